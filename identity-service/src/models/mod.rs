mod session;
mod user;

pub use session::{new_session_id, DeviceInfo, Session, SessionInfo};
pub use user::{PublicUser, User, ROLE_STUDENT};
