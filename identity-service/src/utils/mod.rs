mod password;
mod validation;

pub use password::{hash_password, verify_password, Password, PasswordHashString};
pub use validation::{normalize_identifier, ValidatedJson};
