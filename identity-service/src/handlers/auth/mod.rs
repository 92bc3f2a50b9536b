pub mod registration;
pub mod session;

pub use registration::*;
pub use session::*;

use axum::http::HeaderMap;
use std::net::SocketAddr;

use crate::models::DeviceInfo;

/// Device metadata captured at login/registration time for the session
/// record.
pub(crate) fn device_info(addr: SocketAddr, headers: &HeaderMap) -> DeviceInfo {
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    DeviceInfo {
        ip_address: addr.ip().to_string(),
        user_agent,
    }
}
