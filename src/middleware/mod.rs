pub mod auth;
pub mod response;

pub use auth::{authorize, AuthUser, Guard};
pub use response::{ApiResponse, ApiResult};
