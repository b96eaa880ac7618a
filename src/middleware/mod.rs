pub mod auth;
pub mod json;
pub mod path;
pub mod response;

pub use auth::{authenticate, AuthUser, Authentication, MaybeUser};
pub use json::JsonBody;
pub use path::PathId;
pub use response::{ApiResponse, ApiResult};
