// Route handlers, one module per resource. Every handler returns
// `ApiResult<T>`, so each request yields exactly one envelope.
pub mod ai;
pub mod assets;
pub mod auth;
pub mod brand_kits;
pub mod quotes;
pub mod render;
pub mod system;
pub mod templates;
pub mod uploads;
