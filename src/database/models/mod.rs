pub mod asset;
pub mod brand_kit;
pub mod quote;
pub mod template;

pub use asset::Asset;
pub use brand_kit::BrandKit;
pub use quote::Quote;
pub use template::Template;
