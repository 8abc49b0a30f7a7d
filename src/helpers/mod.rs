//! Helper functions shared by the renderers and templates

mod date;
mod html;
pub mod mailto;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
