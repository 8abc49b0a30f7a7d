//! Configuration module

mod fields;
mod site;

pub use fields::{Attribute, FieldMap};
pub use site::CmsConfig;
pub use site::ContactChannel;
pub use site::Job;
pub use site::SiteConfig;
