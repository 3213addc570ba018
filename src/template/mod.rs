pub mod assets;
pub mod data;
pub mod replacer;

use std::collections::HashMap;

use crate::error::Result;

pub use assets::CertificateAssets;
pub use data::TemplateData;
pub use replacer::PlaceholderReplacer;

/// Merges structured data into a document template
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, source: &str, data: &HashMap<String, String>) -> Result<String>;
}
