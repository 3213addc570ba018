//! HTML to PDF document engines.

pub mod chromium;

use std::path::PathBuf;

use async_trait::async_trait;
use log::info;

use crate::error::{CertError, Result};

pub use chromium::ChromiumEngine;

/// Paper size of the rendered document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaperFormat {
    A4,
}

impl PaperFormat {
    pub fn css_name(&self) -> &'static str {
        match self {
            PaperFormat::A4 => "A4",
        }
    }
}

/// Page options for a PDF render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfOptions {
    pub format: PaperFormat,
    pub landscape: bool,
    pub print_background: bool,

    /// Let `@page` rules in the document override `format`/`landscape`
    pub prefer_css_page_size: bool,

    /// Also write the PDF here (local inspection only)
    pub path: Option<PathBuf>,
}

impl PdfOptions {
    /// A4 landscape with backgrounds, as certificates are printed
    pub fn certificate() -> Self {
        Self {
            format: PaperFormat::A4,
            landscape: true,
            print_background: true,
            prefer_css_page_size: true,
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// CSS `@page` size value for these options
    pub fn page_size_css(&self) -> String {
        if self.landscape {
            format!("{} landscape", self.format.css_name())
        } else {
            format!("{} portrait", self.format.css_name())
        }
    }
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self::certificate()
    }
}

/// Launches renderer instances
#[async_trait]
pub trait DocumentEngine: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn EngineInstance>>;
}

/// A running renderer. Must be closed by its owner.
#[async_trait]
pub trait EngineInstance: Send {
    async fn render_to_pdf(&mut self, html: &str, options: &PdfOptions) -> Result<Vec<u8>>;

    async fn close(self: Box<Self>) -> Result<()>;
}

/// Writes the local copy requested by `options.path`, if any
pub async fn write_local_copy(options: &PdfOptions, pdf: &[u8]) -> Result<()> {
    if let Some(path) = &options.path {
        tokio::fs::write(path, pdf)
            .await
            .map_err(|e| CertError::Engine(format!("{}: {}", path.display(), e)))?;
        info!("Wrote local copy to {}", path.display());
    }
    Ok(())
}
