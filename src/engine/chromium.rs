use std::path::PathBuf;

use async_trait::async_trait;
use log::{debug, info};
use tempfile::TempDir;
use tokio::process::Command;

use super::{write_local_copy, DocumentEngine, EngineInstance, PdfOptions};
use crate::error::{CertError, Result};

/// Renders PDFs with a headless Chromium binary
#[derive(Debug, Clone)]
pub struct ChromiumEngine {
    executable: PathBuf,
    extra_args: Vec<String>,
}

impl ChromiumEngine {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            extra_args: Vec::new(),
        }
    }

    /// Additional command line flags passed on every render
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }
}

#[async_trait]
impl DocumentEngine for ChromiumEngine {
    async fn launch(&self) -> Result<Box<dyn EngineInstance>> {
        let explicit_path = self.executable.components().count() > 1;
        if explicit_path && !self.executable.exists() {
            return Err(CertError::Engine(format!(
                "executable not found: {}",
                self.executable.display()
            )));
        }

        let workdir = tempfile::Builder::new()
            .prefix("certissue-")
            .tempdir()
            .map_err(|e| CertError::Engine(format!("failed to create scratch dir: {}", e)))?;
        debug!("Launched engine instance in {}", workdir.path().display());

        Ok(Box::new(ChromiumInstance {
            executable: self.executable.clone(),
            extra_args: self.extra_args.clone(),
            workdir,
        }))
    }
}

/// One render session with its own scratch directory
pub struct ChromiumInstance {
    executable: PathBuf,
    extra_args: Vec<String>,
    workdir: TempDir,
}

/// Position of the `<head>` start tag, skipping `<header>` and the like
fn find_head_open(lower: &str) -> Option<usize> {
    lower.match_indices("<head").map(|(at, _)| at).find(|&at| {
        matches!(
            lower.as_bytes().get(at + "<head".len()),
            Some(b'>') | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r')
        )
    })
}

/// Inserts the page rules for `options` into the document head.
///
/// With `prefer_css_page_size` the rules go first so the document's own
/// `@page` rules win; otherwise they go last and override them.
fn inject_page_style(html: &str, options: &PdfOptions) -> String {
    let mut css = format!("@page {{ size: {}; margin: 0; }}", options.page_size_css());
    if options.print_background {
        css.push_str(" html { -webkit-print-color-adjust: exact; print-color-adjust: exact; }");
    }
    let style = format!("<style>{}</style>", css);

    let lower = html.to_ascii_lowercase();
    if options.prefer_css_page_size {
        if let Some(start) = find_head_open(&lower) {
            if let Some(end) = lower[start..].find('>') {
                let at = start + end + 1;
                return format!("{}{}{}", &html[..at], style, &html[at..]);
            }
        }
        format!("{}{}", style, html)
    } else if let Some(at) = lower.find("</head>") {
        format!("{}{}{}", &html[..at], style, &html[at..])
    } else {
        format!("{}{}", html, style)
    }
}

#[async_trait]
impl EngineInstance for ChromiumInstance {
    async fn render_to_pdf(&mut self, html: &str, options: &PdfOptions) -> Result<Vec<u8>> {
        let input = self.workdir.path().join("certificate.html");
        let output = self.workdir.path().join("certificate.pdf");

        tokio::fs::write(&input, inject_page_style(html, options))
            .await
            .map_err(|e| CertError::Engine(format!("failed to write page: {}", e)))?;

        let result = Command::new(&self.executable)
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--no-pdf-header-footer")
            .arg(format!("--print-to-pdf={}", output.display()))
            .args(&self.extra_args)
            .arg(format!("file://{}", input.display()))
            .output()
            .await
            .map_err(|e| {
                CertError::Engine(format!("failed to run {}: {}", self.executable.display(), e))
            })?;

        if !result.status.success() {
            return Err(CertError::Engine(format!(
                "{} exited with {}: {}",
                self.executable.display(),
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }

        let pdf = tokio::fs::read(&output)
            .await
            .map_err(|e| CertError::Engine(format!("no PDF produced: {}", e)))?;
        info!("Rendered PDF ({} bytes)", pdf.len());

        write_local_copy(options, &pdf).await?;
        Ok(pdf)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let path = self.workdir.path().display().to_string();
        self.workdir
            .close()
            .map_err(|e| CertError::Engine(format!("failed to clean up {}: {}", path, e)))?;
        debug!("Closed engine instance {}", path);
        Ok(())
    }
}
