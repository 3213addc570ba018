use std::path::PathBuf;

use base64::{engine::general_purpose, Engine as _};
use log::debug;

use crate::error::{CertError, Result};

/// The certificate template and seal image on disk.
///
/// Both are read on every render so a replaced template takes effect
/// without a restart.
#[derive(Debug, Clone)]
pub struct CertificateAssets {
    template_path: PathBuf,
    seal_path: PathBuf,
}

impl CertificateAssets {
    pub fn new(template_path: impl Into<PathBuf>, seal_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
            seal_path: seal_path.into(),
        }
    }

    /// Reads the HTML template source
    pub async fn load_template(&self) -> Result<String> {
        debug!("Loading template: {}", self.template_path.display());
        match tokio::fs::read_to_string(&self.template_path).await {
            Ok(source) => Ok(source),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                CertError::TemplateNotFound(self.template_path.display().to_string()),
            ),
            Err(e) => Err(CertError::Asset(format!(
                "{}: {}",
                self.template_path.display(),
                e
            ))),
        }
    }

    /// Reads the seal image as base64 for inline embedding
    pub async fn load_seal_base64(&self) -> Result<String> {
        let bytes = tokio::fs::read(&self.seal_path)
            .await
            .map_err(|e| CertError::Asset(format!("{}: {}", self.seal_path.display(), e)))?;
        Ok(general_purpose::STANDARD.encode(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let assets = CertificateAssets::new(dir.path().join("nope.html"), dir.path().join("seal.png"));

        let err = assets.load_template().await.unwrap_err();
        assert!(matches!(err, CertError::TemplateNotFound(_)));
    }

    #[tokio::test]
    async fn test_seal_is_base64() {
        let dir = tempfile::tempdir().unwrap();
        let seal = dir.path().join("seal.png");
        std::fs::write(&seal, b"hello").unwrap();

        let assets = CertificateAssets::new(dir.path().join("t.html"), &seal);
        assert_eq!(assets.load_seal_base64().await.unwrap(), "aGVsbG8=");
    }

    #[tokio::test]
    async fn test_missing_seal_is_asset_error() {
        let dir = tempfile::tempdir().unwrap();
        let assets = CertificateAssets::new(dir.path().join("t.html"), dir.path().join("seal.png"));

        let err = assets.load_seal_base64().await.unwrap_err();
        assert!(matches!(err, CertError::Asset(_)));
    }
}
