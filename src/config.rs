//! Validated runtime configuration

use std::path::PathBuf;

use crate::cli::Settings;
use crate::error::{CertError, Result};
use crate::service::PublishPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base of every certificate URL, without trailing slash
    pub public_base_url: String,
    pub records_path: PathBuf,
    pub blob_dir: PathBuf,
    pub template_path: PathBuf,
    pub seal_path: PathBuf,
    pub chromium: PathBuf,
    pub chromium_args: Vec<String>,
    pub policy: PublishPolicy,

    /// Set in offline mode only
    pub local_copy: Option<PathBuf>,
}

impl Config {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base = settings.public_base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(CertError::Config("public base URL must not be empty".to_string()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(CertError::Config(format!(
                "public base URL must be http(s): {}",
                base
            )));
        }

        Ok(Self {
            public_base_url: base.to_string(),
            records_path: settings.records.clone(),
            blob_dir: settings.blob_dir.clone(),
            template_path: settings.template.clone(),
            seal_path: settings.seal.clone(),
            chromium: settings.chromium.clone(),
            chromium_args: settings.chromium_args.clone(),
            policy: PublishPolicy::from_flag(settings.best_effort_publish),
            local_copy: settings.offline.then(|| settings.offline_pdf.clone()),
        })
    }
}
