use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "certissue")]
#[command(author, version, about, long_about = None)]
#[command(about = "Issue and verify PDF completion certificates")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub settings: Settings,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Locations and behaviour shared by all commands
#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Public base address of the certificate bucket
    #[arg(
        long,
        global = true,
        env = "CERTISSUE_PUBLIC_BASE_URL",
        default_value = "http://localhost:3000/certificates"
    )]
    pub public_base_url: String,

    /// JSON file holding certificate records
    #[arg(
        long,
        global = true,
        env = "CERTISSUE_RECORDS_PATH",
        default_value = "./data/users_certificate.json"
    )]
    pub records: PathBuf,

    /// Directory receiving published PDFs
    #[arg(
        long,
        global = true,
        env = "CERTISSUE_BLOB_DIR",
        default_value = "./data/certificates"
    )]
    pub blob_dir: PathBuf,

    /// Certificate HTML template
    #[arg(
        long,
        global = true,
        env = "CERTISSUE_TEMPLATE",
        default_value = "./assets/certificate.html"
    )]
    pub template: PathBuf,

    /// Seal image embedded in the certificate
    #[arg(long, global = true, env = "CERTISSUE_SEAL", default_value = "./assets/seal.png")]
    pub seal: PathBuf,

    /// Headless Chromium executable
    #[arg(long, global = true, env = "CERTISSUE_CHROMIUM", default_value = "chromium")]
    pub chromium: PathBuf,

    /// Extra Chromium flags, comma separated (e.g. --disable-dev-shm-usage)
    #[arg(
        long,
        global = true,
        env = "CERTISSUE_CHROMIUM_ARGS",
        value_delimiter = ',',
        allow_hyphen_values = true
    )]
    pub chromium_args: Vec<String>,

    /// Local/offline mode: also write each PDF to --offline-pdf
    #[arg(
        long,
        global = true,
        env = "IS_OFFLINE",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub offline: bool,

    /// Local copy written in offline mode
    #[arg(
        long,
        global = true,
        env = "CERTISSUE_OFFLINE_PDF",
        default_value = "./certificate.pdf"
    )]
    pub offline_pdf: PathBuf,

    /// Answer issuance requests successfully even if publishing the PDF fails
    #[arg(
        long,
        global = true,
        env = "CERTISSUE_BEST_EFFORT_PUBLISH",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub best_effort_publish: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP service
    Serve {
        /// Address to bind to
        #[arg(short, long, env = "CERTISSUE_BIND", default_value = "127.0.0.1:3000")]
        bind: String,
    },

    /// Issue a single certificate
    Issue {
        /// Recipient identifier
        #[arg(short, long)]
        id: String,

        /// Recipient name
        #[arg(short, long)]
        name: String,

        /// Grade
        #[arg(short, long)]
        grade: String,
    },

    /// Verify a certificate by identifier
    Verify {
        /// Recipient identifier
        #[arg(short, long)]
        id: String,
    },
}
