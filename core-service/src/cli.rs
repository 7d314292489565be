//! CLI - Command-line argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use spam_triage_core::constants;

/// Spam Triage CLI
#[derive(Parser)]
#[command(name = "spam-triage")]
#[command(about = "Train a local spam classifier and auto-close spam CRM cases", long_about = None)]
#[command(version = constants::APP_VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pull recent cases from the CRM into a labelled CSV
    BuildCorpus {
        /// Output CSV
        #[arg(long, default_value = constants::DEFAULT_TRAINING_CSV)]
        output: PathBuf,

        /// Number of most recent cases to fetch
        #[arg(long, default_value_t = constants::DEFAULT_MAX_TICKETS)]
        max_tickets: usize,

        /// Subjects starting with this are labelled legitimate
        #[arg(long, default_value = constants::DEFAULT_KNOWN_GOOD_PREFIX)]
        known_good_prefix: String,
    },

    /// Replace spam-row descriptions with bodies from a `---` separated file
    Augment {
        /// Labelled CSV, rewritten in place
        #[arg(long, default_value = constants::DEFAULT_TRAINING_CSV)]
        data: PathBuf,

        /// Body pool file
        #[arg(long, default_value = constants::DEFAULT_BODIES_FILE)]
        bodies: PathBuf,
    },

    /// Train the classifier and write both artifacts
    Train {
        /// Labelled CSV
        #[arg(long, default_value = constants::DEFAULT_TRAINING_CSV)]
        data: PathBuf,

        #[arg(long)]
        model: Option<PathBuf>,

        #[arg(long)]
        vectorizer: Option<PathBuf>,

        /// Split and SGD seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run one triage cycle against the CRM
    Triage {
        #[arg(long)]
        model: Option<PathBuf>,

        #[arg(long)]
        vectorizer: Option<PathBuf>,

        /// Close only when spam confidence is above this
        #[arg(long)]
        threshold: Option<f32>,

        /// Classify and report without closing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Log in and print the New cases as JSON
    Check,
}
