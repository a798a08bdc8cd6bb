use crate::config::ConfigOverrides;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "scan-filer",
    version,
    about = "File OCR'd PDFs into category folders using an LLM-proposed title and category"
)]
pub struct Cli {
    /// PDFs to file, processed in order
    #[arg(value_name = "PDF", required_unless_present = "scan")]
    pub pdfs: Vec<PathBuf>,

    /// Document root holding the category folders
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Maximum example filenames shown per category
    #[arg(long, value_name = "N")]
    pub exemplars: Option<usize>,

    /// Chat model used for classification
    #[arg(long)]
    pub model: Option<String>,

    /// Scan a new document with NAPS2 into this path and file it first
    #[arg(long, value_name = "OUT.pdf")]
    pub scan: Option<PathBuf>,

    /// NAPS2 scanner profile
    #[arg(long)]
    pub profile: Option<String>,

    /// Stop at the first document that cannot be filed
    #[arg(long, action = ArgAction::SetTrue)]
    pub fail_fast: bool,

    /// Classify and print the destination without moving anything
    #[arg(long, action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Exit without waiting for Enter
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_wait: bool,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            document_root: self.root.clone(),
            exemplar_cap: self.exemplars,
            model: self.model.clone(),
            scanner_profile: self.profile.clone(),
            fail_fast: self.fail_fast,
            dry_run: self.dry_run,
        }
    }
}
