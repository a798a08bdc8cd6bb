use crate::ai::{ClassifierError, ResponseError};
use crate::categories::IndexError;
use crate::config::ConfigError;
use crate::filing::FilingError;
use crate::scanner::ScanError;
use thiserror::Error;

/// Top-level failure of a filing run or of a single document
#[derive(Error, Debug)]
pub enum FilerError {
    #[error("Prerequisite missing: {0}")]
    PrerequisiteMissing(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("Classification request failed: {0}")]
    Classifier(#[from] ClassifierError),

    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error(transparent)]
    Filing(#[from] FilingError),

    #[error(transparent)]
    Scanner(#[from] ScanError),
}

impl FilerError {
    /// Errors that make every following document fail the same way
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FilerError::PrerequisiteMissing(_)
                | FilerError::Config(_)
                | FilerError::Index(IndexError::RootNotFound(_))
                | FilerError::Classifier(ClassifierError::Api { status: 401, .. })
        )
    }
}
