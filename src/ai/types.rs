//! Shared types for the classification step

use serde::Serialize;

/// Everything the classifier needs for one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRequest {
    document_text: String,
    category_listing: String,
}

impl ClassificationRequest {
    pub fn new(document_text: impl Into<String>, category_listing: impl Into<String>) -> Self {
        Self {
            document_text: document_text.into(),
            category_listing: category_listing.into(),
        }
    }

    /// System-role instruction built from the category listing
    pub fn system_prompt(&self) -> String {
        super::prompts::build_classification_prompt(&self.category_listing)
    }

    /// User-role payload carrying the document text
    pub fn user_message(&self) -> String {
        super::prompts::build_document_message(&self.document_text)
    }
}

/// A validated title/category proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    /// Proposed document title (not yet sanitized)
    pub title: String,
    /// Proposed category name, relative to the document root
    pub category: String,
}
