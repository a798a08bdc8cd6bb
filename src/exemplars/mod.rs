//! Exemplar selection for category prompts.
//!
//! Each category can hold hundreds of filenames; only a small, diverse
//! subset is shown to the model so the prompt stays bounded.

pub mod selector;
pub mod similarity;

pub use selector::{select_exemplars, ExemplarError, SimilarityMatrix, DEFAULT_EXEMPLAR_CAP};
pub use similarity::ratio;
