//! Per-document filing pipeline.
//!
//! Each document goes through: index the document root, extract text,
//! classify, validate, move. The index is rebuilt for every document so a
//! file filed earlier in the batch shows up as an exemplar for the next one.

use crate::ai::prompts::limit_document_text;
use crate::ai::{validate_response, ClassificationRequest, ClassificationResult, Classifier};
use crate::categories::CategoryIndex;
use crate::config::FilerConfig;
use crate::error::FilerError;
use crate::extract::TextExtractor;
use crate::filing::{Filer, FilingError};
use crate::scanner::Scanner;
use std::path::{Path, PathBuf};


/// What happened to a document that went through without error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Moved to the given path
    Filed(PathBuf),
    /// Dry run: would have been moved to the given path
    Planned(PathBuf),
}

impl Disposition {
    pub fn destination(&self) -> &Path {
        match self {
            Disposition::Filed(path) | Disposition::Planned(path) => path,
        }
    }
}

/// Result of one document
#[derive(Debug)]
pub struct DocumentOutcome {
    pub source: PathBuf,
    /// Validated proposal, when classification got that far
    pub classification: Option<ClassificationResult>,
    pub result: Result<Disposition, FilerError>,
}

impl DocumentOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Summary of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<DocumentOutcome>,
    /// Documents never attempted because the batch stopped early
    pub skipped: Vec<PathBuf>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// True when every document was handled
    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.skipped.is_empty()
    }

    /// Human readable, one line per document
    pub fn render(&self) -> String {
        let mut out = String::new();
        for outcome in &self.outcomes {
            let line = match &outcome.result {
                Ok(Disposition::Filed(dest)) => {
                    format!("OK    {} -> {}", outcome.source.display(), dest.display())
                }
                Ok(Disposition::Planned(dest)) => {
                    format!("PLAN  {} -> {}", outcome.source.display(), dest.display())
                }
                Err(e) => format!("FAIL  {}: {}", outcome.source.display(), e),
            };
            out.push_str(&line);
            out.push('\n');
        }
        for path in &self.skipped {
            out.push_str(&format!("SKIP  {}\n", path.display()));
        }
        out.push_str(&format!(
            "{} succeeded, {} failed, {} skipped\n",
            self.succeeded(),
            self.failed(),
            self.skipped.len()
        ));
        out
    }
}

/// Runtime options of the pipeline, taken from [`FilerConfig`]
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub document_root: PathBuf,
    pub exemplar_cap: usize,
    pub max_document_chars: usize,
    pub fail_fast: bool,
    pub dry_run: bool,
}

impl From<&FilerConfig> for PipelineOptions {
    fn from(config: &FilerConfig) -> Self {
        Self {
            document_root: config.document_root.clone(),
            exemplar_cap: config.exemplar_cap,
            max_document_chars: config.max_document_chars,
            fail_fast: config.fail_fast,
            dry_run: config.dry_run,
        }
    }
}

pub struct FilingPipeline {
    extractor: Box<dyn TextExtractor>,
    classifier: Box<dyn Classifier>,
    filer: Filer,
    options: PipelineOptions,
}

impl FilingPipeline {
    pub fn new(
        extractor: Box<dyn TextExtractor>,
        classifier: Box<dyn Classifier>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            extractor,
            classifier,
            filer: Filer::new(),
            options,
        }
    }

    /// Fresh snapshot of the category tree
    pub fn index(&self) -> Result<CategoryIndex, FilerError> {
        Ok(CategoryIndex::build(
            &self.options.document_root,
            self.options.exemplar_cap,
        )?)
    }

    /// Build the classification request for one document
    pub fn prepare(&self, index: &CategoryIndex, source: &Path) -> ClassificationRequest {
        let text = self.extractor.extract(source).unwrap_or_else(|| {
            tracing::warn!(
                "[Pipeline] No text extracted from {}, classifying on an empty document",
                source.display()
            );
            String::new()
        });
        let text = limit_document_text(&text, self.options.max_document_chars);

        ClassificationRequest::new(text, index.render_listing())
    }

    /// File a single document
    pub async fn process_document(&self, source: &Path) -> DocumentOutcome {
        let mut classification = None;
        let result = self.run_document(source, &mut classification).await;

        match &result {
            Ok(disposition) => tracing::info!(
                "[Pipeline] {} -> {}",
                source.display(),
                disposition.destination().display()
            ),
            Err(e) => tracing::error!("[Pipeline] {}: {}", source.display(), e),
        }

        DocumentOutcome {
            source: source.to_path_buf(),
            classification,
            result,
        }
    }

    async fn run_document(
        &self,
        source: &Path,
        classification: &mut Option<ClassificationResult>,
    ) -> Result<Disposition, FilerError> {
        // No API call for a document that is not there
        if !source.is_file() {
            return Err(FilingError::SourceNotFound(source.to_path_buf()).into());
        }

        let index = self.index()?;
        if index.is_empty() {
            tracing::warn!(
                "[Pipeline] No categories under {}",
                self.options.document_root.display()
            );
        }

        let request = self.prepare(&index, source);
        let raw = self
            .classifier
            .classify(&request.system_prompt(), &request.user_message())
            .await?;

        let result = validate_response(&raw)?;
        tracing::info!(
            "[Pipeline] Proposed \"{}\" in \"{}\"",
            result.title,
            result.category
        );
        *classification = Some(result.clone());

        let intent = self.filer.plan(&index, &result, source)?;
        if self.options.dry_run {
            return Ok(Disposition::Planned(intent.destination()));
        }

        Ok(Disposition::Filed(intent.execute()?))
    }

    /// File documents in order.
    ///
    /// A failed document does not stop the batch unless `fail_fast` is set
    /// or the failure would repeat for every following document.
    pub async fn process_batch<I, P>(&self, sources: I) -> BatchReport
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut report = BatchReport::default();
        let mut sources = sources.into_iter();

        for source in sources.by_ref() {
            let outcome = self.process_document(source.as_ref()).await;

            let stop = match &outcome.result {
                Ok(_) => false,
                Err(e) => self.options.fail_fast || e.is_fatal(),
            };
            report.outcomes.push(outcome);

            if stop {
                break;
            }
        }

        report.skipped = sources.map(|p| p.as_ref().to_path_buf()).collect();
        if !report.skipped.is_empty() {
            tracing::warn!(
                "[Pipeline] Stopped early, {} document(s) not processed",
                report.skipped.len()
            );
        }

        report
    }

    /// Scan a new document into `output`, then file it ahead of `sources`.
    ///
    /// A failed scan is one failed document; the remaining sources are
    /// still filed unless `fail_fast` is set.
    pub async fn scan_and_process<S, I, P>(
        &self,
        scanner: &S,
        output: &Path,
        sources: I,
    ) -> BatchReport
    where
        S: Scanner + ?Sized,
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let sources: Vec<PathBuf> = sources
            .into_iter()
            .map(|p| p.as_ref().to_path_buf())
            .collect();

        match scanner.scan(output) {
            Ok(scanned) => {
                self.process_batch(std::iter::once(scanned).chain(sources))
                    .await
            }
            Err(e) => {
                tracing::error!("[Pipeline] Scan into {} failed: {}", output.display(), e);
                let failed = DocumentOutcome {
                    source: output.to_path_buf(),
                    classification: None,
                    result: Err(e.into()),
                };

                let mut report = if self.options.fail_fast {
                    BatchReport {
                        skipped: sources,
                        ..Default::default()
                    }
                } else {
                    self.process_batch(sources).await
                };
                report.outcomes.insert(0, failed);
                report
            }
        }
    }
}
