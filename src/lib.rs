pub mod ai;
pub mod categories;
pub mod cli;
pub mod config;
pub mod error;
pub mod exemplars;
pub mod extract;
pub mod filing;
pub mod pipeline;
pub mod scanner;

use ai::http_client::{build_client, openai_client, DEFAULT_REQUEST_TIMEOUT};
use ai::{ClassifierError, CredentialManager, OpenAiClient, OPENAI_PROVIDER};
use clap::Parser;
use cli::Cli;
use config::FilerConfig;
use error::FilerError;
use extract::PdfTextExtractor;
use pipeline::{BatchReport, FilingPipeline, PipelineOptions};
use scanner::Naps2Scanner;
use std::io::{BufRead, IsTerminal, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

pub fn run() -> ExitCode {
    // .env in the working directory, if any
    let _ = dotenvy::dotenv();

    // RUST_LOG overrides; logs go to stderr so stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,scan_filer=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let success = match execute(&cli) {
        Ok(report) => {
            print!("{}", report.render());
            report.is_success()
        }
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            false
        }
    };

    if success {
        return ExitCode::SUCCESS;
    }

    // Keep the message visible when started from a desktop shortcut
    if !cli.no_wait && std::io::stdin().is_terminal() {
        wait_for_enter();
    }

    ExitCode::FAILURE
}

/// Check prerequisites, optionally scan, then file every document
fn execute(cli: &Cli) -> Result<BatchReport, FilerError> {
    let config = FilerConfig::load(cli.overrides())?;
    tracing::debug!("[Run] {:?}", config);

    let api_key =
        CredentialManager::get_api_key(OPENAI_PROVIDER).map_err(FilerError::PrerequisiteMissing)?;

    let scanner = match &cli.scan {
        Some(_) => {
            let scanner = Naps2Scanner::new(config.scanner_profile.clone());
            scanner
                .check_available()
                .map_err(|e| FilerError::PrerequisiteMissing(e.to_string()))?;
            Some(scanner)
        }
        None => None,
    };

    let http = if config.request_timeout == DEFAULT_REQUEST_TIMEOUT {
        openai_client().clone()
    } else {
        build_client(config.request_timeout).map_err(ClassifierError::from)?
    };
    let classifier = OpenAiClient::with_client(http, api_key, config.model.clone())
        .with_base_url(config.api_base_url.clone());
    tracing::info!("[Run] Classifying with {}", classifier.model());

    let pipeline = FilingPipeline::new(
        Box::new(PdfTextExtractor::new()),
        Box::new(classifier),
        PipelineOptions::from(&config),
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| FilerError::PrerequisiteMissing(format!("Async runtime: {}", e)))?;

    let report = match (&scanner, &cli.scan) {
        (Some(scanner), Some(output)) => {
            runtime.block_on(pipeline.scan_and_process(scanner, output, &cli.pdfs))
        }
        _ => runtime.block_on(pipeline.process_batch(&cli.pdfs)),
    };

    Ok(report)
}

fn wait_for_enter() {
    eprint!("Press Enter to exit...");
    let _ = std::io::stderr().flush();
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);
}
