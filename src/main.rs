use std::path::PathBuf;

use clap::Parser;
use docsum::gemini::GeminiService;
use docsum::pipeline::{PipelineOptions, SearchPipeline};
use docsum::{config, logging, picker};

/// Pick a document, index it into a Gemini File Search store, and save a cited summary.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Document to process; opens a native file dialog when omitted.
    file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = config::init_config() {
        eprintln!("Configuration error: {err}");
        std::process::exit(1);
    }
    logging::init_tracing();

    let cli = Cli::parse();
    let path = match cli.file {
        Some(path) => path,
        None => match picker::select_file().await {
            Some(path) => path,
            None => return,
        },
    };

    let service = match GeminiService::new() {
        Ok(service) => service,
        Err(err) => {
            tracing::error!(error = %err, "Failed to initialize Gemini client");
            return;
        }
    };

    let options = PipelineOptions::from_config(config::get_config());
    let pipeline = SearchPipeline::new(Box::new(service), options);

    match pipeline.run(&path).await {
        Ok(outcome) => match &outcome.summary_path {
            Some(summary) => tracing::info!(
                identifier = %outcome.identifier,
                summary = %summary.display(),
                "Pipeline finished"
            ),
            None => tracing::warn!(
                identifier = %outcome.identifier,
                "Pipeline finished without a summary"
            ),
        },
        Err(err) => tracing::error!(error = %err, "Pipeline aborted"),
    }
}
