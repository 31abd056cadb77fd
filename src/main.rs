//! CLI entry point: mirror one knowledge base to `./download/<book-id>/`

use clap::Parser;
use yuque_dl::{BookMirror, Config};

/// Listing mirrored when no URL is given on the command line
const DEFAULT_LISTING_URL: &str = "https://www.yuque.com/burpheart/phpaudit";

/// Mirror a Yuque knowledge base to local Markdown with localized images
#[derive(Debug, Parser)]
#[command(name = "yuque-dl", version, about)]
struct Cli {
    /// URL of the book's listing page
    #[arg(default_value = DEFAULT_LISTING_URL)]
    url: String,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mirror = match BookMirror::new(Config::default()) {
        Ok(mirror) => mirror,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize HTTP client");
            return std::process::ExitCode::FAILURE;
        }
    };

    match mirror.mirror(&cli.url).await {
        Ok(report) => {
            tracing::info!(
                book_id = %report.book_id,
                root = %report.book_root.display(),
                written = report.documents.written,
                skipped = report.documents.skipped,
                failed = report.documents.failed,
                "Done"
            );
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, url = %cli.url, "Mirror run failed");
            std::process::ExitCode::FAILURE
        }
    }
}
