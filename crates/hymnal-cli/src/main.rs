use anyhow::Result;
use clap::Parser;
use hymnal_acquire::config::{parse_book_list, DEFAULT_BOOKS, DEFAULT_COLLECTION_ROOT};
use hymnal_acquire::{HttpTransport, Pipeline, PipelineConfig, SourceConfig};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "hymnal")]
#[command(about = "Download hymn book lyrics into a local collection")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_HASH"), ")"))]
struct Cli {
    /// Path to the collection (will be created if missing)
    #[arg(long, default_value = DEFAULT_COLLECTION_ROOT)]
    collection: PathBuf,

    /// Hymn books to download (comma-delimited)
    #[arg(long, default_value_t = DEFAULT_BOOKS.join(","))]
    books: String,

    /// Print one song (by slug) to stdout instead of downloading books
    #[arg(long, value_name = "SLUG")]
    show: Option<String>,

    /// Per-request timeout in seconds (0 disables it)
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long)]
    utc: bool,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn init_logging(level: &LogLevel, utc: bool) {
    // Keep the HTML parser quiet at debug/trace
    let level = match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug,selectors=warn,html5ever=warn",
        LogLevel::Trace => "trace,selectors=warn,html5ever=warn",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // 2026-02-14 19:44:09.123 -08:00
    let time_format = "%Y-%m-%d %H:%M:%S%.3f %:z".to_string();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    if utc {
        builder
            .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(time_format))
            .init();
    } else {
        builder
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(time_format))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.utc);

    let timeout = (cli.timeout_secs > 0).then(|| Duration::from_secs(cli.timeout_secs));
    let transport = HttpTransport::new(timeout)?;
    let config = PipelineConfig {
        collection_root: cli.collection,
        books: parse_book_list(&cli.books),
        source: SourceConfig::default(),
    };
    let pipeline = Pipeline::new(transport, config);

    if let Some(slug) = cli.show {
        print!("{}", pipeline.show_song(&slug).await?);
        return Ok(());
    }

    tracing::info!(
        collection = %pipeline.store().root().display(),
        books = %cli.books,
        "Downloading hymn books"
    );
    pipeline.run().await?;

    Ok(())
}
