//! quire - build an EPUB from cached web-serial chapters

use std::error::Error as _;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use quire::config::{QuireConfig, load_config, log_config};
use quire::{Converter, PackageAssembler, PackageLayout};

#[derive(Parser)]
#[command(name = "quire")]
#[command(version, about = "Build an EPUB from cached web-serial chapters", long_about = None)]
#[command(after_help = "EXAMPLES:
    quire build                      Convert chapters and write the package
    quire --config pact.toml build   Use another book's configuration
    quire -v convert                 Convert only, with per-chapter logging")]
struct Cli {
    /// Configuration file (defaults to quire.toml if present)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log every chapter
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert cached chapter pages into XHTML
    Convert,
    /// Copy the scaffold and write content.opf and the NCX
    Package,
    /// Convert, then package
    Build,
    /// Show the effective configuration
    Info,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return report(&e),
    };
    init_logging(&cli, &config);

    let result = match cli.command {
        Command::Convert => convert(&config).await,
        Command::Package => package(&config).await,
        Command::Build => match convert(&config).await {
            Ok(()) => package(&config).await,
            Err(e) => Err(e),
        },
        Command::Info => {
            show_info(&config);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

fn init_logging(cli: &Cli, config: &QuireConfig) {
    let level = if cli.quiet {
        "warn"
    } else if cli.verbose {
        "debug"
    } else {
        config.log.level.as_str()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("warn,quire={level}"))),
        )
        .with_target(false)
        .init();
}

fn report(error: &quire::Error) -> ExitCode {
    eprintln!("error: {error}");
    let mut source = error.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
    ExitCode::FAILURE
}

async fn convert(config: &QuireConfig) -> quire::Result<()> {
    log_config(config);
    let chapters_dir = &config.paths.chapters_dir;
    tokio::fs::create_dir_all(chapters_dir)
        .await
        .map_err(|e| quire::Error::Io {
            path: chapters_dir.clone(),
            source: e,
        })?;

    let converter = Converter::with_config(&config.convert)?.with_language(&config.book.language);
    converter
        .convert_all(&config.paths.cache_dir, chapters_dir)
        .await?;
    Ok(())
}

async fn package(config: &QuireConfig) -> quire::Result<()> {
    let layout = PackageLayout::from(&config.paths);
    let report = PackageAssembler::new(config.book.clone())
        .assemble(&layout)
        .await?;
    println!(
        "{} chapters packaged into {}",
        report.chapters.len(),
        layout.book_dir.display()
    );
    Ok(())
}

fn show_info(config: &QuireConfig) {
    let book = &config.book;
    println!("Title: {}", book.title);
    println!("Author: {}", book.author);
    if !book.publisher.is_empty() {
        println!("Publisher: {}", book.publisher);
    }
    println!("Identifier: {}", book.identifier);
    println!("Language: {}", book.language);
    let desc = book.description.trim();
    if !desc.is_empty() {
        match desc.char_indices().nth(200) {
            Some((cut, _)) => println!("Description: {}...", &desc[..cut]),
            None => println!("Description: {desc}"),
        }
    }

    let paths = &config.paths;
    println!("Cache: {}", paths.cache_dir.display());
    println!("Manifest: {}", paths.manifest.display());
    println!("Scaffold: {}", paths.scaffold_dir.display());
    println!("Book: {}", paths.book_dir.display());
    println!("Chapters: {}", paths.chapters_dir.display());
    println!("Concurrency: {}", config.convert.concurrency);
}
