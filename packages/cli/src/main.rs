//! funcpack CLI Entry Point
//!
//! Packages a handler executable (or a `.go` source file, compiled first)
//! into a Lambda custom-runtime zip, written to disk or pushed straight to
//! a function.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use funcpack::api::LambdaClient;
use funcpack::deploy::Deployer;
use funcpack::{archive, compile};

#[derive(Parser)]
#[command(name = "funcpack")]
#[command(
    version,
    about = "Package an executable into a zip that works as an AWS Lambda custom runtime"
)]
struct Cli {
    /// Handler executable, or a .go source file to compile for linux/amd64 first
    input: PathBuf,

    /// Additional files to bundle at their given relative paths
    paths: Vec<PathBuf>,

    /// Output path for the zip (default: <input base name>.zip)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Push the zip as a code update to the named function instead of writing a file
    #[arg(short, long, value_name = "FUNCTION_NAME")]
    update_function: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Everything one invocation needs, fixed at the boundary. Core modules
/// take these by argument and read no ambient state.
struct Invocation {
    input: PathBuf,
    paths: Vec<PathBuf>,
    output: PathBuf,
    function_name: Option<String>,
}

impl Invocation {
    fn from_cli(cli: Cli) -> Result<Self> {
        // The default output name comes from the original input, so
        // `handler.go` packages into `handler.go.zip`.
        let base = cli
            .input
            .file_name()
            .context("input path has no file name")?
            .to_string_lossy()
            .into_owned();
        let output = cli
            .output
            .unwrap_or_else(|| PathBuf::from(format!("{}.zip", base)));

        Ok(Self {
            input: cli.input,
            paths: cli.paths,
            output,
            function_name: cli.update_function,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let invocation = Invocation::from_cli(cli)?;
    run(invocation).await
}

async fn run(invocation: Invocation) -> Result<()> {
    let mut handler = invocation.input.clone();
    let mut intermediate = None;

    if compile::is_source(&handler) {
        let built = compile::build_source(&handler)
            .await
            .with_context(|| format!("failed to compile {}", handler.display()))?;
        info!(
            source = %handler.display(),
            output = %built.display(),
            "compiled handler"
        );
        intermediate = Some(built.clone());
        handler = built;
    }

    let result = match &invocation.function_name {
        Some(function_name) => push(function_name, &handler, &invocation.paths).await,
        None => write_archive(&invocation.output, &handler, &invocation.paths),
    };

    // Cleanup runs on both outcomes; a failed removal never changes the
    // packaging result.
    if let Some(path) = intermediate {
        info!(path = %path.display(), "removing intermediate executable");
        if let Err(e) = std::fs::remove_file(&path) {
            warn!(path = %path.display(), error = %e, "cleanup of intermediate executable failed");
        }
    }

    result
}

fn write_archive(output: &Path, handler: &Path, paths: &[PathBuf]) -> Result<()> {
    archive::write_archive_file(output, handler, paths)?;
    println!("{} wrote {}", "✓".green().bold(), output.display());
    Ok(())
}

async fn push(function_name: &str, handler: &Path, paths: &[PathBuf]) -> Result<()> {
    let archive = archive::build_archive(handler, paths)?;

    let deployer = Deployer::new(LambdaClient::from_config()?);
    deployer
        .deploy(function_name, archive, |status| {
            println!(
                "{} state[{}] reason[{}]",
                "→".blue().bold(),
                status.state,
                status.reason.as_deref().unwrap_or("<none>")
            );
        })
        .await?;

    println!(
        "{} updated function code for {}",
        "✓".green().bold(),
        function_name
    );
    Ok(())
}
