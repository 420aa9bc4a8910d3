//! Scigrade CLI
//!
//! A command-line tool for grading Scilab submissions against reference
//! test scripts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scigrade::grading::sanitize;
use scigrade::{Config, EXAMPLE_CONFIG, Evaluator, Submission, TestCase, Verdict};
use serde::Deserialize;
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scigrade")]
#[command(about = "A tool for grading Scilab submissions")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new configuration file
    Init {
        /// Output path (default: scigrade.toml)
        #[arg(short, long, default_value = "scigrade.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Evaluate a submission against a reference test script
    Evaluate {
        /// Submission source file
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Reference test script
        #[arg(short, long, value_name = "SCRIPT")]
        test_case: String,

        /// Auxiliary file copied next to the submission (repeatable)
        #[arg(short, long = "file", value_name = "PATH")]
        files: Vec<PathBuf>,

        /// Grant full credit on a pass
        #[arg(short, long)]
        partial_grading: bool,

        /// Test case weight, reported with the verdict
        #[arg(short, long, default_value_t = 1.0)]
        weight: f64,

        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate a JSON grading request and print the verdict as JSON
    Request {
        /// Request file with `metadata` and `test_case_data` objects
        #[arg(value_name = "FILE")]
        request: PathBuf,
    },

    /// Strip termination directives from a source file
    Sanitize {
        /// Source file to sanitize
        #[arg(value_name = "SOURCE")]
        source: PathBuf,
    },

    /// Show effective configuration
    ShowConfig,
}

/// A grading request as handed over by the grading host
#[derive(Debug, Deserialize)]
struct GradeRequest {
    metadata: Submission,
    test_case_data: TestCase,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = if let Some(ref path) = cli.config {
        info!(?path, "loading configuration");
        Config::from_file(path).context("failed to load configuration")?
    } else {
        debug!("using default configuration");
        Config::default()
    };

    match cli.command {
        Commands::Init { output, force } => init_config(&output, force).await,
        Commands::Evaluate {
            source,
            test_case,
            files,
            partial_grading,
            weight,
            json,
        } => {
            let user_answer = tokio::fs::read_to_string(&source)
                .await
                .context("failed to read source file")?;

            let submission = Submission {
                user_answer,
                file_paths: (!files.is_empty()).then_some(files),
                partial_grading,
            };
            let test_case = TestCase::new(test_case).with_weight(weight);

            run_evaluate(config, &submission, &test_case, json).await
        }
        Commands::Request { request } => run_request(config, &request).await,
        Commands::Sanitize { source } => run_sanitize(&config, &source).await,
        Commands::ShowConfig => {
            show_config(&config);
            Ok(())
        }
    }
}

async fn run_evaluate(
    config: Config,
    submission: &Submission,
    test_case: &TestCase,
    json: bool,
) -> Result<()> {
    info!(test_case = %test_case.test_case, "evaluating submission");

    let evaluator = Evaluator::new(config);
    let verdict = evaluator
        .evaluate(submission, test_case)
        .await
        .context("evaluation failed")?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&verdict).context("failed to serialize verdict")?
        );
    } else {
        print_verdict(&verdict, test_case.weight);
    }

    if verdict.is_success() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

async fn run_request(config: Config, path: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .context("failed to read request file")?;
    let request: GradeRequest =
        serde_json::from_str(&content).context("failed to parse grading request")?;

    let evaluator = Evaluator::new(config);
    let verdict = evaluator
        .evaluate(&request.metadata, &request.test_case_data)
        .await
        .context("evaluation failed")?;

    println!(
        "{}",
        serde_json::to_string_pretty(&verdict).context("failed to serialize verdict")?
    );
    Ok(())
}

async fn run_sanitize(config: &Config, source: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(source)
        .await
        .context("failed to read source file")?;

    let sanitized = sanitize(&content, &config.sanitizer);
    print!("{}", sanitized.source);

    // Keep stdout clean for piping
    if sanitized.stripped {
        info!(directives = ?config.sanitizer.directives, "termination directives stripped");
    } else {
        debug!("no termination directives found");
    }
    Ok(())
}

fn print_verdict(verdict: &Verdict, weight: f64) {
    if verdict.success {
        println!("Passed");
        println!("Mark: {:.2} of {weight}", verdict.mark_fraction * weight);
    } else {
        println!("Failed");
        if let Some(error) = &verdict.error {
            println!("\n{error}");
        }
    }
}

fn show_config(config: &Config) {
    println!("Staging directory: {}", config.working_dir().display());
    match &config.reference_dir {
        Some(dir) => println!("Reference directory: {}", dir.display()),
        None => println!("Reference directory: (current directory)"),
    }
    println!("Shell: {}", config.shell.display());
    println!();

    let interpreter = &config.interpreter;
    println!("Interpreter: {}", interpreter.binary.display());
    println!("  Arguments: {}", interpreter.args.join(" "));
    println!("  Success status: {}", interpreter.success_status);
    println!("  Error marker: {}", interpreter.error_marker);
    println!("  Submission file: {}", interpreter.source_name);
    println!();

    println!("Stripped directives: {}", config.sanitizer.directives.join(", "));
    println!("  Word boundary: {}", config.sanitizer.word_boundary);
}

async fn init_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at '{}'. Use --force to overwrite.",
            output.display()
        );
    }

    tokio::fs::write(output, EXAMPLE_CONFIG)
        .await
        .context("failed to write configuration file")?;

    println!("Created configuration file at '{}'", output.display());
    Ok(())
}
