use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow, bail};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::Shell;
use jenkins_convert::converter::{Converter, WORKFLOWS_DIR};
use jenkins_convert::jenkinsfile::{discover, parse_pipeline, workflow_name};
use jenkins_convert::options::ConvertOptions;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, prelude::*};

fn main() -> Result<()> {
    let cli = Cli::parse();
    configure_tracing(cli.verbose)?;

    match cli.command {
        Commands::Convert(args) => convert(args),
        Commands::Inspect { input } => inspect(&input),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                env!("CARGO_PKG_NAME"),
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}

fn configure_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init()
        .map_err(|err| anyhow!(err.to_string()))?;

    Ok(())
}

fn convert(args: ConvertArgs) -> Result<()> {
    let mut options = match &args.config {
        Some(path) => ConvertOptions::load(path)?,
        None => ConvertOptions::default(),
    };
    if let Some(versions) = args.java_versions {
        options.versions = versions;
    }
    if let Some(runner) = args.runner {
        options.runner = runner;
    }

    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        versions = ?options.versions,
        runner = %options.runner,
        "Starting conversion"
    );

    let report = Converter::new(&args.input, &args.output, options)
        .with_dry_run(args.dry_run)
        .convert()?;

    if let Some(path) = &args.report {
        report.write_json(path)?;
        info!(report = %path.display(), "Conversion report written");
    }

    if args.dry_run {
        for workflow in &report.workflows {
            println!(
                "{} -> {}",
                workflow.source.display(),
                workflow.workflow.display()
            );
        }
        return Ok(());
    }

    println!("Conversion completed");
    println!("Output directory: {}", args.output.display());
    println!(
        "Workflows created in: {}",
        args.output.join(WORKFLOWS_DIR).display()
    );
    if !report.is_clean() {
        println!(
            "{} pipeline(s) skipped, {} failed, {} file(s) not copied",
            report.skipped.len(),
            report.failures.len(),
            report.mirror.failures.len()
        );
    }

    Ok(())
}

fn inspect(input: &Path) -> Result<()> {
    if !input.is_dir() {
        bail!("Input directory '{}' does not exist", input.display());
    }

    let pipelines = discover(input, None);
    if pipelines.is_empty() {
        println!("No Jenkinsfiles found in {}", input.display());
        return Ok(());
    }

    for path in pipelines {
        let info = match parse_pipeline(input, &path) {
            Ok(info) => info,
            Err(err) => {
                error!(file = %path.display(), "{err:#}");
                continue;
            }
        };
        println!("{}", path.display());
        println!("  project: {}", info.project_type);
        println!(
            "  working directory: {}",
            info.working_directory.as_deref().unwrap_or(".")
        );
        println!("  workflow: {}.yml", workflow_name(input, &path));
        if info.stages.is_empty() {
            println!("  stages: none");
        }
        for stage in &info.stages {
            println!("  - {} [{}]", stage.name, stage.category);
            for command in &stage.commands {
                println!("      sh {command}");
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(
    name = "jenkins-convert",
    version,
    about = "Convert Jenkins pipelines into GitHub Actions workflows"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a Jenkins repository
    Convert(ConvertArgs),
    /// Show what would be converted
    Inspect {
        #[arg(value_hint = ValueHint::DirPath)]
        input: PathBuf,
    },
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
struct ConvertArgs {
    /// Directory containing the Jenkins project(s)
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    input: PathBuf,
    /// Directory receiving workflows and the copied sources
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    output: PathBuf,
    /// Java versions to test against (default: 17 21)
    #[arg(long = "java-versions", num_args = 1..)]
    java_versions: Option<Vec<String>>,
    /// Runner label (default: ubuntu-latest)
    #[arg(long)]
    runner: Option<String>,
    /// YAML file with conversion options
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,
    /// Write a JSON conversion report
    #[arg(long, value_hint = ValueHint::FilePath)]
    report: Option<PathBuf>,
    #[arg(long)]
    dry_run: bool,
}
