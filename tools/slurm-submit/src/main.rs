//! SLURM submission for CABEL training runs.
//!
//! One `sbatch` call per requested (dataset [, model]) combination, with the
//! assembled parameters exported as environment variables to the job script.
//! Submission is sequential and fail-fast: the first scheduler error aborts
//! the run, and jobs already accepted are not rolled back.

use std::path::PathBuf;

use anyhow::{Context, Result};
use cabel_core::{Dataset, Dispatcher, JobParams, Layout, Model, SlurmJob};
use clap::{Parser, Subcommand};
use tracing::info;

/// CLI arguments
#[derive(Parser)]
#[command(name = "slurm-submit")]
#[command(about = "Submit CABEL biencoder/crossencoder training jobs to SLURM")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Workspace root all data/model paths derive from
    #[arg(long, env = "CABEL_ROOT", default_value = ".")]
    root: PathBuf,

    /// Scheduler account
    #[arg(long, env = "SBATCH_ACCOUNT")]
    account: Option<String>,

    /// Scheduler partition
    #[arg(long, env = "SBATCH_PARTITION")]
    partition: Option<String>,

    /// Extra sbatch options, appended verbatim to every invocation
    #[arg(long, env = "SBATCH_EXTRA_OPTS")]
    extra_opts: Option<String>,

    /// Directory receiving job stdout/stderr logs
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// Print the sbatch invocations without submitting
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit one biencoder training job per dataset
    Biencoder {
        /// Datasets to train on (comma separated, default: all registered)
        #[arg(long, value_delimiter = ',')]
        datasets: Vec<String>,

        /// Job script passed to sbatch
        #[arg(long, default_value = "scripts/train_biencoder.sh")]
        job_script: PathBuf,
    },
    /// Submit one crossencoder training job per (dataset, model) pair
    Crossencoder {
        /// Datasets to train on (comma separated, default: all registered)
        #[arg(long, value_delimiter = ',')]
        datasets: Vec<String>,

        /// Pretrained encoder backbones (comma separated, default: all registered)
        #[arg(long, value_delimiter = ',')]
        models: Vec<String>,

        /// Job script passed to sbatch
        #[arg(long, default_value = "scripts/train_crossencoder.sh")]
        job_script: PathBuf,
    },
}

fn resolve_datasets(names: &[String]) -> Result<Vec<Dataset>> {
    if names.is_empty() {
        return Ok(Dataset::ALL.to_vec());
    }
    names.iter().map(|name| Ok(name.parse()?)).collect()
}

fn resolve_models(names: &[String]) -> Result<Vec<Model>> {
    if names.is_empty() {
        return Ok(Model::ALL.to_vec());
    }
    names.iter().map(|name| Ok(name.parse()?)).collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let layout = Layout::new(&cli.root);
    let dispatcher = Dispatcher::new(cli.dry_run)?;

    let submit = |params: JobParams, script: &PathBuf| -> Result<()> {
        let name = params.job_name.clone();
        let job = SlurmJob::new(params, script, &cli.log_dir)
            .account(cli.account.clone())
            .partition(cli.partition.clone())
            .extra_opts(cli.extra_opts.clone());
        dispatcher
            .submit(&job)
            .with_context(|| format!("submitting job {name}"))?;
        Ok(())
    };

    match &cli.command {
        Commands::Biencoder {
            datasets,
            job_script,
        } => {
            let datasets = resolve_datasets(datasets)?;
            info!("submitting {} biencoder jobs", datasets.len());
            for dataset in datasets {
                submit(JobParams::biencoder(dataset, &layout), job_script)?;
            }
        }
        Commands::Crossencoder {
            datasets,
            models,
            job_script,
        } => {
            let datasets = resolve_datasets(datasets)?;
            let models = resolve_models(models)?;
            info!(
                "submitting {} crossencoder jobs",
                datasets.len() * models.len()
            );
            for dataset in &datasets {
                for model in &models {
                    submit(JobParams::crossencoder(*dataset, *model, &layout), job_script)?;
                }
            }
        }
    }

    Ok(())
}
