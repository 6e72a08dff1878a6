//! SLURM job dispatch.
//!
//! One blocking `sbatch` invocation per job descriptor. Submission is
//! fire-and-forget: once the scheduler accepts a job we have no further
//! visibility into it. A failed submission aborts the run immediately;
//! jobs already accepted are not rolled back.

use std::path::{Path, PathBuf};
use std::process::Command;

use regex::Regex;
use tracing::{debug, info};

use crate::error::{CabelError, Result};
use crate::params::JobParams;

/// One job ready for submission. Constructed per (dataset [, model])
/// combination and consumed immediately.
#[derive(Debug, Clone)]
pub struct SlurmJob {
    /// Job name, unique within one run.
    pub name: String,
    /// Path to the job script `sbatch` will run.
    pub script: PathBuf,
    /// Directory receiving the stdout/stderr logs.
    pub log_dir: PathBuf,
    /// Scheduler account, if the cluster requires one.
    pub account: Option<String>,
    /// Scheduler partition, if not the cluster default.
    pub partition: Option<String>,
    /// Environment variables exported to the job script.
    pub env: Vec<(String, String)>,
    /// Extra `sbatch` options appended verbatim (from `SBATCH_EXTRA_OPTS`).
    pub extra_opts: Option<String>,
}

impl SlurmJob {
    /// Build a job descriptor from assembled parameters.
    pub fn new(params: JobParams, script: impl Into<PathBuf>, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: params.job_name,
            script: script.into(),
            log_dir: log_dir.into(),
            account: None,
            partition: None,
            env: params.env,
            extra_opts: None,
        }
    }

    pub fn account(mut self, account: Option<String>) -> Self {
        self.account = account;
        self
    }

    pub fn partition(mut self, partition: Option<String>) -> Self {
        self.partition = partition;
        self
    }

    pub fn extra_opts(mut self, opts: Option<String>) -> Self {
        self.extra_opts = opts;
        self
    }

    /// Stdout log template. `%j` is expanded to the job id by SLURM.
    pub fn stdout_log(&self) -> PathBuf {
        self.log_dir.join(format!("{}-%j.out", self.name))
    }

    /// Stderr log template.
    pub fn stderr_log(&self) -> PathBuf {
        self.log_dir.join(format!("{}-%j.err", self.name))
    }

    /// Full `sbatch` argument vector, job script last.
    pub fn sbatch_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--job-name={}", self.name),
            format!("--output={}", self.stdout_log().display()),
            format!("--error={}", self.stderr_log().display()),
        ];
        if let Some(account) = &self.account {
            args.push(format!("--account={account}"));
        }
        if let Some(partition) = &self.partition {
            args.push(format!("--partition={partition}"));
        }
        if let Some(extra) = &self.extra_opts {
            args.extend(extra.split_whitespace().map(str::to_string));
        }
        args.push(self.script.display().to_string());
        args
    }
}

/// Creates the log directory if missing. Safe to call repeatedly.
pub fn ensure_log_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    Ok(())
}

/// Submits [`SlurmJob`]s via the external `sbatch` binary.
pub struct Dispatcher {
    sbatch: String,
    dry_run: bool,
    re_job_id: Regex,
}

impl Dispatcher {
    pub fn new(dry_run: bool) -> Result<Self> {
        Self::with_command("sbatch", dry_run)
    }

    /// Use a different scheduler binary (tests, wrapper scripts).
    pub fn with_command(sbatch: impl Into<String>, dry_run: bool) -> Result<Self> {
        Ok(Self {
            sbatch: sbatch.into(),
            dry_run,
            re_job_id: Regex::new(r"Submitted batch job (\d+)")?,
        })
    }

    /// Parse the job id from the scheduler's acceptance line.
    pub fn parse_job_id(&self, reply: &str) -> Option<u64> {
        self.re_job_id
            .captures(reply)
            .and_then(|caps| caps.get(1))
            .and_then(|id| id.as_str().parse().ok())
    }

    /// Submit one job. Returns the scheduler-assigned job id, or `None` in
    /// dry-run mode. Any failure halts the caller's loop: remaining jobs
    /// stay unsubmitted.
    pub fn submit(&self, job: &SlurmJob) -> Result<Option<u64>> {
        ensure_log_dir(&job.log_dir)?;

        let args = job.sbatch_args();
        if self.dry_run {
            info!(job = %job.name, "dry-run: {} {}", self.sbatch, args.join(" "));
            for (key, value) in &job.env {
                debug!(job = %job.name, "  {key}={value}");
            }
            return Ok(None);
        }

        let output = Command::new(&self.sbatch)
            .args(&args)
            .envs(job.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .output()?;

        if !output.status.success() {
            return Err(CabelError::SubmitFailed {
                job: job.name.clone(),
                detail: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let job_id = self
            .parse_job_id(&stdout)
            .ok_or_else(|| CabelError::MalformedReply(stdout.trim().to_string()))?;
        info!(job = %job.name, job_id, "submitted");
        Ok(Some(job_id))
    }
}
