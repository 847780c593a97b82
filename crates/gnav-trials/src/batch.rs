//! Batch generation of subject files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use gnav_core::errors::{serde_error, ErrorInfo, GenError};
use gnav_core::rng::{derive_substream_seed, RngHandle};
use gnav_core::serde::{sha256_hex, to_canonical_json_bytes};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::compose::{compose_subject, SubjectConfig};
use crate::config::TrialConfig;

/// State of one subject after the batch ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubjectState {
    /// File written.
    Complete,
    /// Generation or writing failed; no file was left behind.
    Failed,
}

/// Report entry for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectReport {
    /// 1-based subject index, also the file stem.
    pub index: usize,
    /// Seed of the subject's RNG substream.
    pub seed: u64,
    /// Outcome.
    pub state: SubjectState,
    /// Written file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// SHA-256 of the written bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    /// Failure payload, with the failing phase in its context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

/// Summary of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Master seed the substreams were derived from.
    pub master_seed: u64,
    /// Output directory.
    pub directory: PathBuf,
    /// One entry per subject, ordered by index.
    pub subjects: Vec<SubjectReport>,
    /// Number of files written.
    pub written: usize,
    /// Number of subjects that failed.
    pub failed: usize,
}

/// Path of the file holding subject `index`.
pub fn subject_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("{index}.json"))
}

/// Generates the document for subject `index` (1-based).
pub fn generate_subject(config: &TrialConfig, index: usize) -> Result<SubjectConfig, GenError> {
    let mut rng = RngHandle::substream(config.seed_policy.master_seed, index as u64);
    compose_subject(config, &mut rng).map_err(|err| err.with_context("subject", index))
}

/// Writes one subject document atomically and returns its path and digest.
///
/// The full document is encoded in memory, written to a temporary file in
/// `dir` and renamed into place. The temporary file is removed on failure.
pub fn write_subject(
    dir: &Path,
    index: usize,
    subject: &SubjectConfig,
) -> Result<(PathBuf, String), GenError> {
    let bytes = to_canonical_json_bytes(subject)?;
    let path = subject_path(dir, index);
    let mut file = NamedTempFile::new_in(dir).map_err(|err| serde_error("subject-tempfile", err))?;
    file.write_all(&bytes)
        .and_then(|_| file.as_file().sync_all())
        .map_err(|err| serde_error("subject-write", err))?;
    file.persist(&path)
        .map_err(|err| serde_error("subject-persist", err.error))?;
    Ok((path, sha256_hex(&bytes)))
}

fn run_subject(config: &TrialConfig, index: usize) -> Result<SubjectReport, GenError> {
    let dir = &config.output.directory;
    let subject = generate_subject(config, index)?;
    let (path, sha256) = write_subject(dir, index, &subject)
        .map_err(|err| err.with_context("phase", "write").with_context("subject", index))?;
    debug!(subject = index, path = %path.display(), "subject written");
    Ok(SubjectReport {
        index,
        seed: derive_substream_seed(config.seed_policy.master_seed, index as u64),
        state: SubjectState::Complete,
        path: Some(path),
        sha256: Some(sha256),
        error: None,
    })
}

fn failed_report(config: &TrialConfig, index: usize, err: GenError) -> SubjectReport {
    let info = err.info().clone();
    warn!(
        subject = index,
        code = %info.code,
        phase = info.context.get("phase").map(String::as_str).unwrap_or("unknown"),
        "subject skipped: {}",
        info.message
    );
    SubjectReport {
        index,
        seed: derive_substream_seed(config.seed_policy.master_seed, index as u64),
        state: SubjectState::Failed,
        path: None,
        sha256: None,
        error: Some(info),
    }
}

/// Runs subjects until one fails and returns the lowest-index failure.
///
/// Subjects above an already failed index are skipped; those below it still
/// run, so the returned error does not depend on thread scheduling.
fn run_fail_fast(config: &TrialConfig) -> Result<Vec<SubjectReport>, GenError> {
    let first_failure = AtomicUsize::new(usize::MAX);
    let results: Vec<Option<Result<SubjectReport, GenError>>> = (1..=config.subjects)
        .into_par_iter()
        .map(|index| {
            if index > first_failure.load(Ordering::Relaxed) {
                return None;
            }
            let result = run_subject(config, index);
            if result.is_err() {
                first_failure.fetch_min(index, Ordering::Relaxed);
            }
            Some(result)
        })
        .collect();
    // a skipped subject always sits above a failed one, so this yields its error
    results.into_iter().flatten().collect()
}

/// Generates and writes every subject of the configured batch.
///
/// Subjects run in parallel on `output.parallelism` threads. Without
/// `fail_fast` failed subjects are reported and skipped; with it the batch
/// returns the failure with the lowest subject index.
pub fn run_batch(config: &TrialConfig) -> Result<BatchReport, GenError> {
    config.validate()?;
    let dir = &config.output.directory;
    fs::create_dir_all(dir).map_err(|err| {
        serde_error("output-dir", err).with_context("path", dir.display())
    })?;
    info!(
        subjects = config.subjects,
        nodes = config.node_count,
        directory = %dir.display(),
        "generating trial sets"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.output.parallelism.max(1))
        .build()
        .map_err(|err| GenError::Config(ErrorInfo::new("thread-pool", err.to_string())))?;

    let subjects: Vec<SubjectReport> = pool.install(|| {
        if config.output.fail_fast {
            run_fail_fast(config)
        } else {
            Ok((1..=config.subjects)
                .into_par_iter()
                .map(|index| {
                    run_subject(config, index)
                        .unwrap_or_else(|err| failed_report(config, index, err))
                })
                .collect())
        }
    })?;

    let written = subjects
        .iter()
        .filter(|s| s.state == SubjectState::Complete)
        .count();
    let failed = subjects.len() - written;
    info!(written, failed, "batch finished");
    Ok(BatchReport {
        master_seed: config.seed_policy.master_seed,
        directory: dir.clone(),
        subjects,
        written,
        failed,
    })
}
