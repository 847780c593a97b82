//! Re-validation of subject documents already on disk.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use gnav_core::errors::{serde_error, GenError};
use gnav_core::serde::from_json_slice;
use gnav_graph::is_acyclic;
use serde::{Deserialize, Serialize};

use crate::compose::SubjectConfig;

/// One violated invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIssue {
    /// Phase label such as `main[0]`, or `parameters`.
    pub phase: String,
    /// What is wrong.
    pub message: String,
}

/// Check result for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCheck {
    /// Checked file.
    pub path: PathBuf,
    /// Number of problems inspected.
    pub problems: usize,
    /// Violations found; empty when the file is sound.
    pub issues: Vec<CheckIssue>,
}

impl FileCheck {
    /// Returns true when no invariant is violated.
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Checks every problem invariant and the glyph map of one subject.
pub fn check_subject(subject: &SubjectConfig) -> Vec<CheckIssue> {
    let mut issues = Vec::new();
    let glyphs: BTreeSet<_> = subject.parameters.reward_graphics.values().collect();
    if glyphs.len() != subject.parameters.reward_graphics.len() {
        issues.push(CheckIssue {
            phase: "parameters".to_string(),
            message: "two reward values share a glyph".to_string(),
        });
    }
    let mut malformed = BTreeSet::new();
    for (phase, problem) in subject.trials.phases() {
        if let Err(err) = problem.validate() {
            issues.push(CheckIssue {
                phase: phase.clone(),
                message: err.to_string(),
            });
            malformed.insert(phase);
        }
    }
    // cycle check only on problems that passed validation
    for (phase, problem) in subject.trials.template_phases() {
        if !malformed.contains(&phase) && !is_acyclic(&problem.graph) {
            issues.push(CheckIssue {
                phase,
                message: "graph contains a cycle".to_string(),
            });
        }
    }
    issues
}

/// Loads and checks one subject file.
pub fn check_file(path: &Path) -> Result<FileCheck, GenError> {
    let bytes = fs::read(path)
        .map_err(|err| serde_error("subject-read", err).with_context("path", path.display()))?;
    let subject: SubjectConfig =
        from_json_slice(&bytes).map_err(|err| err.with_context("path", path.display()))?;
    Ok(FileCheck {
        path: path.to_path_buf(),
        problems: subject.trials.phases().len(),
        issues: check_subject(&subject),
    })
}

/// Checks every `*.json` file directly inside `dir`, sorted by path.
pub fn check_directory(dir: &Path) -> Result<Vec<FileCheck>, GenError> {
    let entries = fs::read_dir(dir)
        .map_err(|err| serde_error("output-dir", err).with_context("path", dir.display()))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| serde_error("output-dir", err))?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();
    paths.iter().map(|path| check_file(path)).collect()
}
