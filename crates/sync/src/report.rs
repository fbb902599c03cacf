use crate::error::Error;
use std::path::{Path, PathBuf};

/// Why a file was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The store has no record for the file.
    NoRecord,
    /// The file has no readable link marker.
    NoFileId,
}

/// What happened to a single file during a bulk operation.
///
/// Bulk operations never stop on a per-file failure; the error is kept here
/// instead, so callers can log, retry or surface it.
#[derive(Debug)]
pub enum Outcome {
    /// The file was given a new identifier, which was recorded.
    Linked { file_id: String },
    /// A copy of a linked file now carries `to` in place of `from`.
    Relinked { from: String, to: String },
    /// The record followed the file to its new path.
    Moved { file_id: String },
    /// The record now points at the file's current path.
    Refreshed { file_id: String },
    Removed,
    Skipped(SkipReason),
    Failed(Error),
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

#[derive(Debug)]
pub struct FileOutcome {
    /// The file acted upon (the new path for copies and moves).
    pub path: PathBuf,
    pub outcome: Outcome,
}

/// Per-file outcomes of a bulk operation, in processing order.
#[derive(Debug, Default)]
pub struct Report {
    outcomes: Vec<FileOutcome>,
}

impl Report {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self { outcomes: Vec::with_capacity(capacity) }
    }

    pub(crate) fn push(&mut self, path: PathBuf, outcome: Outcome) {
        self.outcomes.push(FileOutcome { path, outcome });
    }

    pub fn outcomes(&self) -> &[FileOutcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<FileOutcome> {
        self.outcomes
    }

    /// Look up the outcome recorded for a path.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&Outcome> {
        let path = path.as_ref();
        self.outcomes.iter().find(|o| o.path == path).map(|o| &o.outcome)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.outcome.is_failed())
    }

    /// `true` if no file failed. Skipped files do not count as failures.
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}
