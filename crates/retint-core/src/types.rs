//! Core data types for the retint pipeline.
//!
//! These types describe what a batch listed, fetched and produced. They are
//! created inside worker tasks and only read by the coordinator after join.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One entry of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    /// Entry name, without any directory part
    pub name: String,

    /// Whether the entry is a directory (directories are never fetched)
    #[serde(default)]
    pub is_dir: bool,
}

impl RemoteEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

/// Result of one dispatched download.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchOutcome {
    /// Remote entry name
    pub source_name: String,

    /// Local destination path
    pub local_path: PathBuf,

    /// Bytes copied (0 on failure)
    pub bytes: u64,

    /// Failure cause, if the fetch failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Where a file is in its pipeline.
///
/// ```text
/// Listed → Fetching → Fetched | FetchFailed
/// Fetched → Decoding → Decoded | DecodeFailed
/// Decoded → Correcting → Corrected | CorrectFailed
/// Corrected → Encoding → Persisted | EncodeFailed | PersistFailed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileState {
    Listed,
    Fetching,
    Fetched,
    FetchFailed,
    Decoding,
    Decoded,
    DecodeFailed,
    Correcting,
    Corrected,
    CorrectFailed,
    Encoding,
    Persisted,
    EncodeFailed,
    PersistFailed,
}

impl FileState {
    /// Whether this state is one of the `*Failed` states.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            FileState::FetchFailed
                | FileState::DecodeFailed
                | FileState::CorrectFailed
                | FileState::EncodeFailed
                | FileState::PersistFailed
        )
    }

    /// Whether no transition leaves this state.
    pub fn is_terminal(self) -> bool {
        self == FileState::Persisted || self.is_failure()
    }

    /// Whether `next` is a legal successor of this state.
    pub fn can_advance_to(self, next: FileState) -> bool {
        use FileState::*;
        matches!(
            (self, next),
            (Listed, Fetching)
                | (Fetching, Fetched | FetchFailed)
                | (Fetched, Decoding)
                | (Decoding, Decoded | DecodeFailed)
                | (Decoded, Correcting)
                | (Correcting, Corrected | CorrectFailed)
                | (Corrected, Encoding)
                | (Encoding, Persisted | EncodeFailed | PersistFailed)
        )
    }
}

/// Per-file record the coordinator aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    /// Remote entry name (or input name for single-file runs)
    pub source_name: String,

    /// Local copy of the source
    pub local_path: PathBuf,

    /// Corrected output, once persisted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,

    /// Last state reached
    pub state: FileState,

    /// Failure cause for `*Failed` states
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    /// A report for a file that is already available locally.
    pub fn fetched(source_name: impl Into<String>, local_path: PathBuf) -> Self {
        Self {
            source_name: source_name.into(),
            local_path,
            output_path: None,
            state: FileState::Fetched,
            error: None,
        }
    }

    /// A report for an entry that was listed but not yet fetched.
    pub fn listed(source_name: impl Into<String>, local_path: PathBuf) -> Self {
        Self {
            source_name: source_name.into(),
            local_path,
            output_path: None,
            state: FileState::Listed,
            error: None,
        }
    }

    /// Build the report from a finished download, walking
    /// `Listed → Fetching → Fetched | FetchFailed`.
    pub fn from_fetch(outcome: FetchOutcome) -> Self {
        let mut report = Self::listed(outcome.source_name, outcome.local_path);
        report.advance(FileState::Fetching);
        match outcome.error {
            None => report.advance(FileState::Fetched),
            Some(error) => report.fail(FileState::FetchFailed, error),
        }
        report
    }

    /// Move to `next`. Illegal transitions are ignored and logged.
    pub fn advance(&mut self, next: FileState) {
        if !self.state.can_advance_to(next) {
            tracing::warn!(
                "Ignoring illegal transition {:?} -> {:?} for {}",
                self.state,
                next,
                self.source_name
            );
            return;
        }
        tracing::trace!("{}: {:?} -> {:?}", self.source_name, self.state, next);
        self.state = next;
    }

    /// Move to a failure state and record its cause.
    pub fn fail(&mut self, next: FileState, error: impl ToString) {
        debug_assert!(next.is_failure());
        self.advance(next);
        if self.state == next {
            self.error = Some(error.to_string());
        }
    }

    /// True unless the file ended in a `*Failed` state.
    pub fn succeeded(&self) -> bool {
        !self.state.is_failure()
    }

    /// The local file name of the fetched copy.
    pub fn local_file_name(&self) -> Option<&str> {
        self.local_path.file_name().and_then(|n| n.to_str())
    }
}

impl From<FetchOutcome> for FileReport {
    fn from(outcome: FetchOutcome) -> Self {
        Self::from_fetch(outcome)
    }
}

/// Aggregate of one batch, frozen after every task has joined.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineResult {
    /// One report per non-directory entry, in listing order
    pub reports: Vec<FileReport>,

    /// Local file name of the first successfully fetched entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub representative: Option<String>,
}

impl PipelineResult {
    /// Freeze reports (in listing order) and pick the representative.
    pub fn from_reports(reports: Vec<FileReport>) -> Self {
        let representative = reports
            .iter()
            .find(|r| r.state != FileState::FetchFailed)
            .and_then(|r| r.local_file_name())
            .map(String::from);
        Self {
            reports,
            representative,
        }
    }

    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| r.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }
}

/// A corrected image written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectedFile {
    /// Input that was corrected
    pub source_path: PathBuf,

    /// Where the corrected JPEG was written
    pub output_path: PathBuf,

    /// File name of the output, for building public URLs
    pub file_name: String,

    pub width: u32,
    pub height: u32,
}
