//! Structural errors raised while assembling a directory tree.

/// Errors that can occur while building a DAG from input files.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DagError {
    /// The path has no usable segments.
    #[error("empty path: {0:?}")]
    EmptyPath(String),

    /// The path contains a segment that cannot name a directory entry.
    #[error("invalid segment {segment:?} in path {path:?}")]
    InvalidSegment { path: String, segment: String },

    /// The same path was given twice with different content.
    #[error("conflicting content for {0:?}")]
    ConflictingContent(String),

    /// One input treats a name as a file and another as a directory.
    #[error("{path:?} is used both as a file and as a directory")]
    FileDirectoryConflict { path: String },
}

/// Convenience alias for DAG results.
pub type DagResult<T> = Result<T, DagError>;
