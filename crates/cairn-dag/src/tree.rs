//! Build-time directory tree.
//!
//! Directories live in a flat arena and refer to subdirectories by
//! [`DirId`]. A directory is always allocated after its parent, so a child's
//! id is greater than its parent's.

use std::collections::HashMap;

use bytes::Bytes;

use crate::error::{DagError, DagResult};

/// Index of a directory in a [`DirTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DirId(usize);

impl DirId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A named entry of a directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    File(Bytes),
    Dir(DirId),
}

#[derive(Debug, Default)]
struct DirNode {
    entries: Vec<(String, Entry)>,
    by_name: HashMap<String, usize>,
}

impl DirNode {
    fn get(&self, name: &str) -> Option<&Entry> {
        self.by_name.get(name).map(|&pos| &self.entries[pos].1)
    }

    fn push(&mut self, name: &str, entry: Entry) {
        self.by_name.insert(name.to_owned(), self.entries.len());
        self.entries.push((name.to_owned(), entry));
    }
}

/// Arena of directories rooted at [`DirTree::ROOT`].
#[derive(Debug)]
pub struct DirTree {
    dirs: Vec<DirNode>,
}

impl DirTree {
    pub const ROOT: DirId = DirId(0);

    /// A tree holding only an empty root directory.
    pub fn new() -> Self {
        Self {
            dirs: vec![DirNode::default()],
        }
    }

    /// Number of directories, root included.
    pub fn dir_count(&self) -> usize {
        self.dirs.len()
    }

    /// Entries of `dir` in insertion order.
    pub fn entries(&self, dir: DirId) -> &[(String, Entry)] {
        &self.dirs[dir.0].entries
    }

    /// Look up `name` directly under `dir`.
    pub fn get(&self, dir: DirId, name: &str) -> Option<&Entry> {
        self.dirs[dir.0].get(name)
    }

    /// Add a file at `path`, creating intermediate directories.
    ///
    /// Segments are separated by `/`; empty and `.` segments are skipped.
    /// Re-adding a path with identical content is a no-op.
    pub fn insert_file(&mut self, path: &str, content: Bytes) -> DagResult<()> {
        let segments = split_path(path)?;
        let Some((name, parents)) = segments.split_last() else {
            return Err(DagError::EmptyPath(path.to_owned()));
        };

        let mut dir = Self::ROOT;
        for (depth, segment) in parents.iter().enumerate() {
            dir = match self.dirs[dir.0].get(segment) {
                Some(Entry::Dir(child)) => *child,
                Some(Entry::File(_)) => {
                    return Err(DagError::FileDirectoryConflict {
                        path: segments[..=depth].join("/"),
                    });
                }
                None => {
                    let child = DirId(self.dirs.len());
                    self.dirs.push(DirNode::default());
                    self.dirs[dir.0].push(segment, Entry::Dir(child));
                    child
                }
            };
        }

        match self.dirs[dir.0].get(name) {
            None => {
                self.dirs[dir.0].push(name, Entry::File(content));
                Ok(())
            }
            Some(Entry::File(existing)) if *existing == content => Ok(()),
            Some(Entry::File(_)) => Err(DagError::ConflictingContent(segments.join("/"))),
            Some(Entry::Dir(_)) => Err(DagError::FileDirectoryConflict {
                path: segments.join("/"),
            }),
        }
    }
}

impl Default for DirTree {
    fn default() -> Self {
        Self::new()
    }
}

fn split_path(path: &str) -> DagResult<Vec<&str>> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                return Err(DagError::InvalidSegment {
                    path: path.to_owned(),
                    segment: segment.to_owned(),
                });
            }
            _ => segments.push(segment),
        }
    }
    if segments.is_empty() {
        return Err(DagError::EmptyPath(path.to_owned()));
    }
    Ok(segments)
}
