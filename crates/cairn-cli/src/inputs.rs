//! Turns command-line paths into [`InputFile`]s.
//!
//! A file argument contributes its base name. A directory argument is walked
//! recursively in file-name order, and every file under it is named by its
//! path relative to the directory's parent, so the directory's own name is
//! the top-level segment.

use std::fs;
use std::path::{Component, Path};

use anyhow::{bail, Context};
use cairn_sdk::InputFile;
use tracing::debug;
use walkdir::WalkDir;

pub fn collect_inputs(paths: &[impl AsRef<Path>]) -> anyhow::Result<Vec<InputFile>> {
    let mut files = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let meta = fs::metadata(path).with_context(|| format!("cannot read {}", path.display()))?;
        if meta.is_dir() {
            collect_dir(path, &mut files)?;
        } else {
            let name = base_name(path)?;
            files.push(read_input(path, name)?);
        }
    }
    debug!(count = files.len(), "collected input files");
    Ok(files)
}

fn collect_dir(dir: &Path, files: &mut Vec<InputFile>) -> anyhow::Result<()> {
    let top = base_name(dir)?;
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("cannot walk {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(dir)?;
        let mut name = top.clone();
        for component in relative.components() {
            if let Component::Normal(segment) = component {
                name.push('/');
                name.push_str(&utf8(segment, entry.path())?);
            }
        }
        files.push(read_input(entry.path(), name)?);
    }
    Ok(())
}

/// Final path segment. Resolves `.` and similar through the real path.
fn base_name(path: &Path) -> anyhow::Result<String> {
    let resolved;
    let path = if path.file_name().is_some() {
        path
    } else {
        resolved = fs::canonicalize(path)?;
        resolved.as_path()
    };
    match path.file_name() {
        Some(name) => utf8(name, path),
        None => bail!("{} has no file name", path.display()),
    }
}

fn utf8(segment: &std::ffi::OsStr, path: &Path) -> anyhow::Result<String> {
    match segment.to_str() {
        Some(s) => Ok(s.to_owned()),
        None => bail!("{} is not valid UTF-8", path.display()),
    }
}

fn read_input(path: &Path, name: String) -> anyhow::Result<InputFile> {
    let content = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    Ok(InputFile::new(name, content))
}
