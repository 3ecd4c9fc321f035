// src/artifact/mod.rs

//! File records flowing through steps.
//!
//! Steps are pull-based: an [`ArtifactSet`] walks a base directory lazily and
//! only reads a file's contents when the consumer asks for the next record,
//! so large asset trees are never buffered in memory at once. A step maps
//! records and hands each one to [`dest`], which writes it under an output
//! directory at the same base-relative path.
//!
//! Steps never reference each other; one step's output directory is simply
//! the next one's input directory.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

use crate::fs::FileSystem;

/// A single file: where it came from, where it sits relative to its base,
/// and its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub relative: PathBuf,
    pub contents: Vec<u8>,
}

impl FileRecord {
    /// Base-relative path with forward slashes (used for glob matching and logs).
    pub fn relative_str(&self) -> String {
        slash_path(&self.relative)
    }

    /// Contents as UTF-8 text.
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.contents)
            .with_context(|| format!("{} is not valid UTF-8", self.relative_str()))
    }

    pub fn with_contents(mut self, contents: impl Into<Vec<u8>>) -> Self {
        self.contents = contents.into();
        self
    }

    pub fn with_extension(mut self, ext: &str) -> Self {
        self.relative.set_extension(ext);
        self
    }

    /// Final path component starts with `_` (e.g. a style partial).
    pub fn is_partial(&self) -> bool {
        self.relative
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with('_'))
            .unwrap_or(false)
    }
}

/// Paths written by a step (or by every step under a composite node).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub written: Vec<PathBuf>,
}

impl RunReport {
    pub fn push(&mut self, path: PathBuf) {
        self.written.push(path);
    }

    pub fn extend(&mut self, other: RunReport) {
        self.written.extend(other.written);
    }

    pub fn len(&self) -> usize {
        self.written.len()
    }

    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }
}

/// Compile a source pattern the way source globs are matched everywhere in
/// pageflow: `*` stops at `/`, `**` crosses directories.
pub fn compile_pattern(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid glob pattern: {pattern}"))?;
    Ok(glob.compile_matcher())
}

/// Lazy sequence of file records under `base` matching a pattern.
///
/// Directory entries are visited in sorted order so the sequence is
/// deterministic. A missing base directory yields an empty set.
pub struct ArtifactSet<'a> {
    fs: &'a dyn FileSystem,
    base: PathBuf,
    matcher: Option<GlobMatcher>,
    dirs: Vec<PathBuf>,
    entries: VecDeque<PathBuf>,
}

impl<'a> ArtifactSet<'a> {
    /// Records under `base` whose base-relative path matches `pattern`.
    pub fn source(fs: &'a dyn FileSystem, base: &Path, pattern: &str) -> Result<Self> {
        let matcher = compile_pattern(pattern)?;
        Ok(Self::new(fs, base, Some(matcher)))
    }

    /// Every file under `base`.
    pub fn all(fs: &'a dyn FileSystem, base: &Path) -> Self {
        Self::new(fs, base, None)
    }

    fn new(fs: &'a dyn FileSystem, base: &Path, matcher: Option<GlobMatcher>) -> Self {
        let dirs = if fs.is_dir(base) {
            vec![base.to_path_buf()]
        } else {
            debug!(base = ?base, "source directory missing; empty artifact set");
            Vec::new()
        };
        Self {
            fs,
            base: base.to_path_buf(),
            matcher,
            dirs,
            entries: VecDeque::new(),
        }
    }

    fn matches(&self, rel: &Path) -> bool {
        match &self.matcher {
            Some(m) => m.is_match(slash_path(rel)),
            None => true,
        }
    }
}

impl Iterator for ArtifactSet<'_> {
    type Item = Result<FileRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(path) = self.entries.pop_front() {
                if self.fs.is_dir(&path) {
                    self.dirs.push(path);
                    continue;
                }
                if !self.fs.is_file(&path) {
                    continue;
                }
                let rel = match path.strip_prefix(&self.base) {
                    Ok(rel) => rel.to_path_buf(),
                    Err(_) => continue,
                };
                if !self.matches(&rel) {
                    continue;
                }
                let record = self.fs.read(&path).map(|contents| FileRecord {
                    path,
                    relative: rel,
                    contents,
                });
                return Some(record);
            }

            let dir = self.dirs.pop()?;
            match self.fs.read_dir(&dir) {
                Ok(mut children) => {
                    children.sort();
                    self.entries.extend(children);
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

/// Write a record under `out_dir` at its base-relative path.
pub fn dest(fs: &dyn FileSystem, out_dir: &Path, record: &FileRecord) -> Result<PathBuf> {
    let target = out_dir.join(&record.relative);
    fs.write(&target, &record.contents)?;
    debug!(path = ?target, bytes = record.contents.len(), "wrote artifact");
    Ok(target)
}

/// Convert a relative path to a forward-slash string.
pub fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
