use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::warn;
use walkdir::WalkDir;

use crate::Result;

// region: --- File Parser

pub fn load_from_toml<T>(file: impl AsRef<Path>) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = read_to_string(file.as_ref())?;

    Ok(toml::from_str(&content)?)
}

// endregion: --- File Parser

// region: --- Knowledge Paths

/// Resolves config entries, relative to `dir`, to existing files.
///
/// Entries with glob metacharacters expand to every match (sorted); plain
/// entries must point to an existing file.
pub fn expand_paths(dir: &Path, entries: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for entry in entries {
        if is_glob(entry) {
            let globs = [entry.as_str()];
            let mut files = list_files(dir, Some(&globs[..]))?;
            if files.is_empty() {
                warn!(glob = %entry, dir = %dir.display(), "no knowledge file matched");
            }
            files.sort();
            paths.extend(files);
        } else {
            let file = dir.join(entry);
            if !file.is_file() {
                return Err(format!("Knowledge file not found: {}", file.display()).into());
            }
            paths.push(file);
        }
    }

    Ok(paths)
}

fn is_glob(entry: &str) -> bool {
    entry.contains(['*', '?', '[', '{'])
}

// endregion: --- Knowledge Paths

// region: --- Dir Utils

/// Lists files under `dir`. Globs are matched against the path relative to `dir`.
pub fn list_files(dir: &Path, include_globs: Option<&[&str]>) -> Result<Vec<PathBuf>> {
    let base_dir_exclude: GlobSet = base_dir_exclude_globs()?;

    // Deep enough for the longest glob, unlimited with `**`
    let depth = include_globs
        .map(|globs| {
            globs
                .iter()
                .map(|g| if g.contains("**") { 100 } else { g.split('/').count() })
                .max()
                .unwrap_or(1)
        })
        .unwrap_or(1);

    // Prep globs
    let include_globs = include_globs.map(get_glob_set).transpose()?;

    // Build file iterator
    let walk_dir_it = WalkDir::new(dir)
        .max_depth(depth)
        .into_iter()
        .filter_entry(|e| {
            let rel_path = e.path().strip_prefix(dir).unwrap_or(e.path());
            // if dir check dir exclude
            if e.file_type().is_dir() {
                !base_dir_exclude.is_match(e.path())
            }
            // else file, we apply the globs
            else {
                match include_globs.as_ref() {
                    Some(globs) => globs.is_match(rel_path),
                    None => true,
                }
            }
        })
        .filter_map(|e| e.ok().filter(|e| e.file_type().is_file()));

    let paths = walk_dir_it.map(|e| e.into_path());

    Ok(paths.collect())
}

fn base_dir_exclude_globs() -> Result<GlobSet> {
    get_glob_set(&["**/.git", "**/target"])
}

pub fn get_glob_set(globs: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for glob in globs {
        builder.add(Glob::new(glob)?);
    }
    Ok(builder.build()?)
}

// endregion: --- Dir Utils

// region: --- File Utils

pub fn read_to_string(file: &Path) -> Result<String> {
    if !file.is_file() {
        return Err(format!("File not found: {}", file.display()).into());
    }
    let content = fs::read_to_string(file)?;

    Ok(content)
}

// endregion: --- File Utils

// region --- XFile

/// Returns the file name as `&str`, or "" when there is none.
pub trait XFile {
    fn x_file_name(&self) -> &str;
}

impl XFile for Path {
    fn x_file_name(&self) -> &str {
        self.file_name().and_then(OsStr::to_str).unwrap_or("")
    }
}

// endregion --- XFile
