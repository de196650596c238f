use crate::errors::{ResgraphError, Result};
use crate::extract::canonical_uri;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use url::Url;

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Discover resource files under `root`.
///
/// - Respects `.gitignore`
/// - Keeps files matching any include glob and no exclude glob
/// - Returns sorted paths for deterministic output
pub fn discover_files(
    root: &Path,
    include_patterns: &[String],
    exclude_patterns: &[String],
) -> Result<Vec<PathBuf>> {
    let include_set = build_globset(include_patterns)?;
    let exclude_set = build_globset(exclude_patterns)?;

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .build();

    let mut files: Vec<PathBuf> = walker
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file())
        .filter(|path| {
            let relative = path.strip_prefix(root).unwrap_or(path);
            let included = include_set.is_match(relative) || include_set.is_match(path);
            let excluded = exclude_set.is_match(relative) || exclude_set.is_match(path);
            included && !excluded
        })
        .collect();

    files.sort();
    tracing::debug!("discovered {} files under {}", files.len(), root.display());
    Ok(files)
}

/// `file:` system id for a local path.
pub fn path_to_uri(path: &Path) -> Result<String> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let absolute = absolute.canonicalize().unwrap_or(absolute);
    Url::from_file_path(&absolute)
        .map(String::from)
        .map_err(|_| ResgraphError::InvalidSeed {
            seed: path.display().to_string(),
        })
}

/// True when `arg` names a URI rather than a local path.
///
/// Single letter schemes are treated as Windows drive letters.
fn is_uri(arg: &str) -> bool {
    Url::parse(arg).is_ok_and(|u| u.scheme().len() > 1)
}

/// Turn command line arguments into seed system ids.
///
/// URIs are canonicalized, files become `file:` URIs and directories are
/// expanded with [`discover_files`]. Paths that do not exist are still
/// converted so the failure shows up on the resolved node.
pub fn discover_seeds(
    args: &[String],
    include_patterns: &[String],
    exclude_patterns: &[String],
) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut seeds = Vec::new();
    let mut push = |seed: String| {
        if seen.insert(seed.clone()) {
            seeds.push(seed);
        }
    };

    for arg in args {
        if arg.trim().is_empty() {
            return Err(ResgraphError::InvalidSeed { seed: arg.clone() });
        }
        let path = Path::new(arg);
        if path.is_dir() {
            let files = discover_files(path, include_patterns, exclude_patterns)?;
            if files.is_empty() {
                return Err(ResgraphError::NoFiles {
                    path: path.to_path_buf(),
                });
            }
            for file in files {
                push(path_to_uri(&file)?);
            }
        } else if !path.exists() && is_uri(arg) {
            push(canonical_uri(arg));
        } else {
            push(path_to_uri(path)?);
        }
    }

    if seeds.is_empty() {
        return Err(ResgraphError::EmptySeeds);
    }
    Ok(seeds)
}
