//! Copy of the source tree minus Jenkins and VCS leftovers.

use std::fs;
use std::path::Path;

use anyhow::{Context, anyhow};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::report::ConversionReport;

#[derive(Debug, Clone, Copy)]
enum Exclusion {
    Name(&'static str),
    Prefix(&'static str),
    Suffix(&'static str),
}

const EXCLUSIONS: &[Exclusion] = &[
    Exclusion::Prefix("Jenkinsfile"),
    Exclusion::Prefix("jenkinsfile"),
    Exclusion::Name("jenkins"),
    Exclusion::Prefix(".git"),
    Exclusion::Name("__pycache__"),
    Exclusion::Suffix(".pyc"),
    Exclusion::Name(".DS_Store"),
    Exclusion::Name("Thumbs.db"),
];

/// Whether a file or directory called `name` is left out of the mirror.
pub fn is_excluded(name: &str) -> bool {
    EXCLUSIONS.iter().any(|rule| match rule {
        Exclusion::Name(exact) => name == *exact,
        Exclusion::Prefix(prefix) => name.starts_with(prefix),
        Exclusion::Suffix(suffix) => name.ends_with(suffix),
    })
}

/// Recreate `source` under `destination`.
///
/// Existing destination files are never overwritten. Excluded entries are
/// pruned at any depth, together with everything below them, and so is
/// `destination` itself when it lives inside `source`. Per-file failures are
/// recorded in `report` and the walk continues.
pub fn mirror_tree(source: &Path, destination: &Path, report: &mut ConversionReport) {
    info!(
        source = %source.display(),
        destination = %destination.display(),
        "Copying source tree"
    );

    let mut excluded = 0usize;
    let walker = WalkDir::new(source)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let keep = !is_excluded(&entry.file_name().to_string_lossy())
                && entry.path() != destination;
            if !keep {
                debug!(path = %entry.path().display(), "Excluded from copy");
                excluded += 1;
            }
            keep
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(source).to_path_buf();
                report.copy_failed(&path, &anyhow!(err));
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            match fs::create_dir_all(&target) {
                Ok(()) => report.mirror.directories += 1,
                Err(err) => report.copy_failed(
                    entry.path(),
                    &anyhow!(err).context(format!(
                        "Failed to create directory: {}",
                        target.display()
                    )),
                ),
            }
            continue;
        }

        if target.exists() {
            debug!(path = %target.display(), "Destination exists, leaving it untouched");
            report.mirror.existing += 1;
            continue;
        }

        match copy_file(entry.path(), &target) {
            Ok(()) => {
                debug!(from = %entry.path().display(), to = %target.display(), "Copied file");
                report.mirror.copied += 1;
            }
            Err(err) => report.copy_failed(entry.path(), &err),
        }
    }

    report.mirror.excluded += excluded;
    info!(
        copied = report.mirror.copied,
        existing = report.mirror.existing,
        excluded = report.mirror.excluded,
        "Source tree copied"
    );
}

fn copy_file(from: &Path, to: &Path) -> anyhow::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::copy(from, to).with_context(|| format!("Failed to copy to {}", to.display()))?;
    Ok(())
}
