// sparkscan - core/discovery.rs
//
// Locates application directories under the scan root and collects their
// log files. Reads only directory structure and file names, never file
// contents -- that boundary is owned by the app layer (app::scan).
//
// Per-directory and per-file problems are non-fatal and collected as
// warnings; only a bad root is an error.

use crate::core::model::ApplicationId;
use crate::util::constants;
use crate::util::error::DiscoveryError;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for a discovery walk. All limits are clamped to the
/// absolute bounds in `util::constants`.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Maximum recursion depth below each application directory.
    pub max_depth: usize,

    /// Maximum number of log files collected across the whole scan.
    pub max_files: usize,

    /// Glob patterns (filename-only) that a file MUST match to be included.
    /// An empty list means "include everything that is not excluded".
    pub include_patterns: Vec<String>,

    /// Glob patterns for files to skip (compressed rotations etc.).
    pub exclude_patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_depth: constants::DEFAULT_MAX_DEPTH,
            max_files: constants::DEFAULT_MAX_FILES,
            include_patterns: constants::DEFAULT_INCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            exclude_patterns: constants::DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

/// One application directory and its log files, ready for scanning.
#[derive(Debug, Clone)]
pub struct DiscoveredApp {
    pub id: ApplicationId,
    pub dir: PathBuf,
    /// Log files in sorted path order (deterministic scan order).
    pub log_files: Vec<PathBuf>,
}

// =============================================================================
// Entity-id extraction
// =============================================================================

/// Directory name pattern: `application_<clusterId>_<appNumber>`.
fn app_dir_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^application_(\d+)_(\d+)$").expect("discovery: invalid app dir regex")
    })
}

/// Extracts the application identity from a directory name, or None when
/// the name does not match the expected pattern.
pub fn parse_application_id(name: &str) -> Option<ApplicationId> {
    let caps = app_dir_re().captures(name)?;
    Some(ApplicationId {
        cluster_id: caps.get(1)?.as_str().to_string(),
        app_number: caps.get(2)?.as_str().to_string(),
    })
}

// =============================================================================
// Discovery
// =============================================================================

/// Discover application directories directly under `root` and collect
/// their log files.
///
/// # Non-fatal problems
/// Directories named `application*` that fail the strict id pattern, and
/// files or directories that cannot be accessed, are recorded as warnings
/// and skipped. Unrelated directory names are ignored silently.
///
/// # Fatal errors
/// Returns `Err` only when the root itself is missing, not a directory,
/// or unreadable.
pub fn discover_applications(
    root: &Path,
    config: &DiscoveryConfig,
) -> Result<(Vec<DiscoveredApp>, Vec<String>), DiscoveryError> {
    // Use fs::metadata rather than Path::exists/is_dir: those helpers map
    // ALL errors (including PermissionDenied) to false, which would hide
    // an access problem behind a misleading "does not exist".
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(DiscoveryError::NotADirectory {
                path: root.to_path_buf(),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(DiscoveryError::PermissionDenied {
                path: root.to_path_buf(),
                source: e,
            })
        }
        Err(_) => {
            return Err(DiscoveryError::RootNotFound {
                path: root.to_path_buf(),
            })
        }
    }

    // Clamp config limits to absolute bounds.
    let max_files = config.max_files.min(constants::ABSOLUTE_MAX_FILES);
    let max_depth = config.max_depth.min(constants::ABSOLUTE_MAX_DEPTH);

    tracing::debug!(
        root = %root.display(),
        max_depth,
        max_files,
        include = ?config.include_patterns,
        exclude = ?config.exclude_patterns,
        "Discovery starting"
    );

    let include_pats = compile_patterns(&config.include_patterns, "include");
    let exclude_pats = compile_patterns(&config.exclude_patterns, "exclude");

    let mut warnings: Vec<String> = Vec::new();

    // Collect candidate application directories first, then sort by id so
    // the scan order (and any truncation below) is deterministic across
    // platforms regardless of read_dir ordering.
    let mut app_dirs: Vec<(ApplicationId, PathBuf)> = Vec::new();

    let entries = std::fs::read_dir(root).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => DiscoveryError::PermissionDenied {
            path: root.to_path_buf(),
            source: e,
        },
        _ => DiscoveryError::RootNotFound {
            path: root.to_path_buf(),
        },
    })?;

    for entry_result in entries {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                let msg = format!("Cannot access entry under '{}': {e}", root.display());
                tracing::debug!(warning = %msg, "Discovery warning");
                warnings.push(msg);
                continue;
            }
        };

        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => {
                warnings.push(format!(
                    "Skipping '{}': non-UTF-8 directory name",
                    path.display()
                ));
                continue;
            }
        };

        match parse_application_id(name) {
            Some(id) => app_dirs.push((id, path)),
            None => {
                // Only names that look like application directories are
                // worth a warning; anything else is unrelated clutter.
                if name.starts_with("application") {
                    let msg = format!(
                        "Directory '{name}' does not match application_<clusterId>_<appNumber>; \
                         excluded from aggregation"
                    );
                    tracing::warn!(dir = %path.display(), "Unrecognised application directory");
                    warnings.push(msg);
                } else {
                    tracing::trace!(dir = name, "Ignored non-application directory");
                }
            }
        }
    }

    app_dirs.sort_by(|a, b| a.0.cmp(&b.0));

    // Collect log files per application, in sorted order, respecting the
    // global file cap.
    let mut apps: Vec<DiscoveredApp> = Vec::new();
    let mut total_files: usize = 0;
    let mut truncated = false;

    for (id, dir) in app_dirs {
        let mut log_files: Vec<PathBuf> = Vec::new();

        let walker = walkdir::WalkDir::new(&dir)
            .max_depth(max_depth)
            .follow_links(false)
            .sort_by_file_name();

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(e) => {
                    let msg = format!("Cannot access entry under '{}': {e}", dir.display());
                    tracing::debug!(warning = %msg, "Discovery warning");
                    warnings.push(msg);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = match entry.file_name().to_str() {
                Some(n) => n,
                None => {
                    warnings.push(format!(
                        "Skipping '{}': non-UTF-8 filename",
                        entry.path().display()
                    ));
                    continue;
                }
            };

            if is_excluded(file_name, &exclude_pats) {
                tracing::trace!(file = file_name, "Excluded by pattern");
                continue;
            }
            if !is_included(file_name, &include_pats) {
                tracing::trace!(file = file_name, "Not matched by include patterns");
                continue;
            }

            if total_files >= max_files {
                truncated = true;
                break;
            }
            total_files += 1;
            log_files.push(entry.into_path());
        }

        if log_files.is_empty() {
            tracing::debug!(app = %id, "Application directory has no log files");
        }
        apps.push(DiscoveredApp { id, dir, log_files });

        if truncated {
            break;
        }
    }

    if truncated {
        warnings.push(format!(
            "Scan stopped at the ingest limit of {max_files} log files; \
             later applications were not scanned. Raise [discovery] max_files \
             in the config to cover the full tree."
        ));
        tracing::info!(limit = max_files, "File collection truncated");
    }

    tracing::debug!(
        applications = apps.len(),
        files = total_files,
        warnings = warnings.len(),
        "Discovery complete"
    );

    Ok((apps, warnings))
}

// =============================================================================
// Glob helpers
// =============================================================================

/// Compile a list of glob pattern strings into `glob::Pattern` objects.
/// Patterns that fail to compile are logged as warnings and skipped.
fn compile_patterns(patterns: &[String], kind: &str) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                tracing::warn!(pattern = p, kind, error = %e, "Invalid glob pattern, skipping");
                None
            }
        })
        .collect()
}

/// Returns true if `file_name` matches any exclude pattern.
fn is_excluded(file_name: &str, exclude_pats: &[glob::Pattern]) -> bool {
    exclude_pats.iter().any(|p| p.matches(file_name))
}

/// Returns true if `file_name` matches at least one include pattern.
/// An empty include list means "include all" (returns true).
fn is_included(file_name: &str, include_pats: &[glob::Pattern]) -> bool {
    if include_pats.is_empty() {
        return true;
    }
    include_pats.iter().any(|p| p.matches(file_name))
}

// =============================================================================
// Tests
// =============================================================================
