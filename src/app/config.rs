// sparkscan - app/config.rs
//
// Optional TOML configuration with startup validation. Invalid values
// produce actionable warnings and fall back to defaults; a broken config
// file never aborts a scan.

use crate::core::discovery::DiscoveryConfig;
use crate::util::constants;
use std::path::Path;

/// Raw deserialisable shape of the config file.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[scan]` section.
    pub scan: ScanSection,
    /// `[discovery]` section.
    pub discovery: DiscoverySection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[scan]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ScanSection {
    /// Reservoir capacity for the sampled-lines table.
    pub sample_size: Option<usize>,
    /// RNG seed for a reproducible sample.
    pub seed: Option<u64>,
    /// Number of clusters listed in the usage stats summary.
    pub top_clusters: Option<usize>,
}

/// `[discovery]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DiscoverySection {
    /// Maximum recursion depth below each application directory.
    pub max_depth: Option<usize>,
    /// Maximum log files collected per scan.
    pub max_files: Option<usize>,
    /// Include glob patterns.
    pub include_patterns: Option<Vec<String>>,
    /// Exclude glob patterns.
    pub exclude_patterns: Option<Vec<String>>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated scan configuration.
///
/// All values are validated against named constants at load time; CLI
/// flags are applied on top by the binary after loading.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Reservoir capacity.
    pub sample_capacity: usize,
    /// RNG seed; None draws from OS entropy.
    pub seed: Option<u64>,
    /// Length of the top-clusters list in the usage summary.
    pub top_clusters: usize,
    /// Maximum recursion depth below each application directory.
    pub max_depth: usize,
    /// Maximum log files collected per scan.
    pub max_files: usize,
    /// Include glob patterns for log files.
    pub include_patterns: Vec<String>,
    /// Exclude glob patterns for log files.
    pub exclude_patterns: Vec<String>,
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            sample_capacity: constants::DEFAULT_SAMPLE_CAPACITY,
            seed: None,
            top_clusters: constants::DEFAULT_TOP_CLUSTERS,
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
            log_level: None,
        }
    }
}

impl ScanConfig {
    /// The discovery-facing slice of the configuration.
    pub fn discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            max_depth: self.max_depth,
            max_files: self.max_files,
            include_patterns: self.include_patterns.clone(),
            exclude_patterns: self.exclude_patterns.clone(),
        }
    }
}

/// Load and validate an optional TOML config file.
///
/// Returns the validated config and a list of non-fatal warnings. With no
/// path, returns defaults with no warnings. An unreadable or unparseable
/// file produces defaults plus a warning so the scan still runs.
pub fn load_config(path: Option<&Path>) -> (ScanConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let mut config = ScanConfig::default();

    let Some(path) = path else {
        return (config, warnings);
    };

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warnings.push(format!(
                "Could not read config file '{}': {e}. Using defaults.",
                path.display()
            ));
            return (config, warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            warnings.push(format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                path.display()
            ));
            return (config, warnings);
        }
    };

    tracing::debug!(path = %path.display(), "Loaded config file");

    // Validate each field against named constants, accumulating warnings.

    // -- Scan: sample_size --
    if let Some(size) = raw.scan.sample_size {
        if (1..=constants::ABSOLUTE_MAX_SAMPLE_CAPACITY).contains(&size) {
            config.sample_capacity = size;
        } else {
            warnings.push(format!(
                "[scan] sample_size = {size} is out of range (1-{}). Using default ({}).",
                constants::ABSOLUTE_MAX_SAMPLE_CAPACITY,
                constants::DEFAULT_SAMPLE_CAPACITY,
            ));
        }
    }

    // -- Scan: seed -- (any u64 is valid)
    if let Some(seed) = raw.scan.seed {
        config.seed = Some(seed);
    }

    // -- Scan: top_clusters --
    if let Some(top) = raw.scan.top_clusters {
        if (1..=constants::ABSOLUTE_MAX_TOP_CLUSTERS).contains(&top) {
            config.top_clusters = top;
        } else {
            warnings.push(format!(
                "[scan] top_clusters = {top} is out of range (1-{}). Using default ({}).",
                constants::ABSOLUTE_MAX_TOP_CLUSTERS,
                constants::DEFAULT_TOP_CLUSTERS,
            ));
        }
    }

    // -- Discovery: max_depth --
    if let Some(depth) = raw.discovery.max_depth {
        if (1..=constants::ABSOLUTE_MAX_DEPTH).contains(&depth) {
            config.max_depth = depth;
        } else {
            warnings.push(format!(
                "[discovery] max_depth = {depth} is out of range (1-{}). Using default ({}).",
                constants::ABSOLUTE_MAX_DEPTH,
                constants::DEFAULT_MAX_DEPTH,
            ));
        }
    }

    // -- Discovery: max_files --
    if let Some(files) = raw.discovery.max_files {
        if (constants::MIN_MAX_FILES..=constants::ABSOLUTE_MAX_FILES).contains(&files) {
            config.max_files = files;
        } else {
            warnings.push(format!(
                "[discovery] max_files = {files} is out of range ({}-{}). Using default ({}).",
                constants::MIN_MAX_FILES,
                constants::ABSOLUTE_MAX_FILES,
                constants::DEFAULT_MAX_FILES,
            ));
        }
    }

    // -- Discovery: patterns -- (glob validity is checked at compile time
    // by discovery, which warns and skips bad patterns)
    if let Some(patterns) = raw.discovery.include_patterns {
        config.include_patterns = patterns;
    }
    if let Some(patterns) = raw.discovery.exclude_patterns {
        config.exclude_patterns = patterns;
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    (config, warnings)
}
