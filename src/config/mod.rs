//! Configuration management.
//!
//! [`GraphConfig`] is resolved in layers: built-in defaults, then an optional
//! TOML file, then `RIVALGRAPH_*` environment variables.
//!
//! ```toml
//! normalize_ids = true
//! default_network_depth = 1
//! default_max_path_length = 3
//! max_traversal_depth = 10
//! summary_top_companies = 5
//! max_enumerated_paths = 50
//! ```

use serde::Deserialize;
use std::path::Path;

/// Configuration for a graph session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphConfig {
    /// Case-normalize entity ids (trim, collapse whitespace, lowercase).
    pub normalize_ids: bool,
    /// Network depth used when a caller does not supply one.
    pub default_network_depth: u32,
    /// Path length bound used when a caller does not supply one.
    pub default_max_path_length: u32,
    /// Hard ceiling for any depth or path-length bound.
    pub max_traversal_depth: u32,
    /// Number of companies listed in the summary's top-by-degree table.
    pub summary_top_companies: usize,
    /// Cap on the number of paths returned by path enumeration.
    pub max_enumerated_paths: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            normalize_ids: true,
            default_network_depth: 1,
            default_max_path_length: 3,
            max_traversal_depth: 10,
            summary_top_companies: 5,
            max_enumerated_paths: 50,
        }
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Id normalization.
    pub normalize_ids: Option<bool>,
    /// Default network depth.
    pub default_network_depth: Option<u32>,
    /// Default path length bound.
    pub default_max_path_length: Option<u32>,
    /// Traversal ceiling.
    pub max_traversal_depth: Option<u32>,
    /// Summary table size.
    pub summary_top_companies: Option<usize>,
    /// Path enumeration cap.
    pub max_enumerated_paths: Option<usize>,
}

impl GraphConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets id normalization.
    #[must_use]
    pub const fn with_normalize_ids(mut self, normalize: bool) -> Self {
        self.normalize_ids = normalize;
        self
    }

    /// Sets the default network depth.
    #[must_use]
    pub const fn with_default_network_depth(mut self, depth: u32) -> Self {
        self.default_network_depth = depth;
        self
    }

    /// Sets the default path length bound.
    #[must_use]
    pub const fn with_default_max_path_length(mut self, max_length: u32) -> Self {
        self.default_max_path_length = max_length;
        self
    }

    /// Sets the traversal ceiling.
    #[must_use]
    pub const fn with_max_traversal_depth(mut self, depth: u32) -> Self {
        self.max_traversal_depth = depth;
        self
    }

    /// Sets the summary table size.
    #[must_use]
    pub const fn with_summary_top_companies(mut self, count: usize) -> Self {
        self.summary_top_companies = count;
        self
    }

    /// Sets the path enumeration cap.
    #[must_use]
    pub const fn with_max_enumerated_paths(mut self, count: usize) -> Self {
        self.max_enumerated_paths = count;
        self
    }

    /// Loads configuration from environment variables over the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Applies `RIVALGRAPH_*` environment variables on top of this config.
    ///
    /// Unparseable values are ignored.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("RIVALGRAPH_NORMALIZE_IDS")
            && let Ok(normalize) = val.parse()
        {
            self.normalize_ids = normalize;
        }

        if let Ok(val) = std::env::var("RIVALGRAPH_DEFAULT_NETWORK_DEPTH")
            && let Ok(depth) = val.parse()
        {
            self.default_network_depth = depth;
        }

        if let Ok(val) = std::env::var("RIVALGRAPH_DEFAULT_MAX_PATH_LENGTH")
            && let Ok(max_length) = val.parse()
        {
            self.default_max_path_length = max_length;
        }

        if let Ok(val) = std::env::var("RIVALGRAPH_MAX_TRAVERSAL_DEPTH")
            && let Ok(depth) = val.parse()
        {
            self.max_traversal_depth = depth;
        }

        if let Ok(val) = std::env::var("RIVALGRAPH_SUMMARY_TOP_COMPANIES")
            && let Ok(count) = val.parse()
        {
            self.summary_top_companies = count;
        }

        if let Ok(val) = std::env::var("RIVALGRAPH_MAX_ENUMERATED_PATHS")
            && let Ok(count) = val.parse()
        {
            self.max_enumerated_paths = count;
        }

        self
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?;

        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for [`ConfigFile`].
    pub fn from_toml_str(contents: &str) -> crate::Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location, then the environment.
    ///
    /// Looks for `rivalgraph/config.toml` in the platform config directory.
    /// Falls back to defaults if no file is found or it fails to parse.
    #[must_use]
    pub fn load_default() -> Self {
        let from_file = directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("rivalgraph").join("config.toml"))
            .filter(|path| path.exists())
            .and_then(|path| match Self::load_from_file(&path) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring unreadable config file");
                    None
                },
            });

        from_file.unwrap_or_default().with_env_overrides()
    }

    /// Converts a `ConfigFile` to `GraphConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(normalize) = file.normalize_ids {
            config.normalize_ids = normalize;
        }
        if let Some(depth) = file.default_network_depth {
            config.default_network_depth = depth;
        }
        if let Some(max_length) = file.default_max_path_length {
            config.default_max_path_length = max_length;
        }
        if let Some(depth) = file.max_traversal_depth {
            config.max_traversal_depth = depth;
        }
        if let Some(count) = file.summary_top_companies {
            config.summary_top_companies = count;
        }
        if let Some(count) = file.max_enumerated_paths {
            config.max_enumerated_paths = count;
        }

        config
    }
}
