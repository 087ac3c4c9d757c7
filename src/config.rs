//! Check configuration.
//!
//! [`CheckOptions`] controls how a check reports: the failure policy, the
//! width of tree dumps, whether accumulated diagnostics are echoed to
//! stderr, and whether a root the grammar does not recognize is an error.
//! Options can be built in code or loaded from a YAML or JSON file; missing
//! fields fall back to their defaults.
//!
//! ```rust
//! use treecheck::config::{CheckOptions, Policy};
//! let opts = CheckOptions::from_yaml_str("policy: accumulate\nprint_width: 100\n").unwrap();
//! assert_eq!(opts.policy, Policy::Accumulate);
//! assert_eq!(opts.print_width, 100);
//! assert!(opts.echo);
//! ```

use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default column limit for tree dumps.
pub const DEFAULT_PRINT_WIDTH: usize = 80;

/// What happens when a violation is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Print the first violation and abort.
    Immediate,
    /// Record violations in the caller's sink and return a failure.
    Accumulate,
}

impl Default for Policy {
    /// `Immediate` when built with the `immediate-fail` feature, otherwise
    /// `Accumulate`.
    fn default() -> Self {
        if cfg!(feature = "immediate-fail") {
            Policy::Immediate
        } else {
            Policy::Accumulate
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckOptions {
    pub policy: Policy,
    pub print_width: usize,
    /// Print accumulated diagnostics to stderr as they are found.
    pub echo: bool,
    /// Treat a root kind the grammar does not recognize as a violation
    /// instead of an unchecked fragment.
    pub require_root: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            policy: Policy::default(),
            print_width: DEFAULT_PRINT_WIDTH,
            echo: true,
            require_root: false,
        }
    }
}

/// Errors raised while loading options from a file.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file '{path}'")]
    #[diagnostic(code(treecheck::config::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML config")]
    #[diagnostic(code(treecheck::config::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON config")]
    #[diagnostic(code(treecheck::config::json))]
    Json(#[from] serde_json::Error),

    #[error("unrecognized config format for '{path}'")]
    #[diagnostic(
        code(treecheck::config::format),
        help("use a .yaml, .yml or .json file")
    )]
    UnknownFormat { path: String },
}

impl CheckOptions {
    /// Silent accumulation: diagnostics only go to the sink.
    pub fn quiet() -> Self {
        Self {
            policy: Policy::Accumulate,
            echo: false,
            ..Self::default()
        }
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_print_width(mut self, width: usize) -> Self {
        self.print_width = width;
        self
    }

    pub fn with_require_root(mut self, require_root: bool) -> Self {
        self.require_root = require_root;
        self
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Loads options from a `.yaml`, `.yml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&source),
            Some("json") => Self::from_json_str(&source),
            _ => Err(ConfigError::UnknownFormat { path: display }),
        }
    }
}
