//! Compiler settings loaded from `sql-stringify.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::statement::SortDir;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG: &str = "sql-stringify.toml";

/// Defaults for options a request leaves out.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// ORDER BY direction when none is given
    pub order: SortDir,

    /// Skip undefined fields in INSERT and UPDATE
    pub ignore_undefined: bool,

    /// COUNT alias
    pub count_alias: String,

    /// COUNT expression
    pub count_expr: String,

    /// Colored CLI output
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            order: SortDir::Desc,
            ignore_undefined: true,
            count_alias: "count".to_string(),
            count_expr: "*".to_string(),
            color: true,
        }
    }
}

impl Config {
    /// Create a new configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Parse TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read and parse one file. A read failure is `Error::Io`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Candidate files, most specific first.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("sql-stringify").join("config.toml"));
        }
        paths
    }

    /// Load the explicit `path`, or the first existing search path, or defaults.
    ///
    /// An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            tracing::debug!(path = %path.display(), "loading config");
            return Self::from_file(path);
        }

        match Self::search_paths().into_iter().find(|p| p.is_file()) {
            Some(found) => {
                tracing::debug!(path = %found.display(), "loading config");
                Self::from_file(&found)
            }
            None => {
                tracing::debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Builder for Config
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the default ORDER BY direction
    pub fn order(mut self, order: SortDir) -> Self {
        self.config.order = order;
        self
    }

    /// Keep or drop undefined fields
    pub fn ignore_undefined(mut self, ignore: bool) -> Self {
        self.config.ignore_undefined = ignore;
        self
    }

    /// Set the COUNT alias
    pub fn count_alias(mut self, alias: impl Into<String>) -> Self {
        self.config.count_alias = alias.into();
        self
    }

    /// Set the COUNT expression
    pub fn count_expr(mut self, expr: impl Into<String>) -> Self {
        self.config.count_expr = expr.into();
        self
    }

    /// Enable or disable colors
    pub fn color(mut self, color: bool) -> Self {
        self.config.color = color;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml("order = \"ASC\"\ncount_alias = \"total\"").unwrap();
        assert_eq!(
            config,
            Config::builder().order(SortDir::Asc).count_alias("total").build()
        );
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(Config::from_toml("order = 3"), Err(Error::Config(_))));
        assert!(matches!(Config::from_toml("colour = true"), Err(Error::Config(_))));
    }

    #[test]
    fn test_explicit_missing_file() {
        let missing = Path::new("definitely/not/here/sql-stringify.toml");
        assert!(matches!(Config::load(Some(missing)), Err(Error::Io(_))));
    }

    #[test]
    fn test_load_file() {
        let path =
            std::env::temp_dir().join(format!("sql-stringify-{}.toml", std::process::id()));
        fs::write(&path, "ignore_undefined = false\ncolor = false\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        fs::remove_file(&path).unwrap();

        assert!(!config.ignore_undefined);
        assert!(!config.color);
        assert_eq!(config.count_expr, "*");
    }

    #[test]
    fn test_search_paths_start_local() {
        assert_eq!(Config::search_paths()[0], PathBuf::from(LOCAL_CONFIG));
    }
}
