use anyhow::{bail, Context, Result};
use caterm_categorize::{CategoryConfig, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_FUZZY_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "caterm.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Statement files processed when `parse` is given none.
    pub statements: Vec<PathBuf>,
    pub clean_transactions: PathBuf,
    pub categorized_transactions: PathBuf,
    /// Percent, 0-100.
    pub confidence_threshold: f64,
    pub fuzzy_threshold: f64,
    pub logging: LoggingConfig,
    pub categories: BTreeMap<String, CategoryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Plain-text log file appended to in addition to the console.
    pub file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            statements: Vec::new(),
            clean_transactions: PathBuf::from("data/clean_transactions.csv"),
            categorized_transactions: PathBuf::from("data/categorized_transactions.csv"),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            logging: LoggingConfig::default(),
            categories: BTreeMap::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Relative paths in the file are taken relative to the file's directory.
    fn resolve(mut self, base: &Path) -> Self {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        for p in &mut self.statements {
            join(p);
        }
        join(&mut self.clean_transactions);
        join(&mut self.categorized_transactions);
        if let Some(file) = self.logging.file.as_mut() {
            join(file);
        }
        self
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.confidence_threshold) {
            bail!(
                "confidence_threshold must be a percentage (0-100), got {}",
                self.confidence_threshold
            );
        }
        Ok(())
    }
}

/// Load the configuration. `path` is `Some` when given on the command line, in which
/// case the file must exist; otherwise a missing default file yields defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let p = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    if !p.exists() {
        if path.is_some() {
            bail!("config file not found: {}", p.display());
        }
        return Ok(Config::default());
    }

    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    let cfg: Config = toml::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
    cfg.validate()?;

    let base = p.parent().unwrap_or_else(|| Path::new(""));
    Ok(cfg.resolve(base))
}
