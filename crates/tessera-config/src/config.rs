use std::{
    collections::BTreeMap,
    fs,
    path::Path,
    sync::{LazyLock, PoisonError, RwLock},
};

use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};
use toml_edit::{DocumentMut, Item};
use tracing::{debug, warn};

use crate::{
    annotations::annotate_table,
    dialect::DialectConfig,
    error::{ConfigError, Result},
};

/// Environment variable naming a TOML file with dialect definitions.
pub const CONFIG_ENV: &str = "TESSERA_CONFIG";

/// Dialect configuration for rendering statements.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct Config {
    /// Dialect used when a statement is rendered without naming one.
    /// Default: "sqlite"
    pub default_dialect: String,

    /// Dialect definitions keyed by name. Built-in dialects not listed here
    /// are added automatically.
    #[serde(default)]
    pub dialect: BTreeMap<String, DialectConfig>,
}

pub static CONFIG: LazyLock<RwLock<Option<Config>>> = LazyLock::new(|| RwLock::new(None));

/// Loads the configuration and installs it process-wide.
pub fn init() -> Result<()> {
    let config = Config::new()?;
    set_config(config);
    Ok(())
}

/// Replaces the process-wide configuration.
pub fn set_config(config: Config) {
    let mut global = CONFIG.write().unwrap_or_else(PoisonError::into_inner);
    *global = Some(config);
}

/// Returns the process-wide configuration, falling back to the built-in defaults.
pub fn get_config() -> Config {
    {
        let global = CONFIG.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(config) = global.as_ref() {
            return config.clone();
        }
    }

    let mut global = CONFIG.write().unwrap_or_else(PoisonError::into_inner);
    global.get_or_insert_with(Config::default_config).clone()
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            default_dialect: "sqlite".to_string(),
            dialect: DialectConfig::builtin()
                .into_iter()
                .map(|d| (d.name.clone(), d))
                .collect(),
        }
    }

    /// Loads the file named by `TESSERA_CONFIG`, or the defaults when it is unset.
    pub fn new() -> Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::load_from(path),
            Err(_) => Ok(Self::default_config()),
        }
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let mut config: Config = toml::from_str(&content)?;
        config.resolve()?;
        debug!(
            "Loaded {} dialect(s) from {}",
            config.dialect.len(),
            path.as_ref().display()
        );
        Ok(config)
    }

    pub fn resolve(&mut self) -> Result<()> {
        for (key, dialect) in &mut self.dialect {
            if key.trim().is_empty() {
                return Err(ConfigError::EmptyDialectName);
            }
            if dialect.name.is_empty() {
                dialect.name = key.clone();
            } else if &dialect.name != key {
                warn!(
                    "Dialect [dialect.{}] is named '{}'; diagnostics will use the name",
                    key, dialect.name
                );
            }
        }

        for builtin in DialectConfig::builtin() {
            self.dialect.entry(builtin.name.clone()).or_insert(builtin);
        }

        if !self.dialect.contains_key(&self.default_dialect) {
            return Err(ConfigError::MissingDefaultDialect(
                self.default_dialect.clone(),
            ));
        }

        Ok(())
    }

    pub fn get_dialect(&self, name: &str) -> Result<&DialectConfig> {
        self.dialect
            .get(name)
            .ok_or_else(|| ConfigError::UnknownDialect(name.to_string()))
    }

    pub fn default_dialect(&self) -> Result<&DialectConfig> {
        self.dialect
            .get(&self.default_dialect)
            .ok_or_else(|| ConfigError::MissingDefaultDialect(self.default_dialect.clone()))
    }

    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut doc = toml_string.parse::<DocumentMut>()?;

        annotate_table::<Config>(doc.as_table_mut(), false)?;

        if let Some(dialects) = doc.get_mut("dialect").and_then(Item::as_table_mut) {
            for (_, item) in dialects.iter_mut() {
                if let Item::Table(dialect_table) = item {
                    annotate_table::<DialectConfig>(dialect_table, false)?;
                }
            }
        }

        Ok(doc)
    }
}
