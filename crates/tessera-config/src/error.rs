use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(tessera_config::toml_serialize),
        help("Check the dialect definitions for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(tessera_config::toml_deserialize),
        help("Check your dialect file syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Failed to parse TOML: {0}")]
    #[diagnostic(code(tessera_config::toml))]
    Toml(#[from] toml_edit::TomlError),

    #[error("Missing default dialect: {0}")]
    #[diagnostic(
        code(tessera_config::missing_default_dialect),
        help("Ensure the default_dialect field references a defined dialect")
    )]
    MissingDefaultDialect(String),

    #[error("Unknown dialect: {0}")]
    #[diagnostic(
        code(tessera_config::unknown_dialect),
        help("Define the dialect under [dialect.<name>] or use a built-in one: sqlite, postgresql, mysql, mysql57, mssql")
    )]
    UnknownDialect(String),

    #[error("Dialect names cannot be empty")]
    #[diagnostic(code(tessera_config::empty_dialect_name))]
    EmptyDialectName,

    #[error("Encountered unexpected TOML item: {0}")]
    #[diagnostic(code(tessera_config::unexpected_toml_item))]
    UnexpectedTomlItem(String),

    #[error("IO error: {0}")]
    #[diagnostic(
        code(tessera_config::io),
        help("Check that the file named by TESSERA_CONFIG exists and is readable")
    )]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
