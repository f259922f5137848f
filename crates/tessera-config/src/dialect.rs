use std::fmt;

use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};

/// A SQL construct that a dialect may be unable to render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    Limit,
    Offset,
    OrderBy,
    CommonTableExpression,
    RecursiveCte,
    UnionAll,
    UnionDistinct,
    Subquery,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feature::Limit => "LIMIT",
            Feature::Offset => "OFFSET",
            Feature::OrderBy => "ORDER BY",
            Feature::CommonTableExpression => "WITH",
            Feature::RecursiveCte => "WITH RECURSIVE",
            Feature::UnionAll => "UNION ALL",
            Feature::UnionDistinct => "UNION",
            Feature::Subquery => "sub-select",
        };
        f.write_str(name)
    }
}

/// Characters used to quote identifiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStyle {
    /// `"name"` (standard SQL)
    #[default]
    Double,
    /// `` `name` `` (MySQL)
    Backtick,
    /// `[name]` (SQL Server)
    Bracket,
}

impl QuoteStyle {
    pub fn delimiters(self) -> (char, char) {
        match self {
            QuoteStyle::Double => ('"', '"'),
            QuoteStyle::Backtick => ('`', '`'),
            QuoteStyle::Bracket => ('[', ']'),
        }
    }
}

/// Placeholder syntax for bound parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// `?`
    #[default]
    Question,
    /// `$1`, `$2`, ...
    Numbered,
    /// `:name`
    Named,
    /// `@p1`, `@p2`, ...
    AtNumbered,
}

impl PlaceholderStyle {
    /// Renders the placeholder for the parameter at 1-based `position`.
    pub fn placeholder(self, position: usize, name: &str) -> String {
        match self {
            PlaceholderStyle::Question => "?".to_string(),
            PlaceholderStyle::Numbered => format!("${position}"),
            PlaceholderStyle::Named => format!(":{name}"),
            PlaceholderStyle::AtNumbered => format!("@p{position}"),
        }
    }
}

/// Rendering rules for a single SQL dialect.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct DialectConfig {
    /// Name of the dialect, used in diagnostics.
    /// Defaults to the key of the `[dialect.<name>]` table.
    #[serde(default)]
    pub name: String,

    /// How identifiers are quoted when quoting is needed: "double", "backtick" or "bracket".
    /// Default: "double"
    pub identifier_quote: Option<QuoteStyle>,

    /// Quote every identifier, not only reserved words and non-plain names.
    /// Default: false
    pub quote_all_identifiers: Option<bool>,

    /// Placeholder syntax: "question", "numbered", "named" or "at_numbered".
    /// Default: "question"
    pub placeholder: Option<PlaceholderStyle>,

    /// Render `UNION DISTINCT` instead of a bare `UNION`.
    /// Default: false
    pub explicit_union_distinct: Option<bool>,

    /// Whether a recursive common table expression needs `WITH RECURSIVE`.
    /// Default: true
    pub recursive_keyword: Option<bool>,

    /// Constructs this dialect cannot render, e.g. ["limit", "recursive-cte"].
    /// Default: []
    pub unsupported: Option<Vec<Feature>>,
}

impl DialectConfig {
    /// A dialect that renders everything with standard SQL conventions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier_quote: None,
            quote_all_identifiers: None,
            placeholder: None,
            explicit_union_distinct: None,
            recursive_keyword: None,
            unsupported: None,
        }
    }

    pub fn sqlite() -> Self {
        Self::new("sqlite")
    }

    pub fn postgresql() -> Self {
        Self {
            placeholder: Some(PlaceholderStyle::Numbered),
            ..Self::new("postgresql")
        }
    }

    pub fn mysql() -> Self {
        Self {
            identifier_quote: Some(QuoteStyle::Backtick),
            ..Self::new("mysql")
        }
    }

    /// MySQL before 8.0 has no common table expressions.
    pub fn mysql57() -> Self {
        Self {
            identifier_quote: Some(QuoteStyle::Backtick),
            unsupported: Some(vec![
                Feature::CommonTableExpression,
                Feature::RecursiveCte,
            ]),
            ..Self::new("mysql57")
        }
    }

    /// SQL Server uses `TOP`/`OFFSET ... FETCH` instead of `LIMIT`/`OFFSET`.
    pub fn mssql() -> Self {
        Self {
            identifier_quote: Some(QuoteStyle::Bracket),
            placeholder: Some(PlaceholderStyle::AtNumbered),
            recursive_keyword: Some(false),
            unsupported: Some(vec![Feature::Limit, Feature::Offset]),
            ..Self::new("mssql")
        }
    }

    pub fn builtin() -> Vec<Self> {
        vec![
            Self::sqlite(),
            Self::postgresql(),
            Self::mysql(),
            Self::mysql57(),
            Self::mssql(),
        ]
    }

    pub fn identifier_quote(&self) -> QuoteStyle {
        self.identifier_quote.unwrap_or_default()
    }

    pub fn quote_all_identifiers(&self) -> bool {
        self.quote_all_identifiers.unwrap_or(false)
    }

    pub fn placeholder(&self) -> PlaceholderStyle {
        self.placeholder.unwrap_or_default()
    }

    pub fn explicit_union_distinct(&self) -> bool {
        self.explicit_union_distinct.unwrap_or(false)
    }

    pub fn recursive_keyword(&self) -> bool {
        self.recursive_keyword.unwrap_or(true)
    }

    pub fn supports(&self, feature: Feature) -> bool {
        !self
            .unsupported
            .as_ref()
            .is_some_and(|unsupported| unsupported.contains(&feature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let dialect = DialectConfig::new("plain");

        assert_eq!(dialect.identifier_quote(), QuoteStyle::Double);
        assert_eq!(dialect.placeholder(), PlaceholderStyle::Question);
        assert!(!dialect.quote_all_identifiers());
        assert!(!dialect.explicit_union_distinct());
        assert!(dialect.recursive_keyword());
        assert!(dialect.supports(Feature::Limit));
    }

    #[test]
    fn test_builtin_presets() {
        assert!(!DialectConfig::mssql().supports(Feature::Limit));
        assert!(DialectConfig::mssql().supports(Feature::CommonTableExpression));
        assert!(!DialectConfig::mysql57().supports(Feature::CommonTableExpression));
        assert!(DialectConfig::mysql().supports(Feature::RecursiveCte));

        let names: Vec<_> = DialectConfig::builtin().into_iter().map(|d| d.name).collect();
        assert_eq!(names, ["sqlite", "postgresql", "mysql", "mysql57", "mssql"]);
    }

    #[test]
    fn test_placeholder_styles() {
        assert_eq!(PlaceholderStyle::Question.placeholder(3, "id"), "?");
        assert_eq!(PlaceholderStyle::Numbered.placeholder(3, "id"), "$3");
        assert_eq!(PlaceholderStyle::Named.placeholder(3, "id"), ":id");
        assert_eq!(PlaceholderStyle::AtNumbered.placeholder(3, "id"), "@p3");
    }

    #[test]
    fn test_feature_serde_names() {
        let dialect: DialectConfig = toml::from_str(
            r#"
            name = "custom"
            placeholder = "at_numbered"
            identifier_quote = "bracket"
            unsupported = ["recursive-cte", "union-distinct"]
            "#,
        )
        .unwrap();

        assert_eq!(dialect.placeholder(), PlaceholderStyle::AtNumbered);
        assert_eq!(dialect.identifier_quote(), QuoteStyle::Bracket);
        assert!(!dialect.supports(Feature::RecursiveCte));
        assert!(!dialect.supports(Feature::UnionDistinct));
        assert!(dialect.supports(Feature::UnionAll));
    }
}
