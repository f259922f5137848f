//! Serialization contexts.
//!
//! A [`Context`] is the mutable sink statements are rendered into. It decides
//! how identifiers are quoted, how parameters are spelled and which constructs
//! can be rendered at all. [`SqlContext`] implements it on top of a
//! [`DialectConfig`].

use tessera_config::{
    config::get_config,
    dialect::{DialectConfig, Feature},
};
use tessera_utils::string::{is_plain_identifier, quote_identifier};
use tracing::trace;

use crate::{
    descriptor::{Name, ValueType},
    error::Result,
    expr::value::Parameter,
    query::union::UnionFlag,
};

pub trait Context {
    fn dialect_name(&self) -> &str;

    fn supports(&self, feature: Feature) -> bool;

    /// Appends raw SQL text.
    fn write(&mut self, sql: &str);

    /// Appends an identifier, quoted when the dialect requires it.
    fn write_identifier(&mut self, name: &str);

    /// Appends a placeholder and records the parameter it binds.
    fn write_parameter(&mut self, parameter: &Parameter);

    fn union_keyword(&self, flag: UnionFlag) -> &'static str;

    /// Whether recursive common table expressions need `WITH RECURSIVE`.
    fn recursive_keyword(&self) -> bool;
}

/// A parameter in the order its placeholder appears in the rendered SQL.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct BoundParameter {
    /// 1-based position of the placeholder.
    pub position: usize,
    pub name: Name,
    pub value_type: ValueType,
}

/// SQL text together with the parameters it expects.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct RenderedQuery {
    pub sql: String,
    pub parameters: Vec<BoundParameter>,
}

pub struct SqlContext {
    dialect: DialectConfig,
    sql: String,
    parameters: Vec<BoundParameter>,
}

impl SqlContext {
    pub fn new(dialect: DialectConfig) -> Self {
        Self {
            dialect,
            sql: String::new(),
            parameters: Vec::new(),
        }
    }

    /// Creates a context for a dialect of the process-wide configuration.
    pub fn for_dialect(name: &str) -> Result<Self> {
        let config = get_config();
        let dialect = config.get_dialect(name)?.clone();
        Ok(Self::new(dialect))
    }

    pub fn dialect(&self) -> &DialectConfig {
        &self.dialect
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn parameters(&self) -> &[BoundParameter] {
        &self.parameters
    }

    pub fn finish(self) -> RenderedQuery {
        RenderedQuery {
            sql: self.sql,
            parameters: self.parameters,
        }
    }
}

impl Context for SqlContext {
    fn dialect_name(&self) -> &str {
        &self.dialect.name
    }

    fn supports(&self, feature: Feature) -> bool {
        self.dialect.supports(feature)
    }

    fn write(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    fn write_identifier(&mut self, name: &str) {
        if self.dialect.quote_all_identifiers() || !is_plain_identifier(name) {
            let (open, close) = self.dialect.identifier_quote().delimiters();
            self.sql.push_str(&quote_identifier(name, open, close));
        } else {
            self.sql.push_str(name);
        }
    }

    fn write_parameter(&mut self, parameter: &Parameter) {
        let position = self.parameters.len() + 1;
        let placeholder = self
            .dialect
            .placeholder()
            .placeholder(position, parameter.name());
        trace!(position, name = parameter.name(), "binding parameter");

        self.sql.push_str(&placeholder);
        self.parameters.push(BoundParameter {
            position,
            name: Name::Owned(parameter.name().to_string()),
            value_type: parameter.value_type(),
        });
    }

    fn union_keyword(&self, flag: UnionFlag) -> &'static str {
        match flag {
            UnionFlag::All => "UNION ALL",
            UnionFlag::Distinct if self.dialect.explicit_union_distinct() => "UNION DISTINCT",
            UnionFlag::Distinct => "UNION",
        }
    }

    fn recursive_keyword(&self) -> bool {
        self.dialect.recursive_keyword()
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tessera_config::config::{set_config, Config};

    use super::*;
    use crate::error::QueryError;

    #[test]
    fn test_identifier_quoting() {
        let mut ctx = SqlContext::new(DialectConfig::sqlite());
        ctx.write_identifier("users");
        ctx.write(" ");
        ctx.write_identifier("order");
        ctx.write(" ");
        ctx.write_identifier("my \"table\"");

        assert_eq!(ctx.sql(), "users \"order\" \"my \"\"table\"\"\"");
    }

    #[test]
    fn test_dialect_quote_styles() {
        let mut mysql = SqlContext::new(DialectConfig::mysql());
        mysql.write_identifier("select");
        assert_eq!(mysql.sql(), "`select`");

        let mut mssql = SqlContext::new(DialectConfig::mssql());
        mssql.write_identifier("user");
        assert_eq!(mssql.sql(), "[user]");

        let mut quote_all = DialectConfig::postgresql();
        quote_all.quote_all_identifiers = Some(true);
        let mut ctx = SqlContext::new(quote_all);
        ctx.write_identifier("id");
        assert_eq!(ctx.sql(), "\"id\"");
    }

    #[test]
    fn test_parameters_are_numbered_in_render_order() {
        let mut ctx = SqlContext::new(DialectConfig::postgresql());
        ctx.write_parameter(&Parameter::new("low", ValueType::Integral));
        ctx.write(", ");
        ctx.write_parameter(&Parameter::new("high", ValueType::Integral));

        let rendered = ctx.finish();
        assert_eq!(rendered.sql, "$1, $2");
        assert_eq!(rendered.parameters[1].position, 2);
        assert_eq!(rendered.parameters[1].name, "high");
    }

    #[test]
    fn test_union_keywords() {
        let ctx = SqlContext::new(DialectConfig::sqlite());
        assert_eq!(ctx.union_keyword(UnionFlag::All), "UNION ALL");
        assert_eq!(ctx.union_keyword(UnionFlag::Distinct), "UNION");

        let mut explicit = DialectConfig::mysql();
        explicit.explicit_union_distinct = Some(true);
        let ctx = SqlContext::new(explicit);
        assert_eq!(ctx.union_keyword(UnionFlag::Distinct), "UNION DISTINCT");
    }

    #[test]
    #[serial]
    fn test_for_dialect_uses_global_config() {
        set_config(Config::default_config());

        let ctx = SqlContext::for_dialect("mysql57").unwrap();
        assert!(!ctx.supports(Feature::CommonTableExpression));

        assert!(matches!(
            SqlContext::for_dialect("oracle"),
            Err(QueryError::Config(_))
        ));
    }
}
