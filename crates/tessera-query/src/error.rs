//! Error types for tessera-query.
//!
//! Composition problems surface while a statement is built ([`Malformation`],
//! [`Inconsistency`]); dialect problems surface only when it is rendered
//! ([`Unsupported`]).

use miette::Diagnostic;
use tessera_config::{dialect::Feature, error::ConfigError};
use thiserror::Error;

use crate::{descriptor::ValueType, query::clause::ClauseKind};

/// A clause setter or fragment constructor received an argument it cannot accept.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum Malformation {
    #[error("{0} clause is already set")]
    #[diagnostic(
        code(tessera_query::clause_already_set),
        help("Clauses are set once; build a new statement instead of replacing one")
    )]
    ClauseAlreadySet(ClauseKind),

    #[error("{clause} cannot be applied here: {reason}")]
    #[diagnostic(code(tessera_query::clause_not_applicable))]
    ClauseNotApplicable {
        clause: ClauseKind,
        reason: &'static str,
    },

    #[error("{0} requires at least one argument")]
    #[diagnostic(code(tessera_query::empty_clause))]
    EmptyClause(ClauseKind),

    #[error("{clause} requires an integral value or integral parameter, found {found}")]
    #[diagnostic(code(tessera_query::row_bound_not_integral))]
    RowBoundNotIntegral {
        clause: ClauseKind,
        found: ValueType,
    },

    #[error("{clause} must not depend on tables: {}", .tables.join(", "))]
    #[diagnostic(code(tessera_query::row_bound_requires_tables))]
    RowBoundRequiresTables {
        clause: ClauseKind,
        tables: Vec<String>,
    },

    #[error("{0} clause is not dynamic")]
    #[diagnostic(
        code(tessera_query::not_dynamic),
        help("Use the dynamic_* variant of the setter to get an assignable slot")
    )]
    NotDynamic(ClauseKind),

    #[error("in() requires at least one argument")]
    #[diagnostic(code(tessera_query::empty_in))]
    EmptyIn,

    #[error("operand is not a value expression")]
    #[diagnostic(
        code(tessera_query::not_an_expression),
        help("Sub-selects used as values must select exactly one column")
    )]
    NotAnExpression,

    #[error("value types do not match: expected {expected}, found {found}")]
    #[diagnostic(code(tessera_query::type_mismatch))]
    TypeMismatch {
        expected: ValueType,
        found: ValueType,
    },

    #[error("a boolean expression is required, found {0}")]
    #[diagnostic(code(tessera_query::not_boolean))]
    NotBoolean(ValueType),

    #[error("a text expression is required, found {0}")]
    #[diagnostic(code(tessera_query::not_text))]
    NotText(ValueType),

    #[error("selected column has no name")]
    #[diagnostic(
        code(tessera_query::unnamed_column),
        help("Name computed columns with `.as_(\"name\")`")
    )]
    UnnamedColumn,

    #[error("`{0}` cannot be selected")]
    #[diagnostic(code(tessera_query::not_selectable))]
    NotSelectable(String),

    #[error("{0} has to be a complete select statement")]
    #[diagnostic(code(tessera_query::not_a_select))]
    NotASelect(&'static str),

    #[error("result columns differ: {left} vs {right}")]
    #[diagnostic(
        code(tessera_query::shape_mismatch),
        help("Both sides must select the same column names with the same value types, in order")
    )]
    ShapeMismatch { left: String, right: String },

    #[error("{0} must not have dynamically added columns")]
    #[diagnostic(code(tessera_query::dynamic_columns))]
    DynamicColumns(&'static str),

    #[error("{side} must not carry its own {clause} clause")]
    #[diagnostic(
        code(tessera_query::union_operand_clause),
        help("Union operands are written without parentheses; chain unions from the left and alias the union as a sub-select to order or limit it")
    )]
    UnionOperandClause {
        side: &'static str,
        clause: ClauseKind,
    },

    #[error("common table expression `{cte}` must not use unknown tables: {}", .tables.join(", "))]
    #[diagnostic(
        code(tessera_query::cte_unknown_tables),
        help("A CTE body may only use tables it selects FROM itself")
    )]
    CteUnknownTables { cte: String, tables: Vec<String> },

    #[error("common table expression `{0}` must not reference itself in its first part")]
    #[diagnostic(
        code(tessera_query::cte_self_reference),
        help("Use union_all/union_distinct on the CTE for recursion")
    )]
    CteSelfReference(String),

    #[error("alias `{alias}` must not depend on external tables: {}", .tables.join(", "))]
    #[diagnostic(code(tessera_query::alias_requires_tables))]
    AliasRequiresTables { alias: String, tables: Vec<String> },

    #[error("`{table}` has no column `{column}`")]
    #[diagnostic(code(tessera_query::unknown_column))]
    UnknownColumn { table: String, column: String },

    #[error("{0} cannot be written as a SQL literal")]
    #[diagnostic(
        code(tessera_query::non_finite_float),
        help("Pass non-finite values as parameters, or store them as NULL")
    )]
    NonFiniteFloat(f64),
}

/// Every clause is well-formed but the statement as a whole is not.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    #[error("no columns selected")]
    #[diagnostic(code(tessera_query::no_columns_selected))]
    NoColumnsSelected,

    #[error("column name `{0}` is selected more than once")]
    #[diagnostic(code(tessera_query::duplicate_column))]
    DuplicateColumn(String),

    #[error("table name `{0}` is used more than once")]
    #[diagnostic(
        code(tessera_query::duplicate_table),
        help("Alias one of the tables to give it a unique name")
    )]
    DuplicateTable(String),

    #[error("common table expression `{0}` is defined more than once")]
    #[diagnostic(code(tessera_query::duplicate_cte))]
    DuplicateCte(String),

    #[error("common table expression `{cte}` uses `{used}` before its definition")]
    #[diagnostic(
        code(tessera_query::cte_forward_reference),
        help("Reorder the WITH clause so that definitions come before their uses")
    )]
    CteForwardReference { cte: String, used: String },

    #[error("statement uses tables that are not provided: {}", .0.join(", "))]
    #[diagnostic(
        code(tessera_query::missing_tables),
        help("Add the tables to FROM, or use the statement as a sub-select where they are provided")
    )]
    MissingTables(Vec<String>),

    #[error("statement uses common table expressions that are not defined: {}", .0.join(", "))]
    #[diagnostic(
        code(tessera_query::missing_ctes),
        help("Define them in a WITH clause")
    )]
    MissingCtes(Vec<String>),
}

/// The dialect cannot render a construct the statement contains.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
#[error("{feature} is not supported by the {dialect} dialect")]
#[diagnostic(
    code(tessera_query::unsupported),
    help("Render with a dialect that supports it, or express the statement without it")
)]
pub struct Unsupported {
    pub dialect: String,
    pub feature: Feature,
}

#[derive(Error, Diagnostic, Debug)]
pub enum QueryError {
    #[error("Malformed statement: {0}")]
    #[diagnostic(transparent)]
    Malformed(#[from] Malformation),

    #[error("Inconsistent statement: {0}")]
    #[diagnostic(transparent)]
    Inconsistent(#[from] Inconsistency),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Unsupported(#[from] Unsupported),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for tessera-query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
