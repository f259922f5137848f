//! Core traits that power the statement builder.
//!
//! These traits define the contract for:
//! - Exposing static metadata of a fragment (`Fragment`)
//! - Building SQL expressions (`Expression`)

use std::borrow::Cow;

use crate::{
    descriptor::{Descriptor, Name},
    error::Result,
    expr::{
        ops::{not, CompareOp, Comparison, InPredicate, Logical, LogicalOp, NullCheck},
        Expr,
    },
    query::{
        order::{Direction, SortOrder},
        select::SelectColumn,
    },
};

/// A piece of a statement with static metadata.
pub trait Fragment {
    /// Leaves compute their descriptor on demand; composites hand out the one
    /// they folded when they were built.
    fn descriptor(&self) -> Cow<'_, Descriptor>;
}

/// A trait for values that can be used as SQL expressions.
///
/// This enables ergonomic condition building using methods like `.eq()`, `.in_()`, etc.
/// Implementors include:
/// - [`crate::expr::column::Col<T>`] and [`crate::expr::column::Column`]: table columns
/// - [`crate::expr::value::Parameter`]: a bound parameter
/// - [`Expr`]: compound expressions
///
/// Every operator checks its operands and returns a malformation error when
/// their value types cannot be combined.
///
/// # Example
///
/// ```rust
/// use tessera_query::{define_table, traits::Expression as _};
///
/// define_table! {
///     users {
///         table: "users",
///         columns: {
///             ID: i64 => "id",
///             NAME: String => "name",
///         }
///     }
/// }
///
/// let condition = users::ID.gt(10).unwrap().and(users::NAME.like("a%").unwrap());
/// assert!(condition.is_ok());
/// assert!(users::NAME.eq(1).is_err());
/// ```
pub trait Expression: Into<Expr> {
    /// Creates a SQL `=` comparison.
    fn eq(self, rhs: impl Into<Expr>) -> Result<Expr> {
        compare(self.into(), CompareOp::Eq, rhs.into())
    }

    /// Creates a SQL `<>` comparison.
    fn ne(self, rhs: impl Into<Expr>) -> Result<Expr> {
        compare(self.into(), CompareOp::Ne, rhs.into())
    }

    /// Creates a SQL `>` comparison.
    fn gt(self, rhs: impl Into<Expr>) -> Result<Expr> {
        compare(self.into(), CompareOp::Gt, rhs.into())
    }

    /// Creates a SQL `<` comparison.
    fn lt(self, rhs: impl Into<Expr>) -> Result<Expr> {
        compare(self.into(), CompareOp::Lt, rhs.into())
    }

    /// Creates a SQL `>=` comparison.
    fn gte(self, rhs: impl Into<Expr>) -> Result<Expr> {
        compare(self.into(), CompareOp::Gte, rhs.into())
    }

    /// Creates a SQL `<=` comparison.
    fn lte(self, rhs: impl Into<Expr>) -> Result<Expr> {
        compare(self.into(), CompareOp::Lte, rhs.into())
    }

    /// Creates a SQL `LIKE` match. Both sides have to be text.
    fn like(self, pattern: impl Into<Expr>) -> Result<Expr> {
        compare(self.into(), CompareOp::Like, pattern.into())
    }

    /// Creates a SQL `IN` predicate. At least one argument is required.
    fn in_<I>(self, args: I) -> Result<Expr>
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        let args = args.into_iter().map(Into::into).collect();
        Ok(InPredicate::new(self.into(), args, false)?.into())
    }

    /// Creates a SQL `NOT IN` predicate. At least one argument is required.
    fn not_in<I>(self, args: I) -> Result<Expr>
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        let args = args.into_iter().map(Into::into).collect();
        Ok(InPredicate::new(self.into(), args, true)?.into())
    }

    /// Creates a SQL `IS NULL` check.
    fn is_null(self) -> Result<Expr> {
        Ok(NullCheck::new(self.into(), true)?.into())
    }

    /// Creates a SQL `IS NOT NULL` check.
    fn is_not_null(self) -> Result<Expr> {
        Ok(NullCheck::new(self.into(), false)?.into())
    }

    /// Combines two boolean expressions with `AND`.
    fn and(self, rhs: impl Into<Expr>) -> Result<Expr> {
        Ok(Logical::new(self.into(), LogicalOp::And, rhs.into())?.into())
    }

    /// Combines two boolean expressions with `OR`.
    fn or(self, rhs: impl Into<Expr>) -> Result<Expr> {
        Ok(Logical::new(self.into(), LogicalOp::Or, rhs.into())?.into())
    }

    /// Negates a boolean expression.
    fn negate(self) -> Result<Expr> {
        not(self)
    }

    /// Names the expression for use in a select list.
    fn as_(self, name: impl Into<Name>) -> SelectColumn {
        SelectColumn::new(self.into(), Some(name.into()))
    }

    fn asc(self) -> SortOrder {
        SortOrder::new(self.into(), Direction::Asc)
    }

    fn desc(self) -> SortOrder {
        SortOrder::new(self.into(), Direction::Desc)
    }
}

fn compare(lhs: Expr, op: CompareOp, rhs: Expr) -> Result<Expr> {
    Ok(Comparison::new(lhs, op, rhs)?.into())
}
