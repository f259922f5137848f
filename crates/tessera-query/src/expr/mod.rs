//! Expression types for building SQL conditions and select lists.
//!
//! This module contains the building blocks of statements below the clause level.

pub mod column;
pub mod ops;
pub mod value;

use std::borrow::Cow;

pub use column::{Col, Column};
pub use ops::not;
pub use value::{Parameter, SqlType, Value};

use tessera_config::dialect::Feature;

use crate::{
    context::Context,
    descriptor::Descriptor,
    error::{Malformation, Unsupported},
    query::statement::Statement,
    serialize::Serialize,
    traits::{Expression, Fragment},
};

/// A value expression.
#[derive(Clone, Debug)]
pub enum Expr {
    Column(Column),
    Value(Value),
    Parameter(Parameter),
    Compare(Box<ops::Comparison>),
    Logical(Box<ops::Logical>),
    Not(Box<ops::Not>),
    NullCheck(Box<ops::NullCheck>),
    In(Box<ops::InPredicate>),
    /// A sub-select used as a value.
    Subquery(Box<Statement>),
}

impl Expr {
    /// Whether the expression renders as more than a single operand.
    pub(crate) fn is_compound(&self) -> bool {
        matches!(
            self,
            Expr::Compare(_) | Expr::Not(_) | Expr::NullCheck(_) | Expr::In(_)
        )
    }

    /// Fails if the expression is a literal that cannot be written as SQL.
    pub(crate) fn ensure_literal(&self) -> Result<(), Malformation> {
        match self {
            Expr::Value(value) => value.ensure_literal(),
            _ => Ok(()),
        }
    }

    /// Renders the expression as an operand of another operator.
    pub(crate) fn serialize_operand(&self, ctx: &mut dyn Context) {
        if self.is_compound() {
            ctx.write("(");
            self.serialize(ctx);
            ctx.write(")");
        } else {
            self.serialize(ctx);
        }
    }
}

impl Expression for Expr {}

impl Fragment for Expr {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        match self {
            Expr::Column(column) => column.descriptor(),
            Expr::Value(value) => value.descriptor(),
            Expr::Parameter(parameter) => parameter.descriptor(),
            Expr::Compare(op) => op.descriptor(),
            Expr::Logical(op) => op.descriptor(),
            Expr::Not(op) => op.descriptor(),
            Expr::NullCheck(op) => op.descriptor(),
            Expr::In(op) => op.descriptor(),
            Expr::Subquery(statement) => statement.descriptor(),
        }
    }
}

impl Serialize for Expr {
    fn serialize_check(&self, ctx: &dyn Context) -> Result<(), Unsupported> {
        match self {
            Expr::Column(_) | Expr::Value(_) | Expr::Parameter(_) => Ok(()),
            Expr::Compare(op) => op.serialize_check(ctx),
            Expr::Logical(op) => op.serialize_check(ctx),
            Expr::Not(op) => op.serialize_check(ctx),
            Expr::NullCheck(op) => op.serialize_check(ctx),
            Expr::In(op) => op.serialize_check(ctx),
            Expr::Subquery(statement) => {
                crate::serialize::require(ctx, Feature::Subquery)?;
                statement.serialize_check(ctx)
            }
        }
    }

    fn serialize(&self, ctx: &mut dyn Context) {
        match self {
            Expr::Column(column) => column.serialize(ctx),
            Expr::Value(value) => value.serialize(ctx),
            Expr::Parameter(parameter) => parameter.serialize(ctx),
            Expr::Compare(op) => op.serialize(ctx),
            Expr::Logical(op) => op.serialize(ctx),
            Expr::Not(op) => op.serialize(ctx),
            Expr::NullCheck(op) => op.serialize(ctx),
            Expr::In(op) => op.serialize(ctx),
            Expr::Subquery(statement) => {
                ctx.write("(");
                statement.serialize(ctx);
                ctx.write(")");
            }
        }
    }
}

macro_rules! impl_from_literal {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Expr {
                fn from(value: $ty) -> Self {
                    Expr::Value(value.into())
                }
            }
        )+
    };
}

impl_from_literal!(i8, i16, i32, i64, u8, u16, u32, usize, bool, f32, f64, &str, String, Value);

impl<T: Into<Value>> From<Option<T>> for Expr {
    fn from(value: Option<T>) -> Self {
        Expr::Value(value.into())
    }
}

impl From<Column> for Expr {
    fn from(column: Column) -> Self {
        Expr::Column(column)
    }
}

impl From<Parameter> for Expr {
    fn from(parameter: Parameter) -> Self {
        Expr::Parameter(parameter)
    }
}

impl From<Statement> for Expr {
    fn from(statement: Statement) -> Self {
        Expr::Subquery(Box::new(statement))
    }
}
