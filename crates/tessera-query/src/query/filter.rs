//! WHERE clause.

use std::borrow::Cow;

use crate::{
    context::Context,
    descriptor::{Descriptor, Tags, ValueType},
    error::{Malformation, Unsupported},
    expr::Expr,
    query::clause::{Clause, ClauseKind},
    serialize::Serialize,
    traits::Fragment,
};

#[derive(Clone, Debug)]
pub struct Where {
    condition: Expr,
    descriptor: Descriptor,
}

impl Where {
    pub(crate) fn new(condition: Expr) -> Result<Self, Malformation> {
        let descriptor = {
            let inner = condition.descriptor();
            if !inner.has_tag(Tags::EXPRESSION) {
                return Err(Malformation::NotAnExpression);
            }
            if inner.value_type() != ValueType::Boolean {
                return Err(Malformation::NotBoolean(inner.value_type()));
            }
            Descriptor::new(ValueType::None, Tags::empty()).with_children([&*inner])
        };

        Ok(Self {
            condition,
            descriptor,
        })
    }

    pub fn condition(&self) -> &Expr {
        &self.condition
    }
}

#[derive(Clone, Debug, Default)]
pub enum WhereClause {
    #[default]
    NoWhere,
    Where(Where),
}

impl Fragment for WhereClause {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        match self {
            WhereClause::NoWhere => Cow::Owned(Descriptor::noop()),
            WhereClause::Where(filter) => Cow::Borrowed(&filter.descriptor),
        }
    }
}

impl Clause for WhereClause {
    fn kind(&self) -> ClauseKind {
        ClauseKind::Where
    }
}

impl Serialize for WhereClause {
    fn serialize_check(&self, ctx: &dyn Context) -> Result<(), Unsupported> {
        match self {
            WhereClause::NoWhere => Ok(()),
            WhereClause::Where(filter) => filter.condition.serialize_check(ctx),
        }
    }

    fn serialize(&self, ctx: &mut dyn Context) {
        if let WhereClause::Where(filter) = self {
            ctx.write(" WHERE ");
            filter.condition.serialize(ctx);
        }
    }
}
