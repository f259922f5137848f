//! ORDER BY clause.

use std::borrow::Cow;

use tessera_config::dialect::Feature;

use crate::{
    context::Context,
    descriptor::{Descriptor, Tags, ValueType},
    error::{Malformation, Unsupported},
    expr::Expr,
    query::clause::{Clause, ClauseKind},
    serialize::{require, serialize_list, Serialize},
    traits::Fragment,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// An expression with a sort direction.
#[derive(Clone, Debug)]
pub struct SortOrder {
    expr: Expr,
    direction: Direction,
}

impl SortOrder {
    pub fn new(expr: Expr, direction: Direction) -> Self {
        Self { expr, direction }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl Serialize for SortOrder {
    fn serialize_check(&self, ctx: &dyn Context) -> Result<(), Unsupported> {
        self.expr.serialize_check(ctx)
    }

    fn serialize(&self, ctx: &mut dyn Context) {
        self.expr.serialize_operand(ctx);
        ctx.write(match self.direction {
            Direction::Asc => " ASC",
            Direction::Desc => " DESC",
        });
    }
}

#[derive(Clone, Debug)]
pub struct OrderBy {
    orders: Vec<SortOrder>,
    descriptor: Descriptor,
}

impl OrderBy {
    pub(crate) fn new(orders: Vec<SortOrder>) -> Result<Self, Malformation> {
        if orders.is_empty() {
            return Err(Malformation::EmptyClause(ClauseKind::OrderBy));
        }
        orders
            .iter()
            .try_for_each(|order| order.expr.ensure_literal())?;

        let descriptor = {
            let children: Vec<_> = orders.iter().map(|order| order.expr.descriptor()).collect();
            if children.iter().any(|d| !d.has_tag(Tags::EXPRESSION)) {
                return Err(Malformation::NotAnExpression);
            }
            Descriptor::new(ValueType::None, Tags::empty())
                .with_children(children.iter().map(|d| &**d))
        };

        Ok(Self { orders, descriptor })
    }

    pub fn orders(&self) -> &[SortOrder] {
        &self.orders
    }
}

#[derive(Clone, Debug, Default)]
pub enum OrderByClause {
    #[default]
    NoOrderBy,
    OrderBy(OrderBy),
}

impl Fragment for OrderByClause {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        match self {
            OrderByClause::NoOrderBy => Cow::Owned(Descriptor::noop()),
            OrderByClause::OrderBy(order) => Cow::Borrowed(&order.descriptor),
        }
    }
}

impl Clause for OrderByClause {
    fn kind(&self) -> ClauseKind {
        ClauseKind::OrderBy
    }
}

impl Serialize for OrderByClause {
    fn serialize_check(&self, ctx: &dyn Context) -> Result<(), Unsupported> {
        match self {
            OrderByClause::NoOrderBy => Ok(()),
            OrderByClause::OrderBy(order) => {
                require(ctx, Feature::OrderBy)?;
                crate::serialize::check_all(&order.orders, ctx)
            }
        }
    }

    fn serialize(&self, ctx: &mut dyn Context) {
        if let OrderByClause::OrderBy(order) = self {
            ctx.write(" ORDER BY ");
            serialize_list(&order.orders, ", ", ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use tessera_config::dialect::DialectConfig;

    use super::*;
    use crate::{context::SqlContext, expr::column::Col, traits::Expression};

    const ID: Col<i64> = Col::new("users", "id");
    const NAME: Col<String> = Col::new("users", "name");

    #[test]
    fn test_order_by_rendering() {
        let clause =
            OrderByClause::OrderBy(OrderBy::new(vec![NAME.asc(), ID.desc()]).unwrap());
        let mut ctx = SqlContext::new(DialectConfig::sqlite());
        clause.serialize(&mut ctx);

        assert_eq!(ctx.sql(), " ORDER BY users.name ASC, users.id DESC");
    }

    #[test]
    fn test_empty_order_by() {
        assert_eq!(
            OrderBy::new(Vec::new()).unwrap_err(),
            Malformation::EmptyClause(ClauseKind::OrderBy)
        );
    }
}
