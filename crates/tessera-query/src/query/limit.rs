//! LIMIT and OFFSET clauses.
//!
//! Both bound the rows of a result the same way: the value has to be integral
//! and must not depend on any table. Either can be fixed when the statement is
//! built, or left as a dynamic slot that is assigned later.

use std::borrow::Cow;

use tessera_config::dialect::Feature;

use crate::{
    context::Context,
    descriptor::{names, Descriptor, Tags, ValueType},
    error::{Malformation, Unsupported},
    expr::Expr,
    query::clause::{Clause, ClauseKind, DynamicSlot},
    serialize::{require, Serialize},
    traits::Fragment,
};

#[derive(Clone, Debug, Default)]
pub enum BoundValue {
    #[default]
    Unset,
    Static(Expr),
    Dynamic(DynamicSlot),
}

/// A LIMIT or OFFSET clause.
#[derive(Clone, Debug)]
pub struct RowBound {
    kind: ClauseKind,
    value: BoundValue,
    descriptor: Descriptor,
}

impl RowBound {
    pub(crate) fn limit() -> Self {
        Self::unset(ClauseKind::Limit)
    }

    pub(crate) fn offset() -> Self {
        Self::unset(ClauseKind::Offset)
    }

    fn unset(kind: ClauseKind) -> Self {
        Self {
            kind,
            value: BoundValue::Unset,
            descriptor: Descriptor::noop(),
        }
    }

    fn tag(&self) -> Tags {
        match self.kind {
            ClauseKind::Offset => Tags::OFFSET,
            _ => Tags::LIMIT,
        }
    }

    fn feature(&self) -> Feature {
        match self.kind {
            ClauseKind::Offset => Feature::Offset,
            _ => Feature::Limit,
        }
    }

    fn validate(&self, value: &Expr) -> Result<Descriptor, Malformation> {
        let descriptor = value.descriptor();
        let found = descriptor.value_type();
        if !descriptor.has_tag(Tags::EXPRESSION) || found != ValueType::Integral {
            return Err(Malformation::RowBoundNotIntegral {
                clause: self.kind,
                found,
            });
        }
        if !descriptor.required_tables().is_empty() {
            return Err(Malformation::RowBoundRequiresTables {
                clause: self.kind,
                tables: names(descriptor.required_tables()),
            });
        }

        Ok(Descriptor::new(ValueType::None, self.tag()).with_children([&*descriptor]))
    }

    pub(crate) fn with_static(&self, value: Expr) -> Result<Self, Malformation> {
        let descriptor = self.validate(&value)?;
        Ok(Self {
            kind: self.kind,
            value: BoundValue::Static(value),
            descriptor,
        })
    }

    pub(crate) fn with_dynamic(&self) -> Self {
        Self {
            kind: self.kind,
            value: BoundValue::Dynamic(DynamicSlot::default()),
            descriptor: Descriptor::new(ValueType::None, self.tag()),
        }
    }

    /// Assigns the dynamic slot. The clause keeps its previous state on error.
    pub(crate) fn set_dynamic(&mut self, value: Expr) -> Result<(), Malformation> {
        if !matches!(self.value, BoundValue::Dynamic(_)) {
            return Err(Malformation::NotDynamic(self.kind));
        }
        let descriptor = self.validate(&value)?;
        if let BoundValue::Dynamic(slot) = &mut self.value {
            slot.set(value);
        }
        self.descriptor = descriptor;
        Ok(())
    }

    pub fn value(&self) -> &BoundValue {
        &self.value
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.value, BoundValue::Dynamic(_))
    }

    /// The expression that will be rendered, if any.
    fn rendered_value(&self) -> Option<&Expr> {
        match &self.value {
            BoundValue::Unset => None,
            BoundValue::Static(value) => Some(value),
            BoundValue::Dynamic(slot) => slot.value(),
        }
    }
}

impl Fragment for RowBound {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        Cow::Borrowed(&self.descriptor)
    }
}

/// Bounds are validated when they are set, so the clause check never fails.
impl Clause for RowBound {
    fn kind(&self) -> ClauseKind {
        self.kind
    }
}

impl Serialize for RowBound {
    fn serialize_check(&self, ctx: &dyn Context) -> Result<(), Unsupported> {
        match self.rendered_value() {
            Some(value) => {
                require(ctx, self.feature())?;
                value.serialize_check(ctx)
            }
            None => Ok(()),
        }
    }

    fn serialize(&self, ctx: &mut dyn Context) {
        if let Some(value) = self.rendered_value() {
            ctx.write(" ");
            ctx.write(&self.kind.to_string());
            ctx.write(" ");
            value.serialize(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use tessera_config::dialect::DialectConfig;

    use super::*;
    use crate::{
        context::SqlContext,
        expr::{
            column::Col,
            value::{Parameter, Value},
        },
    };

    fn render(bound: &RowBound) -> String {
        let mut ctx = SqlContext::new(DialectConfig::sqlite());
        bound.serialize(&mut ctx);
        ctx.finish().sql
    }

    #[test]
    fn test_static_limit() {
        let limit = RowBound::limit().with_static(Expr::from(10)).unwrap();

        assert_eq!(render(&limit), " LIMIT 10");
        assert!(limit.is_set());
        assert!(limit.descriptor().has_tag(Tags::LIMIT));
    }

    #[test]
    fn test_unset_renders_nothing() {
        let limit = RowBound::limit();
        assert_eq!(render(&limit), "");
        assert!(!limit.is_set());
    }

    #[test]
    fn test_non_integral_values_are_rejected() {
        let err = RowBound::limit()
            .with_static(Expr::from("ten"))
            .unwrap_err();
        assert_eq!(
            err,
            Malformation::RowBoundNotIntegral {
                clause: ClauseKind::Limit,
                found: ValueType::Text,
            }
        );

        let err = RowBound::offset()
            .with_static(Expr::from(2.5))
            .unwrap_err();
        assert!(matches!(
            err,
            Malformation::RowBoundNotIntegral {
                clause: ClauseKind::Offset,
                ..
            }
        ));

        assert!(RowBound::limit().with_static(Value::Null.into()).is_err());
    }

    #[test]
    fn test_values_must_not_use_tables() {
        let id: Col<i64> = Col::new("users", "id");
        let err = RowBound::limit().with_static(id.into()).unwrap_err();

        assert_eq!(
            err,
            Malformation::RowBoundRequiresTables {
                clause: ClauseKind::Limit,
                tables: vec!["users".to_string()],
            }
        );
    }

    #[test]
    fn test_parameter_bound() {
        let offset = RowBound::offset()
            .with_static(Parameter::of::<i64>("skip").into())
            .unwrap();

        assert_eq!(render(&offset), " OFFSET ?");
        assert_eq!(offset.descriptor().parameters().len(), 1);
    }

    #[test]
    fn test_dynamic_limit() {
        let mut limit = RowBound::limit().with_dynamic();
        assert!(limit.is_set());
        assert_eq!(render(&limit), "");

        limit.set_dynamic(Expr::from(25)).unwrap();
        assert_eq!(render(&limit), " LIMIT 25");

        assert!(limit.set_dynamic(Expr::from("x")).is_err());
        assert_eq!(render(&limit), " LIMIT 25");
    }

    #[test]
    fn test_set_requires_dynamic_slot() {
        let mut limit = RowBound::limit();
        assert_eq!(
            limit.set_dynamic(Expr::from(1)),
            Err(Malformation::NotDynamic(ClauseKind::Limit))
        );
    }

    #[test]
    fn test_unsupported_dialect() {
        let limit = RowBound::limit().with_static(Expr::from(1)).unwrap();
        let ctx = SqlContext::new(DialectConfig::mssql());

        let err = limit.serialize_check(&ctx).unwrap_err();
        assert_eq!(err.feature, Feature::Limit);

        let dynamic = RowBound::limit().with_dynamic();
        assert!(dynamic.serialize_check(&ctx).is_ok());
    }
}
