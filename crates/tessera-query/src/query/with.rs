//! WITH clause.

use std::borrow::Cow;

use tessera_config::dialect::Feature;

use crate::{
    context::Context,
    cte::Cte,
    descriptor::{Descriptor, Tags, ValueType},
    error::{Inconsistency, Malformation, Unsupported},
    query::{
        check::{first_duplicate, first_inconsistency, Consistency},
        clause::{Clause, ClauseKind},
    },
    serialize::{check_all, require, serialize_list, Serialize},
    traits::Fragment,
};

#[derive(Clone, Debug)]
pub struct With {
    ctes: Vec<Cte>,
    descriptor: Descriptor,
}

impl With {
    pub(crate) fn new(ctes: Vec<Cte>) -> Result<Self, Malformation> {
        if ctes.is_empty() {
            return Err(Malformation::EmptyClause(ClauseKind::With));
        }

        let descriptor = {
            let children: Vec<_> = ctes.iter().map(Fragment::descriptor).collect();
            Descriptor::new(ValueType::None, Tags::empty())
                .with_children(children.iter().map(|d| &**d))
        };

        Ok(Self { ctes, descriptor })
    }

    pub fn ctes(&self) -> &[Cte] {
        &self.ctes
    }

    pub fn is_recursive(&self) -> bool {
        self.ctes.iter().any(Cte::is_recursive)
    }

    /// A CTE may only use CTEs defined before it, or itself.
    fn forward_reference(&self, index: usize) -> Consistency {
        let cte = &self.ctes[index];
        let later = &self.ctes[index + 1..];
        match cte
            .dependencies()
            .iter()
            .find(|dependency| later.iter().any(|other| other.name() == &***dependency))
        {
            Some(used) => Consistency::Inconsistent(Inconsistency::CteForwardReference {
                cte: cte.name().to_string(),
                used: used.to_string(),
            }),
            None => Consistency::Consistent,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub enum WithClause {
    #[default]
    NoWith,
    With(With),
}

impl Fragment for WithClause {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        match self {
            WithClause::NoWith => Cow::Owned(Descriptor::noop()),
            WithClause::With(with) => Cow::Borrowed(&with.descriptor),
        }
    }
}

impl Clause for WithClause {
    fn kind(&self) -> ClauseKind {
        ClauseKind::With
    }

    fn consistency(&self) -> Consistency {
        let WithClause::With(with) = self else {
            return Consistency::Consistent;
        };
        let duplicates = match first_duplicate(with.ctes.iter().map(Cte::name)) {
            Some(name) => Consistency::Inconsistent(Inconsistency::DuplicateCte(name.to_string())),
            None => Consistency::Consistent,
        };
        duplicates.and_then(|| {
            first_inconsistency((0..with.ctes.len()).map(|index| with.forward_reference(index)))
        })
    }
}

impl Serialize for WithClause {
    fn serialize_check(&self, ctx: &dyn Context) -> Result<(), Unsupported> {
        let WithClause::With(with) = self else {
            return Ok(());
        };
        require(ctx, Feature::CommonTableExpression)?;
        if with.is_recursive() {
            require(ctx, Feature::RecursiveCte)?;
        }
        check_all(&with.ctes, ctx)
    }

    fn serialize(&self, ctx: &mut dyn Context) {
        if let WithClause::With(with) = self {
            ctx.write("WITH ");
            if with.is_recursive() && ctx.recursive_keyword() {
                ctx.write("RECURSIVE ");
            }
            serialize_list(&with.ctes, ", ", ctx);
            ctx.write(" ");
        }
    }
}
