//! UNION clause.
//!
//! A union statement holds its two operands and nothing else. Its result row is
//! the result row of the left-hand side, so it can be used as the left-hand side
//! of a further union.

use std::borrow::Cow;

use tessera_config::dialect::Feature;

use crate::{
    context::Context,
    descriptor::{Descriptor, Tags, ValueType},
    error::{Malformation, Unsupported},
    query::{
        check::Consistency,
        clause::{Clause, ClauseKind},
        select::ResultRow,
        statement::Statement,
    },
    serialize::{require, Serialize},
    traits::Fragment,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnionFlag {
    All,
    Distinct,
}

impl UnionFlag {
    pub(crate) fn feature(self) -> Feature {
        match self {
            UnionFlag::All => Feature::UnionAll,
            UnionFlag::Distinct => Feature::UnionDistinct,
        }
    }
}

pub(crate) const LHS: &str = "left-hand side of a union";
pub(crate) const RHS: &str = "right-hand side of a union";

/// Checks that two result rows can be combined by a union.
pub(crate) fn check_union_rows(
    lhs: Option<&ResultRow>,
    rhs: Option<&ResultRow>,
) -> Result<(), Malformation> {
    let lhs = lhs.ok_or(Malformation::NotASelect(LHS))?;
    let rhs = rhs.ok_or(Malformation::NotASelect(RHS))?;

    if lhs.is_dynamic() {
        return Err(Malformation::DynamicColumns(LHS));
    }
    if rhs.is_dynamic() {
        return Err(Malformation::DynamicColumns(RHS));
    }
    if !lhs.shape_matches(rhs) {
        return Err(Malformation::ShapeMismatch {
            left: lhs.to_string(),
            right: rhs.to_string(),
        });
    }

    Ok(())
}

/// Clauses an operand cannot carry, since written without parentheses they
/// would bind to the whole union.
const UNION_BOUND_CLAUSES: [ClauseKind; 3] =
    [ClauseKind::OrderBy, ClauseKind::Limit, ClauseKind::Offset];

/// Checks that `statement` can be written as a bare union operand. Only the
/// left-hand side may itself be a union.
pub(crate) fn check_union_operand(
    side: &'static str,
    statement: &Statement,
    nested_union: bool,
) -> Result<(), Malformation> {
    if !nested_union && statement.is_union() {
        return Err(Malformation::UnionOperandClause {
            side,
            clause: ClauseKind::Union,
        });
    }
    match UNION_BOUND_CLAUSES
        .into_iter()
        .find(|kind| statement.is_set(*kind))
    {
        Some(clause) => Err(Malformation::UnionOperandClause { side, clause }),
        None => Ok(()),
    }
}

#[derive(Clone, Debug)]
pub struct Union {
    flag: UnionFlag,
    lhs: Statement,
    rhs: Statement,
    descriptor: Descriptor,
}

impl Union {
    pub(crate) fn new(
        flag: UnionFlag,
        lhs: Statement,
        rhs: Statement,
    ) -> Result<Self, Malformation> {
        check_union_rows(lhs.result_row(), rhs.result_row())?;
        check_union_operand(LHS, &lhs, true)?;
        check_union_operand(RHS, &rhs, false)?;

        let descriptor = Descriptor::new(ValueType::None, Tags::UNION)
            .with_children([&*lhs.descriptor(), &*rhs.descriptor()]);

        Ok(Self {
            flag,
            lhs,
            rhs,
            descriptor,
        })
    }

    pub fn flag(&self) -> UnionFlag {
        self.flag
    }

    pub fn lhs(&self) -> &Statement {
        &self.lhs
    }

    pub fn rhs(&self) -> &Statement {
        &self.rhs
    }
}

#[derive(Clone, Debug, Default)]
pub enum UnionClause {
    #[default]
    NoUnion,
    Union(Box<Union>),
}

impl UnionClause {
    pub fn get(&self) -> Option<&Union> {
        match self {
            UnionClause::NoUnion => None,
            UnionClause::Union(union) => Some(union),
        }
    }
}

impl Fragment for UnionClause {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        match self {
            UnionClause::NoUnion => Cow::Owned(Descriptor::noop()),
            UnionClause::Union(union) => Cow::Borrowed(&union.descriptor),
        }
    }
}

impl Clause for UnionClause {
    fn kind(&self) -> ClauseKind {
        ClauseKind::Union
    }

    fn consistency(&self) -> Consistency {
        match self {
            UnionClause::NoUnion => Consistency::Consistent,
            UnionClause::Union(union) => union
                .lhs
                .clause_consistency()
                .and_then(|| union.rhs.clause_consistency()),
        }
    }
}

impl Serialize for UnionClause {
    fn serialize_check(&self, ctx: &dyn Context) -> Result<(), Unsupported> {
        match self {
            UnionClause::NoUnion => Ok(()),
            UnionClause::Union(union) => {
                require(ctx, union.flag.feature())?;
                union.lhs.serialize_check(ctx)?;
                union.rhs.serialize_check(ctx)
            }
        }
    }

    fn serialize(&self, ctx: &mut dyn Context) {
        if let UnionClause::Union(union) = self {
            union.lhs.serialize(ctx);
            ctx.write(" ");
            let keyword = ctx.union_keyword(union.flag);
            ctx.write(keyword);
            ctx.write(" ");
            union.rhs.serialize(ctx);
        }
    }
}
