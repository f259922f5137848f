//! Shared clause plumbing.
//!
//! Every statement owns exactly one slot per [`ClauseKind`]; unset slots hold
//! a no-op clause that renders nothing.

use std::fmt;

use crate::{
    expr::Expr,
    query::check::Consistency,
    serialize::Serialize,
    traits::Fragment,
};

/// Clause slots of a statement, in the order the consistency checker visits them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClauseKind {
    Limit,
    Union,
    With,
    Select,
    From,
    Where,
    OrderBy,
    Offset,
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClauseKind::Limit => "LIMIT",
            ClauseKind::Union => "UNION",
            ClauseKind::With => "WITH",
            ClauseKind::Select => "SELECT",
            ClauseKind::From => "FROM",
            ClauseKind::Where => "WHERE",
            ClauseKind::OrderBy => "ORDER BY",
            ClauseKind::Offset => "OFFSET",
        };
        f.write_str(name)
    }
}

pub trait Clause: Fragment + Serialize {
    fn kind(&self) -> ClauseKind;

    fn is_set(&self) -> bool {
        !self.descriptor().is_noop()
    }

    /// Checks that only need this clause; the default is always consistent.
    fn consistency(&self) -> Consistency {
        Consistency::Consistent
    }
}

/// A value assigned after the statement was built.
///
/// An uninitialized slot renders nothing.
#[derive(Clone, Debug, Default)]
pub struct DynamicSlot {
    value: Option<Expr>,
}

impl DynamicSlot {
    pub fn is_initialized(&self) -> bool {
        self.value.is_some()
    }

    pub fn value(&self) -> Option<&Expr> {
        self.value.as_ref()
    }

    pub(crate) fn set(&mut self, value: Expr) {
        self.value = Some(value);
    }
}
