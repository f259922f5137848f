//! Consistency checking.
//!
//! Checks are combined with a short-circuiting AND: the first inconsistency
//! wins and later checks are not evaluated.

use std::collections::BTreeSet;

use crate::error::Inconsistency;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Consistency {
    Consistent,
    Inconsistent(Inconsistency),
}

impl Consistency {
    pub fn is_consistent(&self) -> bool {
        matches!(self, Consistency::Consistent)
    }

    /// Evaluates `next` only if `self` is consistent.
    pub fn and_then<F>(self, next: F) -> Consistency
    where
        F: FnOnce() -> Consistency,
    {
        match self {
            Consistency::Consistent => next(),
            inconsistent => inconsistent,
        }
    }

    pub fn into_result(self) -> Result<(), Inconsistency> {
        match self {
            Consistency::Consistent => Ok(()),
            Consistency::Inconsistent(reason) => Err(reason),
        }
    }
}

impl From<Result<(), Inconsistency>> for Consistency {
    fn from(result: Result<(), Inconsistency>) -> Self {
        match result {
            Ok(()) => Consistency::Consistent,
            Err(reason) => Consistency::Inconsistent(reason),
        }
    }
}

/// Returns the first inconsistent result, evaluating `checks` lazily.
pub fn first_inconsistency<I>(checks: I) -> Consistency
where
    I: IntoIterator<Item = Consistency>,
{
    checks
        .into_iter()
        .find(|check| !check.is_consistent())
        .unwrap_or(Consistency::Consistent)
}

/// Returns the first name that occurs twice.
pub(crate) fn first_duplicate<'a, I>(names: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = BTreeSet::new();
    names.into_iter().find(|name| !seen.insert(*name))
}
