//! Static metadata carried by every fragment.
//!
//! A [`Descriptor`] records the value type of a fragment, what kind of thing it
//! is, which table-like names and common table expressions it needs from its
//! surroundings, which it brings into scope, and which parameters it contains.
//! Composites fold the descriptors of their children when they are built.

use std::{borrow::Cow, collections::BTreeSet, fmt};

use crate::expr::value::Parameter;

/// Identity of tables, aliases, columns and CTEs.
pub type Name = Cow<'static, str>;

pub type NameSet = BTreeSet<Name>;

/// The SQL value kind an expression evaluates to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// No value, or a `NULL` literal.
    #[default]
    None,
    Boolean,
    Integral,
    FloatingPoint,
    Text,
}

impl ValueType {
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Integral | ValueType::FloatingPoint)
    }

    /// Whether values of both types can be compared with each other.
    pub fn is_compatible_with(self, other: ValueType) -> bool {
        self == other
            || self == ValueType::None
            || other == ValueType::None
            || (self.is_numeric() && other.is_numeric())
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::None => "no value",
            ValueType::Boolean => "boolean",
            ValueType::Integral => "integral",
            ValueType::FloatingPoint => "floating point",
            ValueType::Text => "text",
        };
        f.write_str(name)
    }
}

bitflags::bitflags! {
    /// Kinds a fragment belongs to. A fragment may carry several.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Tags: u16 {
        /// Usable in FROM.
        const TABLE = 1 << 0;
        /// Renamed table or sub-select.
        const ALIAS = 1 << 1;
        /// Reference to a common table expression.
        const CTE = 1 << 2;
        /// Evaluates to a single value.
        const EXPRESSION = 1 << 3;
        /// Can appear in a select list.
        const SELECTABLE = 1 << 4;
        /// Clause that has not been set.
        const NOOP = 1 << 5;
        const LIMIT = 1 << 6;
        const OFFSET = 1 << 7;
        const UNION = 1 << 8;
        const STATEMENT = 1 << 9;
        const PARAMETER = 1 << 10;
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Descriptor {
    value_type: ValueType,
    tags: Tags,
    required_tables: NameSet,
    provided_tables: NameSet,
    required_ctes: NameSet,
    provided_ctes: NameSet,
    parameters: Vec<Parameter>,
}

impl Descriptor {
    pub fn new(value_type: ValueType, tags: Tags) -> Self {
        Self {
            value_type,
            tags,
            ..Self::default()
        }
    }

    /// Descriptor of a clause that has not been set.
    pub fn noop() -> Self {
        Self::new(ValueType::None, Tags::NOOP)
    }

    /// Folds the name sets and parameters of `children`, in order.
    pub(crate) fn with_children<'a, I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = &'a Descriptor>,
    {
        for child in children {
            self.required_tables
                .extend(child.required_tables.iter().cloned());
            self.provided_tables
                .extend(child.provided_tables.iter().cloned());
            self.required_ctes.extend(child.required_ctes.iter().cloned());
            self.provided_ctes.extend(child.provided_ctes.iter().cloned());
            self.parameters.extend(child.parameters.iter().cloned());
        }
        self
    }

    /// Takes over what `source` requires and its parameters, but not what it provides.
    pub(crate) fn with_requirements_of(mut self, source: &Descriptor) -> Self {
        self.required_tables
            .extend(source.required_tables.iter().cloned());
        self.required_ctes.extend(source.required_ctes.iter().cloned());
        self.parameters.extend(source.parameters.iter().cloned());
        self
    }

    pub(crate) fn requiring_table(mut self, name: impl Into<Name>) -> Self {
        self.required_tables.insert(name.into());
        self
    }

    pub(crate) fn providing_table(mut self, name: impl Into<Name>) -> Self {
        self.provided_tables.insert(name.into());
        self
    }

    pub(crate) fn requiring_cte(mut self, name: impl Into<Name>) -> Self {
        self.required_ctes.insert(name.into());
        self
    }

    pub(crate) fn providing_cte(mut self, name: impl Into<Name>) -> Self {
        self.provided_ctes.insert(name.into());
        self
    }

    pub(crate) fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Drops requirements that are satisfied by what this fragment provides.
    pub(crate) fn resolved(mut self) -> Self {
        let provided_tables = &self.provided_tables;
        self.required_tables
            .retain(|name| !provided_tables.contains(name));
        let provided_ctes = &self.provided_ctes;
        self.required_ctes.retain(|name| !provided_ctes.contains(name));
        self
    }

    /// Hides provided names from the enclosing fragment.
    pub(crate) fn scoped(mut self) -> Self {
        self.provided_tables.clear();
        self.provided_ctes.clear();
        self
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn tags(&self) -> Tags {
        self.tags
    }

    pub fn has_tag(&self, tag: Tags) -> bool {
        self.tags.contains(tag)
    }

    pub fn is_noop(&self) -> bool {
        self.tags.contains(Tags::NOOP)
    }

    pub fn required_tables(&self) -> &NameSet {
        &self.required_tables
    }

    pub fn provided_tables(&self) -> &NameSet {
        &self.provided_tables
    }

    pub fn required_ctes(&self) -> &NameSet {
        &self.required_ctes
    }

    pub fn provided_ctes(&self) -> &NameSet {
        &self.provided_ctes
    }

    /// Parameters in the order they are rendered.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

/// Collects a name set into owned strings for diagnostics.
pub(crate) fn names(set: &NameSet) -> Vec<String> {
    set.iter().map(|name| name.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_compatibility() {
        assert!(ValueType::Integral.is_compatible_with(ValueType::FloatingPoint));
        assert!(ValueType::Text.is_compatible_with(ValueType::None));
        assert!(ValueType::None.is_compatible_with(ValueType::Boolean));
        assert!(!ValueType::Text.is_compatible_with(ValueType::Integral));
        assert!(!ValueType::Boolean.is_compatible_with(ValueType::Integral));
    }

    #[test]
    fn test_with_children_folds_sets_and_parameters() {
        let lhs = Descriptor::new(ValueType::Integral, Tags::EXPRESSION)
            .requiring_table("users")
            .with_parameter(Parameter::new("a", ValueType::Integral));
        let rhs = Descriptor::new(ValueType::None, Tags::TABLE)
            .providing_table("users")
            .with_parameter(Parameter::new("b", ValueType::Text));

        let folded = Descriptor::new(ValueType::Boolean, Tags::EXPRESSION)
            .with_children([&lhs, &rhs]);

        assert!(folded.required_tables().contains("users"));
        assert!(folded.provided_tables().contains("users"));
        let names: Vec<_> = folded.parameters().iter().map(|p| p.name()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_resolved_and_scoped() {
        let descriptor = Descriptor::new(ValueType::None, Tags::STATEMENT)
            .requiring_table("users")
            .requiring_table("groups")
            .providing_table("users")
            .requiring_cte("tree")
            .providing_cte("tree")
            .resolved()
            .scoped();

        let required: Vec<_> = descriptor.required_tables().iter().collect();
        assert_eq!(required, ["groups"]);
        assert!(descriptor.required_ctes().is_empty());
        assert!(descriptor.provided_tables().is_empty());
        assert!(descriptor.provided_ctes().is_empty());
    }

    #[test]
    fn test_noop() {
        let noop = Descriptor::noop();
        assert!(noop.is_noop());
        assert_eq!(noop.value_type(), ValueType::None);
        assert!(noop.parameters().is_empty());
    }
}
