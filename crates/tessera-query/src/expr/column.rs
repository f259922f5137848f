//! Represents a typed table column.
//!
//! `Col<T>` ties a column name to its table and a Rust type `T`; the type
//! decides the column's SQL value type. It implements [`Expression`], so it can
//! be used directly in conditions and select lists.

use std::{borrow::Cow, marker::PhantomData};

use crate::{
    context::Context,
    descriptor::{Descriptor, Name, Tags, ValueType},
    expr::{value::SqlType, Expr},
    serialize::Serialize,
    traits::{Expression, Fragment},
};

/// A typed reference to a column of a table.
///
/// # Example
///
/// ```rust
/// use tessera_query::expr::column::Col;
/// const NAME: Col<String> = Col::new("users", "name");
/// ```
pub struct Col<T> {
    pub table: &'static str,
    pub name: &'static str,
    _type: PhantomData<fn() -> T>,
}

impl<T> Col<T> {
    /// Creates a new column reference.
    ///
    /// # Parameters
    ///
    /// - `table`: name of the table (or alias) the column belongs to
    /// - `name`: the actual column name in the database (e.g., `"user_name"`)
    pub const fn new(table: &'static str, name: &'static str) -> Self {
        Self {
            table,
            name,
            _type: PhantomData,
        }
    }
}

impl<T> Clone for Col<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Col<T> {}

impl<T> std::fmt::Debug for Col<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Col({}.{})", self.table, self.name)
    }
}

impl<T: SqlType> From<Col<T>> for Column {
    fn from(col: Col<T>) -> Self {
        Column::new(col.table, col.name, T::VALUE_TYPE)
    }
}

impl<T: SqlType> From<Col<T>> for Expr {
    fn from(col: Col<T>) -> Self {
        Expr::Column(col.into())
    }
}

impl<T: SqlType> Expression for Col<T> {}

/// An untyped column, as produced by aliases and common table expressions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    table: Name,
    name: Name,
    value_type: ValueType,
}

impl Column {
    pub fn new(table: impl Into<Name>, name: impl Into<Name>, value_type: ValueType) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            value_type,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }
}

impl Expression for Column {}

impl Fragment for Column {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        Cow::Owned(
            Descriptor::new(self.value_type, Tags::EXPRESSION | Tags::SELECTABLE)
                .requiring_table(self.table.clone()),
        )
    }
}

impl Serialize for Column {
    fn serialize(&self, ctx: &mut dyn Context) {
        ctx.write_identifier(&self.table);
        ctx.write(".");
        ctx.write_identifier(&self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGE: Col<Option<i32>> = Col::new("users", "age");

    #[test]
    fn test_typed_column_conversion() {
        let column = Column::from(AGE);

        assert_eq!(column.table(), "users");
        assert_eq!(column.name(), "age");
        assert_eq!(column.value_type(), ValueType::Integral);
    }

    #[test]
    fn test_column_requires_its_table() {
        let column = Column::from(AGE);
        let descriptor = column.descriptor();

        assert!(descriptor.required_tables().contains("users"));
        assert!(descriptor.provided_tables().is_empty());
        assert!(descriptor.has_tag(Tags::EXPRESSION | Tags::SELECTABLE));
    }
}
