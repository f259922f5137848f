//! Tables and their column definitions.
//!
//! Tables are usually declared with [`crate::define_table!`], which produces a
//! `const` [`Table`] next to typed column constants.

use std::borrow::Cow;

use crate::{
    alias::{Alias, AliasSource, TableAlias},
    context::Context,
    descriptor::{Descriptor, Name, Tags, ValueType},
    error::Result,
    expr::column::Column,
    serialize::Serialize,
    traits::Fragment,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: Name,
    pub value_type: ValueType,
}

impl ColumnDef {
    pub const fn new(name: &'static str, value_type: ValueType) -> Self {
        Self {
            name: Cow::Borrowed(name),
            value_type,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    name: Name,
    columns: Cow<'static, [ColumnDef]>,
}

impl Table {
    pub const fn new(name: &'static str, columns: &'static [ColumnDef]) -> Self {
        Self {
            name: Cow::Borrowed(name),
            columns: Cow::Borrowed(columns),
        }
    }

    /// A table whose name and columns are only known at runtime.
    pub fn dynamic(name: impl Into<Name>, columns: Vec<ColumnDef>) -> Self {
        Self {
            name: name.into(),
            columns: Cow::Owned(columns),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_defs(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<Column> {
        self.columns
            .iter()
            .find(|def| def.name == name)
            .map(|def| Column::new(self.name.clone(), def.name.clone(), def.value_type))
    }

    pub fn columns(&self) -> Vec<Column> {
        self.columns
            .iter()
            .map(|def| Column::new(self.name.clone(), def.name.clone(), def.value_type))
            .collect()
    }

    /// Renames the table. Columns of the alias are referenced through the new name.
    pub fn as_(&self, alias: &Alias) -> Result<TableAlias> {
        Ok(TableAlias::new(
            alias.clone(),
            AliasSource::Table(self.clone()),
            self.column_defs().to_vec(),
        )?)
    }
}

impl Fragment for Table {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        Cow::Owned(Descriptor::new(ValueType::None, Tags::TABLE).providing_table(self.name.clone()))
    }
}

impl Serialize for Table {
    fn serialize(&self, ctx: &mut dyn Context) {
        ctx.write_identifier(&self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[ColumnDef] = &[
        ColumnDef::new("id", ValueType::Integral),
        ColumnDef::new("name", ValueType::Text),
    ];
    const USERS: Table = Table::new("users", COLUMNS);

    #[test]
    fn test_table_provides_itself() {
        let users = USERS;
        let descriptor = users.descriptor();

        assert!(descriptor.provided_tables().contains("users"));
        assert!(descriptor.required_tables().is_empty());
        assert!(descriptor.has_tag(Tags::TABLE));
    }

    #[test]
    fn test_column_lookup() {
        let name = USERS.column("name").unwrap();
        assert_eq!(name.table(), "users");
        assert_eq!(name.value_type(), ValueType::Text);
        assert!(USERS.column("missing").is_none());
        assert_eq!(USERS.columns().len(), 2);
    }

    #[test]
    fn test_dynamic_table() {
        let table = Table::dynamic(
            "events".to_string(),
            vec![ColumnDef::new("at", ValueType::Integral)],
        );
        assert_eq!(table.name(), "events");
        assert!(table.column("at").is_some());
    }
}
