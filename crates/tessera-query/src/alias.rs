//! Aliases for tables, common table expressions and sub-selects.
//!
//! An alias is identified by its name. Aliasing a table-like fragment yields a
//! [`TableAlias`] that provides the alias name instead of the source name, so
//! the same table can appear more than once in FROM.

use std::borrow::Cow;

use tessera_config::dialect::Feature;

use crate::{
    context::Context,
    cte::CteRef,
    descriptor::{names, Descriptor, Name, Tags},
    error::{Malformation, Result, Unsupported},
    expr::column::Column,
    query::statement::Statement,
    serialize::{require, Serialize},
    table::{ColumnDef, Table},
    traits::Fragment,
};

/// A name to rename a table-like fragment to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Alias {
    name: Name,
}

impl Alias {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
        }
    }

    pub fn named(name: impl Into<Name>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn to_name(&self) -> Name {
        self.name.clone()
    }
}

/// What an alias renames.
#[derive(Clone, Debug)]
pub enum AliasSource {
    Table(Table),
    Cte(CteRef),
    Select(Box<Statement>),
}

impl Fragment for AliasSource {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        match self {
            AliasSource::Table(table) => table.descriptor(),
            AliasSource::Cte(cte) => cte.descriptor(),
            AliasSource::Select(statement) => statement.descriptor(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TableAlias {
    alias: Alias,
    source: AliasSource,
    columns: Vec<ColumnDef>,
    descriptor: Descriptor,
}

impl TableAlias {
    pub(crate) fn new(
        alias: Alias,
        source: AliasSource,
        columns: Vec<ColumnDef>,
    ) -> std::result::Result<Self, Malformation> {
        let descriptor = {
            let inner = source.descriptor();
            if !inner.required_tables().is_empty() {
                return Err(Malformation::AliasRequiresTables {
                    alias: alias.name().to_string(),
                    tables: names(inner.required_tables()),
                });
            }
            Descriptor::new(inner.value_type(), Tags::TABLE | Tags::ALIAS)
                .with_requirements_of(&inner)
                .providing_table(alias.to_name())
        };

        Ok(Self {
            alias,
            source,
            columns,
            descriptor,
        })
    }

    pub fn alias(&self) -> &Alias {
        &self.alias
    }

    pub fn source(&self) -> &AliasSource {
        &self.source
    }

    /// A column of the source, referenced through the alias name.
    pub fn column(&self, name: &str) -> Result<Column> {
        self.columns
            .iter()
            .find(|def| def.name == name)
            .map(|def| Column::new(self.alias.to_name(), def.name.clone(), def.value_type))
            .ok_or_else(|| {
                Malformation::UnknownColumn {
                    table: self.alias.name().to_string(),
                    column: name.to_string(),
                }
                .into()
            })
    }

    pub fn columns(&self) -> Vec<Column> {
        self.columns
            .iter()
            .map(|def| Column::new(self.alias.to_name(), def.name.clone(), def.value_type))
            .collect()
    }

    /// Renames the underlying source again. The new alias replaces this one.
    pub fn as_(&self, alias: &Alias) -> Result<TableAlias> {
        Ok(TableAlias::new(
            alias.clone(),
            self.source.clone(),
            self.columns.clone(),
        )?)
    }
}

impl Fragment for TableAlias {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        Cow::Borrowed(&self.descriptor)
    }
}

impl Serialize for TableAlias {
    fn serialize_check(&self, ctx: &dyn Context) -> std::result::Result<(), Unsupported> {
        match &self.source {
            AliasSource::Select(statement) => {
                require(ctx, Feature::Subquery)?;
                statement.serialize_check(ctx)
            }
            AliasSource::Table(_) | AliasSource::Cte(_) => Ok(()),
        }
    }

    fn serialize(&self, ctx: &mut dyn Context) {
        match &self.source {
            AliasSource::Table(table) => table.serialize(ctx),
            AliasSource::Cte(cte) => cte.serialize(ctx),
            AliasSource::Select(statement) => {
                ctx.write("(");
                statement.serialize(ctx);
                ctx.write(")");
            }
        }
        ctx.write(" AS ");
        ctx.write_identifier(self.alias.name());
    }
}
