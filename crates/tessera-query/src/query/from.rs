//! FROM clause.

use std::borrow::Cow;

use crate::{
    alias::TableAlias,
    context::Context,
    cte::CteRef,
    descriptor::{Descriptor, Tags, ValueType},
    error::{Inconsistency, Malformation, Unsupported},
    query::{
        check::{first_duplicate, Consistency},
        clause::{Clause, ClauseKind},
    },
    serialize::{check_all, serialize_list, Serialize},
    table::Table,
    traits::Fragment,
};

/// Anything that can be listed in FROM.
#[derive(Clone, Debug)]
pub enum TableRef {
    Table(Table),
    Alias(TableAlias),
    Cte(CteRef),
}

impl TableRef {
    /// The name the table is visible under in the statement.
    pub fn name(&self) -> &str {
        match self {
            TableRef::Table(table) => table.name(),
            TableRef::Alias(alias) => alias.alias().name(),
            TableRef::Cte(cte) => cte.name(),
        }
    }
}

impl From<Table> for TableRef {
    fn from(table: Table) -> Self {
        TableRef::Table(table)
    }
}

impl From<TableAlias> for TableRef {
    fn from(alias: TableAlias) -> Self {
        TableRef::Alias(alias)
    }
}

impl From<CteRef> for TableRef {
    fn from(cte: CteRef) -> Self {
        TableRef::Cte(cte)
    }
}

impl Fragment for TableRef {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        match self {
            TableRef::Table(table) => table.descriptor(),
            TableRef::Alias(alias) => alias.descriptor(),
            TableRef::Cte(cte) => cte.descriptor(),
        }
    }
}

impl Serialize for TableRef {
    fn serialize_check(&self, ctx: &dyn Context) -> Result<(), Unsupported> {
        match self {
            TableRef::Alias(alias) => alias.serialize_check(ctx),
            TableRef::Table(_) | TableRef::Cte(_) => Ok(()),
        }
    }

    fn serialize(&self, ctx: &mut dyn Context) {
        match self {
            TableRef::Table(table) => table.serialize(ctx),
            TableRef::Alias(alias) => alias.serialize(ctx),
            TableRef::Cte(cte) => cte.serialize(ctx),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FromList {
    tables: Vec<TableRef>,
    descriptor: Descriptor,
}

impl FromList {
    pub(crate) fn new(tables: Vec<TableRef>) -> Result<Self, Malformation> {
        if tables.is_empty() {
            return Err(Malformation::EmptyClause(ClauseKind::From));
        }

        let descriptor = {
            let children: Vec<_> = tables.iter().map(Fragment::descriptor).collect();
            debug_assert!(children
                .iter()
                .all(|d| d.has_tag(Tags::TABLE) || d.has_tag(Tags::CTE)));
            Descriptor::new(ValueType::None, Tags::empty())
                .with_children(children.iter().map(|d| &**d))
        };

        Ok(Self { tables, descriptor })
    }

    pub fn tables(&self) -> &[TableRef] {
        &self.tables
    }
}

#[derive(Clone, Debug, Default)]
pub enum FromClause {
    #[default]
    NoFrom,
    From(FromList),
}

impl Fragment for FromClause {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        match self {
            FromClause::NoFrom => Cow::Owned(Descriptor::noop()),
            FromClause::From(list) => Cow::Borrowed(&list.descriptor),
        }
    }
}

impl Clause for FromClause {
    fn kind(&self) -> ClauseKind {
        ClauseKind::From
    }

    fn consistency(&self) -> Consistency {
        let FromClause::From(list) = self else {
            return Consistency::Consistent;
        };
        match first_duplicate(list.tables.iter().map(TableRef::name)) {
            Some(name) => Consistency::Inconsistent(Inconsistency::DuplicateTable(name.to_string())),
            None => Consistency::Consistent,
        }
    }
}

impl Serialize for FromClause {
    fn serialize_check(&self, ctx: &dyn Context) -> Result<(), Unsupported> {
        match self {
            FromClause::NoFrom => Ok(()),
            FromClause::From(list) => check_all(&list.tables, ctx),
        }
    }

    fn serialize(&self, ctx: &mut dyn Context) {
        if let FromClause::From(list) = self {
            ctx.write(" FROM ");
            serialize_list(&list.tables, ", ", ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use tessera_config::dialect::DialectConfig;

    use super::*;
    use crate::{alias::Alias, context::SqlContext, define_table};

    define_table! {
        users {
            table: "users",
            columns: {
                ID: i64 => "id",
            }
        }
    }

    const U2: Alias = Alias::new("u2");

    fn render(clause: &FromClause) -> String {
        let mut ctx = SqlContext::new(DialectConfig::sqlite());
        clause.serialize(&mut ctx);
        ctx.finish().sql
    }

    #[test]
    fn test_from_rendering() {
        let list = FromList::new(vec![
            users::TABLE.into(),
            users::TABLE.as_(&U2).unwrap().into(),
        ])
        .unwrap();
        let clause = FromClause::From(list);

        assert_eq!(render(&clause), " FROM users, users AS u2");
        assert!(clause.consistency().is_consistent());

        let provided: Vec<_> = clause.descriptor().provided_tables().iter().cloned().collect();
        assert_eq!(provided, ["u2", "users"]);
    }

    #[test]
    fn test_duplicate_tables() {
        let clause =
            FromClause::From(FromList::new(vec![users::TABLE.into(), users::TABLE.into()]).unwrap());

        assert_eq!(
            clause.consistency(),
            Consistency::Inconsistent(Inconsistency::DuplicateTable("users".into()))
        );
    }

    #[test]
    fn test_empty_from() {
        assert_eq!(
            FromList::new(Vec::new()).unwrap_err(),
            Malformation::EmptyClause(ClauseKind::From)
        );
    }
}
