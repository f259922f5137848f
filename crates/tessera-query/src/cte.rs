//! Common table expressions.
//!
//! A CTE starts as a [`CteRef`] naming it, gets its body with [`CteRef::as_`]
//! and may then be extended by unions. It becomes recursive as soon as a union
//! operand reads from the CTE itself.
//!
//! ```rust
//! use tessera_query::{
//!     alias::Alias, columns, cte::cte, define_table, query::from::TableRef, select,
//!     traits::Expression as _,
//! };
//!
//! define_table! {
//!     nodes {
//!         table: "nodes",
//!         columns: {
//!             ID: i64 => "id",
//!             PARENT: Option<i64> => "parent",
//!         }
//!     }
//! }
//!
//! const TREE: Alias = Alias::new("tree");
//!
//! let roots = select(columns![nodes::ID])
//!     .unwrap()
//!     .from([nodes::TABLE])
//!     .unwrap()
//!     .where_(nodes::PARENT.is_null().unwrap())
//!     .unwrap();
//! let tree = cte(&TREE).as_(roots).unwrap();
//! let tree_id = tree.column("id").unwrap();
//!
//! let children = select(columns![nodes::ID])
//!     .unwrap()
//!     .from([TableRef::from(nodes::TABLE), tree.reference().into()])
//!     .unwrap()
//!     .where_(nodes::PARENT.eq(tree_id).unwrap())
//!     .unwrap();
//! let tree = tree.union_all(children).unwrap();
//!
//! assert!(tree.is_recursive());
//! ```

use std::borrow::Cow;

use tracing::debug;

use crate::{
    alias::{Alias, AliasSource, TableAlias},
    context::Context,
    descriptor::{names, Descriptor, Name, NameSet, Tags, ValueType},
    error::{Malformation, Result, Unsupported},
    expr::column::Column,
    query::{
        select::ResultRow,
        statement::Statement,
        union::{self, check_union_operand, check_union_rows, UnionFlag},
    },
    serialize::{require, Serialize},
    table::ColumnDef,
    traits::Fragment,
};

/// Reference to a common table expression by name.
///
/// Used in FROM it provides the CTE name as a table and requires a CTE of that
/// name from an enclosing WITH.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CteRef {
    alias: Alias,
}

/// Starts a common table expression named `alias`.
pub fn cte(alias: &Alias) -> CteRef {
    CteRef {
        alias: alias.clone(),
    }
}

impl CteRef {
    pub fn name(&self) -> &str {
        self.alias.name()
    }

    pub fn alias(&self) -> &Alias {
        &self.alias
    }

    /// Binds the body of the CTE.
    ///
    /// The body has to be a complete select with a static column list that
    /// reads only from tables it provides itself and does not mention this CTE.
    pub fn as_(&self, statement: Statement) -> Result<Cte> {
        let name = self.alias.to_name();
        let row = statement
            .result_row()
            .cloned()
            .ok_or(Malformation::NotASelect("common table expression body"))?;
        if row.is_dynamic() {
            return Err(Malformation::DynamicColumns("common table expression body").into());
        }

        {
            let descriptor = statement.descriptor();
            if !descriptor.required_tables().is_empty() {
                return Err(Malformation::CteUnknownTables {
                    cte: name.to_string(),
                    tables: names(descriptor.required_tables()),
                }
                .into());
            }
            if descriptor.required_ctes().contains(&name) {
                return Err(Malformation::CteSelfReference(name.to_string()).into());
            }
        }

        debug!("defined common table expression `{}`", name);
        Ok(Cte::build(self.clone(), CteBody::Select(Box::new(statement)), row))
    }
}

impl Fragment for CteRef {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        Cow::Owned(
            Descriptor::new(ValueType::None, Tags::CTE | Tags::ALIAS)
                .providing_table(self.alias.to_name())
                .requiring_cte(self.alias.to_name()),
        )
    }
}

impl Serialize for CteRef {
    fn serialize(&self, ctx: &mut dyn Context) {
        ctx.write_identifier(self.alias.name());
    }
}

/// The statement a CTE stands for.
#[derive(Clone, Debug)]
pub enum CteBody {
    Select(Box<Statement>),
    Union {
        flag: UnionFlag,
        lhs: Box<CteBody>,
        rhs: Box<Statement>,
        descriptor: Descriptor,
    },
}

impl Fragment for CteBody {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        match self {
            CteBody::Select(statement) => statement.descriptor(),
            CteBody::Union { descriptor, .. } => Cow::Borrowed(descriptor),
        }
    }
}

impl Serialize for CteBody {
    fn serialize_check(&self, ctx: &dyn Context) -> std::result::Result<(), Unsupported> {
        match self {
            CteBody::Select(statement) => statement.serialize_check(ctx),
            CteBody::Union { flag, lhs, rhs, .. } => {
                require(ctx, flag.feature())?;
                lhs.serialize_check(ctx)?;
                rhs.serialize_check(ctx)
            }
        }
    }

    fn serialize(&self, ctx: &mut dyn Context) {
        match self {
            CteBody::Select(statement) => statement.serialize(ctx),
            CteBody::Union { flag, lhs, rhs, .. } => {
                lhs.serialize(ctx);
                ctx.write(" ");
                let keyword = ctx.union_keyword(*flag);
                ctx.write(keyword);
                ctx.write(" ");
                rhs.serialize(ctx);
            }
        }
    }
}

/// A named statement for use in WITH.
#[derive(Clone, Debug)]
pub struct Cte {
    reference: CteRef,
    body: CteBody,
    row: ResultRow,
    recursive: bool,
    /// CTEs the body reads from, other than this one.
    dependencies: NameSet,
    descriptor: Descriptor,
}

impl Cte {
    fn build(reference: CteRef, body: CteBody, row: ResultRow) -> Self {
        let name = reference.alias.to_name();
        let (recursive, dependencies, descriptor) = {
            let body_descriptor = body.descriptor();
            let recursive = body_descriptor.required_ctes().contains(&name);
            let dependencies = body_descriptor
                .required_ctes()
                .iter()
                .filter(|cte| **cte != name)
                .cloned()
                .collect();
            let descriptor = Descriptor::new(ValueType::None, Tags::CTE)
                .with_children([&*body_descriptor])
                .requiring_cte(name.clone())
                .providing_cte(name.clone());
            (recursive, dependencies, descriptor)
        };

        Self {
            reference,
            body,
            row,
            recursive,
            dependencies,
            descriptor,
        }
    }

    pub fn name(&self) -> &str {
        self.reference.name()
    }

    /// A reference to this CTE, for use in FROM.
    pub fn reference(&self) -> CteRef {
        self.reference.clone()
    }

    pub fn body(&self) -> &CteBody {
        &self.body
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    pub fn result_row(&self) -> &ResultRow {
        &self.row
    }

    pub(crate) fn dependencies(&self) -> &NameSet {
        &self.dependencies
    }

    /// A column of the CTE, referenced through the CTE name.
    pub fn column(&self, name: &str) -> Result<Column> {
        self.columns()
            .into_iter()
            .find(|column| column.name() == name)
            .ok_or_else(|| {
                Malformation::UnknownColumn {
                    table: self.name().to_string(),
                    column: name.to_string(),
                }
                .into()
            })
    }

    pub fn columns(&self) -> Vec<Column> {
        self.row.columns_of(&self.reference.alias.to_name())
    }

    /// Combines the body with `rhs` by `UNION ALL`.
    pub fn union_all(self, rhs: Statement) -> Result<Cte> {
        self.union(UnionFlag::All, rhs)
    }

    /// Combines the body with `rhs` by `UNION`.
    pub fn union_distinct(self, rhs: Statement) -> Result<Cte> {
        self.union(UnionFlag::Distinct, rhs)
    }

    fn union(self, flag: UnionFlag, rhs: Statement) -> Result<Cte> {
        check_union_rows(Some(&self.row), rhs.result_row())?;
        if let CteBody::Select(body) = &self.body {
            check_union_operand(union::LHS, body, true)?;
        }
        check_union_operand(union::RHS, &rhs, false)?;

        let descriptor = {
            let rhs_descriptor = rhs.descriptor();
            if !rhs_descriptor.required_tables().is_empty() {
                return Err(Malformation::CteUnknownTables {
                    cte: self.name().to_string(),
                    tables: names(rhs_descriptor.required_tables()),
                }
                .into());
            }
            Descriptor::new(ValueType::None, Tags::UNION)
                .with_children([&*self.body.descriptor(), &*rhs_descriptor])
        };

        let Cte {
            reference,
            body,
            row,
            ..
        } = self;
        let cte = Cte::build(
            reference,
            CteBody::Union {
                flag,
                lhs: Box::new(body),
                rhs: Box::new(rhs),
                descriptor,
            },
            row,
        );
        if cte.recursive {
            debug!("common table expression `{}` is recursive", cte.name());
        }
        Ok(cte)
    }

    /// Renames the CTE for use in FROM.
    pub fn as_alias(&self, alias: &Alias) -> Result<TableAlias> {
        let columns = self
            .row
            .fields()
            .iter()
            .map(|field| ColumnDef {
                name: Name::Owned(field.name().to_string()),
                value_type: field.value_type(),
            })
            .collect();
        Ok(TableAlias::new(
            alias.clone(),
            AliasSource::Cte(self.reference()),
            columns,
        )?)
    }
}

impl Fragment for Cte {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        Cow::Borrowed(&self.descriptor)
    }
}

impl Serialize for Cte {
    fn serialize_check(&self, ctx: &dyn Context) -> std::result::Result<(), Unsupported> {
        self.body.serialize_check(ctx)
    }

    fn serialize(&self, ctx: &mut dyn Context) {
        ctx.write_identifier(self.name());
        ctx.write(" AS (");
        self.body.serialize(ctx);
        ctx.write(")");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        columns, define_table,
        error::QueryError,
        query::{clause::ClauseKind, from::TableRef, statement::select},
        traits::Expression,
    };

    define_table! {
        nodes {
            table: "nodes",
            columns: {
                ID: i64 => "id",
                PARENT: Option<i64> => "parent",
                LABEL: String => "label",
            }
        }
    }

    const TREE: Alias = Alias::new("tree");
    const OTHER: Alias = Alias::new("other");

    fn roots() -> Statement {
        select(columns![nodes::ID])
            .unwrap()
            .from([nodes::TABLE])
            .unwrap()
            .where_(nodes::PARENT.is_null().unwrap())
            .unwrap()
    }

    #[test]
    fn test_cte_ref_descriptor() {
        let reference = cte(&TREE);
        let descriptor = reference.descriptor();

        assert!(descriptor.provided_tables().contains("tree"));
        assert!(descriptor.required_ctes().contains("tree"));
        assert!(descriptor.has_tag(Tags::CTE));
        assert!(!descriptor.has_tag(Tags::TABLE));
    }

    #[test]
    fn test_bind_body() {
        let tree = cte(&TREE).as_(roots()).unwrap();

        assert_eq!(tree.name(), "tree");
        assert!(!tree.is_recursive());
        assert!(tree.descriptor().provided_ctes().contains("tree"));
        assert!(tree.descriptor().required_ctes().contains("tree"));
        assert_eq!(tree.column("id").unwrap().table(), "tree");
    }

    #[test]
    fn test_body_must_not_use_unknown_tables() {
        let correlated = select(columns![nodes::ID]).unwrap();

        assert!(matches!(
            cte(&TREE).as_(correlated),
            Err(QueryError::Malformed(Malformation::CteUnknownTables { .. }))
        ));
    }

    #[test]
    fn test_body_must_not_reference_itself() {
        let body = select([Column::new("tree", "id", ValueType::Integral)])
            .unwrap()
            .from([cte(&TREE)])
            .unwrap();

        assert!(matches!(
            cte(&TREE).as_(body),
            Err(QueryError::Malformed(Malformation::CteSelfReference(name))) if name == "tree"
        ));
    }

    #[test]
    fn test_body_may_use_other_ctes() {
        let other = cte(&OTHER).as_(roots()).unwrap();
        let body = select([other.column("id").unwrap()])
            .unwrap()
            .from([other.reference()])
            .unwrap();
        let tree = cte(&TREE).as_(body).unwrap();

        assert!(tree.dependencies().contains("other"));
        assert!(!tree.is_recursive());
    }

    #[test]
    fn test_union_makes_recursive() {
        let tree = cte(&TREE).as_(roots()).unwrap();
        let tree_id = tree.column("id").unwrap();

        let children = select(columns![nodes::ID])
            .unwrap()
            .from([TableRef::from(nodes::TABLE), tree.reference().into()])
            .unwrap()
            .where_(nodes::PARENT.eq(tree_id).unwrap())
            .unwrap();
        let tree = tree.union_all(children).unwrap();

        assert!(tree.is_recursive());
        assert!(tree.dependencies().is_empty());
        assert!(matches!(tree.body(), CteBody::Union { flag: UnionFlag::All, .. }));
    }

    #[test]
    fn test_union_without_self_reference_is_not_recursive() {
        let tree = cte(&TREE)
            .as_(roots())
            .unwrap()
            .union_distinct(roots())
            .unwrap();

        assert!(!tree.is_recursive());
    }

    #[test]
    fn test_union_shape_must_match() {
        let tree = cte(&TREE).as_(roots()).unwrap();
        let labels = select(columns![nodes::LABEL])
            .unwrap()
            .from([nodes::TABLE])
            .unwrap();

        assert!(matches!(
            tree.union_all(labels),
            Err(QueryError::Malformed(Malformation::ShapeMismatch { .. }))
        ));
    }

    #[test]
    fn test_union_operands_must_be_plain() {
        let limited = cte(&TREE).as_(roots().limit(1).unwrap()).unwrap();
        assert!(matches!(
            limited.union_all(roots()),
            Err(QueryError::Malformed(Malformation::UnionOperandClause {
                clause: ClauseKind::Limit,
                ..
            }))
        ));

        let tree = cte(&TREE).as_(roots()).unwrap();
        let ordered = roots().order_by([nodes::ID.asc()]).unwrap();
        assert!(matches!(
            tree.clone().union_all(ordered),
            Err(QueryError::Malformed(Malformation::UnionOperandClause {
                clause: ClauseKind::OrderBy,
                ..
            }))
        ));

        let nested = roots().union_all(roots()).unwrap();
        assert!(matches!(
            tree.union_distinct(nested),
            Err(QueryError::Malformed(Malformation::UnionOperandClause {
                clause: ClauseKind::Union,
                ..
            }))
        ));
    }

    #[test]
    fn test_cte_alias() {
        let tree = cte(&TREE).as_(roots()).unwrap();
        let aliased = tree.as_alias(&Alias::new("t2")).unwrap();

        assert_eq!(aliased.column("id").unwrap().table(), "t2");
        assert!(aliased.descriptor().required_ctes().contains("tree"));
        assert!(!aliased.descriptor().provided_tables().contains("tree"));
    }
}
