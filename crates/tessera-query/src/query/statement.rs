//! The statement composer.
//!
//! A [`Statement`] owns one slot per clause kind. Setters consume the statement
//! and hand back a new one, or an error if the clause is already set, does not
//! apply, or is malformed. A failed setter leaves nothing to build on.
//!
//! Setters only check the clause they install. The checks that need the whole
//! statement (every table and CTE in scope, something selected) run when the
//! statement is rendered or bound as a CTE body.
//!
//! ```rust
//! use tessera_config::dialect::DialectConfig;
//! use tessera_query::{columns, define_table, select, traits::Expression as _};
//!
//! define_table! {
//!     users {
//!         table: "users",
//!         columns: {
//!             ID: i64 => "id",
//!             NAME: String => "name",
//!         }
//!     }
//! }
//!
//! let query = select(columns![users::ID, users::NAME])
//!     .unwrap()
//!     .from([users::TABLE])
//!     .unwrap()
//!     .where_(users::ID.gt(10).unwrap())
//!     .unwrap()
//!     .limit(5)
//!     .unwrap();
//!
//! let rendered = query.to_sql(&DialectConfig::sqlite()).unwrap();
//! assert_eq!(
//!     rendered.sql,
//!     "SELECT users.id, users.name FROM users WHERE users.id > 10 LIMIT 5"
//! );
//! ```

use std::borrow::Cow;

use tessera_config::{config::get_config, dialect::DialectConfig};
use tracing::{debug, trace};

use crate::{
    alias::{Alias, AliasSource, TableAlias},
    context::{Context, RenderedQuery, SqlContext},
    cte::Cte,
    descriptor::{names, Descriptor, Name, Tags, ValueType},
    error::{Inconsistency, Malformation, Result, Unsupported},
    expr::Expr,
    query::{
        check::{first_inconsistency, Consistency},
        clause::{Clause, ClauseKind},
        filter::{Where, WhereClause},
        from::{FromClause, FromList, TableRef},
        limit::RowBound,
        order::{OrderBy, OrderByClause, SortOrder},
        select::{ResultRow, Select, SelectClause, SelectColumn},
        union::{Union, UnionClause, UnionFlag},
        with::{With, WithClause},
    },
    serialize::Serialize,
    table::ColumnDef,
    traits::Fragment,
};

/// A SELECT statement under construction.
#[derive(Clone, Debug)]
pub struct Statement {
    limit: RowBound,
    union: UnionClause,
    with: WithClause,
    select: SelectClause,
    from: FromClause,
    filter: WhereClause,
    order_by: OrderByClause,
    offset: RowBound,
    descriptor: Descriptor,
}

/// Starts a statement selecting `columns`.
pub fn select<I>(columns: I) -> Result<Statement>
where
    I: IntoIterator,
    I::Item: Into<SelectColumn>,
{
    Statement::new().select(columns)
}

/// Starts a statement whose select list can be extended with
/// [`Statement::add_column`].
pub fn dynamic_select<I>(columns: I) -> Result<Statement>
where
    I: IntoIterator,
    I::Item: Into<SelectColumn>,
{
    Statement::new().dynamic_select(columns)
}

/// Starts a statement with common table expressions.
pub fn with<I>(ctes: I) -> Result<Statement>
where
    I: IntoIterator<Item = Cte>,
{
    Statement::new().with(ctes)
}

impl Default for Statement {
    fn default() -> Self {
        Self::new()
    }
}

impl Statement {
    /// A statement with every clause unset.
    pub fn new() -> Self {
        let mut statement = Self {
            limit: RowBound::limit(),
            union: UnionClause::default(),
            with: WithClause::default(),
            select: SelectClause::default(),
            from: FromClause::default(),
            filter: WhereClause::default(),
            order_by: OrderByClause::default(),
            offset: RowBound::offset(),
            descriptor: Descriptor::new(ValueType::None, Tags::STATEMENT),
        };
        statement.descriptor = statement.compute_descriptor();
        statement
    }

    /// Clauses in the order the consistency checker visits them.
    fn clauses(&self) -> [&dyn Clause; 8] {
        [
            &self.limit,
            &self.union,
            &self.with,
            &self.select,
            &self.from,
            &self.filter,
            &self.order_by,
            &self.offset,
        ]
    }

    /// Clauses in the order they are rendered.
    fn rendered_clauses(&self) -> [&dyn Clause; 8] {
        [
            &self.with,
            &self.select,
            &self.from,
            &self.filter,
            &self.order_by,
            &self.limit,
            &self.offset,
            &self.union,
        ]
    }

    fn clause(&self, kind: ClauseKind) -> &dyn Clause {
        match kind {
            ClauseKind::Limit => &self.limit,
            ClauseKind::Union => &self.union,
            ClauseKind::With => &self.with,
            ClauseKind::Select => &self.select,
            ClauseKind::From => &self.from,
            ClauseKind::Where => &self.filter,
            ClauseKind::OrderBy => &self.order_by,
            ClauseKind::Offset => &self.offset,
        }
    }

    pub fn is_set(&self, kind: ClauseKind) -> bool {
        self.clause(kind).is_set()
    }

    pub fn is_union(&self) -> bool {
        self.union.is_set()
    }

    pub fn select_clause(&self) -> &SelectClause {
        &self.select
    }

    pub fn from_clause(&self) -> &FromClause {
        &self.from
    }

    pub fn where_clause(&self) -> &WhereClause {
        &self.filter
    }

    pub fn with_clause(&self) -> &WithClause {
        &self.with
    }

    pub fn union_clause(&self) -> &UnionClause {
        &self.union
    }

    pub fn limit_clause(&self) -> &RowBound {
        &self.limit
    }

    pub fn offset_clause(&self) -> &RowBound {
        &self.offset
    }

    /// The columns the statement produces. A union produces the row of its
    /// left-hand side.
    pub fn result_row(&self) -> Option<&ResultRow> {
        match (&self.union, &self.select) {
            (UnionClause::Union(union), _) => union.lhs().result_row(),
            (UnionClause::NoUnion, SelectClause::Select(select)) => Some(select.row()),
            (UnionClause::NoUnion, SelectClause::NoSelect) => None,
        }
    }

    fn compute_descriptor(&self) -> Descriptor {
        let (value_type, mut tags) = match self.result_row() {
            Some(row) if !row.is_dynamic() && row.fields().len() == 1 => (
                row.fields()[0].value_type(),
                Tags::STATEMENT | Tags::EXPRESSION | Tags::SELECTABLE,
            ),
            _ => (ValueType::None, Tags::STATEMENT),
        };
        if self.is_union() {
            tags |= Tags::UNION;
        }

        let children: Vec<_> = self
            .rendered_clauses()
            .into_iter()
            .map(|clause| clause.descriptor())
            .collect();
        Descriptor::new(value_type, tags)
            .with_children(children.iter().map(|d| &**d))
            .resolved()
            .scoped()
    }

    /// Checks that a clause of `kind` can be installed.
    fn ensure_settable(&self, kind: ClauseKind) -> std::result::Result<(), Malformation> {
        if self.is_union() {
            return Err(Malformation::ClauseNotApplicable {
                clause: kind,
                reason: "a union statement only accepts further unions",
            });
        }
        if self.is_set(kind) {
            return Err(Malformation::ClauseAlreadySet(kind));
        }
        Ok(())
    }

    /// Refreshes the descriptor after `kind` was installed and checks the clauses.
    fn commit(mut self, kind: ClauseKind) -> Result<Self> {
        self.descriptor = self.compute_descriptor();
        self.clause_consistency().into_result()?;
        debug!("set {} clause", kind);
        Ok(self)
    }

    pub fn with<I>(mut self, ctes: I) -> Result<Self>
    where
        I: IntoIterator<Item = Cte>,
    {
        self.ensure_settable(ClauseKind::With)?;
        self.with = WithClause::With(With::new(ctes.into_iter().collect())?);
        self.commit(ClauseKind::With)
    }

    pub fn select<I>(self, columns: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<SelectColumn>,
    {
        self.set_select(columns, false)
    }

    /// Sets a select list that can grow after the statement was built.
    pub fn dynamic_select<I>(self, columns: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<SelectColumn>,
    {
        self.set_select(columns, true)
    }

    fn set_select<I>(mut self, columns: I, dynamic: bool) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<SelectColumn>,
    {
        self.ensure_settable(ClauseKind::Select)?;
        let columns = columns.into_iter().map(Into::into).collect();
        self.select = SelectClause::Select(Select::new(columns, dynamic)?);
        self.commit(ClauseKind::Select)
    }

    /// Appends a column to a dynamic select list.
    ///
    /// The statement is left unchanged if the column cannot be added.
    pub fn add_column(&mut self, column: impl Into<SelectColumn>) -> Result<()> {
        let SelectClause::Select(select) = &self.select else {
            return Err(Malformation::NotDynamic(ClauseKind::Select).into());
        };

        let mut select = select.clone();
        select.add(column.into())?;
        let select = SelectClause::Select(select);
        select.consistency().into_result()?;

        self.select = select;
        self.descriptor = self.compute_descriptor();
        trace!("added column to dynamic select");
        Ok(())
    }

    pub fn from<I>(mut self, tables: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<TableRef>,
    {
        self.ensure_settable(ClauseKind::From)?;
        let tables = tables.into_iter().map(Into::into).collect();
        self.from = FromClause::From(FromList::new(tables)?);
        self.commit(ClauseKind::From)
    }

    pub fn where_(mut self, condition: impl Into<Expr>) -> Result<Self> {
        self.ensure_settable(ClauseKind::Where)?;
        self.filter = WhereClause::Where(Where::new(condition.into())?);
        self.commit(ClauseKind::Where)
    }

    pub fn order_by<I>(mut self, orders: I) -> Result<Self>
    where
        I: IntoIterator<Item = SortOrder>,
    {
        self.ensure_settable(ClauseKind::OrderBy)?;
        self.order_by = OrderByClause::OrderBy(OrderBy::new(orders.into_iter().collect())?);
        self.commit(ClauseKind::OrderBy)
    }

    /// Limits the number of rows to an integral expression.
    pub fn limit(mut self, value: impl Into<Expr>) -> Result<Self> {
        self.ensure_settable(ClauseKind::Limit)?;
        self.limit = self.limit.with_static(value.into())?;
        self.commit(ClauseKind::Limit)
    }

    /// Installs a LIMIT whose value is assigned later with [`Statement::set_limit`].
    pub fn dynamic_limit(mut self) -> Result<Self> {
        self.ensure_settable(ClauseKind::Limit)?;
        self.limit = self.limit.with_dynamic();
        self.commit(ClauseKind::Limit)
    }

    /// Assigns a dynamic LIMIT. The statement is left unchanged on error.
    pub fn set_limit(&mut self, value: impl Into<Expr>) -> Result<()> {
        self.limit.set_dynamic(value.into())?;
        self.descriptor = self.compute_descriptor();
        trace!("assigned dynamic LIMIT");
        Ok(())
    }

    pub fn offset(mut self, value: impl Into<Expr>) -> Result<Self> {
        self.ensure_settable(ClauseKind::Offset)?;
        self.offset = self.offset.with_static(value.into())?;
        self.commit(ClauseKind::Offset)
    }

    pub fn dynamic_offset(mut self) -> Result<Self> {
        self.ensure_settable(ClauseKind::Offset)?;
        self.offset = self.offset.with_dynamic();
        self.commit(ClauseKind::Offset)
    }

    /// Assigns a dynamic OFFSET. The statement is left unchanged on error.
    pub fn set_offset(&mut self, value: impl Into<Expr>) -> Result<()> {
        self.offset.set_dynamic(value.into())?;
        self.descriptor = self.compute_descriptor();
        trace!("assigned dynamic OFFSET");
        Ok(())
    }

    /// Combines this statement with `rhs` by `UNION ALL`.
    pub fn union_all(self, rhs: Statement) -> Result<Statement> {
        self.union(UnionFlag::All, rhs)
    }

    /// Combines this statement with `rhs` by `UNION`.
    pub fn union_distinct(self, rhs: Statement) -> Result<Statement> {
        self.union(UnionFlag::Distinct, rhs)
    }

    fn union(self, flag: UnionFlag, rhs: Statement) -> Result<Statement> {
        let union = Union::new(flag, self, rhs)?;
        let mut statement = Statement::new();
        statement.union = UnionClause::Union(Box::new(union));
        statement.commit(ClauseKind::Union)
    }

    /// Uses the statement as a derived table named `alias`.
    pub fn as_(self, alias: &Alias) -> Result<TableAlias> {
        let row = self
            .result_row()
            .ok_or(Malformation::NotASelect("aliased sub-select"))?;
        if row.fields().is_empty() {
            return Err(Inconsistency::NoColumnsSelected.into());
        }
        let columns = row
            .fields()
            .iter()
            .map(|field| ColumnDef {
                name: Name::Owned(field.name().to_string()),
                value_type: field.value_type(),
            })
            .collect();

        Ok(TableAlias::new(
            alias.clone(),
            AliasSource::Select(Box::new(self)),
            columns,
        )?)
    }

    /// Runs the checks of every clause, in registration order.
    pub fn clause_consistency(&self) -> Consistency {
        first_inconsistency(self.clauses().into_iter().map(|clause| clause.consistency()))
    }

    /// The full check: clause checks, then statement-level completeness.
    pub fn consistency(&self) -> Consistency {
        let consistency = self
            .clause_consistency()
            .and_then(|| self.columns_selected())
            .and_then(|| {
                let missing = self.descriptor.required_tables();
                if missing.is_empty() {
                    Consistency::Consistent
                } else {
                    Consistency::Inconsistent(Inconsistency::MissingTables(names(missing)))
                }
            })
            .and_then(|| {
                let missing = self.descriptor.required_ctes();
                if missing.is_empty() {
                    Consistency::Consistent
                } else {
                    Consistency::Inconsistent(Inconsistency::MissingCtes(names(missing)))
                }
            });

        if let Consistency::Inconsistent(reason) = &consistency {
            trace!("statement is inconsistent: {}", reason);
        }
        consistency
    }

    fn columns_selected(&self) -> Consistency {
        if self.is_union() {
            return Consistency::Consistent;
        }
        match self.result_row() {
            Some(row) if !row.fields().is_empty() => Consistency::Consistent,
            _ => Consistency::Inconsistent(Inconsistency::NoColumnsSelected),
        }
    }

    /// Converts the first inconsistency into an error.
    pub fn check(&self) -> Result<()> {
        self.consistency().into_result()?;
        Ok(())
    }

    /// Checks the statement and renders it into `ctx`.
    pub fn render_into(&self, ctx: &mut dyn Context) -> Result<()> {
        self.check()?;
        self.serialize_check(ctx)?;
        self.serialize(ctx);
        Ok(())
    }

    pub fn to_sql(&self, dialect: &DialectConfig) -> Result<RenderedQuery> {
        let mut ctx = SqlContext::new(dialect.clone());
        self.render_into(&mut ctx)?;
        let rendered = ctx.finish();
        debug!(
            "rendered statement for {} with {} parameter(s)",
            dialect.name,
            rendered.parameters.len()
        );
        Ok(rendered)
    }

    /// Renders for a dialect of the process-wide configuration.
    pub fn to_sql_for(&self, dialect: &str) -> Result<RenderedQuery> {
        let dialect = get_config().get_dialect(dialect)?.clone();
        self.to_sql(&dialect)
    }

    /// Renders for the default dialect of the process-wide configuration.
    pub fn to_default_sql(&self) -> Result<RenderedQuery> {
        let dialect = get_config().default_dialect()?.clone();
        self.to_sql(&dialect)
    }
}

impl Fragment for Statement {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        Cow::Borrowed(&self.descriptor)
    }
}

impl Serialize for Statement {
    fn serialize_check(&self, ctx: &dyn Context) -> std::result::Result<(), Unsupported> {
        self.rendered_clauses()
            .into_iter()
            .try_for_each(|clause| clause.serialize_check(ctx))
    }

    fn serialize(&self, ctx: &mut dyn Context) {
        for clause in self.rendered_clauses() {
            clause.serialize(ctx);
        }
    }
}
