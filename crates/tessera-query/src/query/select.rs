//! SELECT clause and result rows.

use std::{borrow::Cow, fmt};

use crate::{
    context::Context,
    descriptor::{Descriptor, Name, Tags, ValueType},
    error::{Inconsistency, Malformation, Unsupported},
    expr::{
        column::{Col, Column},
        value::SqlType,
        Expr,
    },
    query::{
        check::{first_duplicate, Consistency},
        clause::{Clause, ClauseKind},
    },
    serialize::Serialize,
    traits::Fragment,
};

/// A named, typed column of a result row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    name: Name,
    value_type: ValueType,
}

impl Field {
    pub fn new(name: impl Into<Name>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }
}

/// The columns a select statement produces.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultRow {
    fields: Vec<Field>,
    dynamic: bool,
}

impl ResultRow {
    pub fn new(fields: Vec<Field>, dynamic: bool) -> Self {
        Self { fields, dynamic }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Whether columns can still be added after the statement was built.
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Same column names with the same value types, in the same order.
    pub fn shape_matches(&self, other: &ResultRow) -> bool {
        self.fields == other.fields
    }

    /// Columns of the row as seen through the table-like name `table`.
    pub(crate) fn columns_of(&self, table: &Name) -> Vec<Column> {
        self.fields
            .iter()
            .map(|field| Column::new(table.clone(), field.name.clone(), field.value_type))
            .collect()
    }
}

impl fmt::Display for ResultRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", field.name, field.value_type)?;
        }
        write!(f, ")")
    }
}

/// An entry of a select list.
#[derive(Clone, Debug)]
pub struct SelectColumn {
    expr: Expr,
    alias: Option<Name>,
}

impl SelectColumn {
    pub fn new(expr: Expr, alias: Option<Name>) -> Self {
        Self { expr, alias }
    }

    /// The alias if one was given, otherwise the name of a plain column.
    pub fn name(&self) -> Option<&str> {
        match (&self.alias, &self.expr) {
            (Some(alias), _) => Some(alias),
            (None, Expr::Column(column)) => Some(column.name()),
            (None, _) => None,
        }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    fn field(&self) -> Result<Field, Malformation> {
        self.expr.ensure_literal()?;
        let descriptor = self.expr.descriptor();
        let name = self.name().ok_or(Malformation::UnnamedColumn)?;
        if !descriptor.has_tag(Tags::SELECTABLE) {
            return Err(Malformation::NotSelectable(name.to_string()));
        }
        Ok(Field::new(name.to_string(), descriptor.value_type()))
    }
}

impl From<Expr> for SelectColumn {
    fn from(expr: Expr) -> Self {
        Self::new(expr, None)
    }
}

impl From<Column> for SelectColumn {
    fn from(column: Column) -> Self {
        Self::new(Expr::Column(column), None)
    }
}

impl<T: SqlType> From<Col<T>> for SelectColumn {
    fn from(col: Col<T>) -> Self {
        Self::new(col.into(), None)
    }
}

impl Serialize for SelectColumn {
    fn serialize_check(&self, ctx: &dyn Context) -> Result<(), Unsupported> {
        self.expr.serialize_check(ctx)
    }

    fn serialize(&self, ctx: &mut dyn Context) {
        self.expr.serialize(ctx);
        if let Some(alias) = &self.alias {
            ctx.write(" AS ");
            ctx.write_identifier(alias);
        }
    }
}

#[derive(Clone, Debug)]
pub struct Select {
    columns: Vec<SelectColumn>,
    row: ResultRow,
    descriptor: Descriptor,
}

impl Select {
    pub(crate) fn new(columns: Vec<SelectColumn>, dynamic: bool) -> Result<Self, Malformation> {
        let fields = columns
            .iter()
            .map(SelectColumn::field)
            .collect::<Result<Vec<_>, _>>()?;
        let descriptor = select_descriptor(&columns);

        Ok(Self {
            columns,
            row: ResultRow::new(fields, dynamic),
            descriptor,
        })
    }

    /// Appends a column to a dynamic select list.
    pub(crate) fn add(&mut self, column: SelectColumn) -> Result<(), Malformation> {
        if !self.row.dynamic {
            return Err(Malformation::NotDynamic(ClauseKind::Select));
        }
        let field = column.field()?;
        self.columns.push(column);
        self.row.fields.push(field);
        self.descriptor = select_descriptor(&self.columns);
        Ok(())
    }

    pub fn columns(&self) -> &[SelectColumn] {
        &self.columns
    }

    pub fn row(&self) -> &ResultRow {
        &self.row
    }
}

fn select_descriptor(columns: &[SelectColumn]) -> Descriptor {
    let children: Vec<_> = columns.iter().map(|column| column.expr.descriptor()).collect();
    Descriptor::new(ValueType::None, Tags::empty()).with_children(children.iter().map(|d| &**d))
}

#[derive(Clone, Debug, Default)]
pub enum SelectClause {
    #[default]
    NoSelect,
    Select(Select),
}

impl SelectClause {
    pub fn get(&self) -> Option<&Select> {
        match self {
            SelectClause::NoSelect => None,
            SelectClause::Select(select) => Some(select),
        }
    }
}

impl Fragment for SelectClause {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        match self {
            SelectClause::NoSelect => Cow::Owned(Descriptor::noop()),
            SelectClause::Select(select) => Cow::Borrowed(&select.descriptor),
        }
    }
}

impl Clause for SelectClause {
    fn kind(&self) -> ClauseKind {
        ClauseKind::Select
    }

    fn consistency(&self) -> Consistency {
        let SelectClause::Select(select) = self else {
            return Consistency::Consistent;
        };
        if select.columns.is_empty() && !select.row.dynamic {
            return Consistency::Inconsistent(Inconsistency::NoColumnsSelected);
        }
        match first_duplicate(select.row.fields.iter().map(Field::name)) {
            Some(name) => Consistency::Inconsistent(Inconsistency::DuplicateColumn(name.to_string())),
            None => Consistency::Consistent,
        }
    }
}

impl Serialize for SelectClause {
    fn serialize_check(&self, ctx: &dyn Context) -> Result<(), Unsupported> {
        match self {
            SelectClause::NoSelect => Ok(()),
            SelectClause::Select(select) => crate::serialize::check_all(&select.columns, ctx),
        }
    }

    fn serialize(&self, ctx: &mut dyn Context) {
        if let SelectClause::Select(select) = self {
            ctx.write("SELECT ");
            crate::serialize::serialize_list(&select.columns, ", ", ctx);
        }
    }
}
