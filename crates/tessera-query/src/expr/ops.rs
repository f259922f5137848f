//! SQL expression operators.
//!
//! These structs represent compound expressions like `a = b`, `a IN(...)`, etc.
//! Each one validates its operands when it is built and folds their
//! descriptors into its own.

use std::{borrow::Cow, fmt};

use crate::{
    context::Context,
    descriptor::{Descriptor, Tags, ValueType},
    error::{Malformation, Result, Unsupported},
    expr::Expr,
    serialize::Serialize,
    traits::Fragment,
};

fn ensure_expression(descriptor: &Descriptor) -> std::result::Result<(), Malformation> {
    if descriptor.has_tag(Tags::EXPRESSION) {
        Ok(())
    } else {
        Err(Malformation::NotAnExpression)
    }
}

fn ensure_boolean(descriptor: &Descriptor) -> std::result::Result<(), Malformation> {
    ensure_expression(descriptor)?;
    match descriptor.value_type() {
        ValueType::Boolean | ValueType::None => Ok(()),
        other => Err(Malformation::NotBoolean(other)),
    }
}

fn ensure_text(descriptor: &Descriptor) -> std::result::Result<(), Malformation> {
    match descriptor.value_type() {
        ValueType::Text | ValueType::None => Ok(()),
        other => Err(Malformation::NotText(other)),
    }
}

fn ensure_compatible(
    expected: ValueType,
    found: ValueType,
) -> std::result::Result<(), Malformation> {
    if expected.is_compatible_with(found) {
        Ok(())
    } else {
        Err(Malformation::TypeMismatch { expected, found })
    }
}

fn boolean_descriptor<'a, I>(children: I) -> Descriptor
where
    I: IntoIterator<Item = &'a Descriptor>,
{
    Descriptor::new(ValueType::Boolean, Tags::EXPRESSION | Tags::SELECTABLE).with_children(children)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
    Like,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Gte => ">=",
            CompareOp::Lte => "<=",
            CompareOp::Like => "LIKE",
        };
        f.write_str(op)
    }
}

/// Represents a binary comparison (e.g., `=`, `>`, `LIKE`).
#[derive(Clone, Debug)]
pub struct Comparison {
    lhs: Expr,
    op: CompareOp,
    rhs: Expr,
    descriptor: Descriptor,
}

impl Comparison {
    pub fn new(lhs: Expr, op: CompareOp, rhs: Expr) -> std::result::Result<Self, Malformation> {
        lhs.ensure_literal()?;
        rhs.ensure_literal()?;
        let descriptor = {
            let left = lhs.descriptor();
            let right = rhs.descriptor();
            ensure_expression(&left)?;
            ensure_expression(&right)?;
            if op == CompareOp::Like {
                ensure_text(&left)?;
                ensure_text(&right)?;
            } else {
                ensure_compatible(left.value_type(), right.value_type())?;
            }
            boolean_descriptor([&*left, &*right])
        };

        Ok(Self {
            lhs,
            op,
            rhs,
            descriptor,
        })
    }
}

impl Fragment for Comparison {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        Cow::Borrowed(&self.descriptor)
    }
}

impl Serialize for Comparison {
    fn serialize_check(&self, ctx: &dyn Context) -> std::result::Result<(), Unsupported> {
        self.lhs.serialize_check(ctx)?;
        self.rhs.serialize_check(ctx)
    }

    fn serialize(&self, ctx: &mut dyn Context) {
        self.lhs.serialize_operand(ctx);
        ctx.write(&format!(" {} ", self.op));
        self.rhs.serialize_operand(ctx);
    }
}

impl From<Comparison> for Expr {
    fn from(op: Comparison) -> Self {
        Expr::Compare(Box::new(op))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// Combines two boolean expressions with `AND` or `OR`.
#[derive(Clone, Debug)]
pub struct Logical {
    lhs: Expr,
    op: LogicalOp,
    rhs: Expr,
    descriptor: Descriptor,
}

impl Logical {
    pub fn new(lhs: Expr, op: LogicalOp, rhs: Expr) -> std::result::Result<Self, Malformation> {
        let descriptor = {
            let left = lhs.descriptor();
            let right = rhs.descriptor();
            ensure_boolean(&left)?;
            ensure_boolean(&right)?;
            boolean_descriptor([&*left, &*right])
        };

        Ok(Self {
            lhs,
            op,
            rhs,
            descriptor,
        })
    }
}

impl Fragment for Logical {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        Cow::Borrowed(&self.descriptor)
    }
}

impl Serialize for Logical {
    fn serialize_check(&self, ctx: &dyn Context) -> std::result::Result<(), Unsupported> {
        self.lhs.serialize_check(ctx)?;
        self.rhs.serialize_check(ctx)
    }

    fn serialize(&self, ctx: &mut dyn Context) {
        ctx.write("(");
        self.lhs.serialize(ctx);
        ctx.write(match self.op {
            LogicalOp::And => " AND ",
            LogicalOp::Or => " OR ",
        });
        self.rhs.serialize(ctx);
        ctx.write(")");
    }
}

impl From<Logical> for Expr {
    fn from(op: Logical) -> Self {
        Expr::Logical(Box::new(op))
    }
}

/// Negation of a boolean expression.
#[derive(Clone, Debug)]
pub struct Not {
    operand: Expr,
    descriptor: Descriptor,
}

impl Not {
    pub fn new(operand: Expr) -> std::result::Result<Self, Malformation> {
        let descriptor = {
            let inner = operand.descriptor();
            ensure_boolean(&inner)?;
            boolean_descriptor([&*inner])
        };

        Ok(Self {
            operand,
            descriptor,
        })
    }
}

/// Creates a SQL `NOT` of a boolean expression.
pub fn not(operand: impl Into<Expr>) -> Result<Expr> {
    Ok(Not::new(operand.into())?.into())
}

impl Fragment for Not {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        Cow::Borrowed(&self.descriptor)
    }
}

impl Serialize for Not {
    fn serialize_check(&self, ctx: &dyn Context) -> std::result::Result<(), Unsupported> {
        self.operand.serialize_check(ctx)
    }

    fn serialize(&self, ctx: &mut dyn Context) {
        if matches!(self.operand, Expr::Logical(_)) {
            ctx.write("NOT ");
            self.operand.serialize(ctx);
        } else {
            ctx.write("NOT (");
            self.operand.serialize(ctx);
            ctx.write(")");
        }
    }
}

impl From<Not> for Expr {
    fn from(op: Not) -> Self {
        Expr::Not(Box::new(op))
    }
}

/// Represents an `IS NULL` or `IS NOT NULL` check.
#[derive(Clone, Debug)]
pub struct NullCheck {
    operand: Expr,
    is_null: bool,
    descriptor: Descriptor,
}

impl NullCheck {
    pub fn new(operand: Expr, is_null: bool) -> std::result::Result<Self, Malformation> {
        operand.ensure_literal()?;
        let descriptor = {
            let inner = operand.descriptor();
            ensure_expression(&inner)?;
            boolean_descriptor([&*inner])
        };

        Ok(Self {
            operand,
            is_null,
            descriptor,
        })
    }
}

impl Fragment for NullCheck {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        Cow::Borrowed(&self.descriptor)
    }
}

impl Serialize for NullCheck {
    fn serialize_check(&self, ctx: &dyn Context) -> std::result::Result<(), Unsupported> {
        self.operand.serialize_check(ctx)
    }

    fn serialize(&self, ctx: &mut dyn Context) {
        self.operand.serialize_operand(ctx);
        ctx.write(if self.is_null {
            " IS NULL"
        } else {
            " IS NOT NULL"
        });
    }
}

impl From<NullCheck> for Expr {
    fn from(op: NullCheck) -> Self {
        Expr::NullCheck(Box::new(op))
    }
}

/// Represents an `IN` or `NOT IN` predicate over a non-empty argument list.
#[derive(Clone, Debug)]
pub struct InPredicate {
    operand: Expr,
    args: Vec<Expr>,
    negated: bool,
    descriptor: Descriptor,
}

impl InPredicate {
    pub fn new(
        operand: Expr,
        args: Vec<Expr>,
        negated: bool,
    ) -> std::result::Result<Self, Malformation> {
        if args.is_empty() {
            return Err(Malformation::EmptyIn);
        }
        operand.ensure_literal()?;
        args.iter().try_for_each(Expr::ensure_literal)?;

        let descriptor = {
            let inner = operand.descriptor();
            ensure_expression(&inner)?;
            let arg_descriptors: Vec<_> = args.iter().map(Fragment::descriptor).collect();
            for arg in &arg_descriptors {
                ensure_expression(arg)?;
                ensure_compatible(inner.value_type(), arg.value_type())?;
            }
            boolean_descriptor(
                std::iter::once(&*inner).chain(arg_descriptors.iter().map(|arg| &**arg)),
            )
        };

        Ok(Self {
            operand,
            args,
            negated,
            descriptor,
        })
    }

    pub fn args(&self) -> &[Expr] {
        &self.args
    }
}

impl Fragment for InPredicate {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        Cow::Borrowed(&self.descriptor)
    }
}

impl Serialize for InPredicate {
    fn serialize_check(&self, ctx: &dyn Context) -> std::result::Result<(), Unsupported> {
        self.operand.serialize_check(ctx)?;
        self.args.iter().try_for_each(|arg| arg.serialize_check(ctx))
    }

    fn serialize(&self, ctx: &mut dyn Context) {
        self.operand.serialize_operand(ctx);
        ctx.write(if self.negated { " NOT IN(" } else { " IN(" });
        match self.args.as_slice() {
            [Expr::Subquery(statement)] => statement.serialize(ctx),
            args => {
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        ctx.write(",");
                    }
                    arg.serialize_operand(ctx);
                }
            }
        }
        ctx.write(")");
    }
}

impl From<InPredicate> for Expr {
    fn from(op: InPredicate) -> Self {
        Expr::In(Box::new(op))
    }
}
