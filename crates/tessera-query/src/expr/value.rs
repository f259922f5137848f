//! Literal values, bound parameters and the Rust-to-SQL type mapping.

use std::borrow::Cow;

use crate::{
    context::Context,
    descriptor::{Descriptor, Name, Tags, ValueType},
    error::Malformation,
    serialize::Serialize,
    traits::Fragment,
};

/// Maps a Rust type to the SQL value type of a column holding it.
pub trait SqlType {
    const VALUE_TYPE: ValueType;
}

macro_rules! impl_sql_type {
    ($value_type:ident: $($ty:ty),+) => {
        $(
            impl SqlType for $ty {
                const VALUE_TYPE: ValueType = ValueType::$value_type;
            }
        )+
    };
}

impl_sql_type!(Boolean: bool);
impl_sql_type!(Integral: i8, i16, i32, i64, u8, u16, u32, u64, usize);
impl_sql_type!(FloatingPoint: f32, f64);
impl_sql_type!(Text: String, &str);

impl<T: SqlType> SqlType for Option<T> {
    const VALUE_TYPE: ValueType = T::VALUE_TYPE;
}

/// A literal that is rendered inline.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::None,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Integer(_) => ValueType::Integral,
            Value::Float(_) => ValueType::FloatingPoint,
            Value::Text(_) => ValueType::Text,
        }
    }

    /// Fails for values that have no SQL literal, such as NaN.
    pub(crate) fn ensure_literal(&self) -> Result<(), Malformation> {
        match self {
            Value::Float(value) if !value.is_finite() => {
                Err(Malformation::NonFiniteFloat(*value))
            }
            _ => Ok(()),
        }
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Integer(i64::from(value))
                }
            }
        )+
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl Fragment for Value {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        Cow::Owned(Descriptor::new(
            self.value_type(),
            Tags::EXPRESSION | Tags::SELECTABLE,
        ))
    }
}

impl Serialize for Value {
    fn serialize(&self, ctx: &mut dyn Context) {
        match self {
            Value::Null => ctx.write("NULL"),
            Value::Boolean(true) => ctx.write("TRUE"),
            Value::Boolean(false) => ctx.write("FALSE"),
            Value::Integer(n) => ctx.write(&n.to_string()),
            Value::Float(f) => ctx.write(&format_float(*f)),
            Value::Text(s) => ctx.write(&tessera_utils::string::escape_string_literal(s)),
        }
    }
}

/// Keeps a decimal point so the literal stays a floating point value.
fn format_float(value: f64) -> String {
    let rendered = value.to_string();
    if !rendered.contains(['.', 'e', 'E']) {
        format!("{rendered}.0")
    } else {
        rendered
    }
}

/// A named placeholder whose value is supplied when the statement is executed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Parameter {
    name: Name,
    value_type: ValueType,
}

impl Parameter {
    pub fn new(name: impl Into<Name>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }

    /// Creates a parameter typed after the Rust type `T`.
    pub fn of<T: SqlType>(name: impl Into<Name>) -> Self {
        Self::new(name, T::VALUE_TYPE)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }
}

impl Fragment for Parameter {
    fn descriptor(&self) -> Cow<'_, Descriptor> {
        Cow::Owned(
            Descriptor::new(
                self.value_type,
                Tags::EXPRESSION | Tags::SELECTABLE | Tags::PARAMETER,
            )
            .with_parameter(self.clone()),
        )
    }
}

impl Serialize for Parameter {
    fn serialize(&self, ctx: &mut dyn Context) {
        ctx.write_parameter(self);
    }
}
