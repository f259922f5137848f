//! Macros for declaring tables.
//!
//! The [`define_table!`] macro generates typed column constants for a table,
//! tying column names to Rust types, next to a `const` [`crate::table::Table`].

/// Defines a module with typed column constants for a table.
///
/// # Syntax
///
/// ```ignore
/// define_table! {
///     users {
///         table: "users",
///         columns: {
///             ID: i64 => "id",
///             NAME: String => "name"
///         }
///     }
/// }
/// ```
///
/// This expands to:
///
/// ```ignore
/// pub mod users {
///     pub const ID: Col<i64> = Col::new("users", "id");
///     pub const NAME: Col<String> = Col::new("users", "name");
///
///     pub const COLUMNS: &[ColumnDef] = &[
///         ColumnDef::new("id", ValueType::Integral),
///         ColumnDef::new("name", ValueType::Text),
///     ];
///     pub const TABLE: Table = Table::new("users", COLUMNS);
/// }
/// ```
///
/// # Usage
///
/// ```rust
/// use tessera_query::{columns, define_table, select, traits::Expression as _};
///
/// define_table! {
///     users {
///         table: "users",
///         columns: {
///             ID: i64 => "id",
///             EMAIL: Option<String> => "email",
///         }
///     }
/// }
///
/// let statement = select(columns![users::ID])
///     .unwrap()
///     .from([users::TABLE])
///     .unwrap()
///     .where_(users::EMAIL.is_not_null().unwrap())
///     .unwrap();
/// assert!(statement.check().is_ok());
/// ```
#[macro_export]
macro_rules! define_table {
    (
        $table_mod:ident {
            table: $table:literal,
            columns: {
                $($col_name:ident: $col_type:ty => $db_col:literal),* $(,)?
            }
        }
    ) => {
        pub mod $table_mod {
            use $crate::{
                expr::{column::Col, value::SqlType},
                table::{ColumnDef, Table},
            };

            $(
                pub const $col_name: Col<$col_type> = Col::new($table, $db_col);
            )*

            pub const COLUMNS: &[ColumnDef] = &[
                $(ColumnDef::new($db_col, <$col_type as SqlType>::VALUE_TYPE)),*
            ];

            pub const TABLE: Table = Table::new($table, COLUMNS);
        }
    };
}

/// Builds a select list from columns of different types.
///
/// ```rust
/// use tessera_query::{columns, define_table, traits::Expression as _};
///
/// define_table! {
///     users {
///         table: "users",
///         columns: {
///             ID: i64 => "id",
///             NAME: String => "name",
///         }
///     }
/// }
///
/// let list = columns![users::ID, users::NAME.as_("user_name")];
/// assert_eq!(list[1].name(), Some("user_name"));
/// ```
#[macro_export]
macro_rules! columns {
    ($($col:expr),* $(,)?) => {
        vec![$($crate::query::select::SelectColumn::from($col)),*]
    };
}
