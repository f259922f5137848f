//! Clauses and the statement composer.
//!
//! Every clause kind lives in its own submodule and follows the same pattern:
//! an enum with an unset `No*` variant that renders nothing and a set variant
//! that carries the clause data and its folded [`crate::descriptor::Descriptor`].
//! Clauses are installed through setters on [`Statement`], never directly.
//!
//! # Overview
//!
//! - [`statement`]: [`Statement`] and the free functions that start one.
//! - [`clause`]: the [`clause::Clause`] trait, clause kinds and dynamic slots.
//! - [`check`]: the result type of consistency checks.
//! - [`select`], [`from`], [`filter`], [`order`], [`limit`], [`union`], [`with`]:
//!   one clause each.
//!
//! # Example
//!
//! ```rust
//! use tessera_query::{columns, define_table, query::statement::select};
//!
//! define_table! {
//!     users {
//!         table: "users",
//!         columns: {
//!             ID: i64 => "id",
//!         }
//!     }
//! }
//!
//! let statement = select(columns![users::ID]).unwrap();
//! // FROM is still missing, so the statement is not complete yet.
//! assert!(statement.check().is_err());
//!
//! let statement = statement.from([users::TABLE]).unwrap();
//! assert!(statement.check().is_ok());
//! ```

pub mod check;
pub mod clause;
pub mod filter;
pub mod from;
pub mod limit;
pub mod order;
pub mod select;
pub mod statement;
pub mod union;
pub mod with;

pub use check::Consistency;
pub use clause::{Clause, ClauseKind};
pub use statement::{dynamic_select, select, with, Statement};
