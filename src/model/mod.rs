//! Structural model of the inspected tables.
//!
//! These types are the output of an assembly run: one [`Table`] per target
//! table, in target order, each carrying its columns, primary key, unique
//! indexes, outgoing foreign-key references and the elected main unique
//! index.

mod table;

pub use table::{Reference, Table, UniqueIndex};
