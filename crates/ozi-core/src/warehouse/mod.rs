//! Warehouse loader (SQLite via sqlx).
//!
//! One table per record kind; each batch is inserted in one transaction.

mod db;
mod insert;


pub use db::{Warehouse, TABLES};
