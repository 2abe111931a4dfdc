//! Warehouse sink via DuckDB
//!
//! Loads collected records into relational tables. DuckDB is the engine for
//! local files and, through its extensions, for attached MySQL and
//! PostgreSQL databases.
//!
//! Tables are never created here; the schema (raw, `dim_` and `fact_` tables)
//! is owned by the warehouse.

mod engine;

pub use engine::{LoadResult, TableColumn, TableInventory, Warehouse};
