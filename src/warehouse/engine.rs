//! DuckDB-based warehouse loader
//!
//! Writes collected records into existing warehouse tables. A local DuckDB
//! file is opened directly; MySQL and PostgreSQL are attached through the
//! DuckDB extensions and made the default catalog with `USE`.

use crate::config::{TableMapping, WarehouseConfig, WarehouseEngine};
use crate::error::{Error, Result};
use crate::types::{value_text, Record};
use chrono::NaiveDate;
use duckdb::{params_from_iter, Connection};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Catalog alias of an attached MySQL/PostgreSQL database
const ATTACHED_CATALOG: &str = "warehouse";

/// Warehouse connection
pub struct Warehouse {
    /// DuckDB connection
    conn: Connection,
    /// Backend type
    engine: WarehouseEngine,
    /// Prefix of raw tables
    raw_prefix: String,
}

/// One column of a warehouse table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableColumn {
    pub name: String,
    pub data_type: String,
}

/// Result of loading records into one table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadResult {
    /// Target table
    pub table: String,
    /// Rows inserted
    pub inserted: usize,
    /// Records skipped (missing required fields or duplicate keys)
    pub skipped: usize,
    /// Record fields with no matching column
    pub ignored_fields: Vec<String>,
}

/// Warehouse tables grouped by naming convention
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableInventory {
    pub dimension: Vec<String>,
    pub fact: Vec<String>,
    pub raw: Vec<String>,
    pub other: Vec<String>,
}

impl TableInventory {
    /// Total number of tables
    pub fn len(&self) -> usize {
        self.dimension.len() + self.fact.len() + self.raw.len() + self.other.len()
    }

    /// Whether the warehouse has no tables
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Warehouse {
    /// Open the warehouse described by `config`
    pub fn open(config: &WarehouseConfig) -> Result<Self> {
        let conn = match config.engine {
            WarehouseEngine::DuckDb if config.database != ":memory:" => {
                Connection::open(&config.database).map_err(|e| {
                    Error::warehouse(format!(
                        "Failed to open DuckDB database '{}': {e}",
                        config.database
                    ))
                })?
            }
            _ => Connection::open_in_memory()
                .map_err(|e| Error::warehouse(format!("Failed to create DuckDB connection: {e}")))?,
        };

        let warehouse = Self {
            conn,
            engine: config.engine,
            raw_prefix: config.raw_table_prefix.clone(),
        };
        warehouse.attach(&config.database)?;

        debug!(engine = %config.engine, "warehouse opened");
        Ok(warehouse)
    }

    /// In-memory DuckDB warehouse with the default raw prefix
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::warehouse(format!("Failed to create DuckDB connection: {e}")))?;
        Ok(Self {
            conn,
            engine: WarehouseEngine::DuckDb,
            raw_prefix: "raw_".to_string(),
        })
    }

    /// Attach an external database and make it the default catalog
    fn attach(&self, connection_string: &str) -> Result<()> {
        let (extension, db_type) = match self.engine {
            WarehouseEngine::DuckDb => return Ok(()),
            WarehouseEngine::MySql => ("mysql", "MYSQL"),
            WarehouseEngine::Postgres => ("postgres", "POSTGRES"),
        };

        self.conn
            .execute_batch(&format!("INSTALL {extension}; LOAD {extension};"))
            .map_err(|e| Error::warehouse(format!("Failed to load {extension} extension: {e}")))?;

        let attach_sql = format!(
            "ATTACH '{}' AS {ATTACHED_CATALOG} (TYPE {db_type}); USE {ATTACHED_CATALOG};",
            connection_string.replace('\'', "''")
        );
        self.conn
            .execute_batch(&attach_sql)
            .map_err(|e| Error::warehouse(format!("Failed to attach {db_type} database: {e}")))?;

        Ok(())
    }

    /// Backend type
    pub fn engine(&self) -> WarehouseEngine {
        self.engine
    }

    /// Run raw SQL statements (schema setup, maintenance)
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Test the connection
    pub fn check_connection(&self) -> Result<()> {
        self.conn
            .query_row("SELECT 1", [], |row| row.get::<_, i32>(0))
            .map_err(|e| Error::warehouse(format!("Connection check failed: {e}")))?;
        Ok(())
    }

    /// Tables of the current catalog, sorted by name
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT table_name
             FROM information_schema.tables
             WHERE table_catalog = current_database()
             ORDER BY table_name",
        )?;

        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tables)
    }

    /// Tables grouped into dimension (`dim_`), fact (`fact_`), raw and other
    pub fn table_inventory(&self) -> Result<TableInventory> {
        let mut inventory = TableInventory::default();
        for table in self.list_tables()? {
            if table.starts_with("dim_") {
                inventory.dimension.push(table);
            } else if table.starts_with("fact_") {
                inventory.fact.push(table);
            } else if table.starts_with(&self.raw_prefix) {
                inventory.raw.push(table);
            } else {
                inventory.other.push(table);
            }
        }
        Ok(inventory)
    }

    /// Columns of `table` in declaration order; empty if the table is absent
    pub fn table_columns(&self, table: &str) -> Result<Vec<TableColumn>> {
        let mut stmt = self.conn.prepare(
            "SELECT column_name, data_type
             FROM information_schema.columns
             WHERE table_catalog = current_database() AND table_name = ?
             ORDER BY ordinal_position",
        )?;

        let mut seen = BTreeSet::new();
        let columns = stmt
            .query_map([table], |row| {
                Ok(TableColumn {
                    name: row.get(0)?,
                    data_type: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?
            .into_iter()
            .filter(|c| seen.insert(c.name.clone()))
            .collect();
        Ok(columns)
    }

    /// Number of rows in `table`
    pub fn row_count(&self, table: &str) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    /// Name of the raw table for an endpoint
    pub fn raw_table(&self, api_name: &str) -> String {
        format!("{}{api_name}", self.raw_prefix)
    }

    /// Insert records into `<prefix><api_name>`.
    ///
    /// Record fields are matched to the table's existing columns (exact name
    /// first, then ASCII case-insensitive). Fields without a column are
    /// skipped; each value is cast to its column type, unparseable values
    /// become NULL.
    pub fn load_raw(&mut self, api_name: &str, records: &[Record]) -> Result<LoadResult> {
        let plan = self.raw_plan(api_name, records)?;
        let tx = self.conn.transaction()?;
        let load = plan.execute(&tx, records)?;
        tx.commit()?;
        Ok(load)
    }

    /// Insert the projection described by `mapping` into its target table
    pub fn load_mapping(&mut self, mapping: &TableMapping, records: &[Record]) -> Result<LoadResult> {
        let plan = self.mapping_plan(mapping)?;
        let tx = self.conn.transaction()?;
        let load = plan.execute(&tx, records)?;
        tx.commit()?;
        Ok(load)
    }

    /// Raw load (when enabled) followed by every mapping fed by `api_name`.
    ///
    /// All inserts share one transaction: if any table fails, nothing from
    /// this endpoint is committed.
    pub fn load_endpoint(
        &mut self,
        api_name: &str,
        records: &[Record],
        config: &WarehouseConfig,
    ) -> Result<Vec<LoadResult>> {
        let mut plans = Vec::new();
        if config.load_raw {
            plans.push(self.raw_plan(api_name, records)?);
        }
        for mapping in config.mappings_for(api_name) {
            plans.push(self.mapping_plan(mapping)?);
        }
        if plans.is_empty() {
            return Ok(Vec::new());
        }
        self.execute_plans(&plans, records)
    }

    fn raw_plan(&self, api_name: &str, records: &[Record]) -> Result<InsertPlan> {
        let table = self.raw_table(api_name);
        let columns = self.require_table(&table)?;

        let mut fields: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !fields.contains(key) {
                    fields.push(key.clone());
                }
            }
        }

        let mut targets: Vec<(String, TableColumn)> = Vec::new();
        let mut ignored_fields = Vec::new();
        for field in fields {
            match find_column(&columns, &field) {
                Some(column) => targets.push((field, column.clone())),
                None => ignored_fields.push(field),
            }
        }

        if !ignored_fields.is_empty() {
            warn!(
                table = %table,
                fields = ?ignored_fields,
                "record fields without a matching column were skipped"
            );
        }
        if targets.is_empty() && !records.is_empty() {
            return Err(Error::warehouse(format!(
                "No record field matches a column of '{table}'"
            )));
        }

        Ok(InsertPlan::new(table, targets, false, false, ignored_fields))
    }

    fn mapping_plan(&self, mapping: &TableMapping) -> Result<InsertPlan> {
        let columns = self.require_table(&mapping.table)?;

        let mut targets: Vec<(String, TableColumn)> = Vec::new();
        for pair in &mapping.columns {
            let column = find_column(&columns, &pair.target).ok_or_else(|| {
                Error::warehouse(format!(
                    "Table '{}' has no column '{}'",
                    mapping.table, pair.target
                ))
            })?;
            targets.push((pair.source.clone(), column.clone()));
        }

        Ok(InsertPlan::new(
            mapping.table.clone(),
            targets,
            mapping.ignore_duplicates,
            mapping.require_all,
            Vec::new(),
        ))
    }

    /// Run `plans` in order inside one transaction
    fn execute_plans(&mut self, plans: &[InsertPlan], records: &[Record]) -> Result<Vec<LoadResult>> {
        let tx = self.conn.transaction()?;
        let loads = plans
            .iter()
            .map(|plan| plan.execute(&tx, records))
            .collect::<Result<Vec<_>>>()?;
        tx.commit()?;
        Ok(loads)
    }

    fn require_table(&self, table: &str) -> Result<Vec<TableColumn>> {
        let columns = self.table_columns(table)?;
        if columns.is_empty() {
            return Err(Error::warehouse(format!("Table '{table}' does not exist")));
        }
        Ok(columns)
    }
}

/// Insert statement for one target table
struct InsertPlan {
    table: String,
    sql: String,
    /// Record field and target column, in statement order
    targets: Vec<(String, TableColumn)>,
    /// Skip records missing any mapped field
    require_all: bool,
    ignored_fields: Vec<String>,
}

impl InsertPlan {
    fn new(
        table: String,
        targets: Vec<(String, TableColumn)>,
        or_ignore: bool,
        require_all: bool,
        ignored_fields: Vec<String>,
    ) -> Self {
        let columns: Vec<&TableColumn> = targets.iter().map(|(_, c)| c).collect();
        let sql = insert_sql(&table, &columns, or_ignore);
        Self {
            table,
            sql,
            targets,
            require_all,
            ignored_fields,
        }
    }

    fn execute(&self, conn: &Connection, records: &[Record]) -> Result<LoadResult> {
        let mut result = LoadResult {
            table: self.table.clone(),
            ignored_fields: self.ignored_fields.clone(),
            ..LoadResult::default()
        };
        if self.targets.is_empty() {
            return Ok(result);
        }

        let mut stmt = conn.prepare(&self.sql)?;
        for record in records {
            if self.require_all
                && self
                    .targets
                    .iter()
                    .any(|(field, _)| record.get(field).and_then(value_text).is_none())
            {
                result.skipped += 1;
                continue;
            }

            let values = self
                .targets
                .iter()
                .map(|(field, column)| cell(record, field, column));
            match stmt.execute(params_from_iter(values))? {
                0 => result.skipped += 1,
                n => result.inserted += n,
            }
        }

        debug!(
            table = %self.table,
            inserted = result.inserted,
            skipped = result.skipped,
            "loaded records"
        );
        Ok(result)
    }
}

/// Quote an SQL identifier
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn find_column<'a>(columns: &'a [TableColumn], name: &str) -> Option<&'a TableColumn> {
    columns
        .iter()
        .find(|c| c.name == name)
        .or_else(|| columns.iter().find(|c| c.name.eq_ignore_ascii_case(name)))
}

fn insert_sql(table: &str, columns: &[&TableColumn], or_ignore: bool) -> String {
    let names: Vec<String> = columns.iter().map(|c| quote_ident(&c.name)).collect();
    let values: Vec<String> = columns
        .iter()
        .map(|c| format!("TRY_CAST(CAST(? AS VARCHAR) AS {})", c.data_type))
        .collect();

    format!(
        "INSERT {}INTO {} ({}) VALUES ({})",
        if or_ignore { "OR IGNORE " } else { "" },
        quote_ident(table),
        names.join(", "),
        values.join(", ")
    )
}

/// Text bound for one cell; compact dates are rewritten for DATE columns
fn cell(record: &Record, field: &str, column: &TableColumn) -> Option<String> {
    let text = record.get(field).and_then(value_text)?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if column.data_type.eq_ignore_ascii_case("DATE") {
        if let Some(date) = parse_compact_date(trimmed) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    Some(trimmed.to_string())
}

/// `YYYYMMDD`, or `YYYYMM` as the first of the month
fn parse_compact_date(value: &str) -> Option<NaiveDate> {
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match value.len() {
        8 => NaiveDate::parse_from_str(value, "%Y%m%d").ok(),
        6 => NaiveDate::parse_from_str(&format!("{value}01"), "%Y%m%d").ok(),
        _ => None,
    }
}
