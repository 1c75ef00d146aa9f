use crate::constants::SCHEMA_COLUMNS;
use crate::table::Table;

/// Restrict and reorder to the twelve report columns, creating missing ones empty.
///
/// Idempotent: `enforce_schema(&enforce_schema(t)) == enforce_schema(t)`.
pub fn enforce_schema(table: &Table) -> Table {
    table.select(&SCHEMA_COLUMNS)
}
