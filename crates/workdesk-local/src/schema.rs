//! Table Layout
//!
//! Column types for each table and the conversions between JSON row values
//! and SQLite values.

use rusqlite::types::Value as SqlValue;
use serde_json::{Number, Value};
use workdesk_store::{GatewayError, GatewayResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Bool,
    /// `YYYY-MM-DD`
    Date,
    /// RFC 3339
    Timestamp,
}

#[derive(Debug)]
pub struct TableSchema {
    pub name: &'static str,
    /// Client-visible columns besides `id` and `user_id`
    pub columns: &'static [(&'static str, ColumnKind)],
    /// Set by the server on every write
    pub touched_column: &'static str,
}

pub static TABLES: [TableSchema; 3] = [
    TableSchema {
        name: "tasks",
        columns: &[
            ("title", ColumnKind::Text),
            ("priority", ColumnKind::Text),
            ("completed", ColumnKind::Bool),
            ("status", ColumnKind::Text),
            ("start_date", ColumnKind::Date),
            ("due_date", ColumnKind::Date),
            ("display_order", ColumnKind::Integer),
            ("created_at", ColumnKind::Timestamp),
            ("updated_at", ColumnKind::Timestamp),
        ],
        touched_column: "updated_at",
    },
    TableSchema {
        name: "notes",
        columns: &[
            ("title", ColumnKind::Text),
            ("content", ColumnKind::Text),
            ("display_order", ColumnKind::Integer),
            ("created_at", ColumnKind::Timestamp),
            ("last_edited", ColumnKind::Timestamp),
        ],
        touched_column: "last_edited",
    },
    TableSchema {
        name: "rpa_processes",
        columns: &[
            ("name", ColumnKind::Text),
            ("description", ColumnKind::Text),
            ("status", ColumnKind::Text),
            ("owner", ColumnKind::Text),
            ("department", ColumnKind::Text),
            ("entity_name", ColumnKind::Text),
            ("start_date", ColumnKind::Date),
            ("due_date", ColumnKind::Date),
            ("display_order", ColumnKind::Integer),
            ("created_at", ColumnKind::Timestamp),
            ("last_modified", ColumnKind::Timestamp),
        ],
        touched_column: "last_modified",
    },
];

impl TableSchema {
    pub fn find(table: &str) -> GatewayResult<&'static TableSchema> {
        TABLES
            .iter()
            .find(|t| t.name == table)
            .ok_or_else(|| GatewayError::Rejected(format!("relation \"public.{}\" does not exist", table)))
    }

    /// Schema entry for `column`, rejected if the table has no such column
    pub fn column(&self, column: &str) -> GatewayResult<(&'static str, ColumnKind)> {
        self.columns
            .iter()
            .find(|(name, _)| *name == column)
            .copied()
            .ok_or_else(|| {
                GatewayError::Rejected(format!(
                    "column \"{}\" of relation \"{}\" does not exist",
                    column, self.name
                ))
            })
    }

    /// `id, col1, col2, ...` for SELECT lists
    pub fn select_list(&self) -> String {
        let mut names = vec!["id"];
        names.extend(self.columns.iter().map(|(name, _)| *name));
        names.join(", ")
    }

    /// Read one row (in `select_list` order) back into JSON
    pub fn row_to_json(&self, row: &rusqlite::Row) -> rusqlite::Result<Value> {
        let mut obj = serde_json::Map::new();
        let id: i64 = row.get(0)?;
        obj.insert("id".into(), Value::String(id.to_string()));
        for (index, (name, kind)) in self.columns.iter().enumerate() {
            let value: SqlValue = row.get(index + 1)?;
            obj.insert((*name).into(), sql_to_json(*kind, value));
        }
        Ok(Value::Object(obj))
    }
}

pub fn json_to_sql(schema: &TableSchema, column: &str, kind: ColumnKind, value: &Value) -> GatewayResult<SqlValue> {
    let mismatch = || {
        GatewayError::Rejected(format!(
            "invalid input for column \"{}\" of relation \"{}\": {}",
            column, schema.name, value
        ))
    };
    Ok(match (kind, value) {
        (_, Value::Null) => SqlValue::Null,
        (ColumnKind::Bool, Value::Bool(b)) => SqlValue::Integer(i64::from(*b)),
        (ColumnKind::Integer, Value::Number(n)) => SqlValue::Integer(n.as_i64().ok_or_else(mismatch)?),
        (ColumnKind::Text | ColumnKind::Date | ColumnKind::Timestamp, Value::String(s)) => SqlValue::Text(s.clone()),
        _ => return Err(mismatch()),
    })
}

fn sql_to_json(kind: ColumnKind, value: SqlValue) -> Value {
    match (kind, value) {
        (_, SqlValue::Null) => Value::Null,
        (ColumnKind::Bool, SqlValue::Integer(i)) => Value::Bool(i != 0),
        (_, SqlValue::Integer(i)) => Value::Number(Number::from(i)),
        (_, SqlValue::Real(f)) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        (_, SqlValue::Text(s)) => Value::String(s),
        (_, SqlValue::Blob(_)) => Value::Null,
    }
}
