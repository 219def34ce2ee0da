//! Local Table Gateway
//!
//! `TableGateway` over SQLite. Rows are scoped to their owner, ids are
//! assigned by the database and handed out as strings, and the created/touched
//! timestamps are stamped here the way the hosted backend's defaults do.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use serde_json::Value;
use workdesk_store::gateway::OrderUpdate;
use workdesk_store::{GatewayError, GatewayResult, TableGateway};

use crate::db::LocalDb;
use crate::schema::{json_to_sql, TableSchema};

fn sql_error(e: rusqlite::Error) -> GatewayError {
    GatewayError::Rejected(e.to_string())
}

/// Database ids are integers; anything else cannot match a row
fn parse_id(id: &str) -> GatewayResult<i64> {
    id.parse()
        .map_err(|_| GatewayError::Rejected(format!("invalid input syntax for type bigint: \"{}\"", id)))
}

/// Columns and values of a JSON object, checked against the table
fn columns_of(schema: &TableSchema, row: &Value) -> GatewayResult<Vec<(&'static str, SqlValue)>> {
    let obj = row
        .as_object()
        .ok_or_else(|| GatewayError::Rejected(format!("expected a JSON object for {}", schema.name)))?;
    let mut columns = Vec::with_capacity(obj.len());
    for (key, value) in obj {
        if key == "id" || key == "user_id" {
            continue;
        }
        let (name, kind) = schema.column(key)?;
        columns.push((name, json_to_sql(schema, key, kind, value)?));
    }
    Ok(columns)
}

fn fetch_one(conn: &Connection, schema: &TableSchema, owner: &str, id: i64) -> GatewayResult<Option<Value>> {
    let query = format!(
        "SELECT {} FROM {} WHERE id = ?1 AND user_id = ?2",
        schema.select_list(),
        schema.name
    );
    let mut stmt = conn.prepare(&query).map_err(sql_error)?;
    stmt.query_row(rusqlite::params![id, owner], |row| schema.row_to_json(row))
        .optional()
        .map_err(sql_error)
}

pub struct LocalGateway {
    db: LocalDb,
}

impl LocalGateway {
    pub fn new(db: LocalDb) -> Self {
        Self { db }
    }
}

#[async_trait(?Send)]
impl TableGateway for LocalGateway {
    async fn select(&self, table: &str, owner: &str) -> GatewayResult<Vec<Value>> {
        let schema = TableSchema::find(table)?;
        let conn = self.db.conn.lock().await;

        let query = format!(
            "SELECT {} FROM {} WHERE user_id = ?1 ORDER BY display_order ASC, id ASC",
            schema.select_list(),
            schema.name
        );
        let mut stmt = conn.prepare(&query).map_err(sql_error)?;
        let mut rows = stmt.query([owner]).map_err(sql_error)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(sql_error)? {
            out.push(schema.row_to_json(row).map_err(sql_error)?);
        }
        Ok(out)
    }

    async fn insert(&self, table: &str, owner: &str, row: Value) -> GatewayResult<Value> {
        let schema = TableSchema::find(table)?;
        let mut columns = columns_of(schema, &row)?;
        let now = SqlValue::Text(Utc::now().to_rfc3339());
        columns.retain(|(name, _)| *name != "created_at" && *name != schema.touched_column);
        columns.push(("created_at", now.clone()));
        columns.push((schema.touched_column, now));

        let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
        let placeholders: Vec<String> = (2..=columns.len() + 1).map(|i| format!("?{}", i)).collect();
        let query = format!(
            "INSERT INTO {} (user_id, {}) VALUES (?1, {})",
            schema.name,
            names.join(", "),
            placeholders.join(", ")
        );
        let mut values = vec![SqlValue::Text(owner.to_string())];
        values.extend(columns.into_iter().map(|(_, value)| value));

        let conn = self.db.conn.lock().await;
        conn.execute(&query, params_from_iter(values)).map_err(sql_error)?;
        let id = conn.last_insert_rowid();
        log::debug!("inserted {} {}", schema.name, id);

        fetch_one(&conn, schema, owner, id)?.ok_or_else(|| GatewayError::NoRows {
            table: table.to_string(),
            id: id.to_string(),
        })
    }

    async fn update(&self, table: &str, owner: &str, id: &str, patch: Value) -> GatewayResult<Value> {
        let schema = TableSchema::find(table)?;
        let row_id = parse_id(id)?;
        let mut columns = columns_of(schema, &patch)?;
        if !columns.iter().any(|(name, _)| *name == schema.touched_column) {
            columns.push((schema.touched_column, SqlValue::Text(Utc::now().to_rfc3339())));
        }

        let assignments: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, (name, _))| format!("{} = ?{}", name, i + 3))
            .collect();
        let query = format!(
            "UPDATE {} SET {} WHERE id = ?1 AND user_id = ?2",
            schema.name,
            assignments.join(", ")
        );
        let mut values = vec![SqlValue::Integer(row_id), SqlValue::Text(owner.to_string())];
        values.extend(columns.into_iter().map(|(_, value)| value));

        let conn = self.db.conn.lock().await;
        let changed = conn.execute(&query, params_from_iter(values)).map_err(sql_error)?;
        if changed == 0 {
            return Err(GatewayError::NoRows {
                table: table.to_string(),
                id: id.to_string(),
            });
        }
        fetch_one(&conn, schema, owner, row_id)?.ok_or_else(|| GatewayError::NoRows {
            table: table.to_string(),
            id: id.to_string(),
        })
    }

    async fn delete(&self, table: &str, owner: &str, id: &str) -> GatewayResult<()> {
        let schema = TableSchema::find(table)?;
        let row_id = parse_id(id)?;
        let conn = self.db.conn.lock().await;

        // a missing row is not an error, matching the hosted backend
        let removed = conn
            .execute(
                &format!("DELETE FROM {} WHERE id = ?1 AND user_id = ?2", schema.name),
                rusqlite::params![row_id, owner],
            )
            .map_err(sql_error)?;
        log::debug!("deleted {} row(s) from {}", removed, schema.name);
        Ok(())
    }

    async fn increment_display_order(&self, table: &str, owner: &str) -> GatewayResult<()> {
        let schema = TableSchema::find(table)?;
        let conn = self.db.conn.lock().await;
        conn.execute(
            &format!("UPDATE {} SET display_order = display_order + 1 WHERE user_id = ?1", schema.name),
            [owner],
        )
        .map_err(sql_error)?;
        Ok(())
    }

    async fn set_display_orders(&self, table: &str, owner: &str, updates: &[OrderUpdate]) -> GatewayResult<()> {
        let schema = TableSchema::find(table)?;
        let ids = updates
            .iter()
            .map(|u| parse_id(&u.id).map(|id| (id, u.display_order)))
            .collect::<GatewayResult<Vec<_>>>()?;

        let mut conn = self.db.conn.lock().await;
        let tx = conn.transaction().map_err(sql_error)?;
        {
            let mut stmt = tx
                .prepare(&format!(
                    "UPDATE {} SET display_order = ?1 WHERE id = ?2 AND user_id = ?3",
                    schema.name
                ))
                .map_err(sql_error)?;
            for (id, order) in ids {
                stmt.execute(rusqlite::params![order, id, owner]).map_err(sql_error)?;
            }
        }
        tx.commit().map_err(sql_error)?;
        Ok(())
    }
}
