//! REST Table Gateway
//!
//! Talks to the hosted table API (PostgREST dialect): one endpoint per table
//! under `/rest/v1`, `eq.` filters, `Prefer: return=representation` to get
//! rows back from writes.

use std::rc::Rc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

use super::auth::AuthProvider;
use super::realtime::row_id;
use super::traits::{GatewayError, GatewayResult, OrderUpdate, TableGateway};
use crate::config::StoreConfig;

/// URL and filter builder for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableUrl {
    base: String,
    table: String,
}

impl TableUrl {
    pub fn new(api_url: &str, table: &str) -> Self {
        Self {
            base: api_url.trim_end_matches('/').to_string(),
            table: table.to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base, self.table)
    }

    /// Server-side function that shifts the owner's rows down by one.
    /// Only the tasks table has one; other tables are shifted row by row.
    pub fn increment_rpc(&self) -> Option<String> {
        match self.table.as_str() {
            "tasks" => Some(format!("{}/rest/v1/rpc/increment_user_task_display_order", self.base)),
            _ => None,
        }
    }

    /// Query pairs restricting a request to the owner (and optionally one row)
    pub fn scope(owner: &str, id: Option<&str>) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("user_id", format!("eq.{}", owner))];
        if let Some(id) = id {
            pairs.push(("id", format!("eq.{}", id)));
        }
        pairs
    }

    /// Just the ids and positions of the owner's rows
    pub fn order_query(owner: &str) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("select", "id,display_order".to_string())];
        pairs.extend(Self::scope(owner, None));
        pairs
    }

    pub fn list_query(owner: &str) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("select", "*".to_string())];
        pairs.extend(Self::scope(owner, None));
        pairs.push(("order", "display_order.asc".to_string()));
        pairs
    }
}

pub struct RestGateway {
    api_url: String,
    anon_key: String,
    auth: Rc<dyn AuthProvider>,
    http: Client,
}

impl RestGateway {
    pub fn new(config: &StoreConfig, auth: Rc<dyn AuthProvider>) -> Self {
        Self {
            api_url: config.api_url.clone(),
            anon_key: config.anon_key.clone(),
            auth,
            http: Client::new(),
        }
    }

    fn table(&self, table: &str) -> TableUrl {
        TableUrl::new(&self.api_url, table)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.auth.access_token().unwrap_or_else(|| self.anon_key.clone());
        request
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", token))
    }

    async fn send(&self, request: RequestBuilder) -> GatewayResult<Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Http {
            status: status.as_u16(),
            body: error_message(&body),
        })
    }

    async fn rows(&self, response: Response) -> GatewayResult<Vec<Value>> {
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

/// Pull `message` out of a JSON error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// Every row moved one place down
fn shifted_orders(rows: &[Value]) -> Vec<OrderUpdate> {
    rows.iter()
        .filter_map(|row| {
            let order = row["display_order"].as_i64().unwrap_or(0) as i32;
            Some(OrderUpdate {
                id: row_id(row)?,
                display_order: order + 1,
            })
        })
        .collect()
}

fn single_row(rows: Vec<Value>, table: &str, id: &str) -> GatewayResult<Value> {
    rows.into_iter().next().ok_or_else(|| GatewayError::NoRows {
        table: table.to_string(),
        id: id.to_string(),
    })
}

#[async_trait(?Send)]
impl TableGateway for RestGateway {
    async fn select(&self, table: &str, owner: &str) -> GatewayResult<Vec<Value>> {
        log::debug!("GET {} for {}", table, owner);
        let url = self.table(table);
        let response = self.send(self.http.get(url.endpoint()).query(&TableUrl::list_query(owner))).await?;
        self.rows(response).await
    }

    async fn insert(&self, table: &str, owner: &str, mut row: Value) -> GatewayResult<Value> {
        log::debug!("POST {}", table);
        if let Some(obj) = row.as_object_mut() {
            obj.insert("user_id".into(), Value::String(owner.to_string()));
        }
        let request = self
            .http
            .post(self.table(table).endpoint())
            .header("Prefer", "return=representation")
            .json(&vec![row]);
        let response = self.send(request).await?;
        single_row(self.rows(response).await?, table, "new row")
    }

    async fn update(&self, table: &str, owner: &str, id: &str, patch: Value) -> GatewayResult<Value> {
        log::debug!("PATCH {} {}", table, id);
        let request = self
            .http
            .patch(self.table(table).endpoint())
            .query(&TableUrl::scope(owner, Some(id)))
            .header("Prefer", "return=representation")
            .json(&patch);
        let response = self.send(request).await?;
        single_row(self.rows(response).await?, table, id)
    }

    async fn delete(&self, table: &str, owner: &str, id: &str) -> GatewayResult<()> {
        log::debug!("DELETE {} {}", table, id);
        let request = self
            .http
            .delete(self.table(table).endpoint())
            .query(&TableUrl::scope(owner, Some(id)));
        self.send(request).await?;
        Ok(())
    }

    async fn increment_display_order(&self, table: &str, owner: &str) -> GatewayResult<()> {
        let url = self.table(table);
        if let Some(rpc) = url.increment_rpc() {
            // the function resolves the owner from the bearer token
            let request = self.http.post(rpc).json(&serde_json::json!({}));
            self.send(request).await?;
            return Ok(());
        }
        let response = self.send(self.http.get(url.endpoint()).query(&TableUrl::order_query(owner))).await?;
        let rows = self.rows(response).await?;
        self.set_display_orders(table, owner, &shifted_orders(&rows)).await
    }

    async fn set_display_orders(&self, table: &str, owner: &str, updates: &[OrderUpdate]) -> GatewayResult<()> {
        log::debug!("reordering {} rows in {}", updates.len(), table);
        let url = self.table(table);
        for update in updates {
            let request = self
                .http
                .patch(url.endpoint())
                .query(&TableUrl::scope(owner, Some(&update.id)))
                .json(&serde_json::json!({ "display_order": update.display_order }));
            self.send(request).await?;
        }
        Ok(())
    }
}
