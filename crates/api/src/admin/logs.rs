//! Audit log listings.

use serde::{Deserialize, Serialize};

use campuscard_core::GatewayResult;
use campuscard_gateway::GatewayClient;

use crate::Page;

/// Paging and filter parameters; unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub keywords: Option<String>,
    /// Only honored by the data-change listing.
    pub entity: Option<String>,
}

impl LogQuery {
    pub fn page(page: u32, size: u32) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
            ..Self::default()
        }
    }

    pub fn keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    pub fn entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size", size.to_string()));
        }
        if let Some(keywords) = &self.keywords {
            pairs.push(("keywords", keywords.clone()));
        }
        if let Some(entity) = &self.entity {
            pairs.push(("entity", entity.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpLog {
    pub id: i64,
    pub occurred_at: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub subject_type: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub params: Option<String>,
    #[serde(default)]
    pub client_ip: Option<String>,
    #[serde(default)]
    pub result_code: Option<i32>,
    #[serde(default)]
    pub duration_ms: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceOpLog {
    pub id: i64,
    pub occurred_at: String,
    #[serde(default)]
    pub device_id: Option<i64>,
    #[serde(default)]
    pub device_code: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub params: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub operator_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataChangeLog {
    pub id: i64,
    pub occurred_at: String,
    pub entity: String,
    #[serde(default)]
    pub entity_id: Option<String>,
    pub change_type: String,
    #[serde(default)]
    pub before_json: Option<String>,
    #[serde(default)]
    pub after_json: Option<String>,
    #[serde(default)]
    pub changed_fields: Option<String>,
    #[serde(default)]
    pub operator_id: Option<i64>,
    #[serde(default)]
    pub remark: Option<String>,
}

pub async fn op_logs(client: &GatewayClient, query: &LogQuery) -> GatewayResult<Page<OpLog>> {
    client.get("/api/v1/logs/op", &query.pairs()).await
}

pub async fn device_logs(
    client: &GatewayClient,
    query: &LogQuery,
) -> GatewayResult<Page<DeviceOpLog>> {
    client.get("/api/v1/logs/device", &query.pairs()).await
}

pub async fn data_change_logs(
    client: &GatewayClient,
    query: &LogQuery,
) -> GatewayResult<Page<DataChangeLog>> {
    client.get("/api/v1/logs/data-change", &query.pairs()).await
}
