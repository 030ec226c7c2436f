//! Equipment catalog over HTTP

use async_trait::async_trait;
use serde::Deserialize;

use super::EquipmentSource;
use crate::{
    config::ApiConfig,
    error::{AppError, AppResult},
    models::EquipmentRecord,
};

#[derive(Clone, Debug)]
pub struct EquipmentRepository {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

/// The list endpoint answers either a bare array or `{ "data": [...] }`
#[derive(Deserialize)]
#[serde(untagged)]
enum EquipmentListBody {
    Bare(Vec<EquipmentRecord>),
    Wrapped { data: Vec<EquipmentRecord> },
}

impl EquipmentRepository {
    pub fn new(client: reqwest::Client, api: &ApiConfig) -> Self {
        Self {
            client,
            url: api.equipment_url(),
            token: api.token.clone(),
        }
    }

    /// List all equipment
    pub async fn list(&self) -> AppResult<Vec<EquipmentRecord>> {
        let mut request = self.client.get(&self.url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(%status, url = %self.url, "Equipment list request rejected");
            return Err(AppError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        let body: EquipmentListBody = serde_json::from_slice(&bytes)?;
        let records = match body {
            EquipmentListBody::Bare(records) => records,
            EquipmentListBody::Wrapped { data } => data,
        };
        tracing::debug!(count = records.len(), "Fetched equipment snapshot");
        Ok(records)
    }
}

#[async_trait]
impl EquipmentSource for EquipmentRepository {
    async fn fetch_equipment_list(&self) -> AppResult<Vec<EquipmentRecord>> {
        self.list().await
    }
}
