//! Data access layer over the equipment REST API

pub mod equipment;

use async_trait::async_trait;

use crate::{config::ApiConfig, error::AppResult, models::EquipmentRecord};

pub use equipment::EquipmentRepository;

/// Source of catalog snapshots.
///
/// The API offers no server-side filter by code, so every lookup fetches the
/// full list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EquipmentSource: Send + Sync {
    async fn fetch_equipment_list(&self) -> AppResult<Vec<EquipmentRecord>>;
}

/// Main repository struct holding the HTTP-backed data sources
#[derive(Clone, Debug)]
pub struct Repository {
    pub equipment: EquipmentRepository,
}

impl Repository {
    /// Create a repository sharing one HTTP client
    pub fn new(api: &ApiConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder().timeout(api.timeout()).build()?;
        Ok(Self {
            equipment: EquipmentRepository::new(client, api),
        })
    }
}
