//! Code-to-equipment resolution

use std::sync::Arc;

use crate::{
    error::ScanError,
    models::{equipment::find_by_code, EquipmentRecord},
    repository::EquipmentSource,
};

#[derive(Clone)]
pub struct LookupService {
    source: Arc<dyn EquipmentSource>,
}

impl LookupService {
    pub fn new(source: Arc<dyn EquipmentSource>) -> Self {
        Self { source }
    }

    /// Resolve a decoded or typed code against a fresh catalog snapshot
    pub async fn resolve(&self, code: &str) -> Result<EquipmentRecord, ScanError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ScanError::EmptyCode);
        }

        let records = self.source.fetch_equipment_list().await.map_err(|e| {
            tracing::warn!(code, error = %e, "Equipment lookup failed");
            ScanError::from(e)
        })?;

        match find_by_code(records, code) {
            Some(record) => {
                tracing::info!(code, name = %record.name, "Equipment resolved");
                Ok(record)
            }
            None => {
                tracing::info!(code, "No equipment for scanned code");
                Err(ScanError::LookupNotFound {
                    code: code.to_string(),
                })
            }
        }
    }
}
