//! Equipment model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Equipment record as served by the catalog API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    #[serde(default)]
    pub id: Option<i64>,
    /// Code printed on the equipment's QR label (unique)
    pub item_code: String,
    pub name: String,
    /// Status label (available, borrowed, repair, ...)
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity: Option<i32>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "pic")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl EquipmentRecord {
    /// Whether a borrow can be started from this snapshot
    pub fn is_borrowable(&self) -> bool {
        self.status.eq_ignore_ascii_case("available") && self.quantity.map_or(true, |q| q > 0)
    }
}

/// Exact-match search over a catalog snapshot
pub fn find_by_code(records: Vec<EquipmentRecord>, code: &str) -> Option<EquipmentRecord> {
    records.into_iter().find(|r| r.item_code == code)
}
