//! Builders for test data.

#![allow(dead_code)]

use std::path::Path;

use chrono::NaiveDate;
use serde_json::{json, Value};

use warranty::claim::{InvoiceDocument, NewClaim};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

/// Builder for `NewClaim` instances.
pub struct ClaimBuilder {
    owner_id: i64,
    customer_name: String,
    customer_phone: String,
    product_name: String,
    installation_date: NaiveDate,
}

impl ClaimBuilder {
    pub fn new() -> Self {
        Self {
            owner_id: 1,
            customer_name: "Test Customer".to_string(),
            customer_phone: "+1 555 0199".to_string(),
            product_name: "Heat pump".to_string(),
            installation_date: date(2025, 5, 8),
        }
    }

    pub fn owner(mut self, owner_id: i64) -> Self {
        self.owner_id = owner_id;
        self
    }

    pub fn product(mut self, name: &str) -> Self {
        self.product_name = name.to_string();
        self
    }

    pub fn installed_on(mut self, installation_date: NaiveDate) -> Self {
        self.installation_date = installation_date;
        self
    }

    /// Builds a claim pointing at `upload_dir/stored_name`.
    pub fn build(self, upload_dir: &Path, stored_name: &str) -> NewClaim {
        NewClaim {
            owner_id: self.owner_id,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            product_name: self.product_name,
            installation_date: self.installation_date,
            invoice: InvoiceDocument {
                location: upload_dir.join(stored_name),
                stored_name: stored_name.to_string(),
                original_name: format!("original-{}", stored_name),
                mime_type: "application/pdf".to_string(),
            },
        }
    }
}

impl Default for ClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for config JSON documents.
pub struct ConfigJsonBuilder {
    value: Value,
}

impl ConfigJsonBuilder {
    pub fn new() -> Self {
        Self {
            value: json!({ "version": "1.0" }),
        }
    }

    pub fn set(mut self, key: &str, value: Value) -> Self {
        self.value[key] = value;
        self
    }

    pub fn build(self) -> String {
        self.value.to_string()
    }
}

impl Default for ConfigJsonBuilder {
    fn default() -> Self {
        Self::new()
    }
}
