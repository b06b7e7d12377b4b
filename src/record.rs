//! The synthetic order record and its fixed categorical domains.
//!
//! Field order of [`Record`] is the column order of the dataset file; the csv
//! header is derived from it, so reordering fields changes the file format.

use crate::errors::BenchError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Column header of every dataset file, in order.
pub const DATASET_HEADER: [&str; 10] = [
    "order_id",
    "ts",
    "user_id",
    "product_id",
    "price",
    "quantity",
    "category",
    "country",
    "device",
    "rating",
];

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Electronics,
    Clothing,
    Home,
    Sports,
    Beauty,
    Toys,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Electronics,
        Category::Clothing,
        Category::Home,
        Category::Sports,
        Category::Beauty,
        Category::Toys,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Country {
    In,
    Us,
    Gb,
    De,
    Fr,
    Au,
    Ca,
}

impl Country {
    pub const ALL: [Country; 7] = [
        Country::In,
        Country::Us,
        Country::Gb,
        Country::De,
        Country::Fr,
        Country::Au,
        Country::Ca,
    ];

    /// Sampling weights, index-aligned with [`Country::ALL`].
    pub const WEIGHTS: [f64; 7] = [0.5, 0.15, 0.08, 0.07, 0.06, 0.08, 0.06];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Country::In => "IN",
            Country::Us => "US",
            Country::Gb => "GB",
            Country::De => "DE",
            Country::Fr => "FR",
            Country::Au => "AU",
            Country::Ca => "CA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Mobile,
    Desktop,
    Tablet,
}

impl Device {
    pub const ALL: [Device; 3] = [Device::Mobile, Device::Desktop, Device::Tablet];
    pub const WEIGHTS: [f64; 3] = [0.6, 0.3, 0.1];
}

/// One synthetic transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub order_id: u64,
    #[serde(rename = "ts", with = "iso_seconds")]
    pub timestamp: NaiveDateTime,
    pub user_id: u64,
    pub product_id: u32,
    pub price: f64,
    pub quantity: u8,
    pub category: Category,
    pub country: Country,
    pub device: Device,
    pub rating: f64,
}

impl Record {
    /// Check the per-record constraints that do not depend on the dataset.
    ///
    /// # Errors
    /// Returns `BenchError::Validation` naming the first field out of bounds.
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.order_id == 0 {
            return Err(BenchError::Validation("order_id must start at 1".into()));
        }
        if self.user_id == 0 {
            return Err(BenchError::Validation("user_id must be >= 1".into()));
        }
        if !(1..crate::sampler::PRODUCT_ID_END).contains(&self.product_id) {
            return Err(BenchError::Validation(format!(
                "product_id {} out of range",
                self.product_id
            )));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(BenchError::Validation(format!("price {} must be > 0", self.price)));
        }
        if !(1..=4).contains(&self.quantity) {
            return Err(BenchError::Validation(format!(
                "quantity {} not in 1..=4",
                self.quantity
            )));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(BenchError::Validation(format!(
                "rating {} not in [1.0, 5.0]",
                self.rating
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn total_sales(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// `ts` is written as an ISO-8601 local timestamp without offset or
/// fractional seconds, e.g. `2023-03-14T09:26:53`.
pub(crate) mod iso_seconds {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&ts.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
