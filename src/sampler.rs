//! Draws one synthetic [`Record`] at a time from a caller-owned random source.
//!
//! Draw order per record is fixed: timestamp, user_id, product_id, price,
//! quantity, category, country, device, rating. Changing it changes every
//! dataset produced for a given seed.

use crate::errors::BenchError;
use crate::record::{Category, Country, Device, MAX_RATING, MIN_RATING, Record};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rand::Rng;
use rand::distr::weighted::WeightedIndex;
use rand_distr::{Distribution, Exp, Normal};

pub const SECONDS_PER_YEAR: i64 = 60 * 60 * 24 * 365;
pub const PRODUCT_ID_END: u32 = 5000;
pub const PRICE_MEAN: f64 = 40.0;
pub const PRICE_SHIFT: f64 = 1.0;
pub const RATING_MEAN: f64 = 4.0;
pub const RATING_SD: f64 = 0.9;

/// Uniform pick over this list skews quantity toward 1.
const QUANTITY_CHOICES: [u8; 6] = [1, 1, 1, 2, 3, 4];

/// Start of the timestamp window (2023-01-01T00:00:00).
///
/// # Errors
/// Never in practice; the date literal is valid.
pub fn window_start() -> Result<NaiveDateTime, BenchError> {
    NaiveDate::from_ymd_opt(2023, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| BenchError::Validation("invalid timestamp window start".into()))
}

/// Exclusive upper bound of `user_id` for a dataset of `num_rows` rows.
#[must_use]
pub fn user_id_end(num_rows: usize) -> u64 {
    (num_rows / 10) as u64 + 50
}

/// Immutable distribution tables for one dataset. Holds no random state.
#[derive(Debug, Clone)]
pub struct RecordSampler {
    start: NaiveDateTime,
    user_id_end: u64,
    price: Exp<f64>,
    rating: Normal<f64>,
    country: WeightedIndex<f64>,
    device: WeightedIndex<f64>,
}

impl RecordSampler {
    /// Build the sampler for a dataset of `num_rows` rows.
    ///
    /// # Errors
    /// Returns `BenchError::Validation` if a distribution cannot be constructed.
    pub fn new(num_rows: usize) -> Result<Self, BenchError> {
        let invalid = |what: &str, e: &dyn std::fmt::Display| {
            BenchError::Validation(format!("{what} distribution: {e}"))
        };
        Ok(Self {
            start: window_start()?,
            user_id_end: user_id_end(num_rows),
            price: Exp::new(1.0 / PRICE_MEAN).map_err(|e| invalid("price", &e))?,
            rating: Normal::new(RATING_MEAN, RATING_SD).map_err(|e| invalid("rating", &e))?,
            country: WeightedIndex::new(Country::WEIGHTS).map_err(|e| invalid("country", &e))?,
            device: WeightedIndex::new(Device::WEIGHTS).map_err(|e| invalid("device", &e))?,
        })
    }

    #[must_use]
    pub fn user_id_end(&self) -> u64 {
        self.user_id_end
    }

    /// Produce the record for `order_id`, drawing every other field from `rng`.
    pub fn sample<R: Rng>(&self, rng: &mut R, order_id: u64) -> Record {
        let offset = rng.random_range(0..SECONDS_PER_YEAR);
        let timestamp = self.start + TimeDelta::seconds(offset);
        let user_id = rng.random_range(1..self.user_id_end);
        let product_id = rng.random_range(1..PRODUCT_ID_END);
        let price = round2(self.price.sample(rng) + PRICE_SHIFT);
        let quantity = QUANTITY_CHOICES[rng.random_range(0..QUANTITY_CHOICES.len())];
        let category = Category::ALL[rng.random_range(0..Category::ALL.len())];
        let country = Country::ALL[self.country.sample(rng)];
        let device = Device::ALL[self.device.sample(rng)];
        // clip after the draw so the tails pile up on the bounds
        let rating = self.rating.sample(rng).clamp(MIN_RATING, MAX_RATING);
        Record {
            order_id,
            timestamp,
            user_id,
            product_id,
            price,
            quantity,
            category,
            country,
            device,
            rating,
        }
    }
}

/// Round half away from zero to two decimal places.
#[must_use]
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
