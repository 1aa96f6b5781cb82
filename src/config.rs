//! Tunable rules and limits.
//!
//! `Config` deserializes from whatever source the embedding application uses
//! (a settings file, environment, ...). Missing fields take the defaults below.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// How far past today a payment date may lie.
    #[serde(default = "default_max_future_days")]
    pub max_future_days: u32,

    /// Decimal places accepted in a payment amount.
    #[serde(default = "default_amount_decimal_places")]
    pub amount_decimal_places: u32,

    /// Upper bound on every backend call, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_max_future_days() -> u32 {
    30
}

fn default_amount_decimal_places() -> u32 {
    2
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_future_days: default_max_future_days(),
            amount_decimal_places: default_amount_decimal_places(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}
