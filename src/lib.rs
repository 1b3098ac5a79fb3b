// src/lib.rs

mod aggregator;
mod env;
mod error;
mod macros;
mod model;
mod samehadaku;
mod telemetry;
mod utils;

pub use crate::aggregator::fan_out;
pub use crate::env::{EnvVar, ScraperConfig, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
pub use crate::error::SameRustError;
pub use crate::model::{
    HomeInfo, LatestEpisode, LatestPage, MovieProject, ScheduleEntry, ScheduleResult,
    TopTenAnime, Weekday, NOT_AVAILABLE,
};
pub use crate::samehadaku::SamehadakuRust;
pub use crate::telemetry::init_tracing;

#[derive(Debug, Clone)]
pub struct SameRust {
    pub samehadaku: SamehadakuRust,
}

impl SameRust {
    /// Scrapers configured from `.env` / process environment.
    pub fn new() -> Result<Self, SameRustError> {
        Ok(SameRust {
            samehadaku: SamehadakuRust::from_env()?,
        })
    }

    pub fn with_config(config: ScraperConfig) -> Result<Self, SameRustError> {
        Ok(SameRust {
            samehadaku: SamehadakuRust::new(config)?,
        })
    }
}
