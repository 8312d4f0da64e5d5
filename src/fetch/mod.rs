// src/fetch/mod.rs

/// Building the per-year query URL.
pub mod urls;
/// Blocking GET of one year's payload.
pub mod years;

pub use urls::year_url;
pub use years::YearFetcher;
