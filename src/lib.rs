pub mod config;
pub mod export;
pub mod fetch;
pub mod persist;
pub mod pipeline;
pub mod process;
pub mod schema;
pub mod table;

pub use config::{Config, Credential};
pub use pipeline::{rebuild, run, RunSummary};
pub use schema::PlaceRow;
pub use table::ResultTable;
