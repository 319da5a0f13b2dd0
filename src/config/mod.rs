//! Configuration loading and validation
//!
//! Gossamer reads a TOML file with one `[service]` table and any number of
//! `[[job]]` entries; each entry is a job submission that is validated
//! before it reaches the crawl engine.

mod parser;
mod types;
mod validation;

pub use parser::load_config;
pub use types::{Config, JobSpec, ServiceConfig};
pub use validation::validate_job_spec;
