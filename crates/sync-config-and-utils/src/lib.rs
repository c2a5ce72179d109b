//! Configuration, paths, errors, and logging setup shared by the full-sync crates.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, DEFAULT_DOCUMENT_SYNCER_COUNT, DEFAULT_INPUT_QUEUE_CAPACITY, DEFAULT_LOG_LEVEL,
    DEFAULT_TARGET_TYPE,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
