//! Typed client for the Databricks REST API.
//!
//! One module per API family, all funneling through [`http::ApiClient`].
//! Long-running operations (SQL statements, job runs, Genie messages) share
//! the generic poller in [`wait`]; the Genie module adds the attachment
//! aggregation that assembles a composite reply once a message completes.

pub mod catalog;
pub mod config;
pub mod error;
pub mod genie;
pub mod http;
pub mod jobs;
pub mod libraries;
pub mod repos;
pub mod sql;
pub mod wait;
pub mod workspace;

pub use config::Config;
pub use error::{Error, Result};
pub use http::ApiClient;
pub use wait::{Clock, ManualClock, StatusClass, TokioClock, WaitConfig};
