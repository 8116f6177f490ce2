//! Funnel - micro-tool content funnel
//!
//! Builds small web tools from templates, lists them on a commerce platform,
//! generates and posts promotional media, and rolls up the resulting revenue.
//! One SQLite store holds the four entities (`Tool`, `Product`, `Content`,
//! `Metric`); everything that talks to the outside world sits behind the
//! traits in [`adapters`].

pub mod adapters;
pub mod config;
pub mod error;
pub mod model;
pub mod services;
pub mod storage;
pub mod utils;

pub use error::{FunnelError, Result};
