//! Debrid link resolution.
//!
//! This module provides the `LinkResolver` trait, which turns a raw cached-link
//! reference into a direct, time-limited stream URL, and the Real-Debrid
//! implementation of it.
//!
//! # Failure kinds
//!
//! - `InvalidLink`: malformed or unsupported link, never retried
//! - `ProviderUnavailable`: network trouble, timeouts, 5xx; retried with backoff
//! - `NotCached`: the provider does not have the content, never retried
//! - `ProviderAuth`: bad or expired token; aborts the whole batch
//!
//! Retries happen at the call site through [`resolve_with_retry`].

mod config;
mod error;
mod realdebrid;
mod retry;
mod traits;
mod types;

pub use config::{DebridConfig, RetryConfig};
pub use error::ResolveError;
pub use realdebrid::RealDebridResolver;
pub use retry::resolve_with_retry;
pub use traits::LinkResolver;
pub use types::{check_raw_link, ResolvedLink};
