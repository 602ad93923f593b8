//! `fetchguard` bundles two small infrastructure primitives for HTTP
//! services:
//!
//! - [`FetchClient`] — a resilient JSON request client with bounded
//!   retries, exponential backoff and a per-attempt timeout.
//! - [`RateLimiter`] — a fixed-window, per-key request limiter.
//!
//! The two are independent; an application typically uses the client
//! for its outbound calls and the limiter in front of inbound handlers.

mod client;
mod config;
mod error;
mod limiter;
mod options;

pub use client::FetchClient;
pub use config::{ConfigPatch, FetchConfig, SharedConfig};
pub use error::FetchError;
pub use limiter::{Decision, RateLimiter, DEFAULT_LIMIT, DEFAULT_WINDOW};
pub use options::RequestOptions;

pub type Result<T> = std::result::Result<T, FetchError>;
