//! Hub catalog client.

pub mod client;

pub use client::{HubClient, DEFAULT_REQUEST_TIMEOUT};
