// src/aip/mod.rs

pub mod adapters;
pub mod analysis;
pub mod client;
pub mod constants;
pub mod error;
pub mod event;
pub mod http;
pub mod schemas;
pub mod window;

// Explicitly export the client so callers reach it as aip::AipClient rather
// than aip::aip::client::AipClient.
pub use client::{create_client, AipClient};
