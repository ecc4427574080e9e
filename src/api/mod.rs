//! HTTP client for the inspection API

mod client;
mod traits;

pub use client::ApiClient;
pub use traits::ApiClientTrait;

#[cfg(test)]
pub use traits::MockApiClientTrait;
