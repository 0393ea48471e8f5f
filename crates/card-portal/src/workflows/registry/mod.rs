//! HTTP access to the external card registry.

mod client;
mod error;

pub use client::RegistryClient;
pub use error::RegistryError;
