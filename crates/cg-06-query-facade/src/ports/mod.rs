//! Ports module for read-only queries

pub mod inbound;

pub use inbound::QueryApi;
