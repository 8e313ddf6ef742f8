//! Oracle database integration
//!
//! Enumerates objects from the data dictionary and renders their DDL
//! with `DBMS_METADATA`.

pub mod adapter;
pub mod client;

pub use adapter::OracleAdapter;
pub use client::OracleClient;
