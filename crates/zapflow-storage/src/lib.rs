//! Zapflow Storage - Database access for the campaign subsystem
//!
//! This crate provides the PostgreSQL persistence layer for Zapflow:
//! connection pooling, campaign/template/recipient models, and the
//! repository traits consumed by the execution core.

pub mod db;
pub mod models;
pub mod repository;

pub use db::{Database, DatabasePool};
pub use models::*;
pub use repository::*;
