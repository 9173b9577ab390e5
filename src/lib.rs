//! Vigencias - license-validity tracking with traffic-light expiration status.
//!
//! This library provides the core functionality for the Vigencias service:
//! the classification engine, database operations, session auth, and API
//! handlers.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod id;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod response;
pub mod semaforo;
