//! Adapters - Implementations of port interfaces.
//!
//! - `auth` - Session token validation
//! - `events` - Event publishers
//! - `http` - axum routes and middleware
//! - `memory` - In-memory persistence
//! - `postgres` - PostgreSQL persistence
//! - `yookassa` - Payment gateway

pub mod auth;
pub mod events;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod yookassa;
