//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, money, errors, events)
//! - `billing` - Transactions and the payment state machine
//! - `membership` - Membership lifecycle
//! - `tier` - Subscription tier registry
//! - `access` - Course access policies and the access decision

pub mod access;
pub mod billing;
pub mod foundation;
pub mod membership;
pub mod tier;
