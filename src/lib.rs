//! Course Billing - subscriptions and course access for online schools
//!
//! Members buy subscription tiers through YooKassa. Confirmed payments
//! activate or renew a membership, and course access is decided by the
//! course's access policies.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
