//! Subscription tier registry.
//!
//! - `tier` - SubscriptionTier entity
//! - `feature` - TierFeature flags
//! - `catalog` - TierCatalog queries and checkout routing

mod catalog;
mod feature;
#[allow(clippy::module_inception)]
mod tier;

pub use catalog::{CheckoutRoute, TierCatalog};
pub use feature::TierFeature;
pub use tier::SubscriptionTier;
