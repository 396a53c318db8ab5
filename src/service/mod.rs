//! Service entry points
//!
//! [`SubscriptionService`] is what a deployment wires up: one value per
//! process, called once per gateway route request and once per stream
//! batch. Collaborators are injected at construction, never reached through
//! globals.

pub mod config;
pub mod relay;

pub use config::ServiceConfig;
pub use relay::SubscriptionService;
