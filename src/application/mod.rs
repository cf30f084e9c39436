//! Application layer containing the authorization pipeline orchestration.
//!
//! `AuthorizationEngine` sequences account lookup, currency conversion,
//! merchant enrichment and the balance check. `Consumer` sits in front of it
//! and settles queue deliveries.

pub mod consumer;
pub mod engine;
mod exchange;
mod lookup;
