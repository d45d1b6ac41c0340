//! Inbound update ingestion.
//!
//! [`UpdateSource`] turns repeated long-polls into a single ordered,
//! deduplicated sequence of [`InboundEvent`](crate::types::InboundEvent)s.

mod source;

pub use source::{DEFAULT_POLL_TIMEOUT, Subscription, UpdateSource};
