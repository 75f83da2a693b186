//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `checkin` - Check-in conversation state machine and records

pub mod checkin;
pub mod foundation;
