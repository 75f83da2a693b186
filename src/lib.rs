//! Daily Check-in - Conversational stand-up service
//!
//! Walks team members through a short morning or evening question set and
//! records each completed check-in as a row in a shared spreadsheet, falling
//! back to a local JSON log whenever the spreadsheet cannot be reached.

pub mod adapters;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod ports;
