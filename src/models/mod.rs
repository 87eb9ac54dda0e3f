//! API data models
//!
//! Chat completion records and the extensions document the model is asked
//! to return.

pub mod chat;
pub mod suggestion;
