//! Conversion between the target description and the completion API
//!
//! `request_converter` builds the prompt, `response_converter` turns the
//! model's free text into a clean extension list.

pub mod request_converter;
pub mod response_converter;
