//! Provider implementations

pub mod perplexity;

pub use perplexity::PerplexityProvider;
