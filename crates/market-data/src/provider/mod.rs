//! Upstream quote provider abstraction and its Alpha Vantage implementation.
//!
//! The pipeline talks to exactly one provider. The trait exists so the
//! fetcher can be exercised against scripted providers in tests.

mod traits;

pub mod alpha_vantage;

// Re-exports
pub use traits::QuoteProvider;
