//! Relay-backed article extraction.
//!
//! A URL goes in, a normalized [`extractor::ArticleRecord`] comes out. Pages
//! are fetched through an ordered chain of relay providers
//! ([`relay::RelayChain`]), parsed, reduced to their main content and
//! decorated with metadata. Failures past URL validation never surface as
//! errors: the record carries placeholder content instead.

pub mod api;
pub mod app_state;
pub mod config;
pub mod extractor;
pub mod health;
pub mod relay;
