//! Core trait abstractions for the content pipeline.
//!
//! These traits are the seams the pipeline is tested through: outbound
//! HTTP goes through [`fetcher::Fetcher`] and the shared cache /
//! rate-limit backend goes through [`kv::KvStore`], so every component
//! can run against in-memory fakes.

pub mod fetcher;
pub mod kv;
