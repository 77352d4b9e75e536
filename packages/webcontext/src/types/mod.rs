//! Data types for the content pipeline.

pub mod chart;
pub mod config;
pub mod extraction;
pub mod page;
