//! Data models: documents, templates, extracted rows, and configuration.

pub mod config;
pub mod document;
pub mod template;
