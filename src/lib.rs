//! Markdown export service: upload a Markdown file, download styled HTML or a PDF.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
