//! Application services: markdown rendering, PDF conversion and the export
//! use case that combines them.

pub mod error;
pub mod export;
pub mod pdf;
pub mod render;
