#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod feeds;
pub mod pipeline;
pub mod writer;

pub use error::ToolError;
