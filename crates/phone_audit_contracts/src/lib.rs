#![forbid(unsafe_code)]

pub mod call;
pub mod clock;
pub mod common;
pub mod directory;
pub mod ingest;
pub mod phone;
pub mod report;

pub use common::{ContractViolation, SchemaVersion, Validate};
