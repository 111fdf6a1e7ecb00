#![forbid(unsafe_code)]

pub mod audit;
pub mod directory;
pub mod error;
pub mod ledger;
pub mod violation;

pub use audit::{run_audit, AuditInputs};
pub use directory::{Directory, DirectoryConfig};
pub use error::{AuditError, DirectoryError};
pub use ledger::{CallLedger, CallLedgerConfig};
pub use violation::{ViolationConfig, ViolationEngine};
