#![forbid(unsafe_code)]

use std::fmt;

use serde::Serialize;

use crate::{ContractViolation, Validate};

/// Phone number in normalized form: punctuation and whitespace stripped.
///
/// Two numbers that differ only in formatting (`0911-000-111` and
/// `0911 000 111`) normalize to the same key. Carrier service codes such
/// as `*123` or `#888` are kept as billed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(raw: &str) -> Result<Self, ContractViolation> {
        let phone = Self(normalize(raw));
        phone.validate()?;
        Ok(phone)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl Validate for PhoneNumber {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.0.is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "phone_number",
                reason: "must not be empty after normalization",
            });
        }
        Ok(())
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strips separators (`-`, `.`, `(`, `)`, `/`) and whitespace.
pub fn normalize(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '.' | '(' | ')' | '/'))
        .collect()
}
