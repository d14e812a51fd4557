//! Request and response models for the administration API.

pub mod categories;
pub mod lab_technicians;
pub mod pagination;
pub mod uploads;

/// Structural checks applied to every decoded response before it leaves the request layer.
///
/// Decoding only proves the JSON had the right shape; `validate` enforces the invariants the rest
/// of the client relies on (non-empty ids, consistent pagination, ...). The error string names the
/// offending field.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), String> {
        for (index, item) in self.iter().enumerate() {
            item.validate().map_err(|e| format!("[{index}]: {e}"))?;
        }
        Ok(())
    }
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} must not be empty"))
    } else {
        Ok(())
    }
}
