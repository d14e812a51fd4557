//! Common type definitions.
//!
//! The backend issues opaque string identifiers (document ids for entities, object storage keys
//! for uploads). They are wrapped in type aliases so signatures say which kind of id they expect:
//!
//! - [`CategoryId`]: category identifier
//! - [`UserId`]: user identifier (lab technicians are users with the `lab_technician` role)
//! - [`ClinicId`]: clinic identifier, only ever seen as a denormalized reference
//! - [`StorageKey`]: object storage key of an uploaded file

pub type CategoryId = String;
pub type UserId = String;
pub type ClinicId = String;
pub type StorageKey = String;

/// Abbreviate an id to its last 8 characters for more readable logs and traces.
///
/// Document ids share a timestamp prefix, so the tail is the distinguishing part.
/// Example: "65f1c2a9e4b0d3a1f2c4b5e6" -> "f2c4b5e6"
pub fn abbrev_id(id: &str) -> &str {
    let count = id.chars().count();
    if count <= 8 {
        return id;
    }
    match id.char_indices().nth(count - 8) {
        Some((start, _)) => &id[start..],
        None => id,
    }
}
