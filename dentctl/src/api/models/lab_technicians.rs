//! API request/response models for lab technicians.
//!
//! Lab technicians are stored as users with the `lab_technician` role. The role is fixed by this
//! module: it is injected into every create body and every list query, so callers cannot create or
//! list other kinds of users through these types.

use super::pagination::ListParams;
use super::{Validate, require_non_empty};
use crate::api::query::QueryPairs;
use crate::types::{ClinicId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    LabTechnician,
    #[serde(other)]
    Other,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::LabTechnician => "lab_technician",
            Role::Other => "other",
        }
    }
}

/// Denormalized clinic reference embedded in a technician record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicSummary {
    #[serde(alias = "_id")]
    pub id: ClinicId,
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabTechnician {
    #[serde(alias = "_id")]
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub clinic: Option<ClinicSummary>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LabTechnician {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

impl Validate for LabTechnician {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("id", &self.id)?;
        require_non_empty("username", &self.username)?;
        if let Some(clinic) = &self.clinic {
            require_non_empty("clinic.id", &clinic.id)?;
        }
        Ok(())
    }
}

#[skip_serializing_none]
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabTechnicianCreate {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    /// Write-only; never returned by the server
    pub password: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Id of the clinic the technician works for
    pub clinic: Option<ClinicId>,
    pub notes: Option<String>,
}

impl fmt::Debug for LabTechnicianCreate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabTechnicianCreate")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("clinic", &self.clinic)
            .field("notes", &self.notes)
            .finish()
    }
}

/// Wire body for `POST /users`: the create fields plus the fixed role.
#[derive(Serialize)]
pub(crate) struct LabTechnicianCreateBody<'a> {
    #[serde(flatten)]
    pub fields: &'a LabTechnicianCreate,
    pub role: Role,
}

impl<'a> From<&'a LabTechnicianCreate> for LabTechnicianCreateBody<'a> {
    fn from(fields: &'a LabTechnicianCreate) -> Self {
        Self {
            fields,
            role: Role::LabTechnician,
        }
    }
}

/// Partial update; passwords are changed through [`PasswordChange`] instead.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabTechnicianUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub clinic: Option<ClinicId>,
    pub notes: Option<String>,
}

impl LabTechnicianUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct PasswordChange {
    pub password: String,
}

impl fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordChange").field("password", &"<redacted>").finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordChangeResponse {
    pub success: bool,
}

impl Validate for PasswordChangeResponse {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Query parameters for listing lab technicians
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LabTechnicianListQuery {
    pub params: ListParams,
    /// Only technicians of this clinic
    pub clinic: Option<ClinicId>,
    /// Free-text search, matched server side
    pub search: Option<String>,
}

impl LabTechnicianListQuery {
    /// `role` always comes first, then the shared list parameters, then `clinic` and `search`.
    pub fn query_pairs(&self) -> QueryPairs {
        let mut pairs = QueryPairs::new();
        pairs.push("role", Role::LabTechnician.as_str());
        self.params.append_to(&mut pairs);
        pairs
            .push_str("clinic", self.clinic.as_deref())
            .push_str("search", self.search.as_deref());
        pairs
    }
}
