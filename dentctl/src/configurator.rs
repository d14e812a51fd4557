//! Patient-facing configurator preview state.
//!
//! Teeth are addressed in FDI two-digit notation: the first digit is the quadrant (1 upper right,
//! 2 upper left, 3 lower left, 4 lower right), the second the position from the midline (1-8).

use crate::api::models::categories::Category;
use crate::types::CategoryId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not an FDI tooth number (quadrant 1-4, position 1-8)")]
pub struct InvalidToothNumber(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    Upper,
    Lower,
}

impl Arch {
    fn quadrants(self) -> [u8; 2] {
        match self {
            Arch::Upper => [1, 2],
            Arch::Lower => [3, 4],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ToothNumber {
    quadrant: u8,
    position: u8,
}

impl ToothNumber {
    pub fn new(quadrant: u8, position: u8) -> Result<Self, InvalidToothNumber> {
        if (1..=4).contains(&quadrant) && (1..=8).contains(&position) {
            Ok(Self { quadrant, position })
        } else {
            Err(InvalidToothNumber(format!("{quadrant}{position}")))
        }
    }

    pub fn quadrant(self) -> u8 {
        self.quadrant
    }

    pub fn position(self) -> u8 {
        self.position
    }

    pub fn arch(self) -> Arch {
        if self.quadrant <= 2 { Arch::Upper } else { Arch::Lower }
    }

    /// Every tooth of one arch, in FDI order.
    pub fn all_in(arch: Arch) -> impl Iterator<Item = ToothNumber> {
        arch.quadrants()
            .into_iter()
            .flat_map(|quadrant| (1..=8).map(move |position| ToothNumber { quadrant, position }))
    }
}

impl TryFrom<u8> for ToothNumber {
    type Error = InvalidToothNumber;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value / 10, value % 10).map_err(|_| InvalidToothNumber(value.to_string()))
    }
}

impl From<ToothNumber> for u8 {
    fn from(tooth: ToothNumber) -> Self {
        tooth.quadrant * 10 + tooth.position
    }
}

impl FromStr for ToothNumber {
    type Err = InvalidToothNumber;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 2 {
            return Err(InvalidToothNumber(s.to_string()));
        }
        s.parse::<u8>()
            .map_err(|_| InvalidToothNumber(s.to_string()))
            .and_then(Self::try_from)
    }
}

impl fmt::Display for ToothNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.quadrant, self.position)
    }
}

/// Selected teeth, kept in FDI order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToothChart {
    selected: BTreeSet<ToothNumber>,
}

impl ToothChart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the tooth is selected afterwards.
    pub fn toggle(&mut self, tooth: ToothNumber) -> bool {
        if self.selected.remove(&tooth) {
            false
        } else {
            self.selected.insert(tooth);
            true
        }
    }

    pub fn select(&mut self, tooth: ToothNumber) {
        self.selected.insert(tooth);
    }

    pub fn select_arch(&mut self, arch: Arch) {
        self.selected.extend(ToothNumber::all_in(arch));
    }

    pub fn clear_arch(&mut self, arch: Arch) {
        self.selected.retain(|tooth| tooth.arch() != arch);
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, tooth: ToothNumber) -> bool {
        self.selected.contains(&tooth)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn teeth(&self) -> impl Iterator<Item = ToothNumber> + '_ {
        self.selected.iter().copied()
    }
}

impl FromIterator<ToothNumber> for ToothChart {
    fn from_iter<I: IntoIterator<Item = ToothNumber>>(iter: I) -> Self {
        Self {
            selected: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientInfo {
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub clinic: Option<String>,
}

/// The restoration material, chosen from the category list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialChoice {
    pub category_id: CategoryId,
    pub name: String,
}

impl From<&Category> for MaterialChoice {
    fn from(category: &Category) -> Self {
        Self {
            category_id: category.id.clone(),
            name: category.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfiguratorPreview {
    pub patient: PatientInfo,
    pub material: Option<MaterialChoice>,
    pub teeth: ToothChart,
}

impl ConfiguratorPreview {
    pub fn new(patient: PatientInfo) -> Self {
        Self {
            patient,
            ..Default::default()
        }
    }

    pub fn select_material(&mut self, category: &Category) {
        self.material = Some(MaterialChoice::from(category));
    }

    /// A preview can be submitted once a material and at least one tooth are chosen.
    pub fn is_complete(&self) -> bool {
        self.material.is_some() && !self.teeth.is_empty()
    }

    /// Lines shown in the preview panel.
    pub fn summary(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(5);

        let name = self.patient.name.trim();
        lines.push(format!("Patient: {}", if name.is_empty() { "(not provided)" } else { name }));
        if let Some(dob) = self.patient.date_of_birth {
            lines.push(format!("Date of birth: {}", dob.format("%Y-%m-%d")));
        }
        if let Some(clinic) = self.patient.clinic.as_deref().filter(|c| !c.is_empty()) {
            lines.push(format!("Clinic: {clinic}"));
        }

        match &self.material {
            Some(material) => lines.push(format!("Material: {}", material.name)),
            None => lines.push("Material: not selected".to_string()),
        }

        if self.teeth.is_empty() {
            lines.push("Teeth: none selected".to_string());
        } else {
            let teeth = self.teeth.teeth().map(|t| t.to_string()).collect::<Vec<_>>().join(", ");
            lines.push(format!("Teeth: {teeth} ({})", self.teeth.len()));
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn tooth(n: u8) -> ToothNumber {
        ToothNumber::try_from(n).unwrap()
    }

    #[test]
    fn test_fdi_bounds() {
        assert!(ToothNumber::try_from(11).is_ok());
        assert!(ToothNumber::try_from(48).is_ok());
        for invalid in [0, 9, 10, 19, 50, 55, 81, 99] {
            assert!(ToothNumber::try_from(invalid).is_err(), "{invalid} should be rejected");
        }
        assert_eq!("36".parse::<ToothNumber>().unwrap(), tooth(36));
        assert!("036".parse::<ToothNumber>().is_err());
        assert!("x1".parse::<ToothNumber>().is_err());
        assert_eq!(tooth(21).arch(), Arch::Upper);
        assert_eq!(tooth(31).arch(), Arch::Lower);
    }

    #[test]
    fn test_serde_as_number() {
        assert_eq!(serde_json::to_string(&tooth(14)).unwrap(), "14");
        assert!(serde_json::from_str::<ToothNumber>("59").is_err());

        let chart: ToothChart = serde_json::from_str("[21, 11]").unwrap();
        assert_eq!(chart.teeth().collect::<Vec<_>>(), vec![tooth(11), tooth(21)]);
    }

    #[test]
    fn test_toggle_and_arches() {
        let mut chart = ToothChart::new();
        assert!(chart.toggle(tooth(11)));
        assert!(!chart.toggle(tooth(11)));
        assert!(chart.is_empty());

        chart.select_arch(Arch::Upper);
        assert_eq!(chart.len(), 16);
        chart.select(tooth(46));
        chart.clear_arch(Arch::Upper);
        assert_eq!(chart.teeth().collect::<Vec<_>>(), vec![tooth(46)]);
    }

    #[test]
    fn test_preview_summary_and_completeness() {
        let mut preview = ConfiguratorPreview::new(PatientInfo {
            name: "Maria Ionescu".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1984, 3, 9),
            clinic: Some("Smile Clinic".to_string()),
        });
        assert!(!preview.is_complete());

        let category = Category {
            id: "c1".to_string(),
            name: "Zirconia".to_string(),
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        preview.select_material(&category);
        assert!(!preview.is_complete());

        preview.teeth = [tooth(21), tooth(11)].into_iter().collect();
        assert!(preview.is_complete());
        assert_eq!(
            preview.summary(),
            vec![
                "Patient: Maria Ionescu",
                "Date of birth: 1984-03-09",
                "Clinic: Smile Clinic",
                "Material: Zirconia",
                "Teeth: 11, 21 (2)",
            ]
        );
    }

    #[test]
    fn test_empty_preview_summary() {
        let preview = ConfiguratorPreview::default();
        assert_eq!(
            preview.summary(),
            vec!["Patient: (not provided)", "Material: not selected", "Teeth: none selected"]
        );
    }
}
