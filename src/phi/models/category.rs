//! PHI category enumeration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// PHI category covering the identifiers found in clinical narratives
///
/// Variants are declared in default priority order: when two categories
/// claim overlapping bytes, the one with the lower [`priority`](Self::priority)
/// wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhiCategory {
    /// Social security / national identification numbers
    NationalId,
    /// Medical record numbers
    MedicalRecordNumber,
    /// Health plan / insurance member identifiers
    InsuranceId,
    /// Email addresses
    Email,
    /// Telephone numbers
    Phone,
    /// Dates of birth
    DateOfBirth,
    /// Street addresses
    Address,
    /// Person names
    Name,
    /// Diagnosis mentions in free text
    DiagnosisMention,
    /// Medication mentions in free text
    MedicationMention,
}

impl PhiCategory {
    /// All categories in default priority order
    pub const ALL: [PhiCategory; 10] = [
        Self::NationalId,
        Self::MedicalRecordNumber,
        Self::InsuranceId,
        Self::Email,
        Self::Phone,
        Self::DateOfBirth,
        Self::Address,
        Self::Name,
        Self::DiagnosisMention,
        Self::MedicationMention,
    ];

    /// Default replacement label for the category
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "[NAME]",
            Self::Phone => "[PHONE]",
            Self::Email => "[EMAIL]",
            Self::NationalId => "[NATIONAL_ID]",
            Self::MedicalRecordNumber => "[MRN]",
            Self::DateOfBirth => "[DOB]",
            Self::Address => "[ADDRESS]",
            Self::InsuranceId => "[INSURANCE_ID]",
            Self::DiagnosisMention => "[DIAGNOSIS]",
            Self::MedicationMention => "[MEDICATION]",
        }
    }

    /// Default overlap priority (lower wins)
    ///
    /// Most specific identifiers come first so that, for example, a national
    /// id is never split into a phone number and a digit run.
    pub fn priority(&self) -> u32 {
        match self {
            Self::NationalId => 10,
            Self::MedicalRecordNumber => 20,
            Self::InsuranceId => 30,
            Self::Email => 40,
            Self::Phone => 50,
            Self::DateOfBirth => 60,
            Self::Address => 70,
            Self::Name => 80,
            Self::DiagnosisMention => 90,
            Self::MedicationMention => 100,
        }
    }

    /// Snake-case identifier used in configuration and exports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::NationalId => "national_id",
            Self::MedicalRecordNumber => "medical_record_number",
            Self::DateOfBirth => "date_of_birth",
            Self::Address => "address",
            Self::InsuranceId => "insurance_id",
            Self::DiagnosisMention => "diagnosis_mention",
            Self::MedicationMention => "medication_mention",
        }
    }

    /// Whether the category tags clinical content rather than identity
    pub fn is_clinical_mention(&self) -> bool {
        matches!(self, Self::DiagnosisMention | Self::MedicationMention)
    }
}

impl fmt::Display for PhiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PhiCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "name" => Ok(Self::Name),
            "phone" => Ok(Self::Phone),
            "email" => Ok(Self::Email),
            "national_id" | "ssn" => Ok(Self::NationalId),
            "medical_record_number" | "mrn" => Ok(Self::MedicalRecordNumber),
            "date_of_birth" | "dob" => Ok(Self::DateOfBirth),
            "address" => Ok(Self::Address),
            "insurance_id" | "insurance" => Ok(Self::InsuranceId),
            "diagnosis_mention" | "diagnosis" => Ok(Self::DiagnosisMention),
            "medication_mention" | "medication" => Ok(Self::MedicationMention),
            _ => Err(format!("Unknown PHI category: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_in_priority_order() {
        let priorities: Vec<u32> = PhiCategory::ALL.iter().map(|c| c.priority()).collect();
        let mut sorted = priorities.clone();
        sorted.sort_unstable();
        assert_eq!(priorities, sorted);
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("MRN".parse::<PhiCategory>().unwrap(), PhiCategory::MedicalRecordNumber);
        assert_eq!("ssn".parse::<PhiCategory>().unwrap(), PhiCategory::NationalId);
        assert_eq!("date-of-birth".parse::<PhiCategory>().unwrap(), PhiCategory::DateOfBirth);
        assert!("fingerprint".parse::<PhiCategory>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for category in PhiCategory::ALL {
            assert_eq!(category.to_string().parse::<PhiCategory>().unwrap(), category);
        }
    }

    #[test]
    fn test_labels_are_bracketed() {
        for category in PhiCategory::ALL {
            let label = category.label();
            assert!(label.starts_with('[') && label.ends_with(']'));
        }
    }
}
