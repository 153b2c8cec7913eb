use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Literal separator between the date and the note halves of `deadline_details`.
pub const DEADLINE_DELIMITER: &str = " | ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Closed set of values that travel over the wire as their exact label.
pub trait WireValue: Copy + 'static {
    fn as_str(self) -> &'static str;
}

macro_rules! wire_enum {
    ($name:ident, $kind:literal { $($variant:ident => $wire:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
        }

        impl WireValue for $name {
            fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let raw = raw.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|value| value.as_str().eq_ignore_ascii_case(raw))
                    .ok_or_else(|| UnknownVariant {
                        kind: $kind,
                        value: raw.to_string(),
                    })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(de::Error::custom)
            }
        }
    };
}

wire_enum!(StakeholderType, "stakeholder class" {
    Individual => "Individual",
    EnterpriseLender => "Enterprise/Lender",
    Neutral => "Neutral",
});

wire_enum!(ServiceTrack, "resolution track" {
    Negotiation => "Negotiation",
    Mediation => "Mediation",
    Arbitration => "Arbitration",
});

wire_enum!(UrgencyLevel, "urgency level" {
    Low => "Low",
    Medium => "Medium",
    High => "High",
    ImmediateActionRequired => "Immediate Action Required",
});

impl UrgencyLevel {
    pub fn label(self) -> &'static str {
        match self {
            UrgencyLevel::Low => "Standard (30 days)",
            UrgencyLevel::Medium => "Urgent (14 days)",
            UrgencyLevel::High => "Critical (7 days)",
            UrgencyLevel::ImmediateActionRequired => "Immediate Action",
        }
    }

    /// Implied response expectation in days. Informational only.
    pub fn response_window_days(self) -> Option<u32> {
        match self {
            UrgencyLevel::Low => Some(30),
            UrgencyLevel::Medium => Some(14),
            UrgencyLevel::High => Some(7),
            UrgencyLevel::ImmediateActionRequired => None,
        }
    }
}

/// Serde adapter for optional wire enums: unset travels as `""`.
pub mod blank_as_none {
    use std::{fmt::Display, str::FromStr};

    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::WireValue;

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: WireValue,
        S: Serializer,
    {
        serializer.serialize_str(value.map(WireValue::as_str).unwrap_or(""))
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        if raw.trim().is_empty() {
            return Ok(None);
        }
        raw.parse().map(Some).map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormField {
    StakeholderType,
    ServiceTrack,
    PetitionerName,
    RespondentName,
    ClaimAmount,
    Description,
    Urgency,
    DeadlineDetails,
}

impl FormField {
    pub const ALL: [FormField; 8] = [
        FormField::StakeholderType,
        FormField::ServiceTrack,
        FormField::PetitionerName,
        FormField::RespondentName,
        FormField::ClaimAmount,
        FormField::Description,
        FormField::Urgency,
        FormField::DeadlineDetails,
    ];

    /// Key used by the intake form model.
    pub fn as_str(self) -> &'static str {
        match self {
            FormField::StakeholderType => "stakeholderType",
            FormField::ServiceTrack => "serviceTrack",
            FormField::PetitionerName => "petitionerName",
            FormField::RespondentName => "respondentName",
            FormField::ClaimAmount => "claimAmount",
            FormField::Description => "description",
            FormField::Urgency => "urgency",
            FormField::DeadlineDetails => "deadlineDetails",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::StakeholderType => "Stakeholder Class",
            FormField::ServiceTrack => "Resolution Track",
            FormField::PetitionerName => "Petitioner Name",
            FormField::RespondentName => "Respondent Name",
            FormField::ClaimAmount => "Total Claim Amount (INR)",
            FormField::Description => "Detailed Dispute Description",
            FormField::Urgency => "Urgency Level",
            FormField::DeadlineDetails => "Deadline Details (Optional)",
        }
    }

    pub fn step(self) -> Step {
        match self {
            FormField::StakeholderType | FormField::ServiceTrack => Step::ServiceSelection,
            FormField::PetitionerName | FormField::RespondentName => Step::EntityVerification,
            FormField::ClaimAmount
            | FormField::Description
            | FormField::Urgency
            | FormField::DeadlineDetails => Step::CaseDisclosures,
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormField {
    type Err = UnknownVariant;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        FormField::ALL
            .into_iter()
            .find(|field| field.as_str() == raw.trim())
            .ok_or_else(|| UnknownVariant {
                kind: "form field",
                value: raw.to_string(),
            })
    }
}

/// Wizard position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Step {
    #[default]
    ServiceSelection,
    EntityVerification,
    CaseDisclosures,
}

impl Step {
    pub const ALL: [Step; 3] = [
        Step::ServiceSelection,
        Step::EntityVerification,
        Step::CaseDisclosures,
    ];

    pub fn number(self) -> u8 {
        match self {
            Step::ServiceSelection => 1,
            Step::EntityVerification => 2,
            Step::CaseDisclosures => 3,
        }
    }

    /// Clamps into `1..=3`.
    pub fn from_number(number: u8) -> Self {
        match number {
            0 | 1 => Step::ServiceSelection,
            2 => Step::EntityVerification,
            _ => Step::CaseDisclosures,
        }
    }

    pub fn next(self) -> Self {
        Self::from_number(self.number().saturating_add(1))
    }

    pub fn previous(self) -> Self {
        Self::from_number(self.number().saturating_sub(1))
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::ServiceSelection => "Service Selection",
            Step::EntityVerification => "Entity Verification",
            Step::CaseDisclosures => "Case Disclosures",
        }
    }

    pub fn subtitle(self) -> &'static str {
        match self {
            Step::ServiceSelection => "Define your stakeholder class and resolution track.",
            Step::EntityVerification => "Enter the legal designations for the parties involved.",
            Step::CaseDisclosures => "Specify financial parameters and factual details.",
        }
    }

    /// Fields that gate leaving this step. Deadline details are optional.
    pub fn required_fields(self) -> &'static [FormField] {
        match self {
            Step::ServiceSelection => &[FormField::StakeholderType, FormField::ServiceTrack],
            Step::EntityVerification => &[FormField::PetitionerName, FormField::RespondentName],
            Step::CaseDisclosures => &[
                FormField::ClaimAmount,
                FormField::Description,
                FormField::Urgency,
            ],
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// One filing session's worth of user input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormData {
    #[serde(with = "blank_as_none")]
    pub stakeholder_type: Option<StakeholderType>,
    #[serde(with = "blank_as_none")]
    pub service_track: Option<ServiceTrack>,
    pub petitioner_name: String,
    pub respondent_name: String,
    /// Digits only; the grouped display form is derived on demand.
    pub claim_amount: String,
    pub description: String,
    #[serde(with = "blank_as_none")]
    pub urgency: Option<UrgencyLevel>,
    pub deadline_details: String,
}

impl FormData {
    /// Current value of `field` as it would be rendered; unset enums are `""`.
    pub fn value_of(&self, field: FormField) -> &str {
        match field {
            FormField::StakeholderType => self.stakeholder_type.map(WireValue::as_str).unwrap_or(""),
            FormField::ServiceTrack => self.service_track.map(WireValue::as_str).unwrap_or(""),
            FormField::PetitionerName => self.petitioner_name.as_str(),
            FormField::RespondentName => self.respondent_name.as_str(),
            FormField::ClaimAmount => self.claim_amount.as_str(),
            FormField::Description => self.description.as_str(),
            FormField::Urgency => self.urgency.map(WireValue::as_str).unwrap_or(""),
            FormField::DeadlineDetails => self.deadline_details.as_str(),
        }
    }

    pub fn is_present(&self, field: FormField) -> bool {
        !self.value_of(field).is_empty()
    }

    pub fn is_step_complete(&self, step: Step) -> bool {
        step.required_fields()
            .iter()
            .all(|field| self.is_present(*field))
    }
}
