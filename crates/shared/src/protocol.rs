use serde::{Deserialize, Serialize};

use crate::domain::{FormData, FormField};

/// Row appended to the case-management sheet by the intake webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetPayload {
    pub petitioner_name: String,
    pub respondent_name: String,
    pub claim_value: String,
    pub description: String,
    pub urgency_level: String,
    pub stakeholder_type: String,
    pub requested_service: String,
    pub deadline_details: String,
    pub smart_summary: String,
}

impl SheetPayload {
    pub fn from_form(form: &FormData, smart_summary: impl Into<String>) -> Self {
        Self {
            petitioner_name: form.petitioner_name.clone(),
            respondent_name: form.respondent_name.clone(),
            claim_value: form.claim_amount.clone(),
            description: form.description.clone(),
            urgency_level: form.value_of(FormField::Urgency).to_string(),
            stakeholder_type: form.value_of(FormField::StakeholderType).to_string(),
            requested_service: form.value_of(FormField::ServiceTrack).to_string(),
            deadline_details: form.deadline_details.clone(),
            smart_summary: smart_summary.into(),
        }
    }
}
