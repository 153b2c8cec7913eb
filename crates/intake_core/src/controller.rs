use std::{collections::BTreeSet, sync::Arc, time::Duration};

use anyhow::Result;
use shared::{
    domain::{FormData, FormField, ServiceTrack, StakeholderType, Step, UrgencyLevel},
    error::FilingError,
    protocol::SheetPayload,
};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::{
    currency::{digits_only, display_amount, format_currency_input},
    deadline,
    summary::{summarize_or_fallback, Summarizer},
    webhook::CaseSink,
};

/// How long the processing state stays up after the webhook call returns.
pub const DEFAULT_MIN_PROCESSING: Duration = Duration::from_secs(3);
pub const FIELD_REQUIRED: &str = "This field is required";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportContact {
    pub phone: String,
    pub email: String,
}

impl Default for SupportContact {
    fn default() -> Self {
        Self {
            phone: "+91 8447728708".into(),
            email: "info@presolv360.com".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Editing(Step),
    Submitting,
    Filed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Not on the final step, or a filing is already in flight or complete.
    Unavailable,
    /// Required case disclosures are missing; their fields are now touched.
    Incomplete,
    Filed(SheetPayload),
    Failed(FilingError),
}

/// Owns one filing session: field values, wizard step, touched fields, and
/// the submission flow.
pub struct IntakeController {
    session_id: Uuid,
    summarizer: Arc<dyn Summarizer>,
    sink: Arc<dyn CaseSink>,
    min_processing: Duration,
    form: FormData,
    touched: BTreeSet<FormField>,
    step: Step,
    claim_display: String,
    submitting: bool,
    success: bool,
    support_open: bool,
    last_error: Option<FilingError>,
}

impl IntakeController {
    pub fn new(summarizer: Arc<dyn Summarizer>, sink: Arc<dyn CaseSink>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            summarizer,
            sink,
            min_processing: DEFAULT_MIN_PROCESSING,
            form: FormData::default(),
            touched: BTreeSet::new(),
            step: Step::default(),
            claim_display: String::new(),
            submitting: false,
            success: false,
            support_open: false,
            last_error: None,
        }
    }

    pub fn with_min_processing(mut self, min_processing: Duration) -> Self {
        self.min_processing = min_processing;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn form(&self) -> &FormData {
        &self.form
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn phase(&self) -> Phase {
        if self.success {
            Phase::Filed
        } else if self.submitting {
            Phase::Submitting
        } else {
            Phase::Editing(self.step)
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn last_error(&self) -> Option<&FilingError> {
        self.last_error.as_ref()
    }

    pub fn claim_display(&self) -> &str {
        &self.claim_display
    }

    pub fn set_stakeholder_type(&mut self, value: Option<StakeholderType>) {
        self.form.stakeholder_type = value;
    }

    pub fn set_service_track(&mut self, value: Option<ServiceTrack>) {
        self.form.service_track = value;
    }

    pub fn set_urgency(&mut self, value: Option<UrgencyLevel>) {
        self.form.urgency = value;
    }

    pub fn set_petitioner_name(&mut self, value: impl Into<String>) {
        self.form.petitioner_name = value.into();
    }

    pub fn set_respondent_name(&mut self, value: impl Into<String>) {
        self.form.respondent_name = value.into();
    }

    pub fn set_description(&mut self, value: impl Into<String>) {
        self.form.description = value.into();
    }

    /// Takes raw keystrokes; stores the digits and returns the display form.
    pub fn set_claim_amount_input(&mut self, input: &str) -> &str {
        let amount = format_currency_input(input);
        self.form.claim_amount = amount.raw;
        self.claim_display = amount.display;
        &self.claim_display
    }

    pub fn set_deadline_date(&mut self, date: &str) {
        self.form.deadline_details = deadline::with_date(&self.form.deadline_details, date);
    }

    pub fn set_deadline_note(&mut self, note: &str) {
        self.form.deadline_details = deadline::with_note(&self.form.deadline_details, note);
    }

    pub fn deadline_date(&self) -> Option<&str> {
        deadline::date_part(&self.form.deadline_details)
    }

    pub fn deadline_note(&self) -> &str {
        deadline::note_part(&self.form.deadline_details)
    }

    /// Stores a field from its textual form. Enum values that do not parse
    /// are stored as unset.
    pub fn update_field(&mut self, field: FormField, value: &str) {
        match field {
            FormField::StakeholderType => self.form.stakeholder_type = value.parse().ok(),
            FormField::ServiceTrack => self.form.service_track = value.parse().ok(),
            FormField::Urgency => self.form.urgency = value.parse().ok(),
            FormField::PetitionerName => self.form.petitioner_name = value.to_string(),
            FormField::RespondentName => self.form.respondent_name = value.to_string(),
            FormField::Description => self.form.description = value.to_string(),
            FormField::DeadlineDetails => self.form.deadline_details = value.to_string(),
            FormField::ClaimAmount => {
                self.set_claim_amount_input(value);
            }
        }
    }

    /// Replaces the whole record, e.g. from a saved case file.
    pub fn load_form(&mut self, form: FormData) {
        self.claim_display = display_amount(&form.claim_amount);
        self.form = form;
        self.form.claim_amount = digits_only(&self.form.claim_amount);
    }

    pub fn touch(&mut self, field: FormField) {
        self.touched.insert(field);
    }

    pub fn mark_touched(&mut self, fields: impl IntoIterator<Item = FormField>) {
        self.touched.extend(fields);
    }

    pub fn is_touched(&self, field: FormField) -> bool {
        self.touched.contains(&field)
    }

    pub fn touched(&self) -> impl Iterator<Item = FormField> + '_ {
        self.touched.iter().copied()
    }

    pub fn is_step_valid(&self, step: Step) -> bool {
        self.form.is_step_complete(step)
    }

    /// Inline error for `field`: only once touched, and only when empty.
    pub fn field_error(&self, field: FormField) -> Option<&'static str> {
        (self.is_touched(field) && !self.form.is_present(field)).then_some(FIELD_REQUIRED)
    }

    /// Moves forward when the current step is complete. The step's required
    /// fields are touched either way. Returns whether the step changed.
    pub fn advance(&mut self) -> bool {
        if self.step == Step::CaseDisclosures {
            return false;
        }

        let from = self.step;
        self.mark_touched(from.required_fields().iter().copied());
        if !self.is_step_valid(from) {
            debug!(
                "intake: advance blocked session={} step={}",
                self.session_id, self.step
            );
            return false;
        }

        self.step = from.next();
        debug!(
            "intake: advanced session={} from={} to={}",
            self.session_id, from, self.step
        );
        from != self.step
    }

    pub fn back(&mut self) -> bool {
        let from = self.step;
        self.step = self.step.previous();
        from != self.step
    }

    /// Runs the filing: summarize (falling back on failure), deliver, hold
    /// for the minimum processing time, then enter the filed state.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.step != Step::CaseDisclosures || self.submitting || self.success {
            return SubmitOutcome::Unavailable;
        }

        self.mark_touched(Step::CaseDisclosures.required_fields().iter().copied());
        if !self.is_step_valid(Step::CaseDisclosures) {
            debug!("intake: submit blocked session={}", self.session_id);
            return SubmitOutcome::Incomplete;
        }

        self.submitting = true;
        self.last_error = None;
        info!("intake: submit started session={}", self.session_id);

        let result = self.process_filing().await;
        self.submitting = false;

        match result {
            Ok(payload) => {
                self.success = true;
                info!("intake: filing complete session={}", self.session_id);
                SubmitOutcome::Filed(payload)
            }
            Err(err) => {
                error!(
                    "intake: submission failed session={}: {err:#}",
                    self.session_id
                );
                let failure = FilingError::delivery_failed();
                self.last_error = Some(failure.clone());
                SubmitOutcome::Failed(failure)
            }
        }
    }

    async fn process_filing(&self) -> Result<SheetPayload> {
        let summary = summarize_or_fallback(self.summarizer.as_ref(), &self.form).await;
        let payload = SheetPayload::from_form(&self.form, summary);
        self.sink.deliver(&payload).await?;

        if !self.min_processing.is_zero() {
            tokio::time::sleep(self.min_processing).await;
        }

        Ok(payload)
    }

    /// Starts a fresh filing in the same session.
    pub fn reset(&mut self) {
        self.form = FormData::default();
        self.touched.clear();
        self.claim_display.clear();
        self.success = false;
        self.last_error = None;
        self.step = Step::default();
    }

    pub fn is_support_open(&self) -> bool {
        self.support_open
    }

    pub fn open_support(&mut self) {
        self.support_open = true;
    }

    pub fn close_support(&mut self) {
        self.support_open = false;
    }
}
