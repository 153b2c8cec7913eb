use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{FormData, FormField, ServiceTrack, StakeholderType, Step, UrgencyLevel},
    error::{ErrorCode, GENERIC_FILING_FAILURE},
    protocol::SheetPayload,
};
use tokio::sync::Mutex;

use crate::{
    controller::{IntakeController, Phase, SubmitOutcome, FIELD_REQUIRED},
    summary::{MissingSummarizer, Summarizer},
    webhook::CaseSink,
};

#[derive(Clone, Default)]
struct CallLog {
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl CallLog {
    async fn push(&self, call: &'static str) {
        self.calls.lock().await.push(call);
    }

    async fn snapshot(&self) -> Vec<&'static str> {
        self.calls.lock().await.clone()
    }
}

struct TestSummarizer {
    reply: Option<String>,
    log: CallLog,
}

impl TestSummarizer {
    fn ok(reply: &str, log: CallLog) -> Self {
        Self {
            reply: Some(reply.to_string()),
            log,
        }
    }

    fn failing(log: CallLog) -> Self {
        Self { reply: None, log }
    }
}

#[async_trait]
impl Summarizer for TestSummarizer {
    async fn summarize(&self, _form: &FormData) -> Result<String> {
        self.log.push("summarize").await;
        self.reply
            .clone()
            .ok_or_else(|| anyhow!("summary backend exploded"))
    }
}

struct TestSink {
    fail_with: Option<String>,
    delivered: Arc<Mutex<Vec<SheetPayload>>>,
    log: CallLog,
}

impl TestSink {
    fn ok(log: CallLog) -> Self {
        Self {
            fail_with: None,
            delivered: Arc::new(Mutex::new(Vec::new())),
            log,
        }
    }

    fn failing(err: impl Into<String>, log: CallLog) -> Self {
        Self {
            fail_with: Some(err.into()),
            delivered: Arc::new(Mutex::new(Vec::new())),
            log,
        }
    }
}

#[async_trait]
impl CaseSink for TestSink {
    async fn deliver(&self, payload: &SheetPayload) -> Result<()> {
        self.log.push("deliver").await;
        if let Some(err) = &self.fail_with {
            return Err(anyhow!(err.clone()));
        }
        self.delivered.lock().await.push(payload.clone());
        Ok(())
    }
}

fn controller_with(
    summarizer: impl Summarizer + 'static,
    sink: Arc<TestSink>,
) -> IntakeController {
    IntakeController::new(Arc::new(summarizer), sink).with_min_processing(Duration::ZERO)
}

fn fill_all_steps(controller: &mut IntakeController) {
    controller.set_stakeholder_type(Some(StakeholderType::Individual));
    controller.set_service_track(Some(ServiceTrack::Mediation));
    assert!(controller.advance());
    controller.set_petitioner_name("Meera Iyer");
    controller.set_respondent_name("Skyline Builders");
    assert!(controller.advance());
    controller.set_claim_amount_input("7,00,000");
    controller.set_description("Possession of the flat delayed by two years.");
    controller.set_urgency(Some(UrgencyLevel::High));
}

#[test]
fn starts_empty_on_first_step() {
    let log = CallLog::default();
    let controller = controller_with(MissingSummarizer, Arc::new(TestSink::ok(log)));
    assert_eq!(controller.form(), &FormData::default());
    assert_eq!(controller.step(), Step::ServiceSelection);
    assert_eq!(controller.phase(), Phase::Editing(Step::ServiceSelection));
    assert_eq!(controller.touched().count(), 0);
    assert!(!controller.is_support_open());
}

#[test]
fn advance_from_first_step_touches_missing_track_and_stays() {
    let log = CallLog::default();
    let mut controller = controller_with(MissingSummarizer, Arc::new(TestSink::ok(log)));
    controller.set_stakeholder_type(Some(StakeholderType::Individual));

    assert!(!controller.advance());
    assert_eq!(controller.step().number(), 1);
    assert!(controller.is_touched(FormField::ServiceTrack));
    assert!(controller.is_touched(FormField::StakeholderType));
    assert_eq!(
        controller.field_error(FormField::ServiceTrack),
        Some(FIELD_REQUIRED)
    );
    assert_eq!(controller.field_error(FormField::StakeholderType), None);
    assert!(!controller.is_touched(FormField::PetitionerName));
}

#[test]
fn step_validity_tracks_required_fields() {
    let log = CallLog::default();
    let mut controller = controller_with(MissingSummarizer, Arc::new(TestSink::ok(log)));

    controller.set_service_track(Some(ServiceTrack::Mediation));
    assert!(!controller.is_step_valid(Step::ServiceSelection));
    controller.set_stakeholder_type(Some(StakeholderType::Individual));
    assert!(controller.is_step_valid(Step::ServiceSelection));

    controller.set_petitioner_name("Meera Iyer");
    assert!(!controller.is_step_valid(Step::EntityVerification));
    controller.set_respondent_name("Skyline Builders");
    assert!(controller.is_step_valid(Step::EntityVerification));

    controller.set_claim_amount_input("5000");
    controller.set_description("Refund withheld");
    assert!(!controller.is_step_valid(Step::CaseDisclosures));
    controller.set_urgency(Some(UrgencyLevel::Low));
    assert!(controller.is_step_valid(Step::CaseDisclosures));
    assert!(controller.form().deadline_details.is_empty());
}

#[test]
fn back_is_ungated_and_clamped() {
    let log = CallLog::default();
    let mut controller = controller_with(MissingSummarizer, Arc::new(TestSink::ok(log)));
    assert!(!controller.back());
    assert_eq!(controller.step(), Step::ServiceSelection);

    fill_all_steps(&mut controller);
    assert_eq!(controller.step(), Step::CaseDisclosures);
    assert!(!controller.advance());
    assert_eq!(controller.step(), Step::CaseDisclosures);

    controller.set_petitioner_name("");
    assert!(controller.back());
    assert_eq!(controller.step(), Step::EntityVerification);
    assert!(controller.back());
    assert_eq!(controller.step(), Step::ServiceSelection);
}

#[test]
fn field_errors_need_touch_and_emptiness() {
    let log = CallLog::default();
    let mut controller = controller_with(MissingSummarizer, Arc::new(TestSink::ok(log)));
    assert_eq!(controller.field_error(FormField::PetitionerName), None);

    controller.touch(FormField::PetitionerName);
    controller.touch(FormField::PetitionerName);
    assert_eq!(controller.touched().count(), 1);
    assert_eq!(
        controller.field_error(FormField::PetitionerName),
        Some(FIELD_REQUIRED)
    );

    controller.set_petitioner_name("  ");
    assert_eq!(controller.field_error(FormField::PetitionerName), None);
}

#[test]
fn update_field_parses_wire_strings() {
    let log = CallLog::default();
    let mut controller = controller_with(MissingSummarizer, Arc::new(TestSink::ok(log)));

    controller.update_field(FormField::StakeholderType, "Enterprise/Lender");
    controller.update_field(FormField::Urgency, "Immediate Action Required");
    controller.update_field(FormField::ServiceTrack, "Litigation");
    controller.update_field(FormField::ClaimAmount, "12,34,567");

    let form = controller.form();
    assert_eq!(form.stakeholder_type, Some(StakeholderType::EnterpriseLender));
    assert_eq!(form.urgency, Some(UrgencyLevel::ImmediateActionRequired));
    assert_eq!(form.service_track, None);
    assert_eq!(form.claim_amount, "1234567");
    assert_eq!(controller.claim_display(), "12,34,567");
}

#[test]
fn deadline_inputs_share_one_field() {
    let log = CallLog::default();
    let mut controller = controller_with(MissingSummarizer, Arc::new(TestSink::ok(log)));

    controller.set_deadline_date("2025-06-01");
    controller.set_deadline_note("Court hearing");
    assert_eq!(controller.form().deadline_details, "2025-06-01 | Court hearing");
    assert_eq!(controller.deadline_date(), Some("2025-06-01"));
    assert_eq!(controller.deadline_note(), "Court hearing");

    controller.reset();
    controller.set_deadline_note("Court hearing");
    assert_eq!(controller.form().deadline_details, "Court hearing");
    assert_eq!(controller.deadline_date(), None);
}

#[test]
fn load_form_normalizes_claim_amount() {
    let log = CallLog::default();
    let mut controller = controller_with(MissingSummarizer, Arc::new(TestSink::ok(log)));
    controller.load_form(FormData {
        claim_amount: "INR 7,00,000".into(),
        ..FormData::default()
    });
    assert_eq!(controller.form().claim_amount, "700000");
    assert_eq!(controller.claim_display(), "7,00,000");
}

#[tokio::test]
async fn submit_with_missing_disclosures_has_no_side_effects() {
    let log = CallLog::default();
    let sink = Arc::new(TestSink::ok(log.clone()));
    let mut controller = controller_with(TestSummarizer::ok("s", log.clone()), sink.clone());
    fill_all_steps(&mut controller);
    controller.set_description("");

    assert_eq!(controller.submit().await, SubmitOutcome::Incomplete);
    assert!(controller.is_touched(FormField::Description));
    assert!(controller.is_touched(FormField::Urgency));
    assert!(!controller.is_touched(FormField::DeadlineDetails));
    assert_eq!(
        controller.field_error(FormField::Description),
        Some(FIELD_REQUIRED)
    );
    assert!(!controller.is_success());
    assert!(log.snapshot().await.is_empty());
}

#[tokio::test]
async fn submit_before_final_step_is_unavailable() {
    let log = CallLog::default();
    let mut controller = controller_with(
        TestSummarizer::ok("s", log.clone()),
        Arc::new(TestSink::ok(log.clone())),
    );
    assert_eq!(controller.submit().await, SubmitOutcome::Unavailable);
    assert_eq!(controller.touched().count(), 0);
    assert!(log.snapshot().await.is_empty());
}

#[tokio::test]
async fn successful_submit_summarizes_then_delivers() {
    let log = CallLog::default();
    let sink = Arc::new(TestSink::ok(log.clone()));
    let mut controller = controller_with(
        TestSummarizer::ok("Delayed possession dispute.", log.clone()),
        sink.clone(),
    );
    fill_all_steps(&mut controller);
    controller.set_deadline_date("2025-06-01");

    let payload = match controller.submit().await {
        SubmitOutcome::Filed(payload) => payload,
        other => panic!("expected filed outcome, got {other:?}"),
    };

    assert_eq!(log.snapshot().await, vec!["summarize", "deliver"]);
    assert_eq!(payload.smart_summary, "Delayed possession dispute.");
    assert_eq!(payload.claim_value, "700000");
    assert_eq!(payload.requested_service, "Mediation");
    assert_eq!(payload.urgency_level, "High");
    assert_eq!(payload.deadline_details, "2025-06-01");
    assert_eq!(sink.delivered.lock().await.as_slice(), &[payload]);
    assert!(controller.is_success());
    assert!(!controller.is_submitting());
    assert_eq!(controller.phase(), Phase::Filed);
    assert_eq!(controller.submit().await, SubmitOutcome::Unavailable);
}

#[tokio::test]
async fn failing_summarizer_still_files_with_fallback() {
    let log = CallLog::default();
    let sink = Arc::new(TestSink::ok(log.clone()));
    let mut controller = controller_with(TestSummarizer::failing(log.clone()), sink.clone());
    fill_all_steps(&mut controller);

    let outcome = controller.submit().await;
    assert!(matches!(outcome, SubmitOutcome::Filed(_)));
    assert!(controller.is_success());

    let delivered = sink.delivered.lock().await;
    let summary = &delivered[0].smart_summary;
    assert!(summary.starts_with("Case between Meera Iyer and Skyline Builders"));
    assert!(summary.contains("INR 700000"));
    assert!(summary.ends_with("..."));
}

#[tokio::test]
async fn delivery_failure_reports_generic_error() {
    let log = CallLog::default();
    let sink = Arc::new(TestSink::failing("connection refused", log.clone()));
    let mut controller = controller_with(TestSummarizer::ok("s", log.clone()), sink);
    fill_all_steps(&mut controller);

    let failure = match controller.submit().await {
        SubmitOutcome::Failed(failure) => failure,
        other => panic!("expected failure, got {other:?}"),
    };
    assert_eq!(failure.code, ErrorCode::DeliveryFailed);
    assert_eq!(failure.message, GENERIC_FILING_FAILURE);
    assert!(!controller.is_success());
    assert!(!controller.is_submitting());
    assert_eq!(controller.last_error(), Some(&failure));
    assert_eq!(controller.phase(), Phase::Editing(Step::CaseDisclosures));
    assert_eq!(log.snapshot().await, vec!["summarize", "deliver"]);

    // The form is kept so the user can retry.
    assert_eq!(controller.form().petitioner_name, "Meera Iyer");
}

#[tokio::test(start_paused = true)]
async fn submit_holds_for_min_processing() {
    let log = CallLog::default();
    let mut controller = IntakeController::new(
        Arc::new(TestSummarizer::ok("s", log.clone())),
        Arc::new(TestSink::ok(log.clone())),
    );
    fill_all_steps(&mut controller);

    let started = tokio::time::Instant::now();
    assert!(matches!(controller.submit().await, SubmitOutcome::Filed(_)));
    assert!(started.elapsed() >= Duration::from_secs(3));
}

#[tokio::test]
async fn reset_after_success_restores_initial_shape() {
    let log = CallLog::default();
    let mut controller = controller_with(
        TestSummarizer::ok("s", log.clone()),
        Arc::new(TestSink::ok(log.clone())),
    );
    fill_all_steps(&mut controller);
    controller.open_support();
    assert!(matches!(controller.submit().await, SubmitOutcome::Filed(_)));

    controller.reset();
    assert_eq!(controller.form(), &FormData::default());
    assert_eq!(controller.step(), Step::ServiceSelection);
    assert_eq!(controller.claim_display(), "");
    assert_eq!(controller.touched().count(), 0);
    assert!(!controller.is_success());
    assert!(controller.is_support_open());
    controller.close_support();
    assert!(!controller.is_support_open());
}
