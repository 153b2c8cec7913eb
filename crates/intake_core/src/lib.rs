pub mod controller;
pub mod currency;
pub mod deadline;
pub mod summary;
pub mod webhook;

pub use controller::{
    IntakeController, Phase, SubmitOutcome, SupportContact, DEFAULT_MIN_PROCESSING,
    FIELD_REQUIRED,
};
pub use summary::{fallback_summary, GeminiSummarizer, MissingSummarizer, Summarizer};
pub use webhook::{CaseSink, MissingCaseSink, WebhookSink};

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod controller_tests;

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod http_tests;
