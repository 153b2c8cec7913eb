use std::{
    io::{BufRead, Write},
    str::FromStr,
};

use anyhow::Result;
use intake_core::{deadline::looks_like_date, IntakeController, Phase, SubmitOutcome, SupportContact};
use shared::domain::{FormField, ServiceTrack, StakeholderType, Step, UrgencyLevel, WireValue};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
#[error("input closed")]
struct InputClosed;

enum Flow {
    Continue,
    Quit,
}

pub struct Wizard<R, W> {
    input: R,
    out: W,
    support: SupportContact,
    filed: usize,
}

impl<R: BufRead, W: Write> Wizard<R, W> {
    pub fn new(input: R, out: W, support: SupportContact) -> Self {
        Self {
            input,
            out,
            support,
            filed: 0,
        }
    }

    /// Drives `controller` until the user quits or input ends. Returns the
    /// number of filings completed.
    pub async fn run(&mut self, controller: &mut IntakeController) -> Result<usize> {
        match self.drive(controller).await {
            Ok(()) => Ok(self.filed),
            Err(err) if err.is::<InputClosed>() => {
                debug!("wizard: input closed");
                Ok(self.filed)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    async fn drive(&mut self, controller: &mut IntakeController) -> Result<()> {
        writeln!(self.out, "Dispute Filing Portal")?;
        writeln!(
            self.out,
            "Intelligent intake for accelerated dispute resolution."
        )?;

        loop {
            let flow = match controller.phase() {
                Phase::Filed => self.success_screen(controller)?,
                Phase::Editing(_) | Phase::Submitting => {
                    let step = controller.step();
                    self.step_screen(controller, step).await?
                }
            };
            if let Flow::Quit = flow {
                return Ok(());
            }
        }
    }

    fn read_line(&mut self) -> Result<String> {
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(InputClosed.into());
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Shows `current` as a hint and returns the raw line.
    fn prompt(&mut self, label: &str, current: &str) -> Result<String> {
        if current.is_empty() {
            write!(self.out, "{label}: ")?;
        } else {
            write!(self.out, "{label} [{current}]: ")?;
        }
        self.read_line()
    }

    /// Blank input keeps `current`.
    fn ask(&mut self, label: &str, current: &str) -> Result<String> {
        let line = self.prompt(label, current)?;
        Ok(if line.is_empty() {
            current.to_string()
        } else {
            line
        })
    }

    fn choose<T>(
        &mut self,
        label: &str,
        options: &[T],
        describe: fn(T) -> &'static str,
        current: Option<T>,
    ) -> Result<Option<T>>
    where
        T: WireValue + FromStr + PartialEq,
    {
        writeln!(self.out, "{label}")?;
        for (idx, option) in options.iter().enumerate() {
            let marker = if current == Some(*option) { "*" } else { " " };
            writeln!(self.out, " {marker}{}) {}", idx + 1, describe(*option))?;
        }

        loop {
            write!(self.out, "Select 1-{}: ", options.len())?;
            let line = self.read_line()?;
            let line = line.trim();
            if line.is_empty() {
                return Ok(current);
            }
            if let Some(option) = line
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|idx| options.get(idx))
            {
                return Ok(Some(*option));
            }
            if let Ok(option) = line.parse::<T>() {
                return Ok(Some(option));
            }
            writeln!(self.out, "  Unknown choice '{line}'")?;
        }
    }

    async fn step_screen(&mut self, controller: &mut IntakeController, step: Step) -> Result<Flow> {
        writeln!(self.out)?;
        writeln!(self.out, "Step {step} of 3 · {}", step.title())?;
        writeln!(self.out, "{}", step.subtitle())?;

        match step {
            Step::ServiceSelection => self.fill_service_selection(controller)?,
            Step::EntityVerification => self.fill_entity_verification(controller)?,
            Step::CaseDisclosures => self.fill_case_disclosures(controller)?,
        }

        let next_label = if step == Step::CaseDisclosures {
            "submit"
        } else {
            "continue"
        };
        write!(
            self.out,
            "[Enter] {next_label}  [b] back  [s] support  [q] quit: "
        )?;
        let action = self.read_line()?;

        match action.trim().to_ascii_lowercase().as_str() {
            "" if step == Step::CaseDisclosures => self.submit(controller).await?,
            "" => {
                if !controller.advance() {
                    self.show_errors(controller, step)?;
                }
            }
            "b" => {
                controller.back();
            }
            "s" => self.support_panel(controller)?,
            "q" => return Ok(Flow::Quit),
            other => writeln!(self.out, "  Unknown action '{other}'")?,
        }

        Ok(Flow::Continue)
    }

    fn fill_service_selection(&mut self, controller: &mut IntakeController) -> Result<()> {
        let stakeholder = self.choose(
            FormField::StakeholderType.label(),
            StakeholderType::ALL,
            StakeholderType::as_str,
            controller.form().stakeholder_type,
        )?;
        controller.set_stakeholder_type(stakeholder);
        controller.touch(FormField::StakeholderType);

        let track = self.choose(
            FormField::ServiceTrack.label(),
            ServiceTrack::ALL,
            ServiceTrack::as_str,
            controller.form().service_track,
        )?;
        controller.set_service_track(track);
        controller.touch(FormField::ServiceTrack);
        Ok(())
    }

    fn fill_entity_verification(&mut self, controller: &mut IntakeController) -> Result<()> {
        let current = controller.form().petitioner_name.clone();
        let petitioner = self.ask(FormField::PetitionerName.label(), &current)?;
        controller.set_petitioner_name(petitioner);
        controller.touch(FormField::PetitionerName);

        let current = controller.form().respondent_name.clone();
        let respondent = self.ask(FormField::RespondentName.label(), &current)?;
        controller.set_respondent_name(respondent);
        controller.touch(FormField::RespondentName);
        Ok(())
    }

    fn fill_case_disclosures(&mut self, controller: &mut IntakeController) -> Result<()> {
        let current = controller.claim_display().to_string();
        let claim = self.prompt(FormField::ClaimAmount.label(), &current)?;
        let display = if claim.trim().is_empty() {
            current
        } else {
            controller.set_claim_amount_input(&claim).to_string()
        };
        if !display.is_empty() {
            writeln!(self.out, "  INR {display}")?;
        }
        controller.touch(FormField::ClaimAmount);

        let urgency = self.choose(
            FormField::Urgency.label(),
            UrgencyLevel::ALL,
            UrgencyLevel::label,
            controller.form().urgency,
        )?;
        controller.set_urgency(urgency);
        controller.touch(FormField::Urgency);

        writeln!(self.out, "{} ('-' clears)", FormField::DeadlineDetails.label())?;
        loop {
            let current = controller.deadline_date().unwrap_or_default().to_string();
            let date = self.ask("  Date (YYYY-MM-DD)", &current)?;
            if date == "-" {
                controller.set_deadline_date("");
                break;
            }
            if date.is_empty() || looks_like_date(&date) {
                if date != current {
                    controller.set_deadline_date(&date);
                }
                break;
            }
            writeln!(self.out, "  Enter the date as YYYY-MM-DD")?;
        }

        let current = controller.deadline_note().to_string();
        let note = self.ask("  Details (e.g. court date)", &current)?;
        if note == "-" {
            controller.set_deadline_note("");
        } else if note != current {
            controller.set_deadline_note(&note);
        }

        let current = controller.form().description.clone();
        let description = self.ask(FormField::Description.label(), &current)?;
        controller.set_description(description);
        controller.touch(FormField::Description);
        Ok(())
    }

    fn show_errors(&mut self, controller: &IntakeController, step: Step) -> Result<()> {
        for field in step.required_fields() {
            if let Some(message) = controller.field_error(*field) {
                writeln!(self.out, "  ! {}: {message}", field.label())?;
            }
        }
        Ok(())
    }

    async fn submit(&mut self, controller: &mut IntakeController) -> Result<()> {
        writeln!(
            self.out,
            "Analyzing case disclosures and mapping legal parameters..."
        )?;
        self.out.flush()?;

        match controller.submit().await {
            SubmitOutcome::Filed(_) => self.filed += 1,
            SubmitOutcome::Failed(failure) => writeln!(self.out, "  ! {}", failure.message)?,
            SubmitOutcome::Incomplete => self.show_errors(controller, Step::CaseDisclosures)?,
            SubmitOutcome::Unavailable => {}
        }
        Ok(())
    }

    fn support_panel(&mut self, controller: &mut IntakeController) -> Result<()> {
        controller.open_support();
        writeln!(self.out)?;
        writeln!(self.out, "Case Support")?;
        writeln!(self.out, "  Direct Dial            {}", self.support.phone)?;
        writeln!(self.out, "  Institutional Support  {}", self.support.email)?;
        write!(self.out, "Press Enter to close: ")?;
        let closed = self.read_line();
        controller.close_support();
        closed.map(|_| ())
    }

    fn success_screen(&mut self, controller: &mut IntakeController) -> Result<Flow> {
        writeln!(self.out)?;
        writeln!(self.out, "Dispute Filed Successfully")?;
        writeln!(
            self.out,
            "Your case has been recorded. Our legal coordinators will review and contact you within 24 business hours."
        )?;
        write!(self.out, "Start a new filing? [y/N]: ")?;
        let answer = self.read_line()?;
        if answer.trim().eq_ignore_ascii_case("y") {
            controller.reset();
            Ok(Flow::Continue)
        } else {
            Ok(Flow::Quit)
        }
    }
}

#[cfg(test)]
#[path = "tests/wizard_tests.rs"]
mod tests;
