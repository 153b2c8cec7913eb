mod config;
mod wizard;

use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use intake_core::{IntakeController, SubmitOutcome};
use shared::domain::{FormField, Step};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{build_controller, load_case, load_settings},
    wizard::Wizard,
};

#[derive(Parser, Debug)]
#[command(name = "intake", about = "Dispute filing intake")]
struct Cli {
    #[arg(long, default_value = "intake.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk through the three filing steps interactively.
    Wizard,
    /// File a case read from a JSON or TOML file.
    Submit {
        #[arg(long)]
        case: PathBuf,
    },
    /// Print the case support contacts.
    Support,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(&cli.config);

    match cli.command.unwrap_or(Command::Wizard) {
        Command::Wizard => {
            let mut controller = build_controller(&settings)?;
            info!("intake: wizard started session={}", controller.session_id());
            let mut wizard = Wizard::new(io::stdin().lock(), io::stdout(), settings.support.clone());
            let filed = wizard.run(&mut controller).await?;
            info!("intake: wizard finished filed={filed}");
        }
        Command::Submit { case } => {
            let mut controller = build_controller(&settings)?;
            controller.load_form(load_case(&case)?);
            submit_case(&mut controller).await?;
        }
        Command::Support => {
            let mut out = io::stdout().lock();
            writeln!(out, "Case Support")?;
            writeln!(out, "  Direct Dial            {}", settings.support.phone)?;
            writeln!(out, "  Institutional Support  {}", settings.support.email)?;
        }
    }

    Ok(())
}

async fn submit_case(controller: &mut IntakeController) -> Result<()> {
    while controller.step() != Step::CaseDisclosures {
        if !controller.advance() {
            bail!(
                "case is incomplete at step {}: {}",
                controller.step(),
                missing_fields(controller, controller.step())
            );
        }
    }

    match controller.submit().await {
        SubmitOutcome::Filed(payload) => {
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(())
        }
        SubmitOutcome::Incomplete => bail!(
            "case is incomplete: {}",
            missing_fields(controller, Step::CaseDisclosures)
        ),
        SubmitOutcome::Failed(failure) => bail!("{}", failure.message),
        SubmitOutcome::Unavailable => bail!("case could not be submitted"),
    }
}

fn missing_fields(controller: &IntakeController, step: Step) -> String {
    step.required_fields()
        .iter()
        .copied()
        .filter(|field| controller.field_error(*field).is_some())
        .map(FormField::label)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
