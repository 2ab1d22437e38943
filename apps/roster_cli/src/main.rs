use std::{fmt::Write as _, sync::Arc};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use roster_core::{
    config::load_settings,
    document::{ListArea, ParticipantsSection, NO_PARTICIPANTS_NOTICE},
    Document, HttpRosterApi, LoadOutcome, SyncController,
};
use shared::domain::{ParticipantRef, Severity, StatusMessage};

#[derive(Parser, Debug)]
struct Args {
    /// Overrides `server_url` from roster.toml and the environment.
    #[arg(long)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show every activity with its participants.
    List,
    Signup {
        #[arg(long)]
        activity: String,
        #[arg(long)]
        email: String,
    },
    Unregister {
        #[arg(long)]
        activity: String,
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings()?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    tracing::info!(server_url = %settings.server_url, "using roster server");

    let api = HttpRosterApi::new(&settings.server_url, settings.request_timeout())?;
    let controller = SyncController::new(Arc::new(api), settings.feedback_hide_after());

    if controller.load().await == LoadOutcome::Failed {
        print!("{}", render_text(&controller.document().await, None));
        bail!("could not load activities from {}", settings.server_url);
    }

    let report = match args.command {
        Command::List => None,
        Command::Signup { activity, email } => {
            Some(controller.submit_signup(&activity, &email).await?)
        }
        Command::Unregister { activity, email } => Some(
            controller
                .unregister(ParticipantRef::new(activity, email))
                .await?,
        ),
    };

    let feedback = controller.feedback().current().await;
    print!("{}", render_text(&controller.document().await, feedback.as_ref()));

    match report {
        Some(report) if !report.succeeded() => bail!("{}", report.message.text),
        _ => Ok(()),
    }
}

fn render_text(document: &Document, feedback: Option<&StatusMessage>) -> String {
    let mut out = String::new();
    if let Some(message) = feedback {
        let tag = match message.severity {
            Severity::Success => "ok",
            Severity::Error => "error",
        };
        let _ = writeln!(out, "[{tag}] {}\n", message.text);
    }

    match document.list() {
        ListArea::Notice(text) => {
            let _ = writeln!(out, "{text}");
        }
        ListArea::Cards(cards) => {
            for card in cards {
                let _ = writeln!(out, "{}", card.name);
                let _ = writeln!(out, "  {}", card.description);
                let _ = writeln!(out, "  Schedule: {}", card.schedule);
                let _ = writeln!(out, "  Availability: {}", card.availability());
                match &card.participants {
                    ParticipantsSection::Empty => {
                        let _ = writeln!(out, "  {NO_PARTICIPANTS_NOTICE}");
                    }
                    ParticipantsSection::Rows(rows) => {
                        let _ = writeln!(out, "  Participants:");
                        for row in rows {
                            let _ = writeln!(out, "    - {}", row.email);
                        }
                    }
                }
                out.push('\n');
            }
        }
    }
    out
}
