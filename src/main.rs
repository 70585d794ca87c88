use activity_form::context::EngineContext;
use activity_form::host::ActivityController;
use activity_form::service::UreqTransport;
use activity_form::session::{JsonLinesChannel, parse_session, replay};
use activity_form::FormDefinition;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "activity-form", version, about = "Replay a form session against a form definition")]
struct Cli {
    /// Form definition (.json, .yaml or .yml)
    #[arg(short, long)]
    definition: PathBuf,

    /// Session file, one JSON step per line
    #[arg(short, long)]
    session: PathBuf,

    /// How long to wait for web-service calls after each step
    #[arg(long, default_value_t = 10_000)]
    settle_ms: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let definition = match FormDefinition::load(&cli.definition) {
        Ok(definition) => definition,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let steps = match File::open(&cli.session)
        .map_err(Into::into)
        .and_then(|file| parse_session(BufReader::new(file)))
    {
        Ok(steps) => steps,
        Err(e) => {
            eprintln!("Error reading session {:?}: {}", cli.session, e);
            return ExitCode::FAILURE;
        }
    };

    let timeout = Duration::from_millis(definition.settings.request_timeout_ms);
    let context = EngineContext::new(definition);
    let transport = Arc::new(UreqTransport::new(timeout));
    let channel = JsonLinesChannel::new(io::stdout().lock());
    let mut controller = ActivityController::new(context, transport, channel);

    replay(&mut controller, steps, Duration::from_millis(cli.settle_ms));
    ExitCode::SUCCESS
}
