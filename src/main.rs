use std::path::PathBuf;
use std::process::ExitCode;

use certsend_lib::{
    config::load_config,
    data::{load_attendees, CsvOptions},
    output::{RunId, RunOutput},
    pipeline::{run_batch, Actions, BatchContext},
    preview::{default_previewer, Previewer},
    render::CertificateRenderer,
    smtp::{build_transport, resolve_credentials, CertificateMailer, SmtpSettings},
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Generate personalised certificates from an image template and email them to attendees
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Comma-separated actions to perform: preview, save, send (default: preview)
    #[arg(short, long)]
    actions: Option<String>,

    /// Delete the `<output-dir>/<run-id>` directory once the run finishes
    #[arg(short, long)]
    clear_run_output: bool,

    /// Run configuration (JSON, YAML or TOML)
    #[arg(long, default_value = "data.json")]
    config: PathBuf,

    /// Attendee list with one `full name,email` row per attendee
    #[arg(long, default_value = "attendees.csv")]
    attendees: PathBuf,

    /// Root directory for per-run output
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Attendee list column separator
    #[arg(long, default_value_t = ',')]
    separator: char,

    /// Attendee list encoding label (default: UTF-8, falling back to Windows-1252)
    #[arg(long)]
    encoding: Option<String>,

    /// Treat the first attendee row as a header and skip it
    #[arg(long)]
    has_header: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("an error occurred: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> certsend_lib::Result<()> {
    let actions = Actions::parse(cli.actions.as_deref())?;
    let config = load_config(&cli.config)?;

    let run_id = RunId::generate();
    println!("RUN ID: {run_id}");

    let attendees = load_attendees(
        &cli.attendees,
        &CsvOptions {
            separator: Some(CsvOptions::separator_byte(cli.separator)?),
            encoding: cli.encoding,
            has_header: cli.has_header,
        },
    )?;

    let renderer = CertificateRenderer::from_config(&config)?;
    let output = RunOutput::new(&cli.output_dir, &run_id);

    let mut previewer: Option<Box<dyn Previewer>> = if actions.preview {
        Some(default_previewer()?)
    } else {
        None
    };

    let sender = &config.email.sender_credentials;
    let settings = SmtpSettings::from_sender(sender);
    let transport = if actions.send {
        Some(build_transport(&settings, &resolve_credentials(sender)?)?)
    } else {
        None
    };
    let mailer = transport.as_ref().map(|t| {
        CertificateMailer::new(t, &config.email, &settings.from, renderer.extension())
    });

    let ctx = BatchContext {
        config: &config,
        renderer: &renderer,
        output: &output,
        actions,
        clear_requested: cli.clear_run_output,
    };
    let summary = run_batch(&ctx, &attendees, previewer.as_deref_mut(), mailer.as_ref()).await?;

    println!("{}", summary.summary_line());
    Ok(())
}
