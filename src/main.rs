use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use wrapped::client::{HttpTransport, LibraryUpload};
use wrapped::config::{self, PagingMode, Settings, TimeUnit, Transition};
use wrapped::controller::{SubmitController, SubmitState};
use wrapped::export;
use wrapped::format;
use wrapped::logging::{self, LogTarget};
use wrapped::tui;

#[derive(Parser)]
#[command(name = "wrapped", about = "Upload a music-library export and browse your listening statistics")]
struct Cli {
    /// Library export (XML) to upload
    file: PathBuf,

    /// Statistics server base URL
    #[arg(long)]
    server: Option<String>,

    /// Show one section per page or everything on one page
    #[arg(long, value_enum)]
    paging: Option<PagingMode>,

    /// Unit for the listening-time total
    #[arg(long, value_enum)]
    time_unit: Option<TimeUnit>,

    /// Page transition in the TUI
    #[arg(long, value_enum)]
    transition: Option<Transition>,

    /// Background color cycled by the fade transition (repeatable)
    #[arg(long = "background")]
    backgrounds: Vec<String>,

    /// Give up on the request after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the service response as JSON instead of the report
    #[arg(long)]
    json: bool,

    /// Also write the report as HTML to this path
    #[arg(long)]
    html: Option<PathBuf>,

    /// Launch interactive TUI
    #[arg(long)]
    tui: bool,

    /// Fail on incomplete reports instead of showing placeholders
    #[arg(long)]
    strict: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let mut settings = match self.config {
            Some(ref path) => config::load_settings(path)?,
            None => Settings::default(),
        };

        if let Some(ref server) = self.server {
            settings.client.server_url = server.clone();
        }
        if let Some(timeout) = self.timeout {
            settings.client.timeout_secs = Some(timeout);
        }
        if let Some(paging) = self.paging {
            settings.report.paging_mode = paging;
        }
        if let Some(time_unit) = self.time_unit {
            settings.report.time_unit = time_unit;
        }
        if let Some(transition) = self.transition {
            settings.report.transition = transition;
        }
        if !self.backgrounds.is_empty() {
            settings.report.backgrounds = self.backgrounds.clone();
        }
        if self.strict {
            settings.report.strict = true;
        }
        Ok(settings)
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_target = match (&cli.log_file, cli.tui) {
        (Some(path), _) => LogTarget::File(path),
        (None, true) => LogTarget::Off,
        (None, false) => LogTarget::Stderr,
    };
    // Dropped at the end of main so buffered log lines reach the file.
    let _log_guard = logging::init(cli.verbose, log_target)?;

    let settings = cli.settings()?;
    let upload = LibraryUpload::from_path(&cli.file)?;
    let transport = HttpTransport::new(&settings.client).context("Failed to build HTTP client")?;
    let mut controller = SubmitController::new(transport, settings.report);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    if cli.tui {
        let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
        let app = tui::app::App::new(controller, upload, settings.client.server_url, cwd);
        tui::run(runtime.handle(), app)?;
        return Ok(ExitCode::SUCCESS);
    }

    let state = runtime.block_on(controller.submit(upload))?;

    match state {
        SubmitState::Success => {
            let report = controller
                .report()
                .context("Report missing after successful submission")?;
            if cli.json {
                println!("{}", format::format_json(&report.payload));
            } else {
                println!("{}", format::format_report(&report.fragments));
            }
            if let Some(ref path) = cli.html {
                let mut file = std::fs::File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                export::write_html(&mut file, &report.fragments)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!("HTML report written to {}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            eprintln!("{}", format::format_display(controller.display()));
            Ok(ExitCode::FAILURE)
        }
    }
}
