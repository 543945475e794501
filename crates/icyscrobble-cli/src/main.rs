//! icyscrobble CLI — scrobble an internet radio stream to ListenBrainz

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use clap::{ArgAction, Parser};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use icyscrobble_app::data::Settings;
use icyscrobble_app::error::{AppError, Result};
use icyscrobble_app::monitor::{CycleReport, Monitor, MonitorOptions};
use icyscrobble_app::submit::{DryRunSubmitter, ListenBrainzSubmitter, ListenSubmitter};

#[derive(Parser)]
#[command(
    name = "icyscrobble",
    about = "Report the now-playing track of an ICY radio stream to ListenBrainz",
    version
)]
struct Cli {
    /// Stream URL to watch (overrides the settings file)
    url: Option<String>,

    /// ListenBrainz user token (overrides LISTENBRAINZ_TOKEN and the settings file)
    #[arg(long)]
    token: Option<String>,

    /// Settings file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seconds between two polls
    #[arg(long, value_name = "SECS")]
    interval: Option<u64>,

    /// Metadata frames to read per poll before giving up
    #[arg(long)]
    attempts: Option<usize>,

    /// ListenBrainz API root
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Log listens instead of submitting them
    #[arg(long)]
    dry_run: bool,

    /// Run a single poll cycle and exit
    #[arg(long)]
    once: bool,

    /// Write the merged settings back to the settings file
    #[arg(long)]
    save: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn apply_to(&self, settings: &mut Settings) {
        if let Some(url) = &self.url {
            settings.stream_url = Some(url.clone());
        }
        if let Some(token) = &self.token {
            settings.listenbrainz_token = Some(token.clone());
        }
        if let Some(secs) = self.interval {
            settings.poll_interval_secs = secs;
        }
        if let Some(attempts) = self.attempts {
            settings.scan_attempts = attempts;
        }
        if let Some(api_url) = &self.api_url {
            settings.api_url = api_url.clone();
        }
    }
}

static STOP_FLAG: OnceLock<Arc<AtomicBool>> = OnceLock::new();

extern "C" fn on_stop_signal(_signal: libc::c_int) {
    if let Some(flag) = STOP_FLAG.get() {
        flag.store(true, Ordering::SeqCst);
    }
}

/// Route SIGINT/SIGTERM to the monitor's stop flag
fn install_stop_handler(stop: Arc<AtomicBool>) {
    if STOP_FLAG.set(stop).is_err() {
        return;
    }
    let handler = on_stop_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
    unsafe {
        libc::signal(libc::SIGINT, handler);
        libc::signal(libc::SIGTERM, handler);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    settings.apply_env();
    cli.apply_to(&mut settings);

    if cli.save {
        match &cli.config {
            Some(path) => settings.save_to(path)?,
            None => settings.save()?,
        }
        info!("settings saved");
    }
    Ok(settings)
}

fn build_submitter(cli: &Cli, settings: &Settings) -> Result<Box<dyn ListenSubmitter>> {
    if cli.dry_run {
        return Ok(Box::new(DryRunSubmitter));
    }
    let token = settings.listenbrainz_token.as_deref().ok_or_else(|| {
        AppError::Config(
            "No ListenBrainz token: pass --token, set LISTENBRAINZ_TOKEN or use --dry-run"
                .to_string(),
        )
    })?;
    Ok(Box::new(ListenBrainzSubmitter::new(
        &settings.api_url,
        token,
        settings.submit_timeout(),
    )?))
}

fn run(cli: &Cli) -> Result<bool> {
    let settings = load_settings(cli)?;
    let options = MonitorOptions::from_settings(&settings)?;
    let submitter = build_submitter(cli, &settings)?;
    let mut monitor = Monitor::new(options, submitter);

    if cli.once {
        let report = monitor.run_cycle();
        info!(?report, "cycle finished");
        return Ok(!matches!(
            report,
            CycleReport::StreamFailed | CycleReport::SubmitFailed(_)
        ));
    }

    install_stop_handler(monitor.stop_handle());
    monitor.run();
    Ok(true)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
