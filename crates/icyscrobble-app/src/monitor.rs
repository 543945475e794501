//! Polling monitor
//!
//! Runs the single-threaded poll loop: open the stream, find what is
//! playing, and hand new tracks to a [`ListenSubmitter`]. Every failure is
//! logged and the loop moves on to the next cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use icyscrobble::error::Result as IcyResult;
use icyscrobble::stream::{scan_now_playing, sleep_unless_stopped, StreamSession, TrackInfo};
use icyscrobble::tracker::{ChangeDetector, Outcome};
use tracing::{debug, info, warn};

use crate::data::Settings;
use crate::error::{AppError, Result};
use crate::submit::{Listen, ListenSubmitter};

/// What one poll cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    /// Stream opened but no title was found
    NoTrack,
    /// Same track as the last one reported
    Unchanged(TrackInfo),
    /// New track accepted by the submitter
    Submitted(TrackInfo),
    /// New track, submission failed; retried next cycle
    SubmitFailed(TrackInfo),
    /// The stream could not be opened or read
    StreamFailed,
}

/// Knobs for the poll loop
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    pub stream_url: String,
    pub stream_timeout: Duration,
    pub poll_interval: Duration,
    pub scan_attempts: usize,
}

impl MonitorOptions {
    /// Build options from validated settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let stream_url = settings
            .stream_url
            .as_deref()
            .map(str::trim)
            .map(str::to_string)
            .ok_or_else(|| AppError::Config("No stream URL configured".to_string()))?;

        Ok(Self {
            stream_url,
            stream_timeout: settings.stream_timeout(),
            poll_interval: settings.poll_interval(),
            scan_attempts: settings.scan_attempts,
        })
    }
}

/// Watches one station and reports its new tracks
pub struct Monitor<S> {
    options: MonitorOptions,
    submitter: S,
    detector: ChangeDetector,
    stop: Arc<AtomicBool>,
}

impl<S: ListenSubmitter> Monitor<S> {
    pub fn new(options: MonitorOptions, submitter: S) -> Self {
        Self {
            options,
            submitter,
            detector: ChangeDetector::new(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Use an externally owned stop flag
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    /// Flag that ends [`run`](Self::run) once set
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub fn detector(&self) -> &ChangeDetector {
        &self.detector
    }

    /// Poll until the stop flag is set.
    ///
    /// The flag is checked before each cycle and during the idle delay; a
    /// cycle already reading from the network runs to completion or timeout.
    pub fn run(&mut self) {
        info!(
            url = %self.options.stream_url,
            submitter = self.submitter.name(),
            interval_secs = self.options.poll_interval.as_secs(),
            "monitor started"
        );

        while !self.stop.load(Ordering::SeqCst) {
            self.run_cycle();
            if !sleep_unless_stopped(self.options.poll_interval, &self.stop) {
                break;
            }
        }

        info!("monitor stopped");
    }

    /// Run a single poll cycle
    pub fn run_cycle(&mut self) -> CycleReport {
        let track = match self.fetch_now_playing() {
            Ok(Some(track)) => track,
            Ok(None) => {
                debug!("no track information this cycle");
                return CycleReport::NoTrack;
            }
            Err(e) => {
                warn!(error = %e, url = %self.options.stream_url, "stream read failed");
                return CycleReport::StreamFailed;
            }
        };

        let listen = Listen::now(track.clone());
        let submitter = &self.submitter;
        let outcome = self.detector.report_with(&track, |track| {
            info!(%track, "new track");
            match submitter.submit(&listen) {
                Ok(()) => {
                    info!(submitter = submitter.name(), "listen submitted");
                    true
                }
                Err(e) => {
                    warn!(submitter = submitter.name(), error = %e, "listen submission failed");
                    false
                }
            }
        });

        match outcome {
            Outcome::Skipped => {
                debug!(%track, "track unchanged");
                CycleReport::Unchanged(track)
            }
            Outcome::Submitted => CycleReport::Submitted(track),
            Outcome::Failed => CycleReport::SubmitFailed(track),
        }
    }

    /// Open a fresh session and scan it; the session is dropped on return
    fn fetch_now_playing(&self) -> IcyResult<Option<TrackInfo>> {
        let mut session =
            StreamSession::open(&self.options.stream_url, self.options.stream_timeout)?;
        scan_now_playing(&mut session, self.options.scan_attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Instant;

    /// Records listens; fails while `fail` is set
    #[derive(Default)]
    struct Recorder {
        listens: Mutex<Vec<Listen>>,
        fail: AtomicBool,
    }

    impl ListenSubmitter for Arc<Recorder> {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn submit(&self, listen: &Listen) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::Submission {
                    status: 503,
                    body: "down".to_string(),
                });
            }
            self.listens.lock().unwrap().push(listen.clone());
            Ok(())
        }
    }

    fn icy_body(title: &str) -> Vec<u8> {
        let meta = format!("StreamTitle='{title}';");
        let len_byte = meta.len().div_ceil(16);
        let mut out = vec![0u8; 16];
        out.push(len_byte as u8);
        out.extend_from_slice(meta.as_bytes());
        out.resize(16 + 1 + len_byte * 16, 0);
        out
    }

    fn options(url: String) -> MonitorOptions {
        MonitorOptions {
            stream_url: url,
            stream_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_secs(30),
            scan_attempts: 3,
        }
    }

    fn icy_mock(server: &mut mockito::ServerGuard, title: &str) -> mockito::Mock {
        server
            .mock("GET", "/live")
            .with_status(200)
            .with_header("icy-metaint", "16")
            .with_body(icy_body(title))
            .create()
    }

    // --- run_cycle ---

    #[test]
    fn new_track_is_submitted_once() {
        let mut server = mockito::Server::new();
        let _stream = icy_mock(&mut server, "Artist X - Song Y");

        let recorder = Arc::new(Recorder::default());
        let mut monitor = Monitor::new(options(format!("{}/live", server.url())), recorder.clone());

        let expected = TrackInfo::new("Artist X", "Song Y");
        assert_eq!(monitor.run_cycle(), CycleReport::Submitted(expected.clone()));
        assert_eq!(monitor.run_cycle(), CycleReport::Unchanged(expected.clone()));

        let listens = recorder.listens.lock().unwrap();
        assert_eq!(listens.len(), 1);
        assert_eq!(listens[0].track, expected);
    }

    #[test]
    fn failed_submission_is_retried_next_cycle() {
        let mut server = mockito::Server::new();
        let _stream = icy_mock(&mut server, "Retry Me");

        let recorder = Arc::new(Recorder::default());
        recorder.fail.store(true, Ordering::SeqCst);
        let mut monitor = Monitor::new(options(format!("{}/live", server.url())), recorder.clone());

        let expected = TrackInfo::new("Unknown Artist", "Retry Me");
        assert_eq!(monitor.run_cycle(), CycleReport::SubmitFailed(expected.clone()));
        assert!(monitor.detector().last_track().is_none());

        recorder.fail.store(false, Ordering::SeqCst);
        assert_eq!(monitor.run_cycle(), CycleReport::Submitted(expected.clone()));
        assert_eq!(monitor.detector().last_track(), Some(&expected));
    }

    #[test]
    fn track_change_is_reported() {
        let mut server = mockito::Server::new();
        let first = icy_mock(&mut server, "A - One");

        let recorder = Arc::new(Recorder::default());
        let mut monitor = Monitor::new(options(format!("{}/live", server.url())), recorder.clone());
        assert!(matches!(monitor.run_cycle(), CycleReport::Submitted(_)));

        first.remove();
        let _second = icy_mock(&mut server, "B - Two");
        assert_eq!(
            monitor.run_cycle(),
            CycleReport::Submitted(TrackInfo::new("B", "Two"))
        );
        assert_eq!(recorder.listens.lock().unwrap().len(), 2);
    }

    #[test]
    fn station_name_fallback_reported_once() {
        let mut server = mockito::Server::new();
        let _stream = server
            .mock("GET", "/live")
            .with_status(200)
            .with_header("icy-name", "Name Only FM")
            .with_body(vec![0u8; 64])
            .create();

        let recorder = Arc::new(Recorder::default());
        let mut monitor = Monitor::new(options(format!("{}/live", server.url())), recorder.clone());

        let expected = TrackInfo::new("Name Only FM", "Current Track");
        assert_eq!(monitor.run_cycle(), CycleReport::Submitted(expected.clone()));
        assert_eq!(monitor.run_cycle(), CycleReport::Unchanged(expected));
    }

    #[test]
    fn stream_without_title_is_no_track() {
        let mut server = mockito::Server::new();
        let mut body = Vec::new();
        for _ in 0..3 {
            body.extend(vec![0u8; 16]);
            body.push(0);
        }
        let _stream = server
            .mock("GET", "/live")
            .with_status(200)
            .with_header("icy-metaint", "16")
            .with_body(body)
            .create();

        let recorder = Arc::new(Recorder::default());
        let mut monitor = Monitor::new(options(format!("{}/live", server.url())), recorder.clone());
        assert_eq!(monitor.run_cycle(), CycleReport::NoTrack);
        assert!(recorder.listens.lock().unwrap().is_empty());
    }

    #[test]
    fn stream_errors_do_not_touch_state() {
        let mut server = mockito::Server::new();
        let _stream = server
            .mock("GET", "/live")
            .with_status(200)
            .with_header("icy-metaint", "16")
            .with_body(vec![0u8; 5])
            .create();
        let _plain = server
            .mock("GET", "/plain")
            .with_status(200)
            .with_body("audio")
            .create();

        let recorder = Arc::new(Recorder::default());
        let mut truncated =
            Monitor::new(options(format!("{}/live", server.url())), recorder.clone());
        assert_eq!(truncated.run_cycle(), CycleReport::StreamFailed);

        let mut no_icy = Monitor::new(options(format!("{}/plain", server.url())), recorder.clone());
        assert_eq!(no_icy.run_cycle(), CycleReport::StreamFailed);

        let mut unreachable =
            Monitor::new(options("http://127.0.0.1:1/live".to_string()), recorder.clone());
        assert_eq!(unreachable.run_cycle(), CycleReport::StreamFailed);
        assert!(unreachable.detector().last_track().is_none());
    }

    // --- run ---

    #[test]
    fn run_returns_immediately_when_already_stopped() {
        let recorder = Arc::new(Recorder::default());
        let mut monitor = Monitor::new(options("http://127.0.0.1:1/live".to_string()), recorder);
        monitor.stop_handle().store(true, Ordering::SeqCst);

        let start = Instant::now();
        monitor.run();
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn run_stops_during_idle_delay() {
        let mut server = mockito::Server::new();
        let _stream = icy_mock(&mut server, "Loop - Song");

        let recorder = Arc::new(Recorder::default());
        let stop = Arc::new(AtomicBool::new(false));
        let mut monitor = Monitor::new(options(format!("{}/live", server.url())), recorder.clone())
            .with_stop_flag(stop.clone());

        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(500));
            stop.store(true, Ordering::SeqCst);
        });

        let start = Instant::now();
        monitor.run();
        assert!(start.elapsed() < Duration::from_secs(10));
        assert_eq!(recorder.listens.lock().unwrap().len(), 1);
    }

    // --- options ---

    #[test]
    fn options_from_settings() {
        let settings = Settings {
            stream_url: Some(" http://radio.example/live ".to_string()),
            scan_attempts: 4,
            ..Settings::default()
        };
        let opts = MonitorOptions::from_settings(&settings).unwrap();
        assert_eq!(opts.stream_url, "http://radio.example/live");
        assert_eq!(opts.scan_attempts, 4);
        assert_eq!(opts.poll_interval, Duration::from_secs(30));
        assert_eq!(opts.stream_timeout, Duration::from_secs(15));
    }

    #[test]
    fn options_require_stream_url() {
        assert!(MonitorOptions::from_settings(&Settings::default()).is_err());
    }
}
