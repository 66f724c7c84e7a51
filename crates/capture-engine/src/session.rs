//! Scan session management.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use checkin_code_reader::decode_frame;
use checkin_common::clock::{ScanPacer, SessionClock};
use checkin_common::error::CheckinResult;
use checkin_platform_core::{AlertKind, HostServices, PrintTarget};
use checkin_render_engine::BadgeRenderer;
use checkin_roster::{Attendee, Identifier, Roster};
use image::GrayImage;
use serde::Serialize;

use crate::camera::FrameSource;

/// Configuration for one scan session.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Category output directory; created at startup.
    pub output_dir: PathBuf,

    /// Where to print. `None` renders without printing.
    pub print: Option<PrintTarget>,

    /// Minimum time between two frame pulls.
    pub scan_interval_ms: u64,
}

/// State of a scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Waiting for a new code.
    Idle,
    /// Looking up, rendering and printing a freshly seen code.
    Processing,
    /// Loop exited.
    Stopped,
}

/// What one frame or payload led to.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// The source had no frame ready.
    NoFrame,
    /// A frame arrived but held no readable code.
    NoCode,
    /// Code already handled this session.
    Duplicate(Identifier),
    /// Code decoded but not in the roster.
    Unknown(Identifier),
    /// Badge written and sent to the printer.
    Printed { id: Identifier, path: PathBuf },
    /// Badge written; printing disabled.
    Rendered { id: Identifier, path: PathBuf },
    /// Badge written but the printer refused it. The file is kept.
    PrintFailed {
        id: Identifier,
        path: PathBuf,
        error: String,
    },
    /// Badge could not be rendered.
    RenderFailed { id: Identifier, error: String },
}

/// Per-session counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub frames: u64,
    pub decoded: u64,
    pub duplicates: u64,
    pub rendered: u64,
    pub printed: u64,
    pub unknown: u64,
    pub failed: u64,
    /// Frame pulls the camera answered with an error.
    pub source_errors: u64,
}

/// A scan session owns the camera, the seen set and the counters.
pub struct ScanSession {
    source: Box<dyn FrameSource>,
    roster: Roster,
    renderer: BadgeRenderer,
    host: Box<dyn HostServices>,
    options: ScanOptions,
    seen: HashSet<Identifier>,
    state: ScanState,
    stats: ScanStats,
    clock: SessionClock,
    pacer: ScanPacer,
}

impl ScanSession {
    /// Create a session and make sure the output directory exists.
    pub fn new(
        source: Box<dyn FrameSource>,
        roster: Roster,
        renderer: BadgeRenderer,
        host: Box<dyn HostServices>,
        options: ScanOptions,
    ) -> CheckinResult<Self> {
        std::fs::create_dir_all(&options.output_dir)?;
        let pacer = ScanPacer::from_millis(options.scan_interval_ms);

        Ok(Self {
            source,
            roster,
            renderer,
            host,
            options,
            seen: HashSet::new(),
            state: ScanState::Idle,
            stats: ScanStats::default(),
            clock: SessionClock::start(),
            pacer,
        })
    }

    /// Current session state.
    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    /// Identifiers handled so far.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Run until `stop_flag` is set, then release the camera.
    ///
    /// Nothing short of the stop flag ends the loop. Frame source errors are
    /// counted and the next pull is tried after the usual pacing interval.
    pub fn run(&mut self, stop_flag: &AtomicBool) -> ScanStats {
        tracing::info!(
            camera = self.source.name(),
            host = self.host.name(),
            attendees = self.roster.len(),
            output = %self.options.output_dir.display(),
            printing = self.options.print.is_some(),
            started = self.clock.epoch_wall(),
            "Scan session started"
        );

        self.scan_until(stop_flag);
        self.source.release();
        self.state = ScanState::Stopped;

        tracing::info!(
            elapsed_secs = self.clock.elapsed_secs(),
            frames = self.stats.frames,
            decoded = self.stats.decoded,
            duplicates = self.stats.duplicates,
            rendered = self.stats.rendered,
            printed = self.stats.printed,
            unknown = self.stats.unknown,
            failed = self.stats.failed,
            source_errors = self.stats.source_errors,
            badges_per_minute = self.clock.per_minute(self.stats.rendered),
            "Scan session finished"
        );

        self.stats.clone()
    }

    fn scan_until(&mut self, stop_flag: &AtomicBool) {
        let mut failing_since: Option<u64> = None;
        loop {
            if stop_flag.load(Ordering::SeqCst) {
                tracing::info!("Stop requested");
                return;
            }
            self.pacer.wait();
            match self.step() {
                Ok(_) => {
                    if let Some(first) = failing_since.take() {
                        tracing::info!(
                            camera = self.source.name(),
                            failed_pulls = self.stats.source_errors - first,
                            "Frame source recovered"
                        );
                    }
                }
                Err(e) => {
                    if failing_since.is_none() {
                        tracing::error!(
                            camera = self.source.name(),
                            error = %e,
                            "Frame source failed; retrying"
                        );
                        failing_since = Some(self.stats.source_errors);
                    } else {
                        tracing::debug!(
                            camera = self.source.name(),
                            error = %e,
                            "Frame source still failing"
                        );
                    }
                    self.stats.source_errors += 1;
                }
            }
        }
    }

    /// Pull one frame and handle whatever it holds.
    pub fn step(&mut self) -> CheckinResult<ScanOutcome> {
        match self.source.next_frame()? {
            None => Ok(ScanOutcome::NoFrame),
            Some(frame) => Ok(self.process_frame(&frame)),
        }
    }

    /// Decode a frame and handle its payload.
    pub fn process_frame(&mut self, frame: &GrayImage) -> ScanOutcome {
        self.stats.frames += 1;
        match decode_frame(frame) {
            None => ScanOutcome::NoCode,
            Some(payload) => {
                self.stats.decoded += 1;
                self.process_payload(&payload)
            }
        }
    }

    /// Handle a decoded payload.
    ///
    /// The identifier is marked seen before lookup, so an unknown or failed
    /// code does not alert again on every following frame.
    pub fn process_payload(&mut self, payload: &str) -> ScanOutcome {
        let id = Identifier::new(payload);
        if id.is_empty() {
            return ScanOutcome::NoCode;
        }
        if !self.seen.insert(id.clone()) {
            self.stats.duplicates += 1;
            tracing::trace!(%id, "Already handled");
            return ScanOutcome::Duplicate(id);
        }

        self.state = ScanState::Processing;
        let outcome = match self.roster.lookup(&id).cloned() {
            None => {
                self.stats.unknown += 1;
                tracing::warn!(%id, "No roster entry for scanned code");
                self.host
                    .alert(AlertKind::UnknownAttendee, &format!("No attendee for {id}"));
                ScanOutcome::Unknown(id)
            }
            Some(attendee) => self.issue_badge(&attendee),
        };
        self.state = ScanState::Idle;
        outcome
    }

    fn issue_badge(&mut self, attendee: &Attendee) -> ScanOutcome {
        let id = attendee.id.clone();
        let path = badge_path(&self.options.output_dir, &id);

        if let Err(e) = self.renderer.render(attendee, &path) {
            self.stats.failed += 1;
            tracing::error!(%id, error = %e, "Badge rendering failed");
            self.host
                .alert(AlertKind::BadgeFailed, &format!("Badge for {id} failed: {e}"));
            return ScanOutcome::RenderFailed {
                id,
                error: e.to_string(),
            };
        }
        self.stats.rendered += 1;

        let Some(target) = self.options.print.as_ref() else {
            tracing::info!(%id, path = %path.display(), "Badge ready (printing disabled)");
            return ScanOutcome::Rendered { id, path };
        };

        match self.host.print_document(&path, target) {
            Ok(()) => {
                self.stats.printed += 1;
                tracing::info!(
                    %id,
                    first_name = %attendee.first_name,
                    last_name = %attendee.last_name,
                    path = %path.display(),
                    "Badge printed"
                );
                ScanOutcome::Printed { id, path }
            }
            Err(e) => {
                self.stats.failed += 1;
                tracing::error!(%id, path = %path.display(), error = %e, "Print dispatch failed; badge kept");
                ScanOutcome::PrintFailed {
                    id,
                    path,
                    error: e.to_string(),
                }
            }
        }
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        self.source.release();
    }
}

/// Output file for a scanned badge.
pub fn badge_path(output_dir: &Path, id: &Identifier) -> PathBuf {
    output_dir.join(format!("{}.pdf", id.file_stem()))
}
