//! Terminal front-end. Runs the UI event loop on the calling thread and
//! prints each screen whenever its session reports a change.

mod scan_view;
mod story_view;

use std::time::{Duration, Instant};

use anyhow::{Result, anyhow, bail};
use crossbeam_channel::tick;

use crate::{
    interpreter::DiseaseKeywords,
    journey::{Journey, Screen, ScreenState},
    pipeline::{ClassifierHandle, SampleSource},
    session::CaptureOutcome,
    types::{ClassificationResult, Verdict},
    voice::VoiceSink,
};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone, Debug, PartialEq)]
pub struct ScanReport {
    pub result: ClassificationResult,
    pub verdict: Verdict,
}

pub struct AppView {
    journey: Journey,
    classifier: ClassifierHandle,
    source: Box<dyn SampleSource>,
    voice: Box<dyn VoiceSink>,
    listen: bool,
    echo: bool,
    timeout: Duration,
    last_frame: Vec<String>,
    transcript: Vec<String>,
}

impl AppView {
    pub fn new(
        journey: Journey,
        classifier: ClassifierHandle,
        source: Box<dyn SampleSource>,
        voice: Box<dyn VoiceSink>,
    ) -> Self {
        Self {
            journey,
            classifier,
            source,
            voice,
            listen: false,
            echo: true,
            timeout: DEFAULT_TIMEOUT,
            last_frame: Vec::new(),
            transcript: Vec::new(),
        }
    }

    pub fn scanner(
        keywords: DiseaseKeywords,
        classifier: ClassifierHandle,
        source: Box<dyn SampleSource>,
        voice: Box<dyn VoiceSink>,
    ) -> Self {
        Self::new(
            Journey::starting_at(Screen::Scanner, keywords),
            classifier,
            source,
            voice,
        )
    }

    /// Speak each result once it is shown.
    pub fn with_listen(mut self, listen: bool) -> Self {
        self.listen = listen;
        self
    }

    /// Whether rendered frames are printed to stdout as well as recorded.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn journey(&self) -> &Journey {
        &self.journey
    }

    /// Every line printed so far.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Captures once on the current scanner screen and waits for the outcome.
    pub fn run_scan(&mut self) -> Result<ScanReport> {
        self.render();
        let outcome = match self.journey.scan_session() {
            Some(session) => session.capture(self.source.as_mut(), &self.classifier),
            None => bail!("not on the scanner screen"),
        };
        if outcome == CaptureOutcome::Ignored {
            bail!("scanner is busy");
        }
        self.render();

        let ticker = tick(FRAME_INTERVAL);
        let deadline = Instant::now() + self.timeout;
        loop {
            if self.journey.poll() {
                self.render();
            }

            let Some(session) = self.journey.scan_session() else {
                bail!("left the scanner screen");
            };
            if let (Some(result), Some(verdict)) = (session.result(), session.verdict()) {
                let report = ScanReport {
                    result: result.clone(),
                    verdict,
                };
                if self.listen {
                    self.listen_now();
                }
                return Ok(report);
            }
            if session.can_capture() {
                if let Some(error) = session.error() {
                    return Err(anyhow!("{error}"));
                }
            }

            if Instant::now() >= deadline {
                bail!("timed out waiting for the classifier");
            }
            let _ = ticker.recv();
        }
    }

    /// Walks every screen to the end, tapping and scanning along the way.
    pub fn run_journey(&mut self) -> Result<()> {
        let ticker = tick(FRAME_INTERVAL);
        let deadline = Instant::now() + self.timeout;
        self.render();

        loop {
            let mut changed = self.journey.poll();

            if self.journey.screen() == Screen::Scanner {
                let needs_scan = self
                    .journey
                    .scan_session()
                    .is_some_and(|s| !s.has_result());
                if needs_scan {
                    self.run_scan()?;
                    changed = true;
                }
            } else if self.journey.tap() {
                changed = true;
            }

            if self.journey.can_advance() {
                self.journey.advance();
                changed = true;
            } else if self.journey.screen().next().is_none() {
                if let ScreenState::Story(session) = self.journey.state() {
                    if session.can_continue() {
                        self.render();
                        return Ok(());
                    }
                }
            }

            if changed {
                self.render();
            }
            if Instant::now() >= deadline {
                bail!("journey did not finish in {:?}", self.timeout);
            }
            let _ = ticker.recv();
        }
    }

    fn listen_now(&mut self) {
        let spoke = match self.journey.scan_session() {
            Some(session) => session.listen(self.voice.as_ref()),
            None => false,
        };
        if !spoke {
            log::debug!("nothing to speak yet");
        }
    }

    fn render(&mut self) {
        let screen = self.journey.screen();
        let mut frame = vec![format!("== {} ==", screen.title())];
        frame.extend(match self.journey.state() {
            ScreenState::Story(session) => story_view::render_story(screen, session),
            ScreenState::Scan(session) => scan_view::render_scan(session),
        });

        if frame == self.last_frame {
            return;
        }
        if self.echo {
            println!("{}", frame.join("\n"));
            println!();
        }
        self.transcript.extend(frame.iter().cloned());
        self.last_frame = frame;
    }
}
