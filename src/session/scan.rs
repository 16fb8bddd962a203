use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};

use super::timer::TimerChain;
use crate::{
    error::ClassificationError,
    interpreter::{self, DiseaseKeywords},
    pipeline::{ClassifierHandle, ClassifyReply, SampleSource, Ticket},
    types::{ClassificationResult, ImageSample, Verdict},
    voice::VoiceSink,
};

pub const SCAN_INTRO: Duration = Duration::from_millis(300);
pub const CAPTURE_FLASH: Duration = Duration::from_millis(150);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    AnimatingIntro,
    AwaitingInput,
    Processing,
    ResultReady,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A classification is now in flight.
    Started(Ticket),
    /// The capture control is disabled right now.
    Ignored,
    /// The sample could not be captured; the error is set.
    Failed,
}

struct Pending {
    ticket: Ticket,
    reply_rx: Receiver<ClassifyReply>,
}

/// State of one mounted scanner screen. Dropping it unmounts the screen: its
/// timers stop and a classification still in flight is discarded when it
/// completes.
pub struct ScanSession {
    phase: ScanPhase,
    error: Option<String>,
    sample: Option<ImageSample>,
    result: Option<ClassificationResult>,
    verdict: Option<Verdict>,
    flashing: bool,
    keywords: DiseaseKeywords,
    intro: Option<TimerChain>,
    flash: Option<TimerChain>,
    pending: Option<Pending>,
    next_ticket: u64,
}

impl ScanSession {
    pub fn new(keywords: DiseaseKeywords) -> Self {
        Self {
            phase: ScanPhase::Idle,
            error: None,
            sample: None,
            result: None,
            verdict: None,
            flashing: false,
            keywords,
            intro: None,
            flash: None,
            pending: None,
            next_ticket: 0,
        }
    }

    /// Starts the intro animation. Only the first call has an effect.
    pub fn mount(&mut self, intro: Duration) {
        if self.phase != ScanPhase::Idle {
            return;
        }
        self.phase = ScanPhase::AnimatingIntro;
        self.intro = Some(TimerChain::start(vec![intro]));
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn sample(&self) -> Option<&ImageSample> {
        self.sample.as_ref()
    }

    /// The current result, only while it is the one on screen.
    pub fn result(&self) -> Option<&ClassificationResult> {
        if self.has_result() {
            self.result.as_ref()
        } else {
            None
        }
    }

    pub fn verdict(&self) -> Option<Verdict> {
        if self.has_result() { self.verdict } else { None }
    }

    pub fn has_result(&self) -> bool {
        self.phase == ScanPhase::ResultReady && self.result.is_some()
    }

    pub fn is_flashing(&self) -> bool {
        self.flashing
    }

    pub fn can_capture(&self) -> bool {
        matches!(
            self.phase,
            ScanPhase::AnimatingIntro | ScanPhase::AwaitingInput | ScanPhase::ResultReady
        )
    }

    pub fn can_continue(&self) -> bool {
        self.has_result()
    }

    pub fn capture(
        &mut self,
        source: &mut dyn SampleSource,
        classifier: &ClassifierHandle,
    ) -> CaptureOutcome {
        if !self.can_capture() {
            log::debug!("capture ignored in phase {:?}", self.phase);
            return CaptureOutcome::Ignored;
        }

        if let Some(intro) = self.intro.take() {
            intro.cancel();
        }
        self.error = None;
        self.result = None;
        self.verdict = None;

        let sample = match source.capture() {
            Ok(sample) => sample,
            Err(err) => {
                self.fail(err);
                return CaptureOutcome::Failed;
            }
        };

        self.flashing = true;
        self.flash = Some(TimerChain::start(vec![CAPTURE_FLASH]));

        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        log::info!("scanning {} ({ticket:?})", sample.provenance);
        let reply_rx = classifier.submit(ticket, sample.clone());

        self.sample = Some(sample);
        self.pending = Some(Pending { ticket, reply_rx });
        self.phase = ScanPhase::Processing;
        CaptureOutcome::Started(ticket)
    }

    /// Applies fired timers and a finished classification. Returns whether
    /// anything visible changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;

        if let Some(intro) = self.intro.as_mut() {
            if intro.try_next().is_some() {
                self.intro = None;
                if self.phase == ScanPhase::AnimatingIntro {
                    self.phase = ScanPhase::AwaitingInput;
                    changed = true;
                }
            }
        }

        if let Some(flash) = self.flash.as_mut() {
            if flash.try_next().is_some() {
                self.flash = None;
                self.flashing = false;
                changed = true;
            }
        }

        let polled = self.pending.as_ref().map(|p| p.reply_rx.try_recv());
        match polled {
            Some(Ok(reply)) => changed |= self.apply(reply),
            Some(Err(TryRecvError::Disconnected)) => {
                self.pending = None;
                self.fail(ClassificationError::inference("classifier worker has stopped"));
                changed = true;
            }
            Some(Err(TryRecvError::Empty)) | None => {}
        }

        changed
    }

    /// Blocks until the in-flight classification resolves or `timeout`
    /// passes, then applies it. Returns whether a reply was applied.
    pub fn wait_for_result(&mut self, timeout: Duration) -> bool {
        let polled = match self.pending.as_ref() {
            Some(pending) => pending.reply_rx.recv_timeout(timeout),
            None => return false,
        };
        match polled {
            Ok(reply) => self.apply(reply),
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => {
                self.pending = None;
                self.fail(ClassificationError::inference("classifier worker has stopped"));
                true
            }
        }
    }

    /// Speaks the current result. Returns false when there is nothing to say.
    pub fn listen(&self, voice: &dyn VoiceSink) -> bool {
        match self.result() {
            Some(result) => {
                voice.speak(&interpreter::spoken_summary(result));
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, reply: ClassifyReply) -> bool {
        let Some(pending) = self.pending.take_if(|p| p.ticket == reply.ticket) else {
            log::debug!("ignoring stale reply {:?}", reply.ticket);
            return false;
        };
        drop(pending);

        match reply.outcome {
            Ok(result) => {
                let verdict = interpreter::interpret(&result, &self.keywords);
                log::info!(
                    "{} ({}%): {}",
                    result.label(),
                    result.confidence_percent(),
                    verdict.headline()
                );
                self.result = Some(result);
                self.verdict = Some(verdict);
                self.error = None;
                self.phase = ScanPhase::ResultReady;
            }
            Err(err) => self.fail(err),
        }
        true
    }

    fn fail(&mut self, err: ClassificationError) {
        log::warn!("scan failed: {err}");
        self.error = Some(err.to_string());
        self.result = None;
        self.verdict = None;
        self.phase = ScanPhase::AwaitingInput;
    }
}
