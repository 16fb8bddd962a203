//! Per-screen presentation state. Sessions live exactly as long as their
//! screen is mounted and are only touched from the UI thread.

pub mod narrative;
pub mod scan;
pub mod timer;

pub use narrative::{NarrativePhase, NarrativeScript, NarrativeSession, Trigger};
pub use scan::{CAPTURE_FLASH, CaptureOutcome, SCAN_INTRO, ScanPhase, ScanSession};
pub use timer::TimerChain;
