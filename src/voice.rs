use std::sync::{Arc, Mutex};

/// Fire-and-forget text output, e.g. a speech synthesizer.
pub trait VoiceSink: Send + Sync {
    fn speak(&self, text: &str);
}

/// Writes utterances to the log instead of a speaker.
#[derive(Clone, Debug, Default)]
pub struct LogVoice;

impl VoiceSink for LogVoice {
    fn speak(&self, text: &str) {
        log::info!("speaking: {text}");
    }
}

/// Keeps every utterance; used by the terminal driver to echo speech and by
/// tests to observe it.
#[derive(Clone, Debug, Default)]
pub struct RecordingVoice {
    spoken: Arc<Mutex<Vec<String>>>,
}

impl RecordingVoice {
    pub fn take(&self) -> Vec<String> {
        match self.spoken.lock() {
            Ok(mut spoken) => std::mem::take(&mut *spoken),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl VoiceSink for RecordingVoice {
    fn speak(&self, text: &str) {
        if let Ok(mut spoken) = self.spoken.lock() {
            spoken.push(text.to_string());
        }
    }
}
