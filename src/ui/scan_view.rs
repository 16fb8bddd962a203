use crate::{
    interpreter,
    session::{ScanPhase, ScanSession},
};

/// Text rendition of the scanner screen, one line per visible element.
pub(super) fn render_scan(session: &ScanSession) -> Vec<String> {
    let mut lines = Vec::new();

    let frame = match (session.is_flashing(), session.sample()) {
        (true, _) => "[ ✱ flash ✱ ]".to_string(),
        (false, Some(sample)) => format!("[ {} ]", sample.provenance),
        (false, None) => "[ ⌖ Tap Snap to capture a leaf ]".to_string(),
    };
    lines.push(frame);

    let snap = if session.can_capture() {
        "(Snap)"
    } else {
        "(Snap: disabled)"
    };
    lines.push(snap.to_string());

    if session.phase() == ScanPhase::Processing {
        lines.push("⟳ Analyzing leaf…".to_string());
    }

    if let Some(error) = session.error() {
        lines.push(format!("✗ {error}"));
    }

    if let (Some(result), Some(verdict)) = (session.result(), session.verdict()) {
        lines.push(format!("{} {}", verdict.icon(), verdict.headline()));
        lines.push(format!("  Result: {}", result.label()));
        lines.push(format!(
            "  Confidence: {}",
            interpreter::format_confidence(result.probability())
        ));
        lines.push(format!("  {}", verdict.advice()));
        lines.push("(Listen) (Continue)".to_string());
    }

    lines
}
