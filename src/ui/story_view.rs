use crate::{
    journey::Screen,
    session::{NarrativePhase, NarrativeSession},
};

pub(super) fn render_story(screen: Screen, session: &NarrativeSession) -> Vec<String> {
    let mut lines: Vec<String> = screen.story().iter().map(|s| s.to_string()).collect();

    match session.phase() {
        NarrativePhase::Idle => {
            if let Some(prompt) = screen.tap_prompt().filter(|_| session.is_waiting_for_tap()) {
                lines.push(format!("» {prompt}"));
            }
        }
        NarrativePhase::Animating { step, of } => {
            lines.push(format!("[{step}/{of}] {}", screen.step_caption(step)));
        }
        NarrativePhase::Complete => {
            if let Some(label) = screen.continue_label() {
                lines.push(format!("({label})"));
            }
        }
    }

    lines
}
