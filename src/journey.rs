use std::time::Duration;

use crate::{
    interpreter::DiseaseKeywords,
    session::{NarrativeScript, NarrativeSession, SCAN_INTRO, ScanSession, Trigger},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Planting,
    Crisis,
    Scanner,
    Recovery,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Welcome => "Indigo",
            Screen::Planting => "The Farm",
            Screen::Crisis => "Crisis",
            Screen::Scanner => "Leaf Scanner",
            Screen::Recovery => "Recovery",
        }
    }

    pub fn next(&self) -> Option<Screen> {
        match self {
            Screen::Welcome => Some(Screen::Planting),
            Screen::Planting => Some(Screen::Crisis),
            Screen::Crisis => Some(Screen::Scanner),
            Screen::Scanner => Some(Screen::Recovery),
            Screen::Recovery => None,
        }
    }

    /// Label of the control that leads to the next screen.
    pub fn continue_label(&self) -> Option<&'static str> {
        match self {
            Screen::Welcome => Some("Start Journey"),
            Screen::Planting => Some("Continue Journey"),
            Screen::Crisis => Some("Scan Leaf"),
            Screen::Scanner => Some("Continue"),
            Screen::Recovery => None,
        }
    }

    /// Prompt shown while a tap-triggered screen waits for the user.
    pub fn tap_prompt(&self) -> Option<&'static str> {
        match self {
            Screen::Planting => Some("Tap the seed to plant it in the soil."),
            Screen::Crisis => Some("Tap the leaf to see what happens."),
            _ => None,
        }
    }

    pub fn story(&self) -> &'static [&'static str] {
        match self {
            Screen::Welcome => &[
                "Offline AI for Coffee Leaf Health",
                "A single disease can erase a year's income.",
            ],
            Screen::Planting => &[
                "In the highlands of Uganda, a family depends on their coffee farm for everything: school fees, food, and hope.",
            ],
            Screen::Crisis => &[
                "Weeks later, orange spots appear…",
                "Coffee Leaf Rust: a fungal disease that can destroy an entire harvest and wipe out a family's income.",
                "But what if you could catch it early?",
            ],
            Screen::Scanner => &["Tap Snap to capture a leaf"],
            Screen::Recovery => &[
                "Crisis Avoided",
                "Early detection can protect a family's livelihood.",
                "With tools like Indigo, farmers can identify disease before it spreads, saving their harvest, their income, and their future.",
            ],
        }
    }

    /// Caption for step `step` of the staged reveal.
    pub fn step_caption(&self, step: usize) -> String {
        match self {
            Screen::Planting => format!("growth frame {step}: A new life begins to grow."),
            Screen::Crisis => format!("crisis frame {}", step + 1),
            Screen::Welcome => "the leaf emblem fades in".to_string(),
            Screen::Recovery => "a check mark appears".to_string(),
            Screen::Scanner => String::new(),
        }
    }

    pub fn script(&self) -> Option<NarrativeScript> {
        let ms = Duration::from_millis;
        match self {
            Screen::Welcome | Screen::Recovery => Some(NarrativeScript {
                trigger: Trigger::OnMount,
                later_steps: Vec::new(),
                reveal: ms(200),
            }),
            Screen::Planting => Some(NarrativeScript {
                trigger: Trigger::OnTap,
                later_steps: vec![ms(600), ms(1200), ms(1800)],
                reveal: ms(2600),
            }),
            Screen::Crisis => Some(NarrativeScript {
                trigger: Trigger::OnTap,
                later_steps: vec![ms(500), ms(1000), ms(1500), ms(2000)],
                reveal: ms(2800),
            }),
            Screen::Scanner => None,
        }
    }
}

pub enum ScreenState {
    Story(NarrativeSession),
    Scan(ScanSession),
}

/// Forward-only walk through the screens. Navigating away from a screen
/// drops its session.
pub struct Journey {
    screen: Screen,
    state: ScreenState,
    keywords: DiseaseKeywords,
    scan_intro: Duration,
}

impl Journey {
    pub fn new(keywords: DiseaseKeywords) -> Self {
        Self::starting_at(Screen::Welcome, keywords)
    }

    pub fn starting_at(screen: Screen, keywords: DiseaseKeywords) -> Self {
        Self::with_scan_intro(screen, keywords, SCAN_INTRO)
    }

    pub fn with_scan_intro(screen: Screen, keywords: DiseaseKeywords, scan_intro: Duration) -> Self {
        let state = mount(screen, &keywords, scan_intro);
        Self {
            screen,
            state,
            keywords,
            scan_intro,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    pub fn scan_session(&mut self) -> Option<&mut ScanSession> {
        match &mut self.state {
            ScreenState::Scan(session) => Some(session),
            ScreenState::Story(_) => None,
        }
    }

    pub fn can_advance(&self) -> bool {
        if self.screen.next().is_none() {
            return false;
        }
        match &self.state {
            ScreenState::Story(session) => session.can_continue(),
            ScreenState::Scan(session) => session.can_continue(),
        }
    }

    /// Moves to the next screen if the current one allows it.
    pub fn advance(&mut self) -> Option<Screen> {
        if !self.can_advance() {
            return None;
        }
        let next = self.screen.next()?;
        self.go_to(next);
        Some(next)
    }

    /// The welcome screen's "Try Scanner" shortcut.
    pub fn skip_to_scanner(&mut self) -> bool {
        if self.screen != Screen::Welcome {
            return false;
        }
        self.go_to(Screen::Scanner);
        true
    }

    pub fn tap(&mut self) -> bool {
        match &mut self.state {
            ScreenState::Story(session) => session.tap(),
            ScreenState::Scan(_) => false,
        }
    }

    pub fn poll(&mut self) -> bool {
        match &mut self.state {
            ScreenState::Story(session) => session.poll(),
            ScreenState::Scan(session) => session.poll(),
        }
    }

    fn go_to(&mut self, screen: Screen) {
        log::info!("navigating {:?} -> {:?}", self.screen, screen);
        self.state = mount(screen, &self.keywords, self.scan_intro);
        self.screen = screen;
    }
}

fn mount(screen: Screen, keywords: &DiseaseKeywords, scan_intro: Duration) -> ScreenState {
    match screen.script() {
        Some(script) => {
            let mut session = NarrativeSession::new(script);
            session.mount();
            ScreenState::Story(session)
        }
        None => {
            let mut session = ScanSession::new(keywords.clone());
            session.mount(scan_intro);
            ScreenState::Scan(session)
        }
    }
}
