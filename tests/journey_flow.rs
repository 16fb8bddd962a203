mod common;

use std::time::Duration;

use common::{ColourClassifier, Fixed, Scripted, leaf_sample, write_jpeg};
use indigo::{
    ClassificationError, ResourceKind, Verdict,
    interpreter::DiseaseKeywords,
    journey::{Journey, Screen},
    pipeline::{BundledSamples, start_classifier},
    ui::AppView,
    voice::{LogVoice, RecordingVoice},
};

fn rust_bundle() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_jpeg(&dir.path().join("rust_1.jpg"), [200, 90, 30]);
    dir
}

#[test]
fn scanner_shows_disease_for_a_rusty_sample() {
    let dir = rust_bundle();
    let (classifier, _worker) = start_classifier(|| Ok(ColourClassifier));
    let source = BundledSamples::new(dir.path(), vec!["rust_1".to_string()], "jpg");

    let mut view = AppView::scanner(
        DiseaseKeywords::default(),
        classifier,
        Box::new(source),
        Box::new(LogVoice),
    )
    .with_echo(false)
    .with_timeout(Duration::from_secs(10));

    let report = view.run_scan().unwrap();
    assert_eq!(report.verdict, Verdict::Diseased);
    assert_eq!(report.result.label(), "Rust_Leaf");

    let transcript = view.transcript();
    assert!(transcript.iter().any(|l| l.contains("Disease Detected")));
    assert!(transcript.iter().any(|l| l.contains("Confidence: 87%")));
    assert!(transcript.iter().any(|l| l.contains("Analyzing leaf")));
}

#[test]
fn listen_speaks_the_summary() {
    let (classifier, _worker) = start_classifier(|| {
        Ok(Fixed {
            label: "Healthy",
            probability: 0.95,
        })
    });
    let voice = RecordingVoice::default();
    let mut view = AppView::scanner(
        DiseaseKeywords::default(),
        classifier,
        Box::new(Scripted(Ok(leaf_sample()))),
        Box::new(voice.clone()),
    )
    .with_echo(false)
    .with_listen(true);

    let report = view.run_scan().unwrap();
    assert_eq!(report.verdict, Verdict::Healthy);
    assert_eq!(
        voice.take(),
        vec!["Result: Healthy. Confidence: 95 percent.".to_string()]
    );
}

#[test]
fn scan_error_is_returned_and_shown() {
    let (classifier, _worker) = start_classifier(|| {
        Err::<Fixed, _>(ClassificationError::missing(
            ResourceKind::Model,
            "models/indigo_leaf_classifier.onnx",
        ))
    });
    let mut view = AppView::scanner(
        DiseaseKeywords::default(),
        classifier,
        Box::new(Scripted(Ok(leaf_sample()))),
        Box::new(LogVoice),
    )
    .with_echo(false)
    .with_timeout(Duration::from_secs(10));

    let err = view.run_scan().unwrap_err();
    assert!(err.to_string().contains("Could not find model"));
    assert_eq!(view.journey().screen(), Screen::Scanner);
}

#[test]
fn try_scanner_shortcut_ends_on_recovery() {
    let dir = rust_bundle();
    let (classifier, _worker) = start_classifier(|| Ok(ColourClassifier));
    let source = BundledSamples::new(dir.path(), vec!["rust_1".to_string()], "jpg");

    let mut journey = Journey::new(DiseaseKeywords::default());
    assert!(journey.skip_to_scanner());
    assert_eq!(journey.screen(), Screen::Scanner);

    let mut view = AppView::new(journey, classifier, Box::new(source), Box::new(LogVoice))
        .with_echo(false)
        .with_timeout(Duration::from_secs(20));
    view.run_journey().unwrap();

    assert_eq!(view.journey().screen(), Screen::Recovery);
    let transcript = view.transcript();
    assert!(transcript.iter().any(|l| l.contains("Disease Detected")));
    assert!(transcript.iter().any(|l| l.contains("Crisis Avoided")));
}

#[test]
fn full_journey_walks_every_screen() {
    let (classifier, _worker) = start_classifier(|| {
        Ok(Fixed {
            label: "Healthy",
            probability: 0.9,
        })
    });
    let mut view = AppView::new(
        Journey::new(DiseaseKeywords::default()),
        classifier,
        Box::new(Scripted(Ok(leaf_sample()))),
        Box::new(LogVoice),
    )
    .with_echo(false)
    .with_timeout(Duration::from_secs(30));
    view.run_journey().unwrap();

    let titles: Vec<&String> = view
        .transcript()
        .iter()
        .filter(|l| l.starts_with("== "))
        .collect();
    for screen in [
        Screen::Welcome,
        Screen::Planting,
        Screen::Crisis,
        Screen::Scanner,
        Screen::Recovery,
    ] {
        let heading = format!("== {} ==", screen.title());
        assert!(titles.iter().any(|t| **t == heading), "missing {heading}");
    }
    assert!(view.transcript().iter().any(|l| l.contains("Healthy Leaf")));
}
