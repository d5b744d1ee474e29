use super::fixture::{image, Fixture};
use crate::art_classifier::core::{Event, LOADED_TEXT, LOAD_FAILED_TEXT};
use crate::error::PreconditionViolation;
use crate::ui::impl_fake::UiCall;
use std::sync::Arc;
use std::time::Duration;

fn spawn(fixture: &Fixture) -> std::thread::JoinHandle<()> {
    let art_classifier = fixture.art_classifier.clone();
    std::thread::spawn(move || {
        art_classifier.run().unwrap();
    })
}

#[test]
fn test_end_to_end_renders_top_three() {
    let f = Fixture::new();
    let sender = f.art_classifier.sender();
    let handle = spawn(&f);

    assert!(f.wait_for_ui(|ui| ui.calls.iter().any(|call| matches!(
        call,
        UiCall::LoadingStatus { text, .. } if text == LOADED_TEXT
    ))));

    sender.send(Event::ImageSelected(image(256, 128))).unwrap();
    sender.send(Event::PredictRequested).unwrap();

    assert!(f.wait_for_ui(|ui| ui
        .last_result_list()
        .map(|results| !results.is_empty())
        .unwrap_or(false)));

    sender.send(Event::Quit).unwrap();
    handle.join().unwrap();

    let ui = f.ui.lock().unwrap();
    let results = ui.last_result_list().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].label, "Expressionismo");
    assert_eq!(results[0].percent(), "60.00%");

    let (modal, visible) = ui.last_modal().unwrap();
    let modal = modal.as_ref().unwrap();
    assert!(visible);
    assert_eq!(modal.top_label, "Expressionismo");
    assert_eq!(modal.top_score_percent, "60.00%");
    assert_eq!(modal.image.width(), 256);

    assert_eq!(f.loader.run_count(), 1);
    assert_eq!(f.art_classifier.session.ledger().live(), 0);
    assert!(ui.warnings().is_empty());
}

#[test]
fn test_loading_status_hides_after_delay() {
    let f = Fixture::new();
    let sender = f.art_classifier.sender();
    let handle = spawn(&f);

    assert!(f.wait_for_ui(|ui| ui.last_loading_status() == Some((LOADED_TEXT, false))));

    sender.send(Event::Quit).unwrap();
    handle.join().unwrap();
}

#[test]
fn test_predict_during_slow_load_never_reaches_model() {
    let f = Fixture::with_loader(|loader| loader.with_load_delay(Duration::from_millis(300)));
    let sender = f.art_classifier.sender();
    let handle = spawn(&f);

    sender.send(Event::ImageSelected(image(128, 128))).unwrap();
    sender.send(Event::PredictRequested).unwrap();

    let expected = PreconditionViolation::ModelLoading.to_string();
    assert!(f.wait_for_ui(|ui| ui.warnings().contains(&expected)));

    sender.send(Event::Quit).unwrap();
    handle.join().unwrap();

    assert_eq!(f.loader.run_count(), 0);
}

#[test]
fn test_load_failure_shows_persistent_indicator() {
    let f = Fixture::with_loader(|loader| loader.failing());
    let sender = f.art_classifier.sender();
    let handle = spawn(&f);

    assert!(f.wait_for_ui(|ui| ui.last_loading_status() == Some((LOAD_FAILED_TEXT, true))));

    sender.send(Event::ImageSelected(image(128, 128))).unwrap();
    sender.send(Event::PredictRequested).unwrap();

    let expected = PreconditionViolation::ModelFailed.to_string();
    assert!(f.wait_for_ui(|ui| ui.warnings().contains(&expected)));

    sender.send(Event::Quit).unwrap();
    handle.join().unwrap();

    assert_eq!(f.loader.run_count(), 0);
    let ui = f.ui.lock().unwrap();
    assert_eq!(ui.last_loading_status(), Some((LOAD_FAILED_TEXT, true)));
}

#[test]
fn test_empty_image_warns_and_leaks_nothing() {
    let f = Fixture::new();
    let sender = f.art_classifier.sender();
    let handle = spawn(&f);

    assert!(f.wait_for_ui(|ui| ui.calls.iter().any(|call| matches!(
        call,
        UiCall::LoadingStatus { text, .. } if text == LOADED_TEXT
    ))));

    sender.send(Event::ImageSelected(image(64, 0))).unwrap();
    sender.send(Event::PredictRequested).unwrap();

    assert!(f.wait_for_ui(|ui| !ui.warnings().is_empty()));

    sender.send(Event::Quit).unwrap();
    handle.join().unwrap();

    let ui = f.ui.lock().unwrap();
    assert!(ui.warnings()[0].contains("no pixels"));
    assert_eq!(f.loader.run_count(), 0);
    assert_eq!(f.art_classifier.session.ledger().live(), 0);
    assert_eq!(f.art_classifier.session.ledger().allocated(), 1);
}

#[test]
fn test_forward_pass_failure_warns_without_result() {
    let f = Fixture::with_loader(|loader| loader.failing_run());
    let sender = f.art_classifier.sender();
    let handle = spawn(&f);

    assert!(f.wait_for_ui(|ui| ui.calls.iter().any(|call| matches!(
        call,
        UiCall::LoadingStatus { text, .. } if text == LOADED_TEXT
    ))));

    sender.send(Event::ImageSelected(image(160, 90))).unwrap();
    sender.send(Event::PredictRequested).unwrap();

    assert!(f.wait_for_ui(|ui| !ui.warnings().is_empty()));

    sender.send(Event::Quit).unwrap();
    handle.join().unwrap();

    let ui = f.ui.lock().unwrap();
    assert!(ui.warnings()[0].contains("fake model configured to fail"));
    assert_eq!(ui.last_result_list().map(Vec::len), Some(0));
    assert!(matches!(ui.last_modal(), Some((None, false))));
    assert_eq!(f.loader.run_count(), 1);
    assert_eq!(f.art_classifier.session.ledger().live(), 0);
    assert_eq!(f.art_classifier.session.ledger().allocated(), 4);
}

#[test]
fn test_modal_shows_the_predicted_image() {
    let f = Fixture::new();
    let sender = f.art_classifier.sender();
    let handle = spawn(&f);
    let picked = image(200, 300);

    assert!(f.wait_for_ui(|ui| ui.calls.iter().any(|call| matches!(
        call,
        UiCall::LoadingStatus { text, .. } if text == LOADED_TEXT
    ))));

    sender.send(Event::ImageSelected(picked.clone())).unwrap();
    sender.send(Event::PredictRequested).unwrap();

    assert!(f.wait_for_ui(|ui| matches!(ui.last_modal(), Some((Some(_), true)))));

    sender.send(Event::Quit).unwrap();
    handle.join().unwrap();

    let ui = f.ui.lock().unwrap();
    let (modal, _) = ui.last_modal().unwrap();
    assert!(Arc::ptr_eq(&modal.as_ref().unwrap().image, &picked));
}
