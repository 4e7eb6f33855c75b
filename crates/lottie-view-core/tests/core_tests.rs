use std::cell::RefCell;
use std::rc::Rc;

use lottie_view_core::{
    AdapterError, Composition, SharedAnimationView, UiScheduler, ViewEvent, ViewProperty,
};

#[test]
fn notifications_serialized_through_the_scheduler_keep_their_order() {
    // a host posts each notification and applies them on its UI loop
    let view = SharedAnimationView::new();
    let scheduler = UiScheduler::new();
    let applied = Rc::new(RefCell::new(Vec::new()));
    {
        let scheduler = scheduler.clone();
        let applied = applied.clone();
        view.on_property_changed(move |property| {
            let applied = applied.clone();
            scheduler.post(move || applied.borrow_mut().push(property));
        });
    }

    view.set_speed(2.0);
    view.set_progress(0.5);
    view.set_repeat_count(3);
    assert!(applied.borrow().is_empty());

    scheduler.drain();
    assert_eq!(
        applied.borrow().as_slice(),
        &[
            ViewProperty::Speed,
            ViewProperty::Progress,
            ViewProperty::RepeatCount
        ]
    );
}

#[test]
fn view_events_round_trip_through_serde() {
    let events = vec![
        ViewEvent::Started,
        ViewEvent::Progress { value: 0.42 },
        ViewEvent::Loaded {
            composition: Composition::new("spinner", 60, 1000),
        },
        ViewEvent::Failed {
            error: AdapterError::SourceRejected {
                reason: "asset:missing.json".into(),
            },
        },
    ];
    let text = serde_json::to_string(&events).unwrap();
    let back: Vec<ViewEvent> = serde_json::from_str(&text).unwrap();
    assert_eq!(events, back);
}

#[test]
fn progress_round_trip_is_the_clamped_value() {
    let view = SharedAnimationView::new();
    for (written, read) in [(0.25, 0.25), (1.7, 1.0), (-3.0, 0.0)] {
        view.set_progress(written);
        assert_eq!(view.progress(), read);
    }
}

#[test]
fn frame_progress_round_trip_matches_the_composition_ratio() {
    let composition = Composition::new("spinner", 60, 1000);
    for frame in [0, 15, 30, 59] {
        let progress = composition.progress_for_frame(frame);
        let back = composition.frame_for_progress(progress);
        assert!(back.abs_diff(frame) <= 1, "frame {frame} came back as {back}");
    }
}
