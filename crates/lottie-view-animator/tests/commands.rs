use lottie_view_animator::AnimatorViewHandler;
use lottie_view_core::{
    AnimationSource, LottieEngine, SharedAnimationView, UiScheduler, ViewCommand, ViewEvent,
};
use lottie_view_fixtures::{test_composition, EngineOp, EventLog, HostHarness, MockAnimatorEngine};

fn attach(view: &SharedAnimationView) -> HostHarness<AnimatorViewHandler<MockAnimatorEngine>> {
    let scheduler = UiScheduler::new();
    let handler = AnimatorViewHandler::new(view, scheduler.clone(), || {
        MockAnimatorEngine::with_composition(test_composition())
    });
    HostHarness::attach(view.clone(), scheduler, handler)
}

#[test]
fn stop_cancels_and_rewinds_the_engine() {
    let view = SharedAnimationView::new();
    view.set_animation(Some(AnimationSource::asset("spinner.json")));
    let log = EventLog::attach(&view);
    let harness = attach(&view);
    harness.pump();

    view.play();
    harness.engine.borrow_mut().emit_update(0.5);
    harness.pump();
    assert!(view.is_animating());
    log.clear();
    harness.engine.borrow_mut().take_ops();

    view.stop();
    harness.pump();

    assert_eq!(
        harness.engine.borrow().ops(),
        &[EngineOp::Cancel, EngineOp::SetProgress(0.0)]
    );
    assert_eq!(harness.engine.borrow().progress(), 0.0);
    assert_eq!(log.names(), ["stopped"]);
    assert!(!view.is_animating());
}

#[test]
fn frame_range_command_bounds_then_plays() {
    let view = SharedAnimationView::new();
    view.set_animation(Some(AnimationSource::asset("spinner.json")));
    let log = EventLog::attach(&view);
    let harness = attach(&view);
    harness.pump();
    harness.engine.borrow_mut().take_ops();

    view.play_frame_range(10, 40);
    harness.pump();

    assert_eq!(
        harness.engine.borrow().ops(),
        &[
            EngineOp::SetMinFrame(10),
            EngineOp::SetMaxFrame(40),
            EngineOp::Play,
        ]
    );

    // progress reports stay inside the corresponding normalized band
    log.clear();
    harness.engine.borrow_mut().emit_update(0.3);
    harness.pump();
    let events = log.events();
    match &events[..] {
        [ViewEvent::Progress { value }] => {
            assert!(*value >= 10.0 / 60.0 && *value <= 40.0 / 60.0);
        }
        other => panic!("expected one progress event, got {other:?}"),
    }
}

#[test]
fn progress_range_command_bounds_then_plays() {
    let view = SharedAnimationView::new();
    view.set_animation(Some(AnimationSource::asset("spinner.json")));
    let harness = attach(&view);
    harness.pump();
    harness.engine.borrow_mut().take_ops();

    view.play_progress_range(0.2, 0.8);

    assert_eq!(
        harness.engine.borrow().ops(),
        &[
            EngineOp::SetMinProgress(0.2),
            EngineOp::SetMaxProgress(0.8),
            EngineOp::Play,
        ]
    );
}

#[test]
fn reverse_speed_command_reaches_the_engine() {
    let view = SharedAnimationView::new();
    view.set_animation(Some(AnimationSource::asset("spinner.json")));
    let harness = attach(&view);
    harness.pump();
    harness.engine.borrow_mut().take_ops();

    view.reverse_speed();
    assert_eq!(harness.engine.borrow().ops(), &[EngineOp::ReverseSpeed]);
}

#[test]
fn click_command_synthesizes_an_engine_click() {
    let view = SharedAnimationView::new();
    view.set_animation(Some(AnimationSource::asset("spinner.json")));
    let log = EventLog::attach(&view);
    let harness = attach(&view);
    harness.pump();
    log.clear();

    view.click();
    harness.pump();

    assert_eq!(harness.engine.borrow().count_op(&EngineOp::PerformClick), 1);
    assert_eq!(log.names(), ["clicked"]);
}

#[test]
fn host_dispatched_commands_use_the_command_table() {
    let view = SharedAnimationView::new();
    view.set_animation(Some(AnimationSource::asset("spinner.json")));
    let log = EventLog::attach(&view);
    let harness = attach(&view);
    harness.pump();
    harness.engine.borrow_mut().take_ops();
    log.clear();

    harness.dispatch_command(&ViewCommand::Play);
    harness.dispatch_command(&ViewCommand::Pause);
    harness.pump();

    assert_eq!(
        harness.engine.borrow().ops(),
        &[EngineOp::Play, EngineOp::Pause]
    );
    assert_eq!(log.names(), ["started", "paused"]);
}

#[test]
fn commands_after_detach_are_no_ops() {
    let view = SharedAnimationView::new();
    view.set_animation(Some(AnimationSource::asset("spinner.json")));
    let harness = attach(&view);
    harness.pump();
    harness.detach();
    harness.engine.borrow_mut().take_ops();

    view.play();
    view.stop();
    view.play_frame_range(1, 2);

    assert!(harness.engine.borrow().ops().is_empty());
    assert!(!view.is_attached());
}
