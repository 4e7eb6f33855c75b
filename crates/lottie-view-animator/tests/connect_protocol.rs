use lottie_view_animator::AnimatorViewHandler;
use lottie_view_core::{
    AnimationSource, PlatformHandler, RepeatMode, SharedAnimationView, UiScheduler, ViewProperty,
};
use lottie_view_fixtures::{test_composition, EngineOp, HostHarness, MockAnimatorEngine};

fn attach(view: &SharedAnimationView) -> HostHarness<AnimatorViewHandler<MockAnimatorEngine>> {
    let scheduler = UiScheduler::new();
    let handler = AnimatorViewHandler::new(view, scheduler.clone(), || {
        MockAnimatorEngine::with_composition(test_composition())
    });
    HostHarness::attach(view.clone(), scheduler, handler)
}

#[test]
fn listeners_added_equal_listeners_removed() {
    let view = SharedAnimationView::new();
    view.set_animation(Some(AnimationSource::asset("spinner.json")));
    let harness = attach(&view);
    harness.pump();

    // animator + update + loaded + failure + click
    assert_eq!(harness.engine.borrow().listener_adds(), 5);
    assert_eq!(harness.engine.borrow().listener_removes(), 0);

    harness.detach();
    let engine = harness.engine.borrow();
    assert_eq!(engine.listener_adds(), engine.listener_removes());
}

#[test]
fn connect_does_not_play_without_auto_play() {
    let view = SharedAnimationView::new();
    view.set_animation(Some(AnimationSource::asset("spinner.json")));
    let harness = attach(&view);
    harness.pump();

    assert_eq!(harness.engine.borrow().count_op(&EngineOp::Play), 0);
    assert!(!view.is_animating());
}

#[test]
fn connect_applies_defaults_in_the_fixed_order() {
    let view = SharedAnimationView::new();
    view.set_animation(Some(AnimationSource::asset("spinner.json")));
    let harness = attach(&view);

    assert_eq!(
        harness.engine.borrow().ops(),
        &[
            EngineOp::SetSource(AnimationSource::asset("spinner.json")),
            EngineOp::SetCacheEnabled(true),
            EngineOp::SetSpeed(1.0),
            EngineOp::ConfigureRepeat(RepeatMode::Restart, 1),
            EngineOp::SetFrame(0),
            EngineOp::SetProgress(0.0),
            EngineOp::EnableMergePaths(false),
        ]
    );
}

#[test]
fn connect_pushes_every_declared_property_exactly_once() {
    let view = SharedAnimationView::new();
    view.set_animation(Some(AnimationSource::asset("spinner.json")));
    view.set_speed(2.0);
    view.set_repeat_mode(RepeatMode::Infinite);
    view.set_min_frame(Some(10));
    view.set_max_frame(Some(40));
    // progress bounds are also set but frame bounds take precedence
    view.set_min_progress(Some(0.1));
    view.set_max_progress(Some(0.9));
    view.set_image_assets_folder("images");
    view.set_frame(12);
    view.set_progress(0.25);
    view.set_merge_paths(true);

    let harness = attach(&view);

    assert_eq!(
        harness.engine.borrow().ops(),
        &[
            EngineOp::SetSource(AnimationSource::asset("spinner.json")),
            EngineOp::SetCacheEnabled(true),
            EngineOp::SetMinFrame(10),
            EngineOp::SetMaxFrame(40),
            EngineOp::SetSpeed(2.0),
            EngineOp::ConfigureRepeat(RepeatMode::Infinite, 1),
            EngineOp::SetImageAssetsFolder("images".into()),
            EngineOp::SetFrame(12),
            EngineOp::SetProgress(0.25),
            EngineOp::EnableMergePaths(true),
        ]
    );
}

#[test]
fn inverted_frame_bounds_are_skipped() {
    let view = SharedAnimationView::new();
    view.set_animation(Some(AnimationSource::asset("spinner.json")));
    view.set_min_frame(Some(40));
    view.set_max_frame(Some(10));
    let harness = attach(&view);

    let engine = harness.engine.borrow();
    assert_eq!(engine.count_op(&EngineOp::SetMinFrame(40)), 0);
    assert_eq!(engine.count_op(&EngineOp::SetMaxFrame(10)), 0);
}

#[test]
fn auto_play_issues_a_single_play() {
    let view = SharedAnimationView::new();
    view.set_animation(Some(AnimationSource::asset("spinner.json")));
    view.set_auto_play(true);
    let harness = attach(&view);
    harness.pump();

    assert_eq!(harness.engine.borrow().count_op(&EngineOp::Play), 1);
    assert!(view.is_animating());
}

#[test]
fn duration_mirrors_the_engine_after_load() {
    let view = SharedAnimationView::new();
    view.set_animation(Some(AnimationSource::asset("spinner.json")));
    let harness = attach(&view);
    harness.pump();

    assert_eq!(view.duration_ms(), 1000);
    assert_eq!(view.composition().map(|c| c.frame_count), Some(60));
}

#[test]
fn reapplying_a_property_leaves_engine_state_unchanged() {
    let view = SharedAnimationView::new();
    view.set_animation(Some(AnimationSource::asset("spinner.json")));
    view.set_speed(1.5);
    let harness = attach(&view);
    harness.pump();
    harness.engine.borrow_mut().take_ops();

    harness
        .handler
        .borrow_mut()
        .apply_property(ViewProperty::Speed);
    harness
        .handler
        .borrow_mut()
        .apply_property(ViewProperty::Speed);

    assert_eq!(
        harness.engine.borrow().ops(),
        &[EngineOp::SetSpeed(1.5), EngineOp::SetSpeed(1.5)]
    );
}

#[test]
fn property_changes_reconcile_through_the_notification_channel() {
    let view = SharedAnimationView::new();
    view.set_animation(Some(AnimationSource::asset("spinner.json")));
    let harness = attach(&view);
    harness.pump();
    harness.engine.borrow_mut().take_ops();

    view.set_speed(3.0);
    view.set_repeat_count(4);
    harness.pump();

    assert_eq!(
        harness.engine.borrow().ops(),
        &[
            EngineOp::SetSpeed(3.0),
            EngineOp::ConfigureRepeat(RepeatMode::Restart, 4),
        ]
    );
}

#[test]
fn detached_handler_ignores_property_dispatch() {
    let view = SharedAnimationView::new();
    view.set_animation(Some(AnimationSource::asset("spinner.json")));
    let harness = attach(&view);
    harness.pump();
    harness.detach();
    harness.engine.borrow_mut().take_ops();

    harness
        .handler
        .borrow_mut()
        .apply_property(ViewProperty::Speed);
    assert!(harness.engine.borrow().ops().is_empty());
    assert!(!harness.handler.borrow().is_connected());
}
