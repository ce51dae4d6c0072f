use chart_scene::core::SettingKey;
use chart_scene::interaction::{GestureAction, GesturePhase, GestureState, PointerEvent};
use chart_scene::scene::Root;

#[test]
fn click_without_movement_stays_a_click() {
    let mut gesture = GestureState::new();

    assert_eq!(gesture.on_event(PointerEvent::down(10.0, 10.0)), None);
    assert_eq!(gesture.phase(), GesturePhase::Down);

    let action = gesture.on_event(PointerEvent::up(10.0, 10.0));
    assert!(matches!(action, Some(GestureAction::Click { .. })));
    assert_eq!(gesture.phase(), GesturePhase::Idle);
}

#[test]
fn small_jitter_below_threshold_does_not_start_a_drag() {
    let mut gesture = GestureState::new();
    gesture.on_event(PointerEvent::down(10.0, 10.0));

    assert_eq!(gesture.on_event(PointerEvent::moved(11.0, 11.0)), None);
    assert_eq!(gesture.phase(), GesturePhase::Down);

    let action = gesture.on_event(PointerEvent::up(11.0, 11.0));
    assert!(matches!(action, Some(GestureAction::Click { .. })));
}

#[test]
fn movement_past_threshold_starts_a_drag() {
    let mut gesture = GestureState::new();
    gesture.on_event(PointerEvent::down(0.0, 0.0));

    let action = gesture.on_event(PointerEvent::moved(5.0, 0.0));
    assert!(matches!(action, Some(GestureAction::DragStart { .. })));
    assert_eq!(gesture.phase(), GesturePhase::Dragging);

    let action = gesture.on_event(PointerEvent::moved(8.0, 2.0));
    match action {
        Some(GestureAction::DragMove { delta, total }) => {
            assert_eq!(delta.x, 3.0);
            assert_eq!(delta.y, 2.0);
            assert_eq!(total.x, 8.0);
            assert_eq!(total.y, 2.0);
        }
        other => panic!("expected DragMove, got {other:?}"),
    }

    let action = gesture.on_event(PointerEvent::up(8.0, 2.0));
    assert!(matches!(action, Some(GestureAction::DragEnd { .. })));
    assert_eq!(gesture.phase(), GesturePhase::Idle);
}

#[test]
fn moves_without_a_down_are_ignored() {
    let mut gesture = GestureState::new();
    assert_eq!(gesture.on_event(PointerEvent::moved(50.0, 50.0)), None);
    assert_eq!(gesture.on_event(PointerEvent::up(50.0, 50.0)), None);
    assert_eq!(gesture.phase(), GesturePhase::Idle);
}

#[test]
fn custom_threshold_is_respected() {
    let mut gesture = GestureState::new();
    gesture.set_drag_threshold(20.0);
    gesture.on_event(PointerEvent::down(0.0, 0.0));

    assert_eq!(gesture.on_event(PointerEvent::moved(10.0, 0.0)), None);
    let action = gesture.on_event(PointerEvent::moved(25.0, 0.0));
    assert!(matches!(action, Some(GestureAction::DragStart { .. })));
}

#[test]
fn root_routes_captured_gesture_to_the_down_target() {
    let mut root = Root::new();
    let node = root.new_graphics();
    root.push_child(root.container(), node);
    let other = root.new_graphics();
    root.push_child(root.container(), other);

    root.pointer_event(node, PointerEvent::down(0.0, 0.0));
    // Moves reported against another node still route to the captor.
    let action = root.pointer_event(other, PointerEvent::moved(10.0, 0.0));
    assert!(matches!(action, Some(GestureAction::DragStart { .. })));

    let action = root.pointer_event(other, PointerEvent::up(10.0, 0.0));
    assert!(matches!(action, Some(GestureAction::DragEnd { .. })));

    // Capture is released after up.
    assert_eq!(root.pointer_event(other, PointerEvent::moved(20.0, 0.0)), None);
}

#[test]
fn drag_updates_position_settings() {
    let mut root = Root::new();
    let node = root.new_graphics();
    root.push_child(root.container(), node);
    root.set(node, SettingKey::X, 100.0);
    root.set(node, SettingKey::Y, 50.0);
    root.run_frame(0.0);

    root.pointer_event(node, PointerEvent::down(0.0, 0.0));
    root.pointer_event(node, PointerEvent::moved(5.0, 0.0));
    let action = root
        .pointer_event(node, PointerEvent::moved(12.0, 3.0))
        .expect("drag move");
    root.apply_drag(node, &action);
    root.run_frame(1.0);

    assert_eq!(root.settings(node).float(&SettingKey::X), Some(107.0));
    assert_eq!(root.settings(node).float(&SettingKey::Y), Some(53.0));
}

#[test]
fn disposing_the_captor_clears_the_capture() {
    let mut root = Root::new();
    let node = root.new_graphics();
    root.push_child(root.container(), node);
    let other = root.new_graphics();
    root.push_child(root.container(), other);

    root.pointer_event(node, PointerEvent::down(0.0, 0.0));
    root.dispose_node(node);

    // The stale capture must not panic or route to the dead node.
    let action = root.pointer_event(other, PointerEvent::moved(10.0, 0.0));
    assert_eq!(action, None);
}
