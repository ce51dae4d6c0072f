use approx::assert_relative_eq;
use chrono::{TimeZone, Utc};

use chart_scene::axis::{
    choose_grid_interval, Axis, AxisOrientation, AxisRenderer, AxisView, BaseInterval, ThumbDrag,
    TimeUnit, ZoomConstraints,
};
use chart_scene::error::SceneError;
use chart_scene::scene::{Easing, Root};

fn value_axis() -> Axis {
    Axis::new_value(0.0, 1_000.0).expect("valid axis")
}

fn day_axis(days: u32) -> Axis {
    let day = 86_400_000.0;
    Axis::new_date(
        0.0,
        day * f64::from(days),
        Some(BaseInterval::new(TimeUnit::Day, 1)),
    )
    .expect("valid date axis")
}

#[test]
fn new_value_rejects_degenerate_ranges() {
    assert!(Axis::new_value(5.0, 5.0).is_err());
    assert!(Axis::new_value(10.0, 1.0).is_err());
    assert!(Axis::new_value(f64::NAN, 1.0).is_err());
    assert!(Axis::new_value(0.0, f64::INFINITY).is_err());
}

#[test]
fn date_axis_without_base_interval_is_a_config_error() {
    let result = Axis::new_date(0.0, 86_400_000.0, None);
    assert!(matches!(result, Err(SceneError::MissingBaseInterval)));
}

#[test]
fn window_starts_fully_open() {
    let axis = value_axis();
    assert_eq!(axis.start(), 0.0);
    assert_eq!(axis.end(), 1.0);
}

#[test]
fn set_window_swaps_inverted_bounds() {
    let mut axis = value_axis();
    axis.set_window(0.8, 0.2);
    assert_relative_eq!(axis.start(), 0.2);
    assert_relative_eq!(axis.end(), 0.8);
}

#[test]
fn set_window_clamps_out_of_range_requests() {
    let mut axis = value_axis();
    axis.set_window(-0.5, 0.5);
    assert_eq!(axis.start(), 0.0);
    assert_relative_eq!(axis.end(), 0.5);

    axis.set_window(0.7, 1.9);
    assert_relative_eq!(axis.start(), 0.7);
    assert_eq!(axis.end(), 1.0);
}

#[test]
fn set_window_enforces_max_zoom_factor() {
    let mut axis = value_axis();
    axis.set_constraints(ZoomConstraints {
        max_zoom_factor: 10.0,
        ..ZoomConstraints::default()
    });

    axis.set_window(0.50, 0.51);
    // Window can never get narrower than 1/10 of the range.
    assert_relative_eq!(axis.end() - axis.start(), 0.1, epsilon = 1e-12);
    assert!(axis.start() >= 0.0 && axis.end() <= 1.0);
}

#[test]
fn min_zoom_count_keeps_enough_intervals_visible() {
    let mut axis = day_axis(10);
    axis.set_constraints(ZoomConstraints {
        min_zoom_count: Some(5),
        ..ZoomConstraints::default()
    });

    // Asking for 1 of 10 days grows back to 5 days around the center.
    axis.set_window(0.4, 0.5);
    assert_relative_eq!(axis.end() - axis.start(), 0.5, epsilon = 1e-12);
}

#[test]
fn max_zoom_count_limits_visible_intervals() {
    let mut axis = day_axis(10);
    axis.set_constraints(ZoomConstraints {
        max_zoom_count: Some(2),
        ..ZoomConstraints::default()
    });

    axis.set_window(0.0, 1.0);
    assert_relative_eq!(axis.end() - axis.start(), 0.2, epsilon = 1e-12);
}

#[test]
fn pan_preserves_width_until_the_edge() {
    let mut axis = value_axis();
    axis.zoom_to_window(0.2, 0.4);

    axis.pan_by(0.3);
    assert_relative_eq!(axis.start(), 0.5);
    assert_relative_eq!(axis.end(), 0.7);

    // Panning past the edge pins the window, width intact.
    axis.pan_by(10.0);
    assert_relative_eq!(axis.start(), 0.8);
    assert_eq!(axis.end(), 1.0);
}

#[test]
fn zoom_in_and_out_are_centered() {
    let mut axis = value_axis();
    axis.zoom_to_window(0.2, 0.6);

    axis.zoom_in();
    assert_relative_eq!(axis.start(), 0.3);
    assert_relative_eq!(axis.end(), 0.5);

    axis.zoom_out();
    assert_relative_eq!(axis.start(), 0.2);
    assert_relative_eq!(axis.end(), 0.6);
}

#[test]
fn zoom_to_values_maps_through_the_domain() {
    let mut axis = value_axis();
    axis.zoom_to_values(250.0, 750.0);
    assert_relative_eq!(axis.start(), 0.25);
    assert_relative_eq!(axis.end(), 0.75);
}

#[test]
fn zoom_to_dates_uses_epoch_milliseconds() {
    let mut axis = day_axis(10);
    let from = Utc.timestamp_millis_opt(86_400_000).unwrap();
    let to = Utc.timestamp_millis_opt(86_400_000 * 6).unwrap();

    axis.zoom_to_dates(from, to);
    assert_relative_eq!(axis.start(), 0.1);
    assert_relative_eq!(axis.end(), 0.6);
}

#[test]
fn window_animation_lands_on_the_exact_target() {
    let mut axis = value_axis();
    axis.animate_window(0.25, 0.75, 100.0, Easing::Linear, 0.0);
    assert!(axis.is_animating());

    axis.tick(50.0);
    assert!(axis.start() > 0.0 && axis.start() < 0.25);

    axis.tick(100.0);
    assert!(!axis.is_animating());
    assert_eq!(axis.start(), 0.25);
    assert_eq!(axis.end(), 0.75);
}

#[test]
fn thumb_drag_with_zoom_pan_widens_symmetrically() {
    let mut axis = value_axis();
    axis.zoom_to_window(0.4, 0.6);
    let drag = ThumbDrag::begin(&axis);

    drag.pan_zoom(&mut axis, 0.2);
    // extra = 0.2 * min(1, 0.2) / 2 = 0.02 on each side.
    assert_relative_eq!(axis.start(), 0.38, epsilon = 1e-12);
    assert_relative_eq!(axis.end(), 0.62, epsilon = 1e-12);

    // Later deltas recompute from the grabbed window, not the current one.
    drag.pan_zoom(&mut axis, 0.1);
    assert_relative_eq!(axis.start(), 0.39, epsilon = 1e-12);
    assert_relative_eq!(axis.end(), 0.61, epsilon = 1e-12);
}

#[test]
fn coordinate_mapping_tracks_the_window() {
    let mut axis = value_axis();
    let renderer = AxisRenderer::new(AxisOrientation::Horizontal, 1_000.0);

    assert_relative_eq!(renderer.position_to_coordinate(&axis, 0.5), 500.0);

    axis.zoom_to_window(0.5, 1.0);
    // The same position maps through the new window with no stale cache.
    assert_relative_eq!(renderer.position_to_coordinate(&axis, 0.5), 0.0);
    assert_relative_eq!(renderer.position_to_coordinate(&axis, 0.75), 500.0);
}

#[test]
fn inversed_renderer_mirrors_coordinates() {
    let axis = value_axis();
    let mut renderer = AxisRenderer::new(AxisOrientation::Vertical, 800.0);
    renderer.set_inversed(true);

    assert_relative_eq!(renderer.position_to_coordinate(&axis, 0.0), 800.0);
    assert_relative_eq!(renderer.position_to_coordinate(&axis, 1.0), 0.0);
    assert_relative_eq!(renderer.coordinate_to_position(&axis, 0.0), 1.0);
}

#[test]
fn grid_interval_coarsens_as_pixel_density_drops() {
    let base = BaseInterval::new(TimeUnit::Day, 1);
    let day = 86_400_000.0;

    let dense = choose_grid_interval(base, 2_000.0, 30.0 * day, 60.0);
    let sparse = choose_grid_interval(base, 200.0, 30.0 * day, 60.0);

    assert!(sparse.approx_millis() >= dense.approx_millis());
    // Never finer than the declared base interval.
    assert!(dense.approx_millis() >= day);
}

#[test]
fn grid_interval_is_monotone_over_shrinking_lengths() {
    let base = BaseInterval::new(TimeUnit::Minute, 1);
    let span = 6.0 * 3_600_000.0;
    let mut previous = 0.0;
    for length in [4_000.0, 2_000.0, 1_000.0, 500.0, 250.0, 125.0] {
        let chosen = choose_grid_interval(base, length, span, 60.0);
        assert!(chosen.approx_millis() >= previous);
        previous = chosen.approx_millis();
    }
}

#[test]
fn axis_view_pools_scale_with_the_window_not_the_domain() {
    let mut root = Root::new();
    let renderer = AxisRenderer::new(AxisOrientation::Horizontal, 600.0);
    let mut view = AxisView::new(&mut root, renderer);
    root.push_child(root.container(), view.container());

    // Ten years of daily data, but only a month visible.
    let axis = {
        let day = 86_400_000.0;
        let mut axis = Axis::new_date(
            0.0,
            day * 3_650.0,
            Some(BaseInterval::new(TimeUnit::Day, 1)),
        )
        .expect("valid axis");
        axis.zoom_to_window(0.5, 0.5 + 30.0 / 3_650.0);
        axis
    };

    view.sync(&mut root, &axis);
    root.run_frame(0.0);

    let pooled = view.pooled_element_count();
    assert!(pooled > 0);
    // Roughly the visible steps plus buffer, times three element classes.
    assert!(pooled < 120, "pooled {pooled} elements");
}

#[test]
fn axis_view_reuses_elements_across_small_pans() {
    let mut root = Root::new();
    let renderer = AxisRenderer::new(AxisOrientation::Horizontal, 600.0);
    let mut view = AxisView::new(&mut root, renderer);
    root.push_child(root.container(), view.container());

    let mut axis = day_axis(60);
    axis.zoom_to_window(0.0, 0.25);
    view.sync(&mut root, &axis);
    root.run_frame(0.0);
    let before = view.pooled_element_count();

    // A pan of a fraction of one step keeps the same pool.
    axis.pan_by(0.001);
    view.sync(&mut root, &axis);
    root.run_frame(1.0);
    assert_eq!(view.pooled_element_count(), before);
}

#[test]
fn axis_view_disposes_elements_that_leave_the_window() {
    let mut root = Root::new();
    let renderer = AxisRenderer::new(AxisOrientation::Horizontal, 600.0);
    let mut view = AxisView::new(&mut root, renderer);
    root.push_child(root.container(), view.container());

    let mut axis = day_axis(365);
    axis.zoom_to_window(0.0, 0.1);
    view.sync(&mut root, &axis);
    root.run_frame(0.0);
    let at_start = view.pooled_element_count();

    // Jump to the far end: same window width, fully different steps.
    axis.zoom_to_window(0.9, 1.0);
    view.sync(&mut root, &axis);
    root.run_frame(1.0);

    let at_end = view.pooled_element_count();
    // Step alignment can add or drop one index per element class, but the
    // pool never accumulates the steps that scrolled out.
    assert!(
        (at_start as i64 - at_end as i64).abs() <= 3,
        "pool drifted: {at_start} -> {at_end}"
    );
}

#[test]
fn visible_span_follows_the_window() {
    let mut axis = value_axis();
    assert_relative_eq!(axis.visible_span(), 1_000.0);
    axis.zoom_to_window(0.25, 0.75);
    assert_relative_eq!(axis.visible_span(), 500.0);
}
