use chart_scene::axis::{Axis, AxisOrientation, AxisRenderer, ZoomConstraints};
use proptest::prelude::*;

proptest! {
    #[test]
    fn coordinate_round_trip_property(
        start in 0.0f64..0.99,
        width in 0.01f64..1.0,
        length in 1.0f64..10_000.0,
        inversed in any::<bool>(),
        position_factor in 0.0f64..1.0
    ) {
        let end = (start + width).min(1.0);
        prop_assume!(end - start >= 0.01);

        let mut axis = Axis::new_value(0.0, 1.0).expect("valid axis");
        axis.zoom_to_window(start, end);
        let mut renderer = AxisRenderer::new(AxisOrientation::Horizontal, length);
        renderer.set_inversed(inversed);

        let position = axis.start() + position_factor * (axis.end() - axis.start());
        let coordinate = renderer.position_to_coordinate(&axis, position);
        let recovered = renderer.coordinate_to_position(&axis, coordinate);

        prop_assert!((recovered - position).abs() <= 1e-9);
    }

    #[test]
    fn window_invariant_survives_arbitrary_transitions(
        requests in prop::collection::vec((-2.0f64..3.0, -2.0f64..3.0), 1..50)
    ) {
        let mut axis = Axis::new_value(-500.0, 500.0).expect("valid axis");
        for (a, b) in requests {
            axis.set_window(a, b);
            prop_assert!(axis.start() >= 0.0);
            prop_assert!(axis.end() <= 1.0);
            prop_assert!(axis.start() < axis.end());
        }
    }

    #[test]
    fn window_invariant_survives_pans_and_zooms(
        steps in prop::collection::vec(-1.0f64..1.0, 1..50)
    ) {
        let mut axis = Axis::new_value(0.0, 100.0).expect("valid axis");
        axis.set_constraints(ZoomConstraints {
            max_zoom_factor: 100.0,
            ..ZoomConstraints::default()
        });
        axis.zoom_to_window(0.3, 0.6);
        for (index, step) in steps.iter().enumerate() {
            if index % 3 == 0 {
                axis.pan_by(*step);
            } else if index % 3 == 1 {
                axis.zoom_in();
            } else {
                axis.zoom_out();
            }
            prop_assert!(axis.start() >= 0.0);
            prop_assert!(axis.end() <= 1.0);
            prop_assert!(axis.end() - axis.start() >= 0.01 - 1e-12);
        }
    }

    #[test]
    fn value_round_trip_through_positions(
        min in -1_000.0f64..1_000.0,
        span in 0.001f64..10_000.0,
        factor in 0.0f64..1.0
    ) {
        let max = min + span;
        let axis = Axis::new_value(min, max).expect("valid axis");
        let value = min + factor * span;

        let recovered = axis.position_to_value(axis.value_to_position(value));
        prop_assert!((recovered - value).abs() <= 1e-7 * span.max(1.0));
    }
}
