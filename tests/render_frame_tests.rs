use chart_scene::core::{Color, Viewport};
use chart_scene::render::{
    LinePrimitive, NullRenderer, RectPrimitive, RenderFrame, Renderer, TextHAlign, TextPrimitive,
};

fn sample_frame() -> RenderFrame {
    let mut frame = RenderFrame::new(Viewport::new(800, 600));
    frame.lines.push(LinePrimitive {
        x1: 0.0,
        y1: 10.0,
        x2: 800.0,
        y2: 10.0,
        stroke: Color::rgb(0.5, 0.5, 0.5),
        stroke_width: 1.0,
    });
    frame.rects.push(RectPrimitive {
        x: 10.0,
        y: 20.0,
        width: 100.0,
        height: 50.0,
        fill: Some(Color::rgb(0.1, 0.4, 0.8)),
        stroke: None,
        stroke_width: 1.0,
    });
    frame.texts.push(TextPrimitive {
        x: 12.0,
        y: 22.0,
        content: "42".to_owned(),
        font_size: 12.0,
        color: Color::rgb(0.0, 0.0, 0.0),
        h_align: TextHAlign::Left,
    });
    frame
}

#[test]
fn null_renderer_counts_validated_primitives() {
    let mut renderer = NullRenderer::default();
    renderer.render(&sample_frame()).expect("valid frame");

    assert_eq!(renderer.last_line_count, 1);
    assert_eq!(renderer.last_rect_count, 1);
    assert_eq!(renderer.last_text_count, 1);
}

#[test]
fn invalid_viewport_is_rejected() {
    let frame = RenderFrame::new(Viewport::new(0, 600));
    let mut renderer = NullRenderer::default();
    assert!(renderer.render(&frame).is_err());
}

#[test]
fn non_finite_geometry_is_rejected() {
    let mut frame = sample_frame();
    frame.rects[0].x = f64::NAN;
    assert!(frame.validate().is_err());

    let mut frame = sample_frame();
    frame.lines[0].stroke_width = -1.0;
    assert!(frame.validate().is_err());
}

#[test]
fn out_of_range_color_is_rejected() {
    let mut frame = sample_frame();
    frame.texts[0].color = Color::rgba(1.5, 0.0, 0.0, 1.0);
    assert!(frame.validate().is_err());
}

#[test]
fn empty_frame_is_valid() {
    let frame = RenderFrame::new(Viewport::new(100, 100));
    assert!(frame.validate().is_ok());
    assert!(frame.is_empty());
}
