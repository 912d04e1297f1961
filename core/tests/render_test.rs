// Graph geometry and frame composition tests
use crash_core::constants::MAX_GRID_MARKS;
use crash_core::graph::grid_marks;
use crash_core::{
    curve_points, display_max, grid_step, sample_crash_point, CrashPointProvider, DisplayList,
    DrawCommand, GraphRenderer, GraphStyle, GraphView, HashedCrashPoints, Point, Surface,
};

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

#[test]
fn test_grid_step_breakpoints() {
    assert_eq!(grid_step(10.0), 1);
    assert_eq!(grid_step(15.0), 2);
    assert_eq!(grid_step(20.0), 2);
    assert_eq!(grid_step(30.0), 5);
    assert_eq!(grid_step(50.0), 5);
    assert_eq!(grid_step(60.0), 10);
}

#[test]
fn test_display_max_keeps_headroom() {
    assert_eq!(display_max(10.0, 5.0), 10.0, "published max wins while it is larger");
    assert_eq!(display_max(10.0, 9.0), 11.0, "ceil(9 * 1.2)");
    assert_eq!(display_max(10.0, 25.0), 30.0);
}

#[test]
fn test_curve_runs_from_origin_to_multiplier() {
    let points = curve_points(5.0);
    assert_eq!(points.len(), 101, "100 steps plus the origin");
    assert_eq!(points[0], Point::ORIGIN);
    assert_eq!(*points.last().unwrap(), Point::new(5.0, 5.0), "endpoint is (m, m)");

    let mid = points[50];
    assert!((mid.x - 2.5).abs() < 1e-12);
    assert!((mid.y - 0.5f64.powf(1.5) * 5.0).abs() < 1e-12, "y = p^1.5 * m");
}

#[test]
fn test_endpoint_marker_lands_on_tip() {
    let renderer = GraphRenderer::default();
    let frame = renderer.frame(&GraphView::at(5.0, false), 800.0, 600.0);

    // plot area 700x500 over a 0..10 range
    let tip = Point::new(60.0 + 5.0 * 70.0, 540.0 - 5.0 * 50.0);
    let circles: Vec<_> = frame.circles().collect();
    assert_eq!(circles.len(), 2, "marker plus glow");
    assert!(circles.iter().all(|(c, _, _)| close(**c, tip)), "both circles at the tip");
    assert!(circles[1].2.is_some(), "inner circle glows");

    let label = frame.texts().find(|(_, t)| *t == "5.00x").expect("multiplier label");
    assert!(close(*label.0, Point::new(tip.x + 15.0, tip.y - 10.0)));
}

#[test]
fn test_grid_labels_follow_step() {
    let renderer = GraphRenderer::default();
    let frame = renderer.frame(&GraphView::at(5.0, false), 800.0, 600.0);
    let labels: Vec<&str> = frame.texts().map(|(_, t)| t).collect();
    assert_eq!(labels.len(), 11 * 2 + 1, "0x..10x on both axes plus the value label");
    assert!(labels.contains(&"0x") && labels.contains(&"10x"));

    let wide = renderer.frame(&GraphView::at(25.0, false), 800.0, 600.0);
    let labels: Vec<&str> = wide.texts().map(|(_, t)| t).collect();
    // range 30, step 5: 0,5,...,30
    assert_eq!(labels.len(), 7 * 2 + 1);
    assert!(labels.contains(&"30x") && !labels.contains(&"31x"));
}

#[test]
fn test_label_flips_near_right_edge() {
    let renderer = GraphRenderer::default();
    let frame = renderer.frame(&GraphView::at(5.0, false), 200.0, 200.0);
    // plot area 100x100 over 0..10: tip at (110, 90)
    let label = frame.texts().find(|(_, t)| *t == "5.00x").unwrap();
    assert!(close(*label.0, Point::new(30.0, 80.0)), "label moved left, got {:?}", label.0);
}

#[test]
fn test_colors_follow_crash_state() {
    let style = GraphStyle::default();
    let renderer = GraphRenderer::new(style.clone());

    let stroke = |crashed: bool| {
        let frame = renderer.frame(&GraphView::at(3.0, crashed), 640.0, 480.0);
        frame
            .commands
            .iter()
            .find_map(|c| match c {
                DrawCommand::Polyline { color, .. } => Some(*color),
                _ => None,
            })
            .unwrap()
    };
    assert_eq!(stroke(false), style.running_color);
    assert_eq!(stroke(true), style.crashed_color);
}

#[test]
fn test_area_fill_and_marker_styling() {
    let renderer = GraphRenderer::default();
    let style = GraphStyle::default();

    for (crashed, color, start_alpha) in [
        (false, style.running_color, 0.4),
        (true, style.crashed_color, 0.8),
    ] {
        let frame = renderer.frame(&GraphView::at(3.0, crashed), 800.0, 600.0);

        let (gradient, alpha) = frame
            .commands
            .iter()
            .find_map(|c| match c {
                DrawCommand::FillPolygon { gradient, alpha, .. } => Some((*gradient, *alpha)),
                _ => None,
            })
            .expect("area under the curve");
        assert_eq!(alpha, 0.1, "area fill alpha");
        assert_eq!(gradient.start, color.with_alpha(start_alpha), "crashed={}", crashed);
        assert_eq!(gradient.end, color.with_alpha(0.8), "crashed={}", crashed);

        let circles: Vec<_> = frame.circles().collect();
        assert_eq!(circles[0].1, 8.0, "marker radius");
        assert!(circles[0].2.is_none());
        assert_eq!(circles[1].1, 5.0, "glow disc radius");
        let glow = circles[1].2.expect("glow on the inner disc");
        assert_eq!(glow.blur, 15.0);
        assert_eq!(glow.color, color.with_alpha(0.8));
    }
}

#[test]
fn test_grid_marks_are_bounded_for_huge_ranges() {
    assert_eq!(grid_marks(1.2e9).count(), MAX_GRID_MARKS);
    assert_eq!(grid_marks(f64::INFINITY).collect::<Vec<_>>(), vec![0]);
    assert_eq!(grid_marks(60.0).last(), Some(60), "small ranges are untouched");

    let frame = GraphRenderer::default().frame(&GraphView::at(1e9, false), 800.0, 600.0);
    assert_eq!(frame.texts().count(), 2 * MAX_GRID_MARKS + 1, "capped labels plus the multiplier");
}

#[test]
fn test_missing_surface_is_a_no_op() {
    let renderer = GraphRenderer::default();
    let view = GraphView::at(2.0, false);

    let mut detached = DisplayList::detached();
    assert!(!renderer.render(&view, &mut detached));
    assert_eq!(detached.frames_presented(), 0);

    let mut surface = DisplayList::new(320.0, 240.0);
    assert!(renderer.render(&view, &mut surface));
    surface.dispose();
    assert!(!renderer.render(&view, &mut surface), "disposed surface draws nothing");
    assert_eq!(surface.frames_presented(), 1);

    surface.resize(0.0, 240.0);
    assert!(!renderer.render(&view, &mut surface), "zero-area surface draws nothing");
}

#[test]
fn test_frame_is_pure_and_follows_resize() {
    let renderer = GraphRenderer::default();
    let view = GraphView::at(4.2, true);
    assert_eq!(
        renderer.frame(&view, 800.0, 600.0),
        renderer.frame(&view, 800.0, 600.0),
        "same inputs give the same frame"
    );

    let mut surface = DisplayList::new(800.0, 600.0);
    renderer.render(&view, &mut surface);
    surface.resize(400.0, 300.0);
    renderer.render(&view, &mut surface);
    let last = surface.last_frame().unwrap();
    assert_eq!((last.width, last.height), (400.0, 300.0));
}

#[test]
fn test_frame_serializes_with_op_tags() {
    let frame = GraphRenderer::default().frame(&GraphView::at(1.5, false), 320.0, 240.0);
    let json = serde_json::to_value(&frame).unwrap();
    let ops: Vec<&str> = json["commands"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["op"].as_str().unwrap())
        .collect();
    assert_eq!(ops[0], "clear");
    assert!(ops.contains(&"polyline") && ops.contains(&"fill_polygon"));
}

#[test]
fn test_hashed_sampler_is_deterministic_and_bounded() {
    let mut a = HashedCrashPoints::new([7u8; 32]);
    let mut b = HashedCrashPoints::new([7u8; 32]);
    let mut c = HashedCrashPoints::new([8u8; 32]);

    let xs: Vec<f64> = (0..200).map(|_| a.next_crash_point()).collect();
    let ys: Vec<f64> = (0..200).map(|_| b.next_crash_point()).collect();
    let zs: Vec<f64> = (0..200).map(|_| c.next_crash_point()).collect();

    assert_eq!(xs, ys, "same seed, same sequence");
    assert_ne!(xs, zs, "different seed, different sequence");
    assert!(xs.iter().all(|v| (1.0..=100.0).contains(v)));
    assert_eq!(a.rounds_drawn(), 200);
}

#[test]
fn test_sample_mapping() {
    assert_eq!(sample_crash_point(0, 100), 1.0, "low draws clamp to 1.00");
    assert_eq!(sample_crash_point(u32::MAX / 2, 0), 1.98);
    let top = sample_crash_point(u32::MAX, 100);
    assert!(top > 98.0 && top <= 100.0, "top draw near the cap, got {}", top);
}
