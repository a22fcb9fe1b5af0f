use std::cell::RefCell;
use std::rc::Rc;

use egui::{Color32, Modifiers, Pos2, Rect, Vec2, pos2};
use paint_scene::element::{LineCap, Shape};
use paint_scene::{
    BrushKind, EditorEvent, ShapeKind, Tool, ToolController, ToolSettings, ToolState,
};

fn create_test_controller(width: u32, height: u32) -> ToolController {
    let settings = ToolSettings {
        canvas_width: width,
        canvas_height: height,
        ..Default::default()
    };
    ToolController::new(settings).with_brush_seed(42)
}

fn drag(controller: &mut ToolController, points: &[Pos2]) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    controller.pointer_down(*first, Modifiers::NONE);
    for point in rest {
        controller.pointer_move(*point);
    }
    controller.pointer_up();
}

fn record_events(controller: &ToolController) -> Rc<RefCell<Vec<EditorEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    controller.subscribe(move |event: &EditorEvent| sink.borrow_mut().push(event.clone()));
    events
}

#[test]
fn test_rectangle_undo_redo_scenario() {
    let mut controller = create_test_controller(1000, 600);
    controller.set_shape(ShapeKind::Rectangle);
    drag(&mut controller, &[pos2(10.0, 10.0), pos2(110.0, 60.0)]);

    assert_eq!(controller.scene().len(), 1);
    assert_eq!(controller.history().undo_len(), 2);

    controller.undo();
    assert!(controller.scene().is_empty());
    assert!(controller.can_redo());

    controller.redo();
    assert_eq!(controller.scene().len(), 1);
    assert_eq!(
        controller.scene().bounds_of(0),
        Some(Rect::from_min_size(pos2(10.0, 10.0), Vec2::new(100.0, 50.0)))
    );
}

#[test]
fn test_undo_restores_deep_equal_scene() {
    let mut controller = create_test_controller(200, 150);
    drag(
        &mut controller,
        &[pos2(5.0, 5.0), pos2(40.0, 8.0), pos2(60.0, 30.0)],
    );
    controller.set_shape(ShapeKind::Star);
    drag(&mut controller, &[pos2(50.0, 50.0), pos2(120.0, 110.0)]);
    let before = controller.scene().clone();

    controller.set_shape(ShapeKind::Heart);
    drag(&mut controller, &[pos2(0.0, 0.0), pos2(30.0, 30.0)]);
    assert_ne!(controller.scene(), &before);

    controller.undo();
    assert_eq!(controller.scene(), &before);
    controller.redo();
    controller.undo();
    assert_eq!(controller.scene(), &before);
}

#[test]
fn test_new_edit_clears_redo() {
    let mut controller = create_test_controller(100, 100);
    drag(&mut controller, &[pos2(1.0, 1.0), pos2(50.0, 1.0)]);
    controller.undo();
    assert!(controller.can_redo());
    drag(&mut controller, &[pos2(1.0, 1.0), pos2(1.0, 50.0)]);
    assert!(!controller.can_redo());
    assert_eq!(controller.history().undo_len(), 2);
}

#[test]
fn test_undo_at_initial_state_is_noop() {
    let mut controller = create_test_controller(100, 100);
    controller.undo();
    controller.redo();
    assert!(controller.scene().is_empty());
    assert_eq!(controller.history().undo_len(), 1);
    assert!(!controller.can_undo());
}

#[test]
fn test_pencil_auto_closes_near_loop() {
    let mut controller = create_test_controller(100, 100);
    drag(
        &mut controller,
        &[
            pos2(10.0, 10.0),
            pos2(50.0, 10.0),
            pos2(50.0, 50.0),
            pos2(15.0, 12.0),
        ],
    );
    let Some(Shape::Stroke { points, .. }) = controller.scene().get(0).map(|e| &e.shape) else {
        panic!("expected a stroke");
    };
    assert_eq!(points.len(), 5);
    assert_eq!(points.last(), Some(&pos2(10.0, 10.0)));
}

#[test]
fn test_short_pencil_stroke_stays_open() {
    let mut controller = create_test_controller(100, 100);
    drag(&mut controller, &[pos2(10.0, 10.0), pos2(14.0, 10.0)]);
    let Some(Shape::Stroke { points, .. }) = controller.scene().get(0).map(|e| &e.shape) else {
        panic!("expected a stroke");
    };
    assert_eq!(points.len(), 2);
}

#[test]
fn test_eraser_paints_background_at_double_width() {
    let mut controller = create_test_controller(100, 100);
    controller.set_thickness(3.0);
    controller.set_tool(Tool::Eraser);
    drag(&mut controller, &[pos2(10.0, 10.0), pos2(40.0, 40.0)]);

    let element = &controller.scene().elements()[0];
    assert_eq!(element.style.stroke, Color32::WHITE);
    assert_eq!(element.style.thickness, 6.0);
    assert_eq!(element.element_type(), "stroke");
}

#[test]
fn test_zero_extent_shape_is_discarded() {
    let mut controller = create_test_controller(100, 100);
    controller.set_shape(ShapeKind::Ellipse);
    drag(&mut controller, &[pos2(20.0, 20.0)]);
    assert!(controller.scene().is_empty());
    assert_eq!(controller.history().undo_len(), 1);
    assert_eq!(controller.state(), &ToolState::Idle);
}

#[test]
fn test_magnifier_requests_zoom_without_edit() {
    let mut controller = create_test_controller(100, 100);
    let events = record_events(&controller);
    controller.set_tool(Tool::Magnifier);

    controller.pointer_down(pos2(5.0, 5.0), Modifiers::NONE);
    controller.pointer_up();
    controller.pointer_down(pos2(5.0, 5.0), Modifiers::SHIFT);
    controller.pointer_up();

    let zooms: Vec<i32> = events
        .borrow()
        .iter()
        .filter_map(|event| match event {
            EditorEvent::ZoomRequested { delta } => Some(*delta),
            _ => None,
        })
        .collect();
    assert_eq!(zooms, vec![10, -10]);
    assert!(controller.scene().is_empty());
    assert_eq!(controller.history().undo_len(), 1);
}

#[test]
fn test_events_follow_gestures() {
    let mut controller = create_test_controller(100, 100);
    let events = record_events(&controller);
    drag(&mut controller, &[pos2(1.0, 1.0), pos2(20.0, 20.0)]);

    let events = events.borrow();
    assert_eq!(
        events.first(),
        Some(&EditorEvent::SceneChanged(paint_scene::SceneChange::Added {
            index: 0
        }))
    );
    assert_eq!(
        events.last(),
        Some(&EditorEvent::HistoryChanged {
            can_undo: true,
            can_redo: false
        })
    );
}

#[test]
fn test_airbrush_dabs_stay_inside_radius() {
    let mut controller = create_test_controller(200, 200);
    controller.set_brush(BrushKind::Airbrush);
    controller.set_thickness(10.0);
    let center = pos2(100.0, 100.0);
    drag(&mut controller, &[center, center]);

    assert!(!controller.scene().is_empty());
    for element in controller.scene().elements() {
        let bounds = element.bounds();
        for corner in [
            bounds.left_top(),
            bounds.right_top(),
            bounds.left_bottom(),
            bounds.right_bottom(),
        ] {
            assert!(
                corner.distance(center) <= 10.0 + 1e-3,
                "dab at {bounds:?} leaves the spray radius"
            );
        }
    }
    assert_eq!(controller.history().undo_len(), 2);
}

#[test]
fn test_marker_brush_uses_square_cap() {
    let mut controller = create_test_controller(100, 100);
    controller.set_color(Color32::from_rgb(0, 128, 255));
    controller.set_brush(BrushKind::Marker);
    drag(&mut controller, &[pos2(10.0, 10.0), pos2(60.0, 10.0)]);

    let element = &controller.scene().elements()[0];
    assert!(matches!(
        element.shape,
        Shape::Stroke {
            cap: LineCap::Square,
            ..
        }
    ));
    assert_eq!(element.style.stroke.a(), 100);
    assert_eq!(element.style.thickness, 6.0);
}

#[test]
fn test_text_commit_and_discard() {
    let mut controller = create_test_controller(200, 100);
    controller.set_tool(Tool::Text);
    drag(&mut controller, &[pos2(20.0, 30.0)]);
    assert!(matches!(controller.state(), ToolState::EditingText(_)));

    controller.commit_text("   ");
    assert!(controller.scene().is_empty());
    assert_eq!(controller.history().undo_len(), 1);

    drag(&mut controller, &[pos2(20.0, 30.0)]);
    controller.commit_text("Hello");
    assert_eq!(controller.scene().len(), 1);
    assert_eq!(controller.layer_entries()[0].1, "Text: Hello");
    assert_eq!(controller.history().undo_len(), 2);
}

#[test]
fn test_pending_text_commits_on_next_press() {
    let mut controller = create_test_controller(200, 100);
    controller.set_tool(Tool::Text);
    drag(&mut controller, &[pos2(20.0, 30.0)]);
    controller.update_text("first");
    drag(&mut controller, &[pos2(80.0, 30.0)]);

    assert_eq!(controller.scene().len(), 1);
    assert!(matches!(controller.state(), ToolState::EditingText(_)));
    controller.cancel_text();
    assert_eq!(controller.state(), &ToolState::Idle);
    assert_eq!(controller.scene().len(), 1);
}

#[test]
fn test_layer_reordering_is_undoable() {
    let mut controller = create_test_controller(200, 200);
    controller.set_shape(ShapeKind::Rectangle);
    for x in [10.0, 50.0, 90.0] {
        drag(&mut controller, &[pos2(x, 10.0), pos2(x + 20.0, 30.0)]);
    }
    controller.set_shape(ShapeKind::Triangle);
    drag(&mut controller, &[pos2(10.0, 100.0), pos2(50.0, 150.0)]);
    let names: Vec<String> = controller
        .layer_entries()
        .into_iter()
        .map(|(_, name)| name)
        .collect();
    assert_eq!(names, ["Rectangle", "Rectangle", "Rectangle", "Triangle"]);

    assert!(controller.bring_to_front(0));
    assert_eq!(controller.scene().bounds_of(3).map(|r| r.min.x), Some(10.0));
    assert!(!controller.bring_to_front(3));
    assert!(controller.send_to_back(3));
    assert_eq!(controller.scene().bounds_of(0).map(|r| r.min.x), Some(10.0));
    assert!(controller.remove_element(1));
    assert_eq!(controller.scene().len(), 3);
    assert!(!controller.remove_element(7));

    controller.undo();
    assert_eq!(controller.scene().len(), 4);
}

#[test]
fn test_rotate_swaps_canvas_and_undoes() {
    let mut controller = create_test_controller(100, 80);
    drag(&mut controller, &[pos2(10.0, 10.0), pos2(60.0, 20.0)]);
    let before = controller.scene().clone();

    controller.rotate_canvas_90();
    assert_eq!(controller.canvas_size(), (80, 100));
    assert_eq!(controller.scene().len(), 1);
    assert_eq!(controller.scene().elements()[0].element_type(), "image");

    controller.undo();
    assert_eq!(controller.canvas_size(), (100, 80));
    assert_eq!(controller.scene(), &before);
}

#[test]
fn test_canvas_resize_is_part_of_history() {
    let mut controller = create_test_controller(100, 80);
    controller.set_canvas_size(300, 200);
    assert_eq!(controller.canvas_size(), (300, 200));
    controller.set_canvas_size(300, 200);
    assert_eq!(controller.history().undo_len(), 2);
    controller.undo();
    assert_eq!(controller.canvas_size(), (100, 80));
}

#[test]
fn test_invalid_thickness_is_ignored() {
    let mut controller = create_test_controller(100, 80);
    controller.set_thickness(0.0);
    controller.set_thickness(f32::NAN);
    assert_eq!(controller.settings().thickness, 2.0);
}

#[test]
fn test_clear_canvas() {
    let mut controller = create_test_controller(100, 80);
    controller.clear_canvas();
    assert_eq!(controller.history().undo_len(), 1);
    drag(&mut controller, &[pos2(10.0, 10.0), pos2(60.0, 20.0)]);
    controller.clear_canvas();
    assert!(controller.scene().is_empty());
    assert_eq!(controller.history().undo_len(), 3);
}
