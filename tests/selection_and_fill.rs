use std::sync::Arc;

use egui::{Color32, Modifiers, Pos2, Rect, Vec2, pos2};
use image::{Rgba, RgbaImage};
use paint_scene::renderer::{Renderer, SkiaRenderer};
use paint_scene::selection::masked_cutout;
use paint_scene::snapshot::{export_snapshot, import_snapshot};
use paint_scene::{SelectionMode, ShapeKind, Tool, ToolController, ToolSettings, ToolState};

fn create_test_controller(width: u32, height: u32) -> ToolController {
    let settings = ToolSettings {
        canvas_width: width,
        canvas_height: height,
        ..Default::default()
    };
    ToolController::new(settings)
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

fn raster_size(controller: &ToolController, index: usize) -> Option<(u32, u32)> {
    controller
        .scene()
        .get(index)
        .and_then(|element| element.as_raster())
        .map(|raster| raster.pixels().dimensions())
}

/// White 40x20 canvas with a red 12x12 block in the top-left corner
fn create_block_canvas() -> ToolController {
    let mut canvas = RgbaImage::from_pixel(40, 20, Rgba([255, 255, 255, 255]));
    for y in 0..12 {
        for x in 0..12 {
            canvas.put_pixel(x, y, Rgba([255, 0, 0, 255]));
        }
    }
    let mut controller = create_test_controller(40, 20);
    controller.open_image(canvas);
    controller.set_tool(Tool::Select);
    controller
}

const RED: [u8; 4] = [255, 0, 0, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];

#[test]
fn test_fill_on_same_color_is_noop() {
    let mut controller = create_test_controller(60, 40);
    controller.set_tool(Tool::Fill);
    controller.set_color(Color32::WHITE);
    drag(&mut controller, &[pos2(5.0, 5.0)]);
    assert!(controller.scene().is_empty());
    assert_eq!(controller.history().undo_len(), 1);

    controller.set_color(Color32::RED);
    drag(&mut controller, &[pos2(5.0, 5.0)]);
    assert_eq!(controller.history().undo_len(), 2);
    let scene = controller.scene().clone();

    drag(&mut controller, &[pos2(30.0, 20.0)]);
    assert_eq!(controller.scene(), &scene);
    assert_eq!(controller.history().undo_len(), 2);
}

#[test]
fn test_fill_flattens_scene_into_one_raster() {
    let mut controller = create_test_controller(60, 40);
    controller.set_shape(ShapeKind::Rectangle);
    drag(&mut controller, &[pos2(10.0, 10.0), pos2(30.0, 30.0)]);
    controller.set_tool(Tool::Fill);
    controller.set_color(Color32::RED);
    drag(&mut controller, &[pos2(50.0, 5.0)]);

    assert_eq!(controller.scene().len(), 1);
    assert_eq!(raster_size(&controller, 0), Some((60, 40)));
    let canvas = controller.render();
    assert_eq!(canvas.get_pixel(55, 35).0, [255, 0, 0, 255]);
    assert_eq!(canvas.get_pixel(20, 20).0, [255, 255, 255, 255]);

    controller.undo();
    assert_eq!(controller.scene().elements()[0].element_type(), "rect");
}

#[test]
fn test_fill_outside_canvas_is_ignored() {
    let mut controller = create_test_controller(60, 40);
    controller.set_tool(Tool::Fill);
    controller.set_color(Color32::RED);
    drag(&mut controller, &[pos2(-3.0, 5.0)]);
    drag(&mut controller, &[pos2(60.0, 5.0)]);
    assert!(controller.scene().is_empty());
    assert_eq!(controller.history().undo_len(), 1);
}

#[test]
fn test_crop_then_export_import_keeps_raster() {
    let mut controller = create_test_controller(100, 80);
    controller.set_shape(ShapeKind::Ellipse);
    drag(&mut controller, &[pos2(5.0, 5.0), pos2(90.0, 70.0)]);
    controller.set_tool(Tool::Select);
    drag(&mut controller, &[pos2(10.0, 20.0), pos2(50.0, 60.0)]);
    assert_eq!(
        controller.selection().bounds(),
        Some(Rect::from_min_max(pos2(10.0, 20.0), pos2(50.0, 60.0)))
    );

    assert!(controller.crop_selection());
    assert_eq!(controller.canvas_size(), (40, 40));
    assert_eq!(controller.scene().len(), 1);
    assert_eq!(raster_size(&controller, 0), Some((40, 40)));
    assert!(!controller.selection().has_selection());

    let exported = export_snapshot(controller.scene());
    let records = exported.as_array().cloned().unwrap_or_default();
    let imported = import_snapshot(&records);
    assert_eq!(imported.len(), 1);
    let raster = imported.elements()[0].as_raster().unwrap();
    assert_eq!(raster.pixels().dimensions(), (40, 40));
    assert_eq!(raster.pixels(), controller.scene().elements()[0].as_raster().unwrap().pixels());

    let records = controller.export_shapes();
    controller.import_shapes(records);
    assert_eq!(raster_size(&controller, 0), Some((40, 40)));
}

#[test]
fn test_crop_clamps_to_canvas() {
    let mut controller = create_test_controller(100, 80);
    controller.set_tool(Tool::Select);
    drag(&mut controller, &[pos2(80.0, 60.0), pos2(150.0, 120.0)]);
    assert!(controller.crop_selection());
    assert_eq!(controller.canvas_size(), (20, 20));
}

#[test]
fn test_armed_crop_fires_on_finished_selection() {
    let mut controller = create_test_controller(100, 80);
    assert!(!controller.crop_selection());
    assert_eq!(controller.settings().tool, Tool::Select);
    assert!(controller.selection().is_crop_armed());

    drag(&mut controller, &[pos2(30.0, 30.0)]);
    assert!(controller.selection().is_crop_armed());
    assert_eq!(controller.canvas_size(), (100, 80));

    drag(&mut controller, &[pos2(0.0, 0.0), pos2(30.0, 25.0)]);
    assert_eq!(controller.canvas_size(), (30, 25));
    assert!(!controller.selection().is_crop_armed());
    assert_eq!(controller.history().undo_len(), 2);

    controller.undo();
    assert_eq!(controller.canvas_size(), (100, 80));
}

#[test]
fn test_leaving_select_tool_disarms_crop() {
    let mut controller = create_test_controller(100, 80);
    controller.begin_crop_mode();
    controller.set_tool(Tool::Pencil);
    assert!(!controller.selection().is_crop_armed());
}

#[test]
fn test_selection_drag_moves_pixels() {
    let mut controller = create_test_controller(100, 80);
    controller.set_shape(ShapeKind::Rectangle);
    drag(&mut controller, &[pos2(20.0, 20.0), pos2(40.0, 40.0)]);
    controller.set_tool(Tool::Select);
    drag(&mut controller, &[pos2(10.0, 10.0), pos2(50.0, 50.0)]);

    controller.pointer_down(pos2(30.0, 30.0), Modifiers::NONE);
    assert_eq!(controller.state(), &ToolState::DraggingSelection);
    controller.pointer_move(pos2(40.0, 30.0));
    assert_eq!(controller.scene().len(), 3);
    assert_eq!(controller.scene().elements()[1].element_type(), "rect");
    let raster = controller.scene().elements()[2].as_raster().unwrap();
    assert_eq!(raster.origin, pos2(20.0, 10.0));
    controller.pointer_up();

    assert_eq!(controller.history().undo_len(), 3);
    assert_eq!(
        controller.selection().bounds(),
        Some(Rect::from_min_max(pos2(20.0, 10.0), pos2(60.0, 50.0)))
    );

    // The same floating pixels keep moving on the next drag
    drag(&mut controller, &[pos2(30.0, 30.0), pos2(30.0, 40.0)]);
    assert_eq!(controller.scene().len(), 3);
    let raster = controller.scene().elements()[2].as_raster().unwrap();
    assert_eq!(raster.origin, pos2(20.0, 20.0));
    assert_eq!(controller.history().undo_len(), 4);
}

#[test]
fn test_zero_distance_drag_discards_extraction() {
    let mut controller = create_test_controller(100, 80);
    controller.set_shape(ShapeKind::Rectangle);
    drag(&mut controller, &[pos2(20.0, 20.0), pos2(40.0, 40.0)]);
    let before = controller.scene().clone();
    controller.set_tool(Tool::Select);
    drag(&mut controller, &[pos2(10.0, 10.0), pos2(50.0, 50.0)]);

    drag(
        &mut controller,
        &[pos2(30.0, 30.0), pos2(35.0, 30.0), pos2(30.0, 30.0)],
    );
    assert_eq!(controller.scene(), &before);
    assert_eq!(controller.history().undo_len(), 2);

    drag(&mut controller, &[pos2(30.0, 30.0)]);
    assert_eq!(controller.scene(), &before);
    assert_eq!(controller.history().undo_len(), 2);
}

#[test]
fn test_self_intersecting_lasso_mask_matches_containment() {
    let mut controller = create_test_controller(80, 80);
    controller.set_shape(ShapeKind::Rectangle);
    drag(&mut controller, &[pos2(5.0, 5.0), pos2(70.0, 70.0)]);
    controller.set_tool(Tool::Select);
    controller.set_selection_mode(SelectionMode::Freeform);
    drag(
        &mut controller,
        &[
            pos2(10.0, 10.0),
            pos2(60.0, 60.0),
            pos2(60.0, 10.0),
            pos2(10.0, 60.0),
        ],
    );
    assert!(controller.selection().has_selection());

    let region = controller.selection().region().unwrap().clone();
    let canvas = SkiaRenderer::default().rasterize(controller.scene(), 80, 80);
    let (cutout, origin) = masked_cutout(&canvas, &region).unwrap();
    for (x, y, pixel) in cutout.enumerate_pixels() {
        let center = pos2(origin.x + x as f32 + 0.5, origin.y + y as f32 + 0.5);
        assert_eq!(pixel.0[3] == 255, region.contains(center), "pixel ({x}, {y})");
    }
    // Left and right lobes are inside, the crossing wedges are not
    assert!(region.contains(pos2(15.0, 30.0)));
    assert!(region.contains(pos2(55.0, 30.0)));
    assert!(!region.contains(pos2(35.0, 20.0)));
}

#[test]
fn test_switching_tool_drops_selection() {
    let mut controller = create_test_controller(100, 80);
    controller.set_tool(Tool::Select);
    drag(&mut controller, &[pos2(10.0, 10.0), pos2(50.0, 50.0)]);
    assert!(controller.selection().has_selection());
    controller.set_tool(Tool::Pencil);
    assert!(!controller.selection().has_selection());
}

#[test]
fn test_fractional_rect_drag_keeps_edge_pixels() {
    let mut controller = create_block_canvas();
    drag(&mut controller, &[pos2(2.6, 2.6), pos2(8.4, 8.4)]);
    drag(&mut controller, &[pos2(5.0, 5.0), pos2(25.0, 5.0)]);

    let raster = controller.scene().elements()[2].as_raster().unwrap();
    assert_eq!(raster.origin, pos2(22.0, 2.0));
    assert_eq!(raster.pixels().dimensions(), (7, 7));
    assert!(raster.pixels().pixels().all(|pixel| pixel.0[3] == 255));

    let canvas = controller.render();
    // Covering box 2..9 moved by 20, its first and last columns included
    assert_eq!(canvas.get_pixel(22, 5).0, RED);
    assert_eq!(canvas.get_pixel(28, 8).0, RED);
    assert_eq!(canvas.get_pixel(22, 2).0, RED);
    assert_eq!(canvas.get_pixel(2, 5).0, WHITE);
    assert_eq!(canvas.get_pixel(9, 5).0, RED);
    assert_eq!(canvas.get_pixel(29, 5).0, WHITE);
}

#[test]
fn test_second_drag_reuses_floating_raster() {
    let mut controller = create_block_canvas();
    drag(&mut controller, &[pos2(2.6, 2.6), pos2(8.4, 8.4)]);
    drag(&mut controller, &[pos2(5.0, 5.0), pos2(25.0, 5.0)]);
    assert!(controller.selection().is_floating());
    let handle = controller.scene().elements()[2]
        .as_raster()
        .unwrap()
        .pixel_handle()
        .clone();
    let before = controller.selection().bounds().unwrap();

    drag(&mut controller, &[pos2(25.0, 5.0), pos2(25.0, 12.0)]);

    assert_eq!(controller.scene().len(), 3);
    let raster = controller.scene().elements()[2].as_raster().unwrap();
    assert!(Arc::ptr_eq(raster.pixel_handle(), &handle));
    assert_eq!(raster.origin, pos2(22.0, 9.0));
    let after = controller.selection().bounds().unwrap();
    assert!((after.min - before.min - Vec2::new(0.0, 7.0)).length() < 1e-4);
    assert!((after.size() - before.size()).length() < 1e-4);
    assert_eq!(controller.history().undo_len(), 4);

    let canvas = controller.render();
    assert_eq!(canvas.get_pixel(22, 9).0, RED);
    assert_eq!(canvas.get_pixel(22, 2).0, WHITE);
}
