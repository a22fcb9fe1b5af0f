//! Scripted drawing session that writes a PNG and a project file.

use std::path::{Path, PathBuf};
use std::process;

use egui::{Color32, Modifiers, pos2};
use log::{LevelFilter, error, info};

use paint_scene::persistence;
use paint_scene::{BrushKind, SelectionMode, ShapeKind, Tool, ToolController, ToolSettings};

fn run(out_dir: &Path) -> paint_scene::PersistenceResult<()> {
    std::fs::create_dir_all(out_dir)?;

    let mut editor = ToolController::new(ToolSettings::default()).with_brush_seed(42);
    editor.subscribe(|event: &paint_scene::EditorEvent| log::debug!("{event:?}"));
    let none = Modifiers::NONE;

    editor.set_shape(ShapeKind::Rectangle);
    editor.set_thickness(3.0);
    editor.pointer_down(pos2(60.0, 60.0), none);
    editor.pointer_move(pos2(360.0, 260.0));
    editor.pointer_up();

    editor.set_shape(ShapeKind::Star);
    editor.set_color(Color32::from_rgb(200, 40, 40));
    editor.pointer_down(pos2(450.0, 80.0), none);
    editor.pointer_move(pos2(650.0, 280.0));
    editor.pointer_up();

    editor.set_tool(Tool::Pencil);
    editor.set_color(Color32::from_rgb(20, 90, 200));
    editor.pointer_down(pos2(720.0, 100.0), none);
    for step in 1..=36 {
        let angle = step as f32 / 36.0 * std::f32::consts::TAU;
        editor.pointer_move(pos2(800.0 - 80.0 * angle.cos(), 100.0 + 80.0 * angle.sin()));
    }
    editor.pointer_up();

    editor.set_brush(BrushKind::Airbrush);
    editor.set_color(Color32::from_rgb(30, 160, 60));
    editor.pointer_down(pos2(150.0, 420.0), none);
    for step in 0..40 {
        editor.pointer_move(pos2(150.0 + step as f32 * 8.0, 420.0 + (step % 5) as f32 * 4.0));
    }
    editor.pointer_up();

    editor.set_tool(Tool::Fill);
    editor.set_color(Color32::from_rgb(255, 220, 120));
    editor.pointer_down(pos2(200.0, 150.0), none);
    editor.pointer_up();

    editor.set_tool(Tool::Select);
    editor.set_selection_mode(SelectionMode::Freeform);
    editor.pointer_down(pos2(440.0, 60.0), none);
    for point in [(680.0, 60.0), (680.0, 300.0), (440.0, 300.0), (445.0, 70.0)] {
        editor.pointer_move(pos2(point.0, point.1));
    }
    editor.pointer_up();
    editor.pointer_down(pos2(560.0, 180.0), none);
    editor.pointer_move(pos2(600.0, 330.0));
    editor.pointer_up();
    editor.clear_selection();

    let png = out_dir.join("canvas.png");
    editor.save_png(&png)?;
    let project = out_dir.join("project.json");
    persistence::save_project(&editor.to_project(), &project)?;

    info!(
        "Wrote {} and {} ({} elements, {} undo steps)",
        png.display(),
        project.display(),
        editor.scene().len(),
        editor.history().undo_len()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(LevelFilter::Info)
        .init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("paint-demo-out"));

    if let Err(err) = run(&out_dir) {
        error!("{err}");
        process::exit(1);
    }
}
