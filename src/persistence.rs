use std::fs;
use std::path::Path;

use image::ImageFormat;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::Scene;
use crate::error::{PersistenceError, PersistenceResult};
use crate::snapshot::{ShapeRecord, export_records, import_snapshot};
use crate::tools::ToolSettings;

/// One layer of a saved project
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: Uuid,
    pub name: String,
    pub scene: Scene,
    pub visible: bool,
    pub opacity: f32,
}

impl Layer {
    pub fn new(name: impl Into<String>, scene: Scene) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            scene,
            visible: true,
            opacity: 1.0,
        }
    }
}

/// A saved document: canvas size plus ordered layers, bottom first
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub layers: Vec<Layer>,
}

impl Project {
    /// Visible layers flattened into one scene, bottom layer first
    pub fn flatten(&self) -> Scene {
        let elements = self
            .layers
            .iter()
            .filter(|layer| layer.visible)
            .flat_map(|layer| layer.scene.elements().iter().cloned())
            .collect();
        Scene::from_elements(elements)
    }
}

#[derive(Serialize, Deserialize)]
struct LayerFile {
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    #[serde(default)]
    name: String,
    #[serde(default = "default_visible")]
    visible: bool,
    #[serde(default = "default_opacity")]
    opacity: f32,
    /// Kept untyped so one bad record does not sink the file
    #[serde(default)]
    shapes: Vec<serde_json::Value>,
}

#[derive(Serialize, Deserialize)]
struct ProjectFile {
    canvas_width: u32,
    canvas_height: u32,
    layers: Vec<LayerFile>,
}

fn default_visible() -> bool {
    true
}

fn default_opacity() -> f32 {
    1.0
}

impl From<&Layer> for LayerFile {
    fn from(layer: &Layer) -> Self {
        Self {
            id: layer.id,
            name: layer.name.clone(),
            visible: layer.visible,
            opacity: layer.opacity,
            shapes: export_records(&layer.scene)
                .into_iter()
                .filter_map(|record: ShapeRecord| serde_json::to_value(record).ok())
                .collect(),
        }
    }
}

impl From<LayerFile> for Layer {
    fn from(file: LayerFile) -> Self {
        Self {
            id: file.id,
            name: file.name,
            scene: import_snapshot(&file.shapes),
            visible: file.visible,
            opacity: file.opacity.clamp(0.0, 1.0),
        }
    }
}

pub fn project_to_json(project: &Project) -> PersistenceResult<String> {
    let file = ProjectFile {
        canvas_width: project.canvas_width,
        canvas_height: project.canvas_height,
        layers: project.layers.iter().map(LayerFile::from).collect(),
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

pub fn project_from_json(json: &str) -> PersistenceResult<Project> {
    let file: ProjectFile = serde_json::from_str(json)?;
    if file.canvas_width == 0 || file.canvas_height == 0 {
        return Err(PersistenceError::InvalidProject(format!(
            "canvas size {}x{}",
            file.canvas_width, file.canvas_height
        )));
    }
    Ok(Project {
        canvas_width: file.canvas_width,
        canvas_height: file.canvas_height,
        layers: file.layers.into_iter().map(Layer::from).collect(),
    })
}

/// Save a project as JSON
pub fn save_project(project: &Project, path: impl AsRef<Path>) -> PersistenceResult<()> {
    let path = path.as_ref();
    fs::write(path, project_to_json(project)?)?;
    info!("Saved project to {}", path.display());
    Ok(())
}

/// Load a project. Shape records that fail to parse are dropped with a warning.
pub fn load_project(path: impl AsRef<Path>) -> PersistenceResult<Project> {
    let path = path.as_ref();
    let project = project_from_json(&fs::read_to_string(path)?)?;
    info!(
        "Loaded project {} with {} layers",
        path.display(),
        project.layers.len()
    );
    Ok(project)
}

pub fn save_settings(settings: &ToolSettings, path: impl AsRef<Path>) -> PersistenceResult<()> {
    fs::write(path, serde_json::to_string_pretty(settings)?)?;
    Ok(())
}

/// Load settings, falling back to defaults when the file does not exist
pub fn load_settings(path: impl AsRef<Path>) -> PersistenceResult<ToolSettings> {
    let path = path.as_ref();
    if !path.exists() {
        warn!("No settings at {}, using defaults", path.display());
        return Ok(ToolSettings::default());
    }
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

/// Write a rendered canvas as PNG
pub fn save_png(image: &image::RgbaImage, path: impl AsRef<Path>) -> PersistenceResult<()> {
    let path = path.as_ref();
    image.save_with_format(path, ImageFormat::Png)?;
    info!("Saved {}x{} PNG to {}", image.width(), image.height(), path.display());
    Ok(())
}

/// Read any image format the `image` crate can decode
pub fn load_image(path: impl AsRef<Path>) -> PersistenceResult<image::RgbaImage> {
    Ok(image::open(path)?.to_rgba8())
}
