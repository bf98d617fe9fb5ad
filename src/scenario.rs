//! Scenario loading, parsing, and validation.
//!
//! A scenario file describes one building: its extent and grid resolution,
//! the wall rectangles and their materials, the access point locations, and
//! optional propagation parameter overrides. Scenarios are JSON and are
//! validated before use; the material grid is built from the validated
//! scenario with rectangle paints.

use anyhow::Context;
use log::debug;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::Point;
use crate::grid::MaterialGrid;
use crate::materials::{Material, standard_materials};
use crate::propagation::PropagationConfig;

/// Error type for scenario loading failures.
#[derive(Debug)]
pub enum ScenarioLoadError {
    FileReadError(String),
    ParseError(String),
    ValidationError(String),
}

impl std::fmt::Display for ScenarioLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioLoadError::FileReadError(msg) => write!(f, "Failed to read file: {}", msg),
            ScenarioLoadError::ParseError(msg) => write!(f, "Failed to parse JSON: {}", msg),
            ScenarioLoadError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ScenarioLoadError {}

/// A named access point at a fixed position.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessPoint {
    pub name: String,
    pub position: Point,
}

/// One wall rectangle: bottom-left corner plus extent, all in meters.
#[derive(Debug, Clone, Deserialize)]
pub struct Wall {
    /// Name of a built-in or scenario-defined material.
    pub material: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Material definition supplied by the scenario, extending the built-in
/// catalog (or overriding an entry of the same name).
#[derive(Debug, Clone, Deserialize)]
pub struct MaterialSpec {
    pub name: String,
    pub relative_permittivity: f64,
    pub conductivity: f64,
    pub default_thickness: f64,
}

/// Root structure representing one building scenario.
#[derive(Debug, Deserialize)]
pub struct Scenario {
    /// Building width in meters.
    pub width: f64,
    /// Building height in meters.
    pub height: f64,
    /// Material grid resolution in meters per cell.
    #[serde(default = "default_resolution")]
    pub resolution: f64,
    /// Radio parameters; every field falls back to its default.
    #[serde(default)]
    pub propagation: PropagationConfig,
    /// All access points present in the scenario.
    pub access_points: Vec<AccessPoint>,
    /// Wall rectangles painted into the material grid, in order.
    #[serde(default)]
    pub walls: Vec<Wall>,
    /// Additional materials beyond the built-in catalog.
    #[serde(default)]
    pub materials: Vec<MaterialSpec>,
}

fn default_resolution() -> f64 {
    0.5
}

impl Scenario {
    /// Resolve the material catalog for this scenario.
    ///
    /// Scenario-defined materials are validated through [`Material::new`] and
    /// shadow built-in entries with the same name.
    pub fn catalog(&self) -> Result<Vec<Material>, crate::Error> {
        let mut catalog = standard_materials();
        for spec in &self.materials {
            let material = Material::new(
                spec.name.clone(),
                spec.relative_permittivity,
                spec.conductivity,
                spec.default_thickness,
            )?;
            if let Some(existing) = catalog.iter_mut().find(|m| m.name == material.name) {
                *existing = material;
            } else {
                catalog.push(material);
            }
        }
        Ok(catalog)
    }

    /// Build the material grid by painting every wall rectangle in order
    /// (later walls overwrite earlier ones where they overlap).
    pub fn build_grid(&self) -> anyhow::Result<MaterialGrid> {
        let catalog = self.catalog()?;
        let mut grid = MaterialGrid::new(self.width, self.height, self.resolution)?;
        for wall in &self.walls {
            let material = catalog
                .iter()
                .find(|m| m.name == wall.material)
                .with_context(|| format!("Unknown wall material '{}'", wall.material))?;
            grid.place(material, wall.x, wall.y, wall.w, wall.h);
        }
        debug!(
            "Painted {} wall(s) into a {} x {} cell grid",
            self.walls.len(),
            grid.rows(),
            grid.cols()
        );
        Ok(grid)
    }
}

/// Load and parse a scenario from a JSON file.
///
/// # Returns
///
/// Parsed and validated [`Scenario`] or an error describing the first
/// problem found.
pub fn load_scenario(path: &Path) -> Result<Scenario, ScenarioLoadError> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))
        .map_err(|e| ScenarioLoadError::FileReadError(e.to_string()))?;

    let scenario: Scenario = serde_json::from_str(&data)
        .context("Invalid JSON format")
        .map_err(|e| ScenarioLoadError::ParseError(e.to_string()))?;

    validate_scenario(&scenario).map_err(ScenarioLoadError::ValidationError)?;

    debug!(
        "Loaded scenario {}: {} x {} m at {} m resolution",
        path.display(),
        scenario.width,
        scenario.height,
        scenario.resolution
    );
    Ok(scenario)
}

/// Validate a scenario.
///
/// # Returns
///
/// `Ok(())` if validation passes, `Err(String)` with a description otherwise.
pub fn validate_scenario(scenario: &Scenario) -> Result<(), String> {
    const MAX_EXTENT_M: f64 = 1000.0;

    if !(scenario.width > 0.0) || !(scenario.height > 0.0) {
        return Err(format!(
            "Building extent must be positive, got {} x {} m",
            scenario.width, scenario.height
        ));
    }
    if scenario.width > MAX_EXTENT_M || scenario.height > MAX_EXTENT_M {
        return Err(format!(
            "Building extent {} x {} m exceeds maximum of {} m",
            scenario.width, scenario.height, MAX_EXTENT_M
        ));
    }
    if !(scenario.resolution > 0.0) {
        return Err(format!(
            "Grid resolution must be positive, got {} m",
            scenario.resolution
        ));
    }
    if !(scenario.propagation.frequency_hz > 0.0) {
        return Err(format!(
            "Carrier frequency must be positive, got {} Hz",
            scenario.propagation.frequency_hz
        ));
    }

    if scenario.access_points.is_empty() {
        return Err("Scenario must contain at least one access point".to_string());
    }
    let mut ap_names = HashSet::new();
    for ap in &scenario.access_points {
        if !ap_names.insert(ap.name.as_str()) {
            return Err(format!("Duplicate access point name: {}", ap.name));
        }
        if ap.position.x < 0.0
            || ap.position.y < 0.0
            || ap.position.x > scenario.width
            || ap.position.y > scenario.height
        {
            return Err(format!(
                "Access point '{}' position ({}, {}) outside building extent",
                ap.name, ap.position.x, ap.position.y
            ));
        }
    }

    // Resolving the catalog validates every scenario-defined material
    let catalog = scenario.catalog().map_err(|e| e.to_string())?;
    for (idx, wall) in scenario.walls.iter().enumerate() {
        if !catalog.iter().any(|m| m.name == wall.material) {
            return Err(format!(
                "Wall {} references unknown material '{}'",
                idx, wall.material
            ));
        }
        if !(wall.w > 0.0) || !(wall.h > 0.0) {
            return Err(format!(
                "Wall {} has non-positive extent {} x {} m",
                idx, wall.w, wall.h
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn office_json() -> &'static str {
        r#"{
            "width": 20.0,
            "height": 15.0,
            "resolution": 0.1,
            "access_points": [
                { "name": "ap1", "position": { "x": 5.0, "y": 3.0 } }
            ],
            "walls": [
                { "material": "concrete", "x": 0.0, "y": 0.0, "w": 20.0, "h": 0.3 },
                { "material": "glass", "x": 10.0, "y": 0.3, "w": 0.2, "h": 8.0 }
            ]
        }"#
    }

    #[test]
    fn parses_and_validates() {
        let scenario: Scenario = serde_json::from_str(office_json()).unwrap();
        assert!(validate_scenario(&scenario).is_ok());
        assert_eq!(0.1, scenario.resolution);
        assert_eq!(PropagationConfig::default(), scenario.propagation);
        assert_eq!(2, scenario.walls.len());
    }

    #[test]
    fn resolution_defaults_to_half_meter() {
        let json = r#"{
            "width": 10.0,
            "height": 10.0,
            "access_points": [ { "name": "ap1", "position": { "x": 1.0, "y": 1.0 } } ]
        }"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();
        assert_eq!(0.5, scenario.resolution);
    }

    #[test]
    fn build_grid_paints_walls() {
        let scenario: Scenario = serde_json::from_str(office_json()).unwrap();
        let grid = scenario.build_grid().unwrap();
        assert_eq!(200, grid.cols());
        assert_eq!(150, grid.rows());
        assert_eq!("concrete", grid.material_at(10.0, 0.1).unwrap().name);
        assert_eq!("glass", grid.material_at(10.1, 5.0).unwrap().name);
        assert!(grid.material_at(5.0, 10.0).is_none());
    }

    #[test]
    fn scenario_can_define_custom_materials() {
        let json = r#"{
            "width": 10.0,
            "height": 10.0,
            "access_points": [ { "name": "ap1", "position": { "x": 1.0, "y": 1.0 } } ],
            "materials": [
                { "name": "brick", "relative_permittivity": 3.9,
                  "conductivity": 0.02, "default_thickness": 0.1 }
            ],
            "walls": [ { "material": "brick", "x": 4.0, "y": 0.0, "w": 0.5, "h": 10.0 } ]
        }"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();
        assert!(validate_scenario(&scenario).is_ok());
        let grid = scenario.build_grid().unwrap();
        assert_eq!("brick", grid.material_at(4.2, 5.0).unwrap().name);
    }

    #[test]
    fn shipped_office_scenario_walls_all_paint_cells() {
        // Wall extents must survive the truncating rect-to-cell mapping:
        // a wall thinner than one cell paints nothing at all.
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/office.json");
        let scenario = load_scenario(&path).unwrap();
        let grid = scenario.build_grid().unwrap();

        for (idx, wall) in scenario.walls.iter().enumerate() {
            let step = scenario.resolution / 2.0;
            let mut painted = false;
            let mut y = wall.y + step;
            while y < wall.y + wall.h && !painted {
                let mut x = wall.x + step;
                while x < wall.x + wall.w && !painted {
                    painted = grid
                        .material_at(x, y)
                        .is_some_and(|m| m.name == wall.material);
                    x += step;
                }
                y += step;
            }
            assert!(
                painted,
                "wall {} ({}) occupies no grid cell",
                idx, wall.material
            );
        }

        // Spot-check the interior partitions specifically
        assert_eq!("drywall", grid.material_at(8.05, 3.0).unwrap().name);
        assert_eq!("drywall", grid.material_at(5.0, 7.05).unwrap().name);
        assert_eq!("wood", grid.material_at(14.0, 5.25).unwrap().name);
    }

    #[test]
    fn rejects_missing_access_points() {
        let json = r#"{ "width": 10.0, "height": 10.0, "access_points": [] }"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();
        assert!(validate_scenario(&scenario).is_err());
    }

    #[test]
    fn rejects_unknown_wall_material() {
        let json = r#"{
            "width": 10.0,
            "height": 10.0,
            "access_points": [ { "name": "ap1", "position": { "x": 1.0, "y": 1.0 } } ],
            "walls": [ { "material": "adamantium", "x": 0.0, "y": 0.0, "w": 1.0, "h": 1.0 } ]
        }"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();
        let err = validate_scenario(&scenario).unwrap_err();
        assert!(err.contains("adamantium"));
    }

    #[test]
    fn rejects_out_of_extent_access_point() {
        let json = r#"{
            "width": 10.0,
            "height": 10.0,
            "access_points": [ { "name": "ap1", "position": { "x": 11.0, "y": 1.0 } } ]
        }"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();
        assert!(validate_scenario(&scenario).is_err());
    }

    #[test]
    fn rejects_invalid_custom_material() {
        let json = r#"{
            "width": 10.0,
            "height": 10.0,
            "access_points": [ { "name": "ap1", "position": { "x": 1.0, "y": 1.0 } } ],
            "materials": [
                { "name": "bogus", "relative_permittivity": 0.2,
                  "conductivity": 0.0, "default_thickness": 0.1 }
            ]
        }"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();
        assert!(validate_scenario(&scenario).is_err());
    }
}
