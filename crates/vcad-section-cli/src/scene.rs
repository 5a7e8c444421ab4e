//! Scene files: a cutting plane plus a list of objects, as JSON.
//!
//! ```json
//! {
//!   "plane": [[1,0,0,0],[0,1,0,0],[0,0,1,0.5],[0,0,0,1]],
//!   "objects": [
//!     { "name": "Cube", "vertices": [[0,0,0], ...], "polygons": [[0,1,2,3], ...] },
//!     { "name": "Array", "instances": [ { "name": "Array.0", ... } ] },
//!     { "name": "Camera" }
//!   ]
//! }
//! ```
//!
//! Matrices are row-major. An object without `vertices` has no geometry.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use vcad_kernel_math::{Point3, Transform};
use vcad_kernel_section::{Mesh, SceneObject};

/// Scene file as stored on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneFile {
    /// Cutting plane world matrix; identity (the XY plane) when absent.
    #[serde(default)]
    pub plane: Option<[[f64; 4]; 4]>,
    /// Top-level objects.
    pub objects: Vec<ObjectDto>,
}

/// One object in a scene file.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectDto {
    pub name: String,
    #[serde(default)]
    pub vertices: Option<Vec<[f64; 3]>>,
    #[serde(default)]
    pub polygons: Vec<Vec<usize>>,
    /// Explicit edges; derived from the polygons when absent.
    #[serde(default)]
    pub edges: Option<Vec<[usize; 2]>>,
    #[serde(default)]
    pub matrix: Option<[[f64; 4]; 4]>,
    #[serde(default)]
    pub instances: Vec<ObjectDto>,
}

/// A scene ready to cut.
#[derive(Debug)]
pub struct Scene {
    /// Cutting plane world matrix.
    pub plane: Transform,
    /// Objects in file order. Invalid meshes are kept as rejected objects.
    pub objects: Vec<SceneObject>,
}

impl ObjectDto {
    fn into_object(self) -> SceneObject {
        let world = self.matrix.map(Transform::from_rows).unwrap_or_default();
        let instances = self
            .instances
            .into_iter()
            .map(ObjectDto::into_object)
            .collect();

        let (mesh, rejected) = match self.vertices {
            None => (None, None),
            Some(vertices) => {
                let points = vertices
                    .iter()
                    .map(|&[x, y, z]| Point3::new(x, y, z))
                    .collect();
                let built = match self.edges {
                    Some(edges) => Mesh::new(points, edges, self.polygons),
                    None => Mesh::from_polygons(points, self.polygons),
                };
                match built {
                    Ok(mesh) => (Some(mesh), None),
                    Err(e) => {
                        tracing::warn!(object = %self.name, error = %e, "rejecting mesh");
                        (None, Some(e))
                    }
                }
            }
        };

        SceneObject {
            name: self.name,
            mesh,
            rejected,
            world,
            instances,
        }
    }
}

impl SceneFile {
    /// Parse a scene from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid scene JSON")
    }

    /// Convert to kernel types.
    pub fn into_scene(self) -> Scene {
        Scene {
            plane: self.plane.map(Transform::from_rows).unwrap_or_default(),
            objects: self
                .objects
                .into_iter()
                .map(ObjectDto::into_object)
                .collect(),
        }
    }
}

/// Read and convert a scene file.
pub fn load(path: &Path) -> Result<Scene> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scene {}", path.display()))?;
    Ok(SceneFile::from_json(&json)?.into_scene())
}

/// Object counts shown by `vcad-section info`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SceneCounts {
    pub objects: usize,
    pub instancers: usize,
    pub instances: usize,
    pub meshes: usize,
    pub rejected: usize,
    pub without_geometry: usize,
    pub vertices: usize,
    pub polygons: usize,
}

impl SceneCounts {
    /// Count a list of objects, descending into instancers.
    pub fn of(objects: &[SceneObject]) -> Self {
        let mut counts = Self::default();
        for object in objects {
            counts.objects += 1;
            if object.is_instancer() {
                counts.instancers += 1;
                counts.instances += object.instances.len();
                for instance in &object.instances {
                    counts.add_geometry(instance);
                }
            } else {
                counts.add_geometry(object);
            }
        }
        counts
    }

    fn add_geometry(&mut self, object: &SceneObject) {
        match (&object.mesh, &object.rejected) {
            (_, Some(_)) => self.rejected += 1,
            (Some(mesh), None) => {
                self.meshes += 1;
                self.vertices += mesh.vertex_count();
                self.polygons += mesh.polygon_count();
            }
            (None, None) => self.without_geometry += 1,
        }
    }
}

/// Objects and instances whose geometry was rejected, in scene order.
pub fn rejected_objects(objects: &[SceneObject]) -> Vec<&SceneObject> {
    objects
        .iter()
        .flat_map(|o| std::iter::once(o).chain(&o.instances))
        .filter(|o| o.rejected.is_some())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcad_kernel_section::{CrossSection, SectionError};

    const SCENE: &str = r#"{
        "plane": [[1,0,0,0],[0,1,0,0],[0,0,1,0.25],[0,0,0,1]],
        "objects": [
            {
                "name": "Tri",
                "vertices": [[0,0,-1],[1,0,1],[0,1,-1]],
                "polygons": [[0,1,2]],
                "matrix": [[1,0,0,5],[0,1,0,0],[0,0,1,0],[0,0,0,1]]
            },
            { "name": "Camera" },
            {
                "name": "Array",
                "instances": [
                    { "name": "Array.0", "vertices": [[0,0,-1],[1,0,1],[0,1,-1]], "polygons": [[0,1,2]] },
                    { "name": "Array.1", "vertices": [[0,0,0]], "polygons": [[0,1,2]] }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_and_convert() {
        let scene = SceneFile::from_json(SCENE).unwrap().into_scene();
        assert_eq!(scene.plane.to_rows()[2][3], 0.25);
        assert_eq!(scene.objects.len(), 3);
        assert_eq!(scene.objects[0].world.to_rows()[0][3], 5.0);
        assert!(scene.objects[1].mesh.is_none());
        assert_eq!(scene.objects[2].instances.len(), 2);

        let rejected = rejected_objects(&scene.objects);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].name, "Array.1");
        assert!(rejected[0].mesh.is_none());
        assert!(rejected[0].rejected.as_ref().unwrap().is_invalid_input());
    }

    #[test]
    fn test_counts() {
        let scene = SceneFile::from_json(SCENE).unwrap().into_scene();
        let counts = SceneCounts::of(&scene.objects);
        assert_eq!(
            counts,
            SceneCounts {
                objects: 3,
                instancers: 1,
                instances: 2,
                meshes: 2,
                rejected: 1,
                without_geometry: 1,
                vertices: 6,
                polygons: 2,
            }
        );
    }

    #[test]
    fn test_missing_plane_is_identity() {
        let scene = SceneFile::from_json(r#"{ "objects": [] }"#)
            .unwrap()
            .into_scene();
        assert_eq!(scene.plane, Transform::identity());
    }

    #[test]
    fn test_explicit_edges_checked() {
        let json = r#"{ "objects": [ {
            "name": "Open",
            "vertices": [[0,0,0],[1,0,0],[0,1,0]],
            "polygons": [[0,1,2]],
            "edges": [[0,1],[1,2]]
        } ] }"#;
        let scene = SceneFile::from_json(json).unwrap().into_scene();
        assert_eq!(scene.objects.len(), 1);
        assert!(matches!(
            scene.objects[0].rejected,
            Some(SectionError::MissingEdge { polygon: 0, a: 0, b: 2 })
        ));
    }

    #[test]
    fn test_rejected_meshes_stay_in_scene_order() {
        let json = r#"{ "objects": [
            { "name": "Bad", "vertices": [[0,0,0]], "polygons": [[0,1,2]] },
            { "name": "Good", "vertices": [[0,0,-1],[1,0,1],[0,1,-1]], "polygons": [[0,1,2]] }
        ] }"#;
        let scene = SceneFile::from_json(json).unwrap().into_scene();
        let report = CrossSection::new(scene.plane, Default::default())
            .run(&scene.objects)
            .unwrap();
        let names: Vec<&str> = report.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Bad", "Good"]);
        assert!(report.entries[0].outcome.is_err());
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.summary.sectioned, 1);
        assert_eq!(report.summary.skipped, 0);
    }

    #[test]
    fn test_all_rejected_scene_still_reports() {
        let json = r#"{ "objects": [
            { "name": "Array", "instances": [
                { "name": "Array.0", "vertices": [[0,0,0]], "polygons": [[0,1,2]] }
            ] }
        ] }"#;
        let scene = SceneFile::from_json(json).unwrap().into_scene();
        let report = CrossSection::new(scene.plane, Default::default())
            .run(&scene.objects)
            .unwrap();
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.summary.skipped, 0);
    }

    #[test]
    fn test_bad_json_reports_context() {
        let err = SceneFile::from_json("{ nope").unwrap_err();
        assert!(err.to_string().contains("invalid scene JSON"));
    }
}
