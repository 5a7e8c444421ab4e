//! Batch sectioning of scene objects against one cutting plane.

use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use vcad_kernel_math::Transform;

use crate::error::{Result, SectionError};
use crate::mesh::Mesh;
use crate::{section_with_options, SectionOptions, SectionOutcome};

/// An object in a scene, as handed over by a host application.
#[derive(Debug, Clone, Default)]
pub struct SceneObject {
    /// Display name, carried through to the report.
    pub name: String,
    /// Geometry; `None` for empties, cameras, lights and the like.
    pub mesh: Option<Mesh>,
    /// Why the object's geometry could not be built. Such an object is
    /// reported as a failed entry instead of being skipped.
    pub rejected: Option<SectionError>,
    /// Object-to-world matrix.
    pub world: Transform,
    /// Instances this object generates. Their `world` matrices are
    /// absolute, not relative to the instancer.
    pub instances: Vec<SceneObject>,
}

impl SceneObject {
    /// A mesh object.
    pub fn mesh(name: impl Into<String>, mesh: Mesh, world: Transform) -> Self {
        Self {
            name: name.into(),
            mesh: Some(mesh),
            rejected: None,
            world,
            instances: Vec::new(),
        }
    }

    /// An object whose geometry failed validation.
    pub fn rejected(name: impl Into<String>, error: SectionError, world: Transform) -> Self {
        Self {
            name: name.into(),
            mesh: None,
            rejected: Some(error),
            world,
            instances: Vec::new(),
        }
    }

    /// True when the object generates instances.
    pub fn is_instancer(&self) -> bool {
        !self.instances.is_empty()
    }
}

/// A mesh to cut, with its object-to-world matrix.
#[derive(Debug, Clone, Copy)]
pub struct Job<'a> {
    /// Object name.
    pub name: &'a str,
    /// Mesh to cut, or the error that already failed it.
    pub mesh: std::result::Result<&'a Mesh, &'a SectionError>,
    /// Object-to-world matrix.
    pub world: &'a Transform,
}

/// Replace every instancer by its instances (one level deep) and drop
/// objects without geometry. Rejected objects stay as jobs so they are
/// reported in place.
///
/// Returns the jobs in scene order and the number of skipped objects.
pub fn flatten_instances(objects: &[SceneObject]) -> (Vec<Job<'_>>, usize) {
    let mut jobs = Vec::new();
    let mut skipped = 0;

    for object in objects {
        let expanded: &[SceneObject] = if object.is_instancer() {
            &object.instances
        } else {
            std::slice::from_ref(object)
        };
        for item in expanded {
            let mesh = match (&item.mesh, &item.rejected) {
                (_, Some(error)) => Err(error),
                (Some(mesh), None) => Ok(mesh),
                (None, None) => {
                    skipped += 1;
                    continue;
                }
            };
            jobs.push(Job {
                name: &item.name,
                mesh,
                world: &item.world,
            });
        }
    }

    (jobs, skipped)
}

/// Result for one sectioned object.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    /// Object name.
    pub name: String,
    /// Section, missed plane, or the error that failed this object.
    pub outcome: std::result::Result<SectionOutcome, SectionError>,
}

/// Per-status counts for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Objects with a section.
    pub sectioned: usize,
    /// Objects the plane does not cut.
    pub no_intersection: usize,
    /// Objects that failed.
    pub failed: usize,
    /// Objects without geometry.
    pub skipped: usize,
}

/// Everything a batch produced.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// The plane's world matrix. Sections are in plane-local coordinates;
    /// this places them in the scene.
    pub placement: Transform,
    /// One entry per mesh job, in scene order.
    pub entries: Vec<BatchEntry>,
    /// Counts by status.
    pub summary: BatchSummary,
}

/// Cut many objects with one plane.
#[derive(Debug, Clone, Default)]
pub struct CrossSection {
    /// Cutting plane's world matrix; the plane is its local z = 0.
    pub plane_world: Transform,
    /// Options applied to every object.
    pub options: SectionOptions,
}

impl CrossSection {
    /// Create a batch for the given plane.
    pub fn new(plane_world: Transform, options: SectionOptions) -> Self {
        Self {
            plane_world,
            options,
        }
    }

    /// Section every object in parallel.
    ///
    /// Per-object failures are recorded in the report; only an empty
    /// selection, a singular plane or invalid options fail the batch.
    pub fn run(&self, objects: &[SceneObject]) -> Result<BatchReport> {
        let start = Instant::now();
        self.options.validate()?;

        let (jobs, skipped) = flatten_instances(objects);
        if jobs.is_empty() {
            return Err(SectionError::EmptySelection);
        }
        let plane_inv = self
            .plane_world
            .inverse()
            .ok_or(SectionError::SingularTransform)?;

        let entries: Vec<BatchEntry> = jobs
            .par_iter()
            .map(|job| {
                let outcome = match job.mesh {
                    Ok(mesh) => {
                        section_with_options(mesh, &plane_inv.then(job.world), &self.options)
                    }
                    Err(error) => Err(error.clone()),
                };
                BatchEntry {
                    name: job.name.to_string(),
                    outcome,
                }
            })
            .collect();

        let mut summary = BatchSummary {
            skipped,
            ..Default::default()
        };
        for entry in &entries {
            match &entry.outcome {
                Ok(SectionOutcome::Section(_)) => summary.sectioned += 1,
                Ok(SectionOutcome::NoIntersection) => {
                    tracing::warn!(object = %entry.name, "no intersection with cutting plane");
                    summary.no_intersection += 1;
                }
                Err(e) => {
                    tracing::warn!(object = %entry.name, error = %e, "section failed");
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            objects = entries.len(),
            sectioned = summary.sectioned,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "cross section finished"
        );

        Ok(BatchReport {
            placement: self.plane_world.clone(),
            entries,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_meshes::unit_cube;

    fn cube_at(name: &str, x: f64, z: f64) -> SceneObject {
        SceneObject::mesh(name, unit_cube(), Transform::translation(x, 0.0, z))
    }

    fn empty(name: &str) -> SceneObject {
        SceneObject {
            name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_flatten_expands_instancers_and_skips_empties() {
        let instancer = SceneObject {
            name: "array".into(),
            instances: vec![cube_at("a.0", 0.0, 0.0), cube_at("a.1", 2.0, 0.0), empty("a.2")],
            ..Default::default()
        };
        let objects = vec![cube_at("first", 0.0, 0.0), instancer, empty("camera")];
        let (jobs, skipped) = flatten_instances(&objects);
        let names: Vec<&str> = jobs.iter().map(|j| j.name).collect();
        assert_eq!(names, vec!["first", "a.0", "a.1"]);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn test_run_keeps_order_and_counts() {
        let objects: Vec<SceneObject> = (0..16)
            .map(|i| {
                let z = if i % 4 == 3 { 10.0 } else { 0.0 };
                cube_at(&format!("cube.{i}"), i as f64 * 2.0, z)
            })
            .chain(std::iter::once(empty("light")))
            .collect();

        let report = CrossSection::default().run(&objects).unwrap();
        assert_eq!(report.entries.len(), 16);
        for (i, entry) in report.entries.iter().enumerate() {
            assert_eq!(entry.name, format!("cube.{i}"));
        }
        assert_eq!(
            report.summary,
            BatchSummary {
                sectioned: 12,
                no_intersection: 4,
                failed: 0,
                skipped: 1,
            }
        );
    }

    #[test]
    fn test_section_uses_object_and_plane_matrices() {
        // Plane lifted to z = 5, cube moved there too.
        let cut = CrossSection::new(Transform::translation(0.0, 0.0, 5.0), SectionOptions::default());
        let report = cut.run(&[cube_at("lifted", 3.0, 5.0)]).unwrap();
        let section = report.entries[0].outcome.clone().unwrap().into_section().unwrap();

        // Plane-local: centred on x = 3 at z = 0.
        let cx: f64 = section.vertices.iter().map(|p| p.x).sum::<f64>() / 4.0;
        assert!((cx - 3.0).abs() < 1e-12);

        let placed = section.transformed(&report.placement);
        assert!(placed.vertices.iter().all(|p| (p.z - 5.0).abs() < 1e-12));
    }

    #[test]
    fn test_empty_selection() {
        let cut = CrossSection::default();
        assert!(matches!(cut.run(&[]), Err(SectionError::EmptySelection)));
        assert!(matches!(
            cut.run(&[empty("camera")]),
            Err(SectionError::EmptySelection)
        ));
    }

    #[test]
    fn test_singular_plane() {
        let cut = CrossSection::new(Transform::scale(1.0, 1.0, 0.0), SectionOptions::default());
        assert!(matches!(
            cut.run(&[cube_at("c", 0.0, 0.0)]),
            Err(SectionError::SingularTransform)
        ));
    }

    fn broken(name: &str) -> SceneObject {
        SceneObject::rejected(
            name,
            SectionError::PolygonTooSmall { polygon: 0, len: 2 },
            Transform::identity(),
        )
    }

    #[test]
    fn test_rejected_objects_reported_in_scene_order() {
        let report = CrossSection::default()
            .run(&[broken("bad"), cube_at("good", 0.0, 0.0)])
            .unwrap();
        let names: Vec<&str> = report.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["bad", "good"]);
        assert_eq!(
            report.entries[0].outcome,
            Err(SectionError::PolygonTooSmall { polygon: 0, len: 2 })
        );
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.summary.sectioned, 1);
    }

    #[test]
    fn test_all_rejected_still_reports() {
        let report = CrossSection::default()
            .run(&[broken("a"), broken("b")])
            .unwrap();
        assert_eq!(report.entries.len(), 2);
        assert_eq!(
            report.summary,
            BatchSummary {
                failed: 2,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_instancer_with_rejected_instances_not_skipped() {
        let instancer = SceneObject {
            name: "array".into(),
            instances: vec![broken("array.0")],
            ..Default::default()
        };
        let report = CrossSection::default()
            .run(&[cube_at("cube", 0.0, 0.0), instancer])
            .unwrap();
        assert_eq!(
            report.summary,
            BatchSummary {
                sectioned: 1,
                no_intersection: 0,
                failed: 1,
                skipped: 0,
            }
        );
    }

    #[test]
    fn test_failure_does_not_abort_batch() {
        let bad = SceneObject::mesh(
            "bad",
            unit_cube(),
            Transform::translation(f64::NAN, 0.0, 0.0),
        );
        let report = CrossSection::default()
            .run(&[cube_at("good", 0.0, 0.0), bad])
            .unwrap();
        assert_eq!(report.summary.sectioned, 1);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(
            report.entries[1].outcome,
            Err(SectionError::NonFiniteTransform)
        );
    }
}
