//! Output formats: a JSON report and a Wavefront OBJ of the sections.

use std::io::{self, Write};

use serde::Serialize;
use vcad_kernel_section::{BatchReport, BatchSummary, SectionError, SectionOutcome, SectionStats};

/// JSON report of a batch.
#[derive(Debug, Serialize)]
pub struct ReportDto {
    pub summary: BatchSummary,
    /// Plane world matrix, row-major.
    pub placement: [[f64; 4]; 4],
    pub entries: Vec<EntryDto>,
}

/// One object in the JSON report.
#[derive(Debug, Serialize)]
pub struct EntryDto {
    pub name: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertices: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edges: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faces: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<SectionStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EntryDto {
    fn failed(name: &str, error: &SectionError) -> Self {
        Self {
            name: name.to_string(),
            status: "failed",
            vertices: None,
            edges: None,
            faces: None,
            stats: None,
            error: Some(error.to_string()),
        }
    }
}

impl ReportDto {
    /// Build the report from a finished batch.
    pub fn new(report: &BatchReport) -> Self {
        let entries = report
            .entries
            .iter()
            .map(|entry| match &entry.outcome {
                Ok(SectionOutcome::Section(s)) => EntryDto {
                    name: entry.name.clone(),
                    status: "sectioned",
                    vertices: Some(s.vertices.len()),
                    edges: Some(s.edges.len()),
                    faces: Some(s.faces.len()),
                    stats: Some(s.stats.clone()),
                    error: None,
                },
                Ok(SectionOutcome::NoIntersection) => EntryDto {
                    name: entry.name.clone(),
                    status: "no_intersection",
                    vertices: None,
                    edges: None,
                    faces: None,
                    stats: None,
                    error: None,
                },
                Err(e) => EntryDto::failed(&entry.name, e),
            })
            .collect();

        Self {
            summary: report.summary,
            placement: report.placement.to_rows(),
            entries,
        }
    }
}

/// Write every section as an OBJ group, placed in world space.
///
/// Edges become `l` records and filled faces `f` records; indices are
/// 1-based and global across groups.
pub fn write_obj<W: Write>(out: &mut W, report: &BatchReport) -> io::Result<()> {
    writeln!(out, "# vcad-section")?;
    let mut base = 1;

    for entry in &report.entries {
        let Ok(SectionOutcome::Section(section)) = &entry.outcome else {
            continue;
        };
        let placed = section.transformed(&report.placement);

        writeln!(out, "o {}", entry.name.replace(char::is_whitespace, "_"))?;
        for p in &placed.vertices {
            writeln!(out, "v {} {} {}", p.x, p.y, p.z)?;
        }
        for [a, b] in &placed.edges {
            writeln!(out, "l {} {}", a + base, b + base)?;
        }
        for face in &placed.faces {
            write!(out, "f")?;
            for v in face {
                write!(out, " {}", v + base)?;
            }
            writeln!(out)?;
        }

        base += placed.vertices.len();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcad_kernel_math::{Point3, Transform};
    use vcad_kernel_section::{CrossSection, Mesh, SceneObject, SectionOptions};

    fn tetra(name: &str, x: f64) -> SceneObject {
        let mesh = Mesh::from_polygons(
            vec![
                Point3::new(0.0, 0.0, -1.0),
                Point3::new(1.0, 0.0, -1.0),
                Point3::new(0.0, 1.0, -1.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
            vec![vec![0, 2, 1], vec![0, 1, 3], vec![1, 2, 3], vec![2, 0, 3]],
        )
        .unwrap();
        SceneObject::mesh(name, mesh, Transform::translation(x, 0.0, 0.0))
    }

    fn run() -> BatchReport {
        let mut far = tetra("Far", 0.0);
        far.world = Transform::translation(0.0, 0.0, 10.0);
        let broken = SceneObject::rejected(
            "Broken",
            SectionError::PolygonTooSmall { polygon: 0, len: 2 },
            Transform::identity(),
        );
        let objects = vec![tetra("Tetra A", 0.0), broken, tetra("B", 5.0), far];
        CrossSection::new(Transform::identity(), SectionOptions::default())
            .run(&objects)
            .unwrap()
    }

    #[test]
    fn test_obj_groups_and_global_indices() {
        let report = run();
        let mut buf = Vec::new();
        write_obj(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let groups: Vec<&str> = text.lines().filter(|l| l.starts_with("o ")).collect();
        assert_eq!(groups, vec!["o Tetra_A", "o B"]);
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 6);
        assert_eq!(text.lines().filter(|l| l.starts_with("l ")).count(), 6);
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 2);

        // Second group refers to vertices 4..=6.
        let last_face = text.lines().filter(|l| l.starts_with("f ")).last().unwrap();
        assert!(last_face
            .split_whitespace()
            .skip(1)
            .all(|i| (4..=6).contains(&i.parse::<usize>().unwrap())));
    }

    #[test]
    fn test_report_keeps_rejected_entry_in_place() {
        let dto = ReportDto::new(&run());
        assert_eq!(dto.summary.sectioned, 2);
        assert_eq!(dto.summary.no_intersection, 1);
        assert_eq!(dto.summary.failed, 1);
        assert_eq!(dto.entries.len(), 4);

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["entries"][0]["status"], "sectioned");
        assert_eq!(json["entries"][0]["faces"], 1);
        assert_eq!(json["entries"][1]["name"], "Broken");
        assert_eq!(json["entries"][1]["status"], "failed");
        assert_eq!(
            json["entries"][1]["error"],
            "polygon 0 has 2 vertices, need at least 3"
        );
        assert_eq!(json["entries"][2]["status"], "sectioned");
        assert_eq!(json["entries"][3]["status"], "no_intersection");
        assert!(json["entries"][3].get("faces").is_none());
        assert_eq!(json["placement"][3][3], 1.0);
    }
}
