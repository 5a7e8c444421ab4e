//! Section assembly: weld, trace contours, fill and orient.

use crate::classify::Intersections;
use crate::fill::{fill_loops, trace_contours, triangulate_face};
use crate::stitch::Stitched;
use crate::weld::weld;
use crate::{SectionMesh, SectionOptions, SectionOutcome, SectionStats};

/// Turn classified points and stitched edges into the final section.
///
/// An empty edge list means the plane does not cut the mesh. Otherwise
/// the result is always a section, even if welding leaves only isolated
/// points.
pub fn assemble(hits: &Intersections, stitched: &Stitched, options: &SectionOptions) -> SectionOutcome {
    if stitched.edges.is_empty() {
        return SectionOutcome::NoIntersection;
    }

    let welded = weld(&hits.points, &stitched.edges, options.weld_tolerance);
    let traced = trace_contours(welded.points.len(), &welded.edges);

    let mut stats = SectionStats {
        crossings: hits.crossings,
        on_plane: hits.on_plane,
        degenerate_faces: stitched.degenerate_faces,
        merged_points: welded.merged,
        closed_loops: traced.contours.iter().filter(|c| c.closed).count(),
        open_chains: traced.contours.iter().filter(|c| !c.closed).count(),
        branched: traced.branched,
        ..Default::default()
    };

    let mut faces = Vec::new();
    if options.fill {
        let min_area = options.weld_tolerance * options.weld_tolerance;
        let fill = fill_loops(&welded.points, &traced.contours, min_area);
        stats.zero_area_loops = fill.zero_area;

        if options.triangulate {
            for face in &fill.faces {
                faces.extend(
                    triangulate_face(&welded.points, face)
                        .into_iter()
                        .map(|t| t.to_vec()),
                );
            }
        } else {
            faces = fill.faces;
        }
    }
    stats.faces = faces.len();

    tracing::debug!(
        vertices = welded.points.len(),
        edges = welded.edges.len(),
        closed_loops = stats.closed_loops,
        open_chains = stats.open_chains,
        faces = stats.faces,
        "assembled section"
    );

    SectionOutcome::Section(SectionMesh {
        vertices: welded.points,
        edges: welded.edges,
        faces,
        contours: traced.contours,
        stats,
    })
}
