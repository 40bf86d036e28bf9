use std::collections::{HashMap, HashSet, VecDeque};
use std::f64::consts::TAU;

use spade::handles::{FixedFaceHandle, InnerTag};
use spade::{ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation};

use crate::error::{Result, TessellationError};
use crate::geometry::surface::{Cylinder, Plane, Surface};
use crate::math::Point2;
use crate::topology::{FaceId, FaceSurface, TopologyStore, WireId};

use super::tessellate_curve::wire_polygon;
use super::{TessellationParams, TriangleMesh};

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Tessellates a face into a triangle mesh.
pub struct TessellateFace {
    face: FaceId,
    params: TessellationParams,
}

impl TessellateFace {
    /// Creates a new `TessellateFace` operation.
    #[must_use]
    pub fn new(face: FaceId, params: TessellationParams) -> Self {
        Self { face, params }
    }

    /// Executes the tessellation, returning a triangle mesh.
    ///
    /// Planar faces are triangulated with a constrained Delaunay
    /// triangulation of their sampled boundary. Cylindrical faces span a
    /// full revolution and are meshed on a regular (u, v) grid whose height
    /// comes from the boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if the face cannot be tessellated.
    pub fn execute(&self, store: &TopologyStore) -> Result<TriangleMesh> {
        self.params.validate()?;
        let face = store.face(self.face)?;
        match &face.surface {
            FaceSurface::Plane(plane) => {
                let wires: Vec<WireId> = face.wires().collect();
                tessellate_plane(store, plane, face.same_sense, &wires, &self.params)
            }
            FaceSurface::Cylinder(cyl) => {
                let outline = wire_polygon(store, face.outer_wire, &self.params)?;
                let (v_min, v_max) = outline
                    .iter()
                    .map(|p| cyl.inverse(p).1)
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                        (lo.min(v), hi.max(v))
                    });
                if !v_max.is_finite() || v_max <= v_min {
                    return Err(TessellationError::Failed(
                        "cylindrical face has no height".into(),
                    )
                    .into());
                }
                tessellate_cylinder(cyl, v_min, v_max, face.same_sense, &self.params)
            }
        }
    }
}

/// Tessellates a planar face using CDT.
#[allow(clippy::cast_possible_truncation)]
fn tessellate_plane(
    store: &TopologyStore,
    plane: &Plane,
    same_sense: bool,
    wires: &[WireId],
    params: &TessellationParams,
) -> Result<TriangleMesh> {
    let normal = if same_sense {
        *plane.plane_normal()
    } else {
        -*plane.plane_normal()
    };

    let mut cdt = Cdt::new();
    for &wire_id in wires {
        let loop_2d: Vec<SpadePoint2<f64>> = wire_polygon(store, wire_id, params)?
            .iter()
            .map(|p| {
                let uv = plane.project(p);
                SpadePoint2::new(uv.x, uv.y)
            })
            .collect();
        insert_constraint_loop(&mut cdt, &loop_2d)?;
    }

    let interior = classify_interior_faces(&cdt);

    let mut mesh = TriangleMesh::default();
    let mut vertex_map: HashMap<usize, u32> = HashMap::new();

    for face_handle in cdt.inner_faces() {
        if !interior.contains(&face_handle.fix().index()) {
            continue;
        }

        let mut tri = [0u32; 3];
        for (slot, vh) in tri.iter_mut().zip(face_handle.vertices()) {
            let idx = vh.fix().index();
            *slot = *vertex_map.entry(idx).or_insert_with(|| {
                let pos = vh.position();
                let p3 = *plane.origin() + plane.u_dir() * pos.x + plane.v_dir() * pos.y;
                mesh.vertices.push(p3);
                mesh.normals.push(normal);
                mesh.uvs.push(Point2::new(pos.x, pos.y));
                (mesh.vertices.len() - 1) as u32
            });
        }

        // CDT triangles wind counter-clockwise in (u, v), i.e. around +normal.
        if !same_sense {
            tri.swap(1, 2);
        }
        mesh.indices.push(tri);
    }

    if mesh.indices.is_empty() {
        return Err(TessellationError::Failed("planar face produced no triangles".into()).into());
    }
    Ok(mesh)
}

/// Meshes a full-revolution cylinder band between `v_min` and `v_max`.
///
/// Generates `(n_u + 1) * (n_v + 1)` vertices and splits each quad cell
/// into two triangles.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn tessellate_cylinder(
    cyl: &Cylinder,
    v_min: f64,
    v_max: f64,
    same_sense: bool,
    params: &TessellationParams,
) -> Result<TriangleMesh> {
    // Straight along v, so one row of cells is exact.
    let n_u = params.angular_segments(cyl.radius(), TAU);
    let n_v = 1;
    let cols = n_u + 1;

    let mut mesh = TriangleMesh::default();
    for iv in 0..=n_v {
        let v = v_min + (v_max - v_min) * iv as f64 / n_v as f64;
        for iu in 0..cols {
            let u = TAU * iu as f64 / n_u as f64;
            let pt = cyl.evaluate(u, v)?;
            let n = cyl.normal(u, v)?;
            mesh.vertices.push(pt);
            mesh.normals.push(if same_sense { n } else { -n });
            mesh.uvs.push(Point2::new(u, v));
        }
    }

    for iv in 0..n_v {
        for iu in 0..n_u {
            let i00 = (iv * cols + iu) as u32;
            let i10 = (iv * cols + iu + 1) as u32;
            let i01 = ((iv + 1) * cols + iu) as u32;
            let i11 = ((iv + 1) * cols + iu + 1) as u32;
            if same_sense {
                mesh.indices.push([i00, i10, i11]);
                mesh.indices.push([i00, i11, i01]);
            } else {
                mesh.indices.push([i00, i11, i10]);
                mesh.indices.push([i00, i01, i11]);
            }
        }
    }

    Ok(mesh)
}

/// Inserts a closed polygon as constraint edges into the CDT.
fn insert_constraint_loop(cdt: &mut Cdt, points: &[SpadePoint2<f64>]) -> Result<()> {
    if points.len() < 3 {
        return Err(
            TessellationError::Failed("constraint loop needs at least 3 points".into()).into(),
        );
    }

    let handles = points
        .iter()
        .map(|&pt| {
            cdt.insert(pt)
                .map_err(|e: InsertionError| TessellationError::Failed(format!("CDT insert: {e}")))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    for (i, &from) in handles.iter().enumerate() {
        let to = handles[(i + 1) % handles.len()];
        if from != to {
            cdt.add_constraint(from, to);
        }
    }

    Ok(())
}

/// Marks the CDT faces that lie inside the constrained loops.
///
/// Flood-fills from the convex hull; crossing a constraint edge flips
/// between outside and inside, so odd depth means interior.
fn classify_interior_faces(cdt: &Cdt) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_map: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();

    let outer_fix = cdt.outer_face().fix();

    for edge in cdt.directed_edges() {
        if edge.face().fix() != outer_fix {
            continue;
        }
        let Some(inner) = edge.rev().face().as_inner() else {
            continue;
        };
        let idx = inner.fix().index();
        if depth_map.contains_key(&idx) {
            continue;
        }
        let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
        depth_map.insert(idx, depth);
        queue.push_back((inner.fix(), depth));
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        if depth % 2 == 1 {
            interior.insert(face_fix.index());
        }
        for edge in cdt.face(face_fix).adjacent_edges() {
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let n_idx = neighbor.fix().index();
            if depth_map.contains_key(&n_idx) {
                continue;
            }
            let crossed = cdt.is_constraint_edge(edge.as_undirected().fix());
            let new_depth = depth + u32::from(crossed);
            depth_map.insert(n_idx, new_depth);
            queue.push_back((neighbor.fix(), new_depth));
        }
    }

    interior
}
