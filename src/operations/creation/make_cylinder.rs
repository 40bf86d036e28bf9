use std::f64::consts::TAU;

use tracing::debug;

use crate::error::{OperationError, Result};
use crate::geometry::curve::{Circle, Curve, Line};
use crate::geometry::surface::{Cylinder, Plane};
use crate::math::TOLERANCE;
use crate::topology::{
    EdgeCurve, EdgeData, EdgeId, FaceData, FaceId, FaceSurface, OrientedEdge, ShellData, SolidData,
    SolidId, TopologyStore, VertexData, VertexId, WireData,
};

/// Creates the boundary representation of a cylinder swept from a base
/// circle along the circle's normal.
///
/// The lateral face is bounded by the base circle, a seam line, the
/// translated top circle and the seam again. End caps are optional; without
/// them the result is an open tube. A negative height sweeps against the
/// normal.
pub struct MakeCylinder {
    base: Circle,
    height: f64,
    cap_bottom: bool,
    cap_top: bool,
}

impl MakeCylinder {
    /// Creates a new `MakeCylinder` operation without end caps.
    #[must_use]
    pub fn new(base: Circle, height: f64) -> Self {
        Self {
            base,
            height,
            cap_bottom: false,
            cap_top: false,
        }
    }

    /// Selects which end caps to build.
    #[must_use]
    pub fn with_caps(mut self, cap_bottom: bool, cap_top: bool) -> Self {
        self.cap_bottom = cap_bottom;
        self.cap_top = cap_top;
        self
    }

    /// Executes the operation, creating the body in the topology store.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the height is near zero or
    /// not finite.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SolidId> {
        if !self.height.is_finite() || self.height.abs() < TOLERANCE {
            return Err(OperationError::InvalidInput(format!(
                "cylinder height must be non-zero, got {}",
                self.height
            ))
            .into());
        }

        let axis = *self.base.normal();
        let offset = axis * self.height;
        let top = self.base.translated(&offset);
        let upward = self.height > 0.0;

        // All fallible steps come first; a failure must leave the store untouched.
        let seam_bottom = self.base.evaluate(0.0)?;
        let seam_top = seam_bottom + offset;
        let (seam_line, seam_len) = Line::through(seam_bottom, seam_top)?;
        let lateral_surface = Cylinder::from_circle(&self.base);
        // Outward is away from the sweep direction at the bottom, along it at
        // the top.
        let bottom_plane = if self.cap_bottom {
            let normal = if upward { -axis } else { axis };
            Some(Plane::from_normal(*self.base.center(), normal)?)
        } else {
            None
        };
        let top_plane = if self.cap_top {
            let normal = if upward { axis } else { -axis };
            Some(Plane::from_normal(*top.center(), normal)?)
        } else {
            None
        };

        let v0 = store.add_vertex(VertexData::new(seam_bottom));
        let v1 = store.add_vertex(VertexData::new(seam_top));
        let bottom_edge = add_circle_edge(store, self.base.clone(), v0);
        let top_edge = add_circle_edge(store, top, v1);
        let seam = store.add_edge(EdgeData {
            start: v0,
            end: v1,
            curve: EdgeCurve::Line(seam_line),
            t_start: 0.0,
            t_end: seam_len,
        });

        // Counter-clockwise in the surface's (u, v) space so the face agrees
        // with the outward radial normal.
        let lateral_loop = if upward {
            vec![
                OrientedEdge::new(bottom_edge, true),
                OrientedEdge::new(seam, true),
                OrientedEdge::new(top_edge, false),
                OrientedEdge::new(seam, false),
            ]
        } else {
            vec![
                OrientedEdge::new(seam, true),
                OrientedEdge::new(top_edge, true),
                OrientedEdge::new(seam, false),
                OrientedEdge::new(bottom_edge, false),
            ]
        };
        let lateral_wire = store.add_wire(WireData {
            edges: lateral_loop,
            is_closed: true,
        });
        let lateral = store.add_face(FaceData {
            surface: FaceSurface::Cylinder(lateral_surface),
            outer_wire: lateral_wire,
            inner_wires: vec![],
            same_sense: true,
        });

        let mut faces = vec![lateral];
        if let Some(plane) = bottom_plane {
            faces.push(add_cap(store, plane, bottom_edge, !upward));
        }
        if let Some(plane) = top_plane {
            faces.push(add_cap(store, plane, top_edge, upward));
        }

        let is_closed = self.cap_bottom && self.cap_top;
        let shell = store.add_shell(ShellData { faces, is_closed });
        let solid = store.add_solid(SolidData {
            outer_shell: shell,
            inner_shells: vec![],
        });

        debug!(
            radius = self.base.radius(),
            height = self.height,
            cap_bottom = self.cap_bottom,
            cap_top = self.cap_top,
            "built cylinder"
        );
        Ok(solid)
    }
}

fn add_circle_edge(store: &mut TopologyStore, circle: Circle, vertex: VertexId) -> EdgeId {
    store.add_edge(EdgeData {
        start: vertex,
        end: vertex,
        curve: EdgeCurve::Circle(circle),
        t_start: 0.0,
        t_end: TAU,
    })
}

/// Adds a planar disk face bounded by a circle edge.
///
/// `forward` must be `true` exactly when the circle winds counter-clockwise
/// around the plane normal.
fn add_cap(store: &mut TopologyStore, plane: Plane, edge: EdgeId, forward: bool) -> FaceId {
    let wire = store.add_wire(WireData {
        edges: vec![OrientedEdge::new(edge, forward)],
        is_closed: true,
    });
    store.add_face(FaceData {
        surface: FaceSurface::Plane(plane),
        outer_wire: wire,
        inner_wires: vec![],
        same_sense: true,
    })
}
