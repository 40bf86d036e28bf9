//! Glass body and base construction.
//!
//! Both routines take a frame and dimensions, build one body in the given
//! [`TopologyStore`], and either return its id or a [`ConstructionError`].
//! Every outcome is logged: an `info` event on entry, then either an `info`
//! event with the new body or an `error` event with the full cause chain.

use std::fmt;

use thiserror::Error;
use tracing::{error, info};

use crate::error::VitrumError;
use crate::geometry::curve::Circle;
use crate::geometry::surface::Plane;
use crate::math::{Point3, Vector3};
use crate::operations::creation::{MakeCylinder, MakePlanarBreps};
use crate::topology::{SolidId, TopologyStore};

/// Absolute tolerance used when building the planar base.
pub const BASE_TOLERANCE: f64 = 0.01;

/// A construction frame: an origin and the normal of the plane through it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Origin of the construction plane.
    pub origin: Point3,
    /// Normal of the construction plane; the glass grows along it.
    pub normal: Vector3,
}

impl Frame {
    /// Creates a frame. The normal is not validated here.
    #[must_use]
    pub fn new(origin: Point3, normal: Vector3) -> Self {
        Self { origin, normal }
    }

    /// World origin with the world Z axis as normal.
    #[must_use]
    pub fn world_xy() -> Self {
        Self::new(Point3::origin(), Vector3::z())
    }

    fn plane(&self) -> crate::error::Result<Plane> {
        Plane::from_normal(self.origin, self.normal)
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::world_xy()
    }
}

/// The frames of a glass's body and base.
///
/// The base sits on the body's bottom plane, so both always share one
/// frame; [`GlassFrames::shared`] is the only way to build this.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlassFrames {
    frame: Frame,
}

impl GlassFrames {
    /// Uses `frame` for both the body and the base.
    #[must_use]
    pub fn shared(frame: Frame) -> Self {
        Self { frame }
    }

    /// Frame of the body's bottom rim.
    #[must_use]
    pub fn body(&self) -> &Frame {
        &self.frame
    }

    /// Frame of the base disk.
    #[must_use]
    pub fn base(&self) -> &Frame {
        &self.frame
    }
}

/// Why a glass part could not be built.
#[derive(Debug, Error)]
pub enum ConstructionError {
    /// The caller's dimensions or frame were degenerate (non-positive radius,
    /// zero normal, zero height).
    #[error("degenerate input")]
    DegenerateInput(#[source] VitrumError),

    /// The kernel failed on otherwise acceptable input.
    #[error("kernel fault")]
    KernelFault(#[source] VitrumError),

    /// The planar construction returned no body for the boundary curve.
    #[error("planar construction returned no body")]
    EmptyResult,
}

impl From<VitrumError> for ConstructionError {
    fn from(err: VitrumError) -> Self {
        if err.is_input_error() {
            Self::DegenerateInput(err)
        } else {
            Self::KernelFault(err)
        }
    }
}

/// Builds the glass body: an open cylinder of `radius` and `height` standing
/// on the frame's plane and extending along its normal, with neither end
/// capped.
///
/// # Errors
///
/// Returns [`ConstructionError::DegenerateInput`] for a non-positive radius,
/// zero normal or zero height, and [`ConstructionError::KernelFault`] if the
/// kernel fails otherwise.
pub fn create_glass_body(
    store: &mut TopologyStore,
    frame: &Frame,
    radius: f64,
    height: f64,
) -> Result<SolidId, ConstructionError> {
    info!(
        origin = ?frame.origin,
        normal = ?frame.normal,
        radius,
        height,
        "create_glass_body start"
    );

    let result = build_body(store, frame, radius, height);
    match &result {
        Ok(solid) => info!(?solid, "create_glass_body done"),
        Err(err) => log_failure("create_glass_body", err),
    }
    result
}

fn build_body(
    store: &mut TopologyStore,
    frame: &Frame,
    radius: f64,
    height: f64,
) -> Result<SolidId, ConstructionError> {
    let plane = frame.plane()?;
    let base_circle = Circle::on_plane(&plane, radius)?;
    let solid = MakeCylinder::new(base_circle, height)
        .with_caps(false, false)
        .execute(store)?;
    Ok(solid)
}

/// Builds the glass base: a flat disk of `radius` lying in the frame's
/// plane, centered on its origin.
///
/// # Errors
///
/// Returns [`ConstructionError::DegenerateInput`] for a non-positive radius
/// or zero normal, [`ConstructionError::EmptyResult`] if no planar body comes
/// back for the boundary, and [`ConstructionError::KernelFault`] otherwise.
pub fn create_glass_base(
    store: &mut TopologyStore,
    frame: &Frame,
    radius: f64,
) -> Result<SolidId, ConstructionError> {
    info!(
        origin = ?frame.origin,
        normal = ?frame.normal,
        radius,
        tolerance = BASE_TOLERANCE,
        "create_glass_base start"
    );

    let result = build_base(store, frame, radius);
    match &result {
        Ok(solid) => info!(?solid, "create_glass_base done"),
        Err(err) => log_failure("create_glass_base", err),
    }
    result
}

fn build_base(
    store: &mut TopologyStore,
    frame: &Frame,
    radius: f64,
) -> Result<SolidId, ConstructionError> {
    let plane = frame.plane()?;
    let boundary = Circle::on_plane(&plane, radius)?.to_nurbs()?;
    let solids = MakePlanarBreps::new(boundary, BASE_TOLERANCE).execute(store)?;
    solids.first().copied().ok_or(ConstructionError::EmptyResult)
}

fn log_failure(operation: &'static str, err: &ConstructionError) {
    error!(operation, error = %ErrorChain(err), "construction failed");
}

/// Displays an error followed by each of its sources, `: `-separated.
pub(crate) struct ErrorChain<'a>(pub &'a (dyn std::error::Error + 'static));

impl fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(cause) = source {
            write!(f, ": {cause}")?;
            source = cause.source();
        }
        Ok(())
    }
}
