pub mod edge;
pub mod face;
pub mod shell;
pub mod solid;
pub mod vertex;
pub mod wire;

pub use edge::{EdgeCurve, EdgeData, EdgeId};
pub use face::{FaceData, FaceId, FaceSurface};
pub use shell::{ShellData, ShellId};
pub use solid::{SolidData, SolidId};
pub use vertex::{VertexData, VertexId};
pub use wire::{OrientedEdge, WireData, WireId};

use crate::error::TopologyError;
use slotmap::SlotMap;

/// Central arena that owns all topological entities.
///
/// Entities reference each other via typed IDs (generational indices),
/// avoiding self-referential structures. A store is handed to the host
/// together with the solid ids it contains.
#[derive(Debug, Default)]
pub struct TopologyStore {
    vertices: SlotMap<VertexId, VertexData>,
    edges: SlotMap<EdgeId, EdgeData>,
    wires: SlotMap<WireId, WireData>,
    faces: SlotMap<FaceId, FaceData>,
    shells: SlotMap<ShellId, ShellData>,
    solids: SlotMap<SolidId, SolidData>,
}

macro_rules! entity_access {
    ($add:ident, $get:ident, $field:ident, $id:ty, $data:ty, $name:literal) => {
        #[doc = concat!("Inserts a ", $name, " and returns its ID.")]
        pub fn $add(&mut self, data: $data) -> $id {
            self.$field.insert(data)
        }

        #[doc = concat!("Returns a reference to the ", $name, " data.")]
        ///
        /// # Errors
        ///
        /// Returns [`TopologyError::EntityNotFound`] if the ID is stale or foreign.
        pub fn $get(&self, id: $id) -> Result<&$data, TopologyError> {
            self.$field
                .get(id)
                .ok_or(TopologyError::EntityNotFound($name))
        }
    };
}

impl TopologyStore {
    /// Creates a new, empty topology store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    entity_access!(add_vertex, vertex, vertices, VertexId, VertexData, "vertex");
    entity_access!(add_edge, edge, edges, EdgeId, EdgeData, "edge");
    entity_access!(add_wire, wire, wires, WireId, WireData, "wire");
    entity_access!(add_face, face, faces, FaceId, FaceData, "face");
    entity_access!(add_shell, shell, shells, ShellId, ShellData, "shell");
    entity_access!(add_solid, solid, solids, SolidId, SolidData, "solid");

    /// Returns every face of a solid, outer shell first.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid or one of its shells is missing.
    pub fn solid_faces(&self, id: SolidId) -> Result<Vec<FaceId>, TopologyError> {
        let solid = self.solid(id)?;
        let mut faces = Vec::new();
        for shell_id in std::iter::once(solid.outer_shell).chain(solid.inner_shells.iter().copied())
        {
            faces.extend_from_slice(&self.shell(shell_id)?.faces);
        }
        Ok(faces)
    }

    /// Number of solids in the store.
    #[must_use]
    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    /// Number of vertices in the store.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges in the store.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
