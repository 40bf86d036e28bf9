use std::collections::HashMap;

use crate::error::Result;
use crate::topology::{EdgeId, SolidId, TopologyStore};

/// Finds the naked edges of a body: edges used by exactly one face boundary.
///
/// A seam counts twice because its face traverses it in both directions.
/// An open tube has two naked edges (its rims), a disk has one, and a
/// watertight body has none.
pub struct NakedEdges {
    solid: SolidId,
}

impl NakedEdges {
    /// Creates a new `NakedEdges` query.
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        Self { solid }
    }

    /// Executes the query, returning naked edges in first-use order.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced entity is missing.
    pub fn execute(&self, store: &TopologyStore) -> Result<Vec<EdgeId>> {
        let mut uses: HashMap<EdgeId, usize> = HashMap::new();
        let mut order = Vec::new();

        for face_id in store.solid_faces(self.solid)? {
            for wire_id in store.face(face_id)?.wires() {
                for oe in &store.wire(wire_id)?.edges {
                    let count = uses.entry(oe.edge).or_insert(0);
                    if *count == 0 {
                        order.push(oe.edge);
                    }
                    *count += 1;
                }
            }
        }

        Ok(order.into_iter().filter(|e| uses[e] == 1).collect())
    }
}
