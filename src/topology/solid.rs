use super::shell::ShellId;

slotmap::new_key_type! {
    /// Unique identifier for a solid in the topology store.
    pub struct SolidId;
}

/// Data associated with a boundary-representation body.
///
/// Bodies handed to the host may be open (a tube, a disk); the outer shell's
/// `is_closed` flag tells whether the body bounds a volume.
#[derive(Debug, Clone)]
pub struct SolidData {
    /// The outer shell of the solid.
    pub outer_shell: ShellId,
    /// Inner shells representing voids within the solid.
    pub inner_shells: Vec<ShellId>,
}
