//! Broadphase candidate collection.

/// Identity broadphase: every registered body is a candidate.
///
/// The working set is a snapshot so callbacks may add or remove bodies
/// while a step walks it.
#[derive(Debug, Default, Clone, Copy)]
pub struct Broadphase;

impl Broadphase {
    pub fn new() -> Self {
        Self
    }

    /// Replace `out` with the candidates for this step, in registration order.
    pub fn collect(&self, bodies: &[hecs::Entity], out: &mut Vec<hecs::Entity>) {
        out.clear();
        out.extend_from_slice(bodies);
    }
}
