//! Contact data structures for collision response.

use glam::Vec2;

/// A single contact between two shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Contact point in world space.
    pub position: Vec2,
    /// Unit normal pointing from shape A to shape B.
    pub normal: Vec2,
    /// Penetration depth along `normal`. For segment tests, the length of the
    /// segment left past the hit point.
    pub penetration: f32,
}

impl Contact {
    pub fn new(position: Vec2, normal: Vec2, penetration: f32) -> Self {
        Self {
            position,
            normal,
            penetration,
        }
    }

    /// Translation that would push B out of A.
    #[inline]
    pub fn penetration_vector(&self) -> Vec2 {
        self.normal * self.penetration
    }

    /// The same contact seen from B.
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }
}

/// Contacts between two bodies for one resolution pass.
#[derive(Debug, Clone)]
pub struct Manifold {
    pub entity_a: hecs::Entity,
    pub entity_b: hecs::Entity,
    pub contacts: Vec<Contact>,
}

impl Manifold {
    pub fn new(entity_a: hecs::Entity, entity_b: hecs::Entity, contacts: Vec<Contact>) -> Self {
        Self {
            entity_a,
            entity_b,
            contacts,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Contact with the least penetration, used for impulse resolution.
    pub fn shallowest(&self) -> Option<&Contact> {
        self.contacts
            .iter()
            .min_by(|a, b| a.penetration.total_cmp(&b.penetration))
    }

    /// Contact with the greatest penetration, used for positional correction.
    pub fn deepest(&self) -> Option<&Contact> {
        self.contacts
            .iter()
            .max_by(|a, b| a.penetration.total_cmp(&b.penetration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifold_extremes() {
        let mut world = hecs::World::new();
        let a = world.spawn(());
        let b = world.spawn(());
        let manifold = Manifold::new(
            a,
            b,
            vec![
                Contact::new(Vec2::ZERO, Vec2::X, 2.0),
                Contact::new(Vec2::ONE, Vec2::Y, 0.5),
                Contact::new(Vec2::NEG_ONE, Vec2::X, 4.0),
            ],
        );
        assert_eq!(manifold.shallowest().unwrap().penetration, 0.5);
        assert_eq!(manifold.deepest().unwrap().penetration, 4.0);
        assert!(Manifold::new(a, b, Vec::new()).shallowest().is_none());
    }

    #[test]
    fn test_penetration_vector_and_flip() {
        let contact = Contact::new(Vec2::ZERO, Vec2::new(0.0, -1.0), 3.0);
        assert_eq!(contact.penetration_vector(), Vec2::new(0.0, -3.0));
        assert_eq!(contact.flipped().normal, Vec2::Y);
    }
}
