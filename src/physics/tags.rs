//! Collision categories and the symmetric tag-pair collision table.

use std::any::TypeId;
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

use crate::error::{PhysicsError, Result};

/// Set of up to 64 collision categories, one per bit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BitTag(u64);

impl BitTag {
    /// Empty set. Never valid in registration APIs.
    pub const NONE: BitTag = BitTag(0);
    pub const ALL: BitTag = BitTag(u64::MAX);

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Single-category tag for bit `index` (0..64).
    pub const fn bit(index: u32) -> Self {
        Self(1u64 << index)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Exactly one category.
    pub const fn is_single(self) -> bool {
        self.0.is_power_of_two()
    }

    pub const fn contains(self, other: BitTag) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: BitTag) -> bool {
        self.0 & other.0 != 0
    }

    /// Bit index of a single-category tag.
    pub fn index(self) -> Option<u32> {
        self.is_single().then(|| self.0.trailing_zeros())
    }

    /// Single-category tags contained in this set, lowest bit first.
    pub fn iter(self) -> impl Iterator<Item = BitTag> {
        let mut remaining = self.0;
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            let lowest = remaining & remaining.wrapping_neg();
            remaining &= !lowest;
            Some(BitTag(lowest))
        })
    }
}

impl fmt::Debug for BitTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitTag({:#b})", self.0)
    }
}

impl BitOr for BitTag {
    type Output = BitTag;
    fn bitor(self, rhs: BitTag) -> BitTag {
        BitTag(self.0 | rhs.0)
    }
}

impl BitOrAssign for BitTag {
    fn bitor_assign(&mut self, rhs: BitTag) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for BitTag {
    type Output = BitTag;
    fn bitand(self, rhs: BitTag) -> BitTag {
        BitTag(self.0 & rhs.0)
    }
}

impl BitAndAssign for BitTag {
    fn bitand_assign(&mut self, rhs: BitTag) {
        self.0 &= rhs.0;
    }
}

impl Not for BitTag {
    type Output = BitTag;
    fn not(self) -> BitTag {
        BitTag(!self.0)
    }
}

/// A user enum whose variants are single-bit collision categories.
///
/// ```
/// use rein2d::physics::tags::TagDomain;
///
/// #[derive(Clone, Copy)]
/// enum Layer { Player = 1, Wall = 2 }
///
/// impl TagDomain for Layer {
///     const NAME: &'static str = "Layer";
///     const VARIANTS: &'static [Self] = &[Layer::Player, Layer::Wall];
///     fn bits(self) -> u64 { self as u64 }
///     fn name(self) -> &'static str {
///         match self { Layer::Player => "Player", Layer::Wall => "Wall" }
///     }
/// }
/// ```
pub trait TagDomain: Copy + 'static {
    const NAME: &'static str;
    const VARIANTS: &'static [Self];

    fn bits(self) -> u64;
    fn name(self) -> &'static str;

    fn tag(self) -> BitTag {
        BitTag::from_bits(self.bits())
    }
}

/// Registered categories and their display names.
#[derive(Debug)]
pub struct TagRegistry {
    registered: BitTag,
    names: [Option<&'static str>; 64],
    domains: Vec<TypeId>,
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self {
            registered: BitTag::NONE,
            names: [None; 64],
            domains: Vec::new(),
        }
    }
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every variant of a tag domain.
    pub fn register_domain<T: TagDomain>(&mut self) -> Result<()> {
        let id = TypeId::of::<T>();
        if self.domains.contains(&id) {
            return Err(PhysicsError::DuplicateDomain(T::NAME));
        }
        // Validate all variants before mutating anything.
        let mut seen = BitTag::NONE;
        for variant in T::VARIANTS {
            let tag = variant.tag();
            if !tag.is_single() || seen.intersects(tag) {
                return Err(PhysicsError::InvalidTagBits {
                    name: variant.name(),
                    bits: tag.bits(),
                });
            }
            self.check_free(tag)?;
            seen |= tag;
        }
        for variant in T::VARIANTS {
            self.insert(variant.tag(), variant.name());
        }
        self.domains.push(id);
        Ok(())
    }

    /// Register one single-bit category.
    pub fn register(&mut self, tag: BitTag, name: &'static str) -> Result<()> {
        if tag.is_none() {
            return Err(PhysicsError::NoneTag);
        }
        if !tag.is_single() {
            return Err(PhysicsError::InvalidTagBits {
                name,
                bits: tag.bits(),
            });
        }
        self.check_free(tag)?;
        self.insert(tag, name);
        Ok(())
    }

    fn check_free(&self, tag: BitTag) -> Result<()> {
        if let Some(existing) = tag.index().and_then(|i| self.names[i as usize]) {
            return Err(PhysicsError::DuplicateTag { tag, existing });
        }
        Ok(())
    }

    fn insert(&mut self, tag: BitTag, name: &'static str) {
        if let Some(index) = tag.index() {
            self.names[index as usize] = Some(name);
            self.registered |= tag;
        }
    }

    pub fn registered(&self) -> BitTag {
        self.registered
    }

    pub fn is_registered(&self, tags: BitTag) -> bool {
        !tags.is_none() && self.registered.contains(tags)
    }

    /// Fail unless `tags` is non-empty and every category in it is registered.
    pub fn ensure_registered(&self, tags: BitTag) -> Result<()> {
        if tags.is_none() {
            return Err(PhysicsError::NoneTag);
        }
        let unknown = tags & !self.registered;
        if !unknown.is_none() {
            return Err(PhysicsError::UnregisteredTag(unknown));
        }
        Ok(())
    }

    pub fn name(&self, tag: BitTag) -> Option<&'static str> {
        tag.index().and_then(|i| self.names[i as usize])
    }

    /// `"Player|Wall"` style description of a tag set.
    pub fn describe(&self, tags: BitTag) -> String {
        if tags.is_none() {
            return "None".to_string();
        }
        tags.iter()
            .map(|t| match self.name(t) {
                Some(name) => name.to_string(),
                None => format!("#{}", t.bits().trailing_zeros()),
            })
            .collect::<Vec<_>>()
            .join("|")
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Symmetric allow-list of category pairs that may generate contacts.
#[derive(Debug, Clone)]
pub struct CollisionTable {
    rows: [BitTag; 64],
}

impl Default for CollisionTable {
    fn default() -> Self {
        Self {
            rows: [BitTag::NONE; 64],
        }
    }
}

impl CollisionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow every category of `a` to collide with every category of `b`,
    /// in both directions.
    pub fn register(&mut self, a: BitTag, b: BitTag) -> Result<()> {
        if a.is_none() || b.is_none() {
            return Err(PhysicsError::NoneTag);
        }
        for ta in a.iter() {
            for tb in b.iter() {
                self.rows[ta.bits().trailing_zeros() as usize] |= tb;
                self.rows[tb.bits().trailing_zeros() as usize] |= ta;
            }
        }
        Ok(())
    }

    /// Remove the pairing in both directions.
    pub fn remove(&mut self, a: BitTag, b: BitTag) -> Result<()> {
        if a.is_none() || b.is_none() {
            return Err(PhysicsError::NoneTag);
        }
        for ta in a.iter() {
            for tb in b.iter() {
                self.rows[ta.bits().trailing_zeros() as usize] &= !tb;
                self.rows[tb.bits().trailing_zeros() as usize] &= !ta;
            }
        }
        Ok(())
    }

    /// Whether any category of `a` may collide with any category of `b`.
    pub fn is_collidable(&self, a: BitTag, b: BitTag) -> bool {
        self.collidable_with(a).intersects(b)
    }

    /// Union of the rows of every category in `tags`.
    pub fn collidable_with(&self, tags: BitTag) -> BitTag {
        tags.iter().fold(BitTag::NONE, |acc, t| {
            acc | self.rows[t.bits().trailing_zeros() as usize]
        })
    }

    pub fn clear(&mut self) {
        self.rows = [BitTag::NONE; 64];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy)]
    enum Layer {
        Player = 1,
        Wall = 2,
        Pickup = 4,
    }

    impl TagDomain for Layer {
        const NAME: &'static str = "Layer";
        const VARIANTS: &'static [Self] = &[Layer::Player, Layer::Wall, Layer::Pickup];
        fn bits(self) -> u64 {
            self as u64
        }
        fn name(self) -> &'static str {
            match self {
                Layer::Player => "Player",
                Layer::Wall => "Wall",
                Layer::Pickup => "Pickup",
            }
        }
    }

    #[derive(Clone, Copy)]
    struct Broken;

    impl TagDomain for Broken {
        const NAME: &'static str = "Broken";
        const VARIANTS: &'static [Self] = &[Broken];
        fn bits(self) -> u64 {
            0b110
        }
        fn name(self) -> &'static str {
            "Broken"
        }
    }

    #[test]
    fn test_bit_iteration() {
        let tags = BitTag::bit(0) | BitTag::bit(5) | BitTag::bit(63);
        let bits: Vec<u64> = tags.iter().map(BitTag::bits).collect();
        assert_eq!(bits, vec![1, 1 << 5, 1 << 63]);
        assert_eq!(BitTag::bit(5).index(), Some(5));
        assert_eq!(tags.index(), None);
    }

    #[test]
    fn test_register_domain() {
        let mut registry = TagRegistry::new();
        registry.register_domain::<Layer>().unwrap();
        assert!(registry.is_registered(Layer::Player.tag() | Layer::Wall.tag()));
        assert_eq!(registry.describe(Layer::Player.tag() | Layer::Pickup.tag()), "Player|Pickup");
        assert_eq!(
            registry.register_domain::<Layer>().unwrap_err(),
            PhysicsError::DuplicateDomain("Layer")
        );
        assert!(matches!(
            registry.register(BitTag::bit(1), "Other"),
            Err(PhysicsError::DuplicateTag { existing: "Wall", .. })
        ));
        assert!(matches!(
            registry.register_domain::<Broken>(),
            Err(PhysicsError::InvalidTagBits { bits: 0b110, .. })
        ));
    }

    #[test]
    fn test_unregistered_and_none_rejected() {
        let mut registry = TagRegistry::new();
        registry.register(BitTag::bit(0), "A").unwrap();
        assert_eq!(registry.ensure_registered(BitTag::NONE), Err(PhysicsError::NoneTag));
        assert_eq!(
            registry.ensure_registered(BitTag::bit(0) | BitTag::bit(3)),
            Err(PhysicsError::UnregisteredTag(BitTag::bit(3)))
        );
        assert!(registry.ensure_registered(BitTag::bit(0)).is_ok());
    }

    #[test]
    fn test_collision_table_symmetry() {
        let mut table = CollisionTable::new();
        let tags: Vec<BitTag> = (0..6).map(BitTag::bit).collect();
        table.register(tags[0], tags[1]).unwrap();
        table.register(tags[2], tags[2]).unwrap();
        table.register(tags[3] | tags[4], tags[5]).unwrap();

        for &a in &tags {
            for &b in &tags {
                assert_eq!(table.is_collidable(a, b), table.is_collidable(b, a));
            }
        }
        assert!(table.is_collidable(tags[1], tags[0]));
        assert!(table.is_collidable(tags[5], tags[4]));
        assert!(!table.is_collidable(tags[0], tags[2]));

        table.remove(tags[1], tags[0]).unwrap();
        assert!(!table.is_collidable(tags[0], tags[1]));
        assert!(!table.is_collidable(tags[1], tags[0]));
        assert_eq!(table.collidable_with(tags[3] | tags[4]), tags[5]);
    }

    #[test]
    fn test_none_tag_registration_fails() {
        let mut table = CollisionTable::new();
        assert_eq!(table.register(BitTag::NONE, BitTag::bit(0)), Err(PhysicsError::NoneTag));
        assert_eq!(table.remove(BitTag::bit(0), BitTag::NONE), Err(PhysicsError::NoneTag));
        assert_eq!(table.collidable_with(BitTag::bit(0)), BitTag::NONE);
    }
}
