//! Deterministic hash-based type identity.
//!
//! [`TypeHash`] is a 64-bit identity computed from a type's spelling and
//! structure. Equal canonical types always hash equal, which lets the
//! template instance cache key specializations without walking the arena.
//!
//! # Hash Computation
//!
//! Uses XXHash64 with domain-specific mixing constants so that a record
//! named `int`, a pointer, and an integer template argument of the same
//! bits can never collide by construction.
//!
//! # Examples
//!
//! ```
//! use interop_core::TypeHash;
//!
//! let foo = TypeHash::from_name("Foo");
//! let int = TypeHash::from_name("int");
//! let four = TypeHash::from_value(int, 4);
//!
//! let a = TypeHash::from_template_instance(foo, &[int, four]);
//! let b = TypeHash::from_template_instance(foo, &[four, int]);
//! assert_ne!(a, b); // argument order matters
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
pub mod hash_constants {
    /// Separator constant used when folding argument lists.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for named types (builtins, records, templates).
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for integral template arguments.
    pub const VALUE: u64 = 0x5ea77ffbcdf5f302;

    /// Domain marker for pointer types.
    pub const POINTER: u64 = 0x7d3c8b4a92e15f6d;

    /// Domain marker for reference types.
    pub const REFERENCE: u64 = 0x3e9f5d2a8c7b1403;

    /// Domain marker for array types.
    pub const ARRAY: u64 = 0x9a7f3d5e2b8c4601;

    /// Domain marker for const-qualified types.
    pub const CONST: u64 = 0x1a095090689d4647;

    /// Golden-ratio increment used to derive per-position markers.
    pub const POSITION: u64 = 0x9e3779b97f4a7c15;
}

/// A deterministic 64-bit identity for a canonical type or template argument.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from a qualified type name.
    ///
    /// ```
    /// use interop_core::TypeHash;
    ///
    /// assert_eq!(TypeHash::from_name("ns::Foo"), TypeHash::from_name("ns::Foo"));
    /// assert_ne!(TypeHash::from_name("Foo"), TypeHash::from_name("foo"));
    /// ```
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Create the hash of an integral template argument.
    ///
    /// `ty` is the hash of the argument's integral type, so `4` as `int`
    /// and `4` as `unsigned int` are distinct arguments.
    #[inline]
    pub fn from_value(ty: TypeHash, value: i128) -> Self {
        let bits = xxh64(&value.to_le_bytes(), 0);
        TypeHash(
            (hash_constants::VALUE ^ bits)
                .wrapping_mul(hash_constants::SEP)
                .wrapping_add(ty.0),
        )
    }

    /// Hash of a pointer to `pointee`.
    #[inline]
    pub fn from_pointer(pointee: TypeHash) -> Self {
        Self::wrap(hash_constants::POINTER, pointee)
    }

    /// Hash of a reference to `referent`.
    #[inline]
    pub fn from_reference(referent: TypeHash) -> Self {
        Self::wrap(hash_constants::REFERENCE, referent)
    }

    /// Hash of a const-qualified `inner`.
    #[inline]
    pub fn from_const(inner: TypeHash) -> Self {
        Self::wrap(hash_constants::CONST, inner)
    }

    /// Hash of an array of `len` elements of `element`.
    #[inline]
    pub fn from_array(element: TypeHash, len: u64) -> Self {
        let hash = Self::wrap(hash_constants::ARRAY, element);
        TypeHash(hash.0.wrapping_mul(hash_constants::SEP).wrapping_add(len))
    }

    /// Create a template instance hash from the template hash and argument hashes.
    ///
    /// Argument order matters - `pair<int, char>` differs from `pair<char, int>`.
    #[inline]
    pub fn from_template_instance(template: TypeHash, args: &[TypeHash]) -> Self {
        let mut hash = template.0;
        for (i, arg) in args.iter().enumerate() {
            let marker = position_marker(i);
            // wrapping_mul keeps the fold order-sensitive (unlike XOR)
            hash = hash
                .wrapping_mul(hash_constants::SEP)
                .wrapping_add(marker ^ arg.0);
        }
        TypeHash(hash)
    }

    #[inline]
    fn wrap(domain: u64, inner: TypeHash) -> Self {
        TypeHash((domain ^ inner.0).wrapping_mul(hash_constants::SEP) ^ domain)
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// SplitMix64 finalizer over the argument position.
fn position_marker(index: usize) -> u64 {
    let mut z = hash_constants::POSITION.wrapping_mul(index as u64 + 1);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
