//! Schema mapping for the CBOR engine.
//!
//! An [`Atlas`] lists the top-level types an encoder is allowed to marshal and
//! how each one is shaped on the wire: an optional semantic tag around the
//! value, and the order in which map keys are emitted.
//!
//! Entries are keyed by [`std::any::type_name`], so borrowed types such as
//! `Row<'a>` can be registered and looked up: lifetimes do not appear in the
//! name, and `Row<'static>` and `Row<'a>` share one entry.

use std::any::type_name;
use std::collections::HashMap;

/// Order in which map entries are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeySortMode {
    /// Keep the order the value's `Serialize` impl produced.
    #[default]
    Preserve,
    /// Shorter encoded keys first, ties broken bytewise (RFC 7049 canonical).
    LengthFirst,
    /// Bytewise order of the encoded keys (RFC 8949 deterministic).
    Bytewise,
}

/// Wire shape for one registered type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasEntry {
    type_name: &'static str,
    tag: Option<u64>,
}

impl AtlasEntry {
    /// Create an entry for `T`.
    #[must_use]
    pub fn of<T: ?Sized>() -> Self {
        Self {
            type_name: type_name::<T>(),
            tag: None,
        }
    }

    /// Wrap every encoded `T` in CBOR semantic tag `tag`.
    #[must_use]
    pub fn with_tag(mut self, tag: u64) -> Self {
        self.tag = Some(tag);
        self
    }

    /// The registered type's name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The semantic tag, if any.
    #[must_use]
    pub fn tag(&self) -> Option<u64> {
        self.tag
    }
}

/// Immutable type-to-wire mapping.
///
/// A closed atlas (from [`Atlas::build`]) rejects top-level types it has no
/// entry for; an open atlas (from [`Atlas::open`]) encodes any `Serialize`
/// value with default rules. Only the top-level type is looked up; nested
/// values follow their own `Serialize` impls.
///
/// ## Example
///
/// ```rust
/// use cborpool_core::{Atlas, AtlasEntry, KeySortMode};
///
/// struct Record;
///
/// let atlas = Atlas::build([AtlasEntry::of::<Record>().with_tag(40_000)])
///     .with_key_sort(KeySortMode::LengthFirst);
///
/// assert_eq!(atlas.entry::<Record>().and_then(|e| e.tag()), Some(40_000));
/// assert!(!atlas.contains::<String>());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Atlas {
    entries: HashMap<&'static str, AtlasEntry>,
    key_sort: KeySortMode,
    open: bool,
}

impl Atlas {
    /// Build a closed atlas from `entries`.
    ///
    /// A later entry for the same type replaces an earlier one.
    #[must_use]
    pub fn build(entries: impl IntoIterator<Item = AtlasEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.type_name, e)).collect(),
            key_sort: KeySortMode::default(),
            open: false,
        }
    }

    /// Build an open atlas with no entries.
    #[must_use]
    pub fn open() -> Self {
        Self {
            open: true,
            ..Self::default()
        }
    }

    /// Set the map key order.
    #[must_use]
    pub fn with_key_sort(mut self, mode: KeySortMode) -> Self {
        self.key_sort = mode;
        self
    }

    /// Add or replace an entry.
    #[must_use]
    pub fn with_entry(mut self, entry: AtlasEntry) -> Self {
        self.entries.insert(entry.type_name, entry);
        self
    }

    /// Look up the entry for `T`.
    #[inline]
    #[must_use]
    pub fn entry<T: ?Sized>(&self) -> Option<&AtlasEntry> {
        self.entries.get(type_name::<T>())
    }

    /// Check if `T` has an entry.
    #[must_use]
    pub fn contains<T: ?Sized>(&self) -> bool {
        self.entries.contains_key(type_name::<T>())
    }

    /// The map key order.
    #[inline]
    #[must_use]
    pub fn key_sort(&self) -> KeySortMode {
        self.key_sort
    }

    /// Check if unregistered types are accepted.
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
