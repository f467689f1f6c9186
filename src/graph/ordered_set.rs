//! Insertion-ordered set with O(1) reverse lookup from value to position.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    collections::{hash_map::Entry, HashMap},
    fmt,
    hash::{Hash, Hasher},
    ops::Index,
};

use crate::{error::SpanGraphError, properties::NodeId};

/// An ordered, duplicate-free sequence that assigns each distinct value the [NodeId] of its
/// insertion position and can map a value back to that id.
///
/// The sequence and the reverse map are kept in lockstep; the map holds its own copy of each
/// value. Values must not be mutated in a way that changes their hash while they are in the set.
#[derive(Debug, Clone)]
pub struct ReverseLookupOrderedSet<T> {
    values: Vec<T>,
    ids: HashMap<T, NodeId>,
}

impl<T> Default for ReverseLookupOrderedSet<T> {
    fn default() -> Self {
        ReverseLookupOrderedSet {
            values: Vec::new(),
            ids: HashMap::new(),
        }
    }
}

impl<T: Eq + Hash + Clone> ReverseLookupOrderedSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ReverseLookupOrderedSet {
            values: Vec::with_capacity(capacity),
            ids: HashMap::with_capacity(capacity),
        }
    }

    /// Build a set from an existing ordered sequence. The sequence must already be a set: any
    /// value equal to an earlier one fails with [SpanGraphError::DuplicateValue].
    pub fn try_from_vec(values: Vec<T>) -> Result<Self, SpanGraphError> {
        let mut ids = HashMap::with_capacity(values.len());
        for (position, value) in values.iter().enumerate() {
            match ids.entry(value.clone()) {
                Entry::Occupied(existing) => {
                    let first: &NodeId = existing.get();
                    return Err(SpanGraphError::DuplicateValue {
                        first: first.index(),
                        duplicate: position,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(NodeId::new(position));
                }
            }
        }
        Ok(ReverseLookupOrderedSet { values, ids })
    }

    /// Append `value` unless an equal value is already present. Returns the id of the stored
    /// value either way.
    pub fn add(&mut self, value: T) -> NodeId {
        let next = NodeId::new(self.values.len());
        match self.ids.entry(value) {
            Entry::Occupied(existing) => *existing.get(),
            Entry::Vacant(slot) => {
                self.values.push(slot.key().clone());
                slot.insert(next);
                next
            }
        }
    }

    pub fn get(&self, id: NodeId) -> Result<&T, SpanGraphError> {
        self.values
            .get(id.index())
            .ok_or(SpanGraphError::IndexOutOfRange {
                id: id.index(),
                len: self.values.len(),
            })
    }

    pub fn id_of(&self, value: &T) -> Option<NodeId> {
        self.ids.get(value).copied()
    }

    pub fn contains(&self, value: &T) -> bool {
        self.ids.contains_key(value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    /// Values paired with their ids, in id order.
    pub fn entries(&self) -> impl Iterator<Item = (NodeId, &T)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(index, value)| (NodeId::new(index), value))
    }

    pub fn into_vec(self) -> Vec<T> {
        self.values
    }
}

impl<T: Eq + Hash + Clone> Index<NodeId> for ReverseLookupOrderedSet<T> {
    type Output = T;

    fn index(&self, id: NodeId) -> &T {
        &self.values[id.index()]
    }
}

impl<T: Eq + Hash + Clone> TryFrom<Vec<T>> for ReverseLookupOrderedSet<T> {
    type Error = SpanGraphError;

    fn try_from(values: Vec<T>) -> Result<Self, Self::Error> {
        Self::try_from_vec(values)
    }
}

/// Collecting deduplicates, keeping the first occurrence of each value.
impl<T: Eq + Hash + Clone> FromIterator<T> for ReverseLookupOrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = ReverseLookupOrderedSet::new();
        for value in iter {
            set.add(value);
        }
        set
    }
}

impl<'a, T> IntoIterator for &'a ReverseLookupOrderedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

// Equality and hashing follow the ordered sequence only; the reverse map is derived from it.
impl<T: PartialEq> PartialEq for ReverseLookupOrderedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl<T: Eq> Eq for ReverseLookupOrderedSet<T> {}

impl<T: Hash> Hash for ReverseLookupOrderedSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.values.hash(state);
    }
}

impl<T: fmt::Display> fmt::Display for ReverseLookupOrderedSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (index, value) in self.values.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}

impl<T: Serialize> Serialize for ReverseLookupOrderedSet<T> {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(ser)
    }
}

impl<'de, T> Deserialize<'de> for ReverseLookupOrderedSet<T>
where
    T: Deserialize<'de> + Eq + Hash + Clone,
{
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let values = Vec::<T>::deserialize(de)?;
        Self::try_from_vec(values).map_err(serde::de::Error::custom)
    }
}
