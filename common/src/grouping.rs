//! Ordered grouping of values.

use std::{collections::HashMap, hash::Hash, slice, vec};

use serde::{Serialize, Serializer};

/// Values grouped by a key.
///
/// [`Group`]s follow the order in which their keys were first seen, and the
/// values inside a [`Group`] keep the order they arrived in. Nothing is
/// sorted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Groups<K, V> {
    /// [`Group`]s in the first-seen order of their keys.
    groups: Vec<Group<K, V>>,
}

/// Values sharing the same key.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Group<K, V> {
    /// Key shared by the [`Group::values`].
    pub key: K,

    /// Values of this [`Group`].
    pub values: Vec<V>,
}

impl<K, V> Default for Groups<K, V> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<K, V> Groups<K, V> {
    /// Groups the provided `values` by the key returned from `key`.
    pub fn by<I, F>(values: I, mut key: F) -> Self
    where
        I: IntoIterator<Item = V>,
        F: FnMut(&V) -> K,
        K: Clone + Eq + Hash,
    {
        values.into_iter().map(|v| (key(&v), v)).collect()
    }

    /// Returns the number of [`Group`]s.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Indicates whether there are no [`Group`]s at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Returns the total number of values across all the [`Group`]s.
    #[must_use]
    pub fn count(&self) -> usize {
        self.groups.iter().map(|g| g.values.len()).sum()
    }

    /// Iterates over the [`Group`]s.
    pub fn iter(&self) -> slice::Iter<'_, Group<K, V>> {
        self.groups.iter()
    }

    /// Iterates over all the values, group after group.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.groups.iter().flat_map(|g| g.values.iter())
    }

    /// Returns the keys in their first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.groups.iter().map(|g| &g.key)
    }

    /// Returns the values grouped under the provided `key`, if any.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&[V]>
    where
        K: PartialEq,
    {
        self.groups
            .iter()
            .find(|g| &g.key == key)
            .map(|g| g.values.as_slice())
    }

    /// Transforms every value keeping the grouping intact.
    #[must_use]
    pub fn map<U>(self, mut f: impl FnMut(V) -> U) -> Groups<K, U> {
        Groups {
            groups: self
                .groups
                .into_iter()
                .map(|Group { key, values }| Group {
                    key,
                    values: values.into_iter().map(&mut f).collect(),
                })
                .collect(),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Groups<K, V>
where
    K: Clone + Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut positions = HashMap::<K, usize>::new();
        let mut groups: Vec<Group<K, V>> = Vec::new();
        for (key, value) in iter {
            if let Some(group) =
                positions.get(&key).and_then(|&at| groups.get_mut(at))
            {
                group.values.push(value);
            } else {
                _ = positions.insert(key.clone(), groups.len());
                groups.push(Group {
                    key,
                    values: vec![value],
                });
            }
        }
        Self { groups }
    }
}

impl<K, V> IntoIterator for Groups<K, V> {
    type Item = Group<K, V>;
    type IntoIter = vec::IntoIter<Group<K, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a Groups<K, V> {
    type Item = &'a Group<K, V>;
    type IntoIter = slice::Iter<'a, Group<K, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

impl<K, V> Serialize for Groups<K, V>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(&self.groups)
    }
}
