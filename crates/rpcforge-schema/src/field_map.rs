use crate::node::RpcType;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, MapAccess, Visitor},
    ser::SerializeMap,
};
use std::{collections::BTreeSet, fmt, marker::PhantomData};

///
/// Fields
///

pub type Fields = FieldMap<RpcType>;

///
/// FieldMap
///
/// String-keyed map that keeps declaration order and unique keys.
/// Re-inserting a key replaces the value in its original position.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> FieldMap<V> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    // insert
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    // get
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Key set used for order-insensitive comparisons.
    #[must_use]
    pub fn key_set(&self) -> BTreeSet<&str> {
        self.keys().collect()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for FieldMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for FieldMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }

        map
    }
}

impl<V> IntoIterator for FieldMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<V: Serialize> Serialize for FieldMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }

        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for FieldMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FieldMapVisitor(PhantomData))
    }
}

struct FieldMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for FieldMapVisitor<V> {
    type Value = FieldMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map with unique keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = FieldMap::new();
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            if map.contains_key(&key) {
                return Err(de::Error::custom(format!("duplicate field '{key}'")));
            }
            map.entries.push((key, value));
        }

        Ok(map)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn insert_keeps_first_position() {
        let mut map = FieldMap::new();
        map.insert("b", 1);
        map.insert("a", 2);
        let prev = map.insert("b", 3);

        assert_eq!(prev, Some(1));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(map.get("b"), Some(&3));
    }

    #[test]
    fn deserialize_preserves_document_order() {
        let map: FieldMap<u32> =
            serde_json::from_str(r#"{"zeta": 1, "alpha": 2, "mid": 3}"#).expect("valid map");

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn deserialize_rejects_duplicate_keys() {
        let err = serde_json::from_str::<FieldMap<u32>>(r#"{"a": 1, "a": 2}"#)
            .expect_err("duplicate keys must be rejected");

        assert!(
            err.to_string().contains("duplicate field 'a'"),
            "unexpected error: {err}"
        );
    }

    proptest! {
        #[test]
        fn keys_follow_first_insertion_and_stay_unique(
            ops in prop::collection::vec(("[a-e]", 0u32..100), 0..40),
        ) {
            let mut map = FieldMap::new();
            let mut first_seen: Vec<String> = Vec::new();
            for (key, value) in &ops {
                map.insert(key.clone(), *value);
                if !first_seen.contains(key) {
                    first_seen.push(key.clone());
                }
            }

            let expected: Vec<&str> = first_seen.iter().map(String::as_str).collect();
            prop_assert_eq!(map.keys().collect::<Vec<_>>(), expected);
            prop_assert_eq!(map.len(), first_seen.len());
            for key in &first_seen {
                let last = ops.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v);
                prop_assert_eq!(map.get(key), last);
            }
        }
    }
}
