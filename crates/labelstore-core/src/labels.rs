//! Order-independent label sets used as store keys.
//!
//! A `LabelSet` is canonicalized at construction: pairs are sorted by key and
//! duplicate keys collapse (last value wins). Equality, ordering, and hashing
//! are derived from that canonical form, so two sets built from the same pairs
//! in any order are interchangeable as map keys.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Scalar label value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl fmt::Display for LabelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelValue::Bool(b) => write!(f, "{b}"),
            LabelValue::Int(i) => write!(f, "{i}"),
            LabelValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for LabelValue {
    fn from(v: &str) -> Self {
        LabelValue::Str(v.to_owned())
    }
}

impl From<String> for LabelValue {
    fn from(v: String) -> Self {
        LabelValue::Str(v)
    }
}

impl From<i64> for LabelValue {
    fn from(v: i64) -> Self {
        LabelValue::Int(v)
    }
}

impl From<i32> for LabelValue {
    fn from(v: i32) -> Self {
        LabelValue::Int(v.into())
    }
}

impl From<u32> for LabelValue {
    fn from(v: u32) -> Self {
        LabelValue::Int(v.into())
    }
}

impl From<bool> for LabelValue {
    fn from(v: bool) -> Self {
        LabelValue::Bool(v)
    }
}

/// `LabelSet` is an immutable set of key/value pairs sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(from = "BTreeMap<String, LabelValue>")]
pub struct LabelSet(Vec<(String, LabelValue)>);

impl LabelSet {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<LabelValue>,
    {
        pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<BTreeMap<String, LabelValue>>()
            .into()
    }

    /// Returns the value of the label with given key.
    pub fn get(&self, key: &str) -> Option<&LabelValue> {
        self.0
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .ok()
            .map(|index| &self.0[index].1)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LabelValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<BTreeMap<String, LabelValue>> for LabelSet {
    fn from(map: BTreeMap<String, LabelValue>) -> Self {
        Self(map.into_iter().collect())
    }
}

impl<K, V> FromIterator<(K, V)> for LabelSet
where
    K: Into<String>,
    V: Into<LabelValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{k}=\"{v}\"")?;
        }
        f.write_str("}")
    }
}

impl Serialize for LabelSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
