//! CSS helpers - Dimensions and inline style strings

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A CSS length given either as pixels or as a raw CSS string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Pixels(f64),
    Css(String),
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Pixels(n) => write!(f, "{}px", n),
            Dimension::Css(s) => f.write_str(s),
        }
    }
}

macro_rules! dimension_from_number {
    ($($t:ty),*) => {
        $(impl From<$t> for Dimension {
            fn from(v: $t) -> Self {
                Dimension::Pixels(v as f64)
            }
        })*
    };
}

dimension_from_number!(u16, u32, u64, i32, i64, f32, f64);

impl From<&str> for Dimension {
    fn from(s: &str) -> Self {
        Dimension::Css(s.to_string())
    }
}

impl From<String> for Dimension {
    fn from(s: String) -> Self {
        Dimension::Css(s)
    }
}

pub fn normalize_dimension(value: Option<&Dimension>) -> Option<String> {
    value.map(Dimension::to_string)
}

/// Ordered CSS declarations. Setting an existing key replaces its value in
/// place; `None` values are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleMap {
    declarations: Vec<(String, String)>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: Option<String>) {
        let Some(value) = value else { return };
        match self.declarations.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.declarations.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `key:value` pairs joined by `;`, or `None` when empty.
    pub fn to_css(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(
            self.declarations
                .iter()
                .map(|(k, v)| format!("{}:{}", k, v))
                .collect::<Vec<_>>()
                .join(";"),
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StyleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut style = StyleMap::new();
        for (key, value) in iter {
            style.set(&key.into(), Some(value.into()));
        }
        style
    }
}

impl Serialize for StyleMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.declarations.len()))?;
        for (key, value) in &self.declarations {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct StyleMapVisitor;

impl<'de> Visitor<'de> for StyleMapVisitor {
    type Value = StyleMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of CSS properties to values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<StyleMap, A::Error> {
        let mut style = StyleMap::new();
        while let Some((key, value)) = access.next_entry::<String, String>()? {
            style.set(&key, Some(value));
        }
        Ok(style)
    }
}

/// Deserializes from a map, keeping the document order of its keys.
impl<'de> Deserialize<'de> for StyleMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StyleMapVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_display() {
        assert_eq!(Dimension::from(100).to_string(), "100px");
        assert_eq!(Dimension::from(12.5).to_string(), "12.5px");
        assert_eq!(Dimension::from("50%").to_string(), "50%");
    }

    #[test]
    fn test_dimension_deserialize() {
        let n: Dimension = serde_json::from_str("100").unwrap();
        let s: Dimension = serde_json::from_str("\"2rem\"").unwrap();
        assert_eq!(n, Dimension::Pixels(100.0));
        assert_eq!(s, Dimension::Css("2rem".to_string()));
    }

    #[test]
    fn test_override_keeps_position() {
        let mut style = StyleMap::new();
        style.set("width", Some("10px".into()));
        style.set("height", None);
        style.set("border-radius", Some("4px".into()));
        style.set("width", Some("20px".into()));
        assert_eq!(style.to_css().unwrap(), "width:20px;border-radius:4px");
    }

    #[test]
    fn test_deserialize_keeps_document_order() {
        let style: StyleMap =
            serde_json::from_str(r#"{"z-index": "2", "color": "red", "margin": "0"}"#).unwrap();
        assert_eq!(style.to_css().unwrap(), "z-index:2;color:red;margin:0");
        assert_eq!(
            serde_json::to_string(&style).unwrap(),
            r#"{"z-index":"2","color":"red","margin":"0"}"#
        );
    }

    #[test]
    fn test_empty_style() {
        assert_eq!(StyleMap::new().to_css(), None);
    }
}
