//! Part catalog model: parts, their attribute bags, and builds.
//!
//! Attributes are stored untyped (string values with an optional display
//! unit). Numeric interpretation happens at lookup time through
//! [`AttributeBag::get_numeric`]; a value that does not parse is treated the
//! same as a missing one.

use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Identifiers may be written as JSON strings or integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// Opaque part identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PartId(String);

impl PartId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for PartId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawId::deserialize(deserializer).map(|raw| Self(raw.into_string()))
    }
}

impl From<PartId> for String {
    fn from(id: PartId) -> Self {
        id.0
    }
}

impl From<&str> for PartId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PartId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque build identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BuildId(String);

impl BuildId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for BuildId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawId::deserialize(deserializer).map(|raw| Self(raw.into_string()))
    }
}

impl From<BuildId> for String {
    fn from(id: BuildId) -> Self {
        id.0
    }
}

impl From<&str> for BuildId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Part category slug.
///
/// The well-known slugs get their own variants; anything else is carried
/// verbatim in [`Category::Other`] so new categories need no code change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Cpu,
    Gpu,
    Motherboard,
    Ram,
    Storage,
    Psu,
    Case,
    Cooler,
    Monitor,
    Peripheral,
    Other(String),
}

impl Category {
    pub fn slug(&self) -> &str {
        match self {
            Category::Cpu => "cpu",
            Category::Gpu => "gpu",
            Category::Motherboard => "motherboard",
            Category::Ram => "ram",
            Category::Storage => "storage",
            Category::Psu => "psu",
            Category::Case => "case",
            Category::Cooler => "cooler",
            Category::Monitor => "monitor",
            Category::Peripheral => "peripheral",
            Category::Other(slug) => slug,
        }
    }
}

impl From<&str> for Category {
    fn from(slug: &str) -> Self {
        match slug {
            "cpu" => Category::Cpu,
            "gpu" => Category::Gpu,
            "motherboard" => Category::Motherboard,
            "ram" => Category::Ram,
            "storage" => Category::Storage,
            "psu" => Category::Psu,
            "case" => Category::Case,
            "cooler" => Category::Cooler,
            "monitor" => Category::Monitor,
            "peripheral" => Category::Peripheral,
            other => Category::Other(other.to_string()),
        }
    }
}

impl From<String> for Category {
    fn from(slug: String) -> Self {
        Category::from(slug.as_str())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Other(slug) => slug,
            known => known.slug().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// One key/value attribute entry. The unit is display-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            unit: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// Parse an attribute value as a finite number.
///
/// Surrounding whitespace is ignored. `NaN` and infinities are rejected so
/// they behave like any other unparseable value.
pub fn parse_numeric(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Key-unique attribute mapping for a single part.
///
/// Serialized as a list of [`Attribute`]s. When a list repeats a key, the
/// last entry wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Attribute>", into = "Vec<Attribute>")]
pub struct AttributeBag {
    entries: BTreeMap<String, Attribute>,
}

impl AttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an attribute, returning the one it replaced.
    pub fn insert(&mut self, attribute: Attribute) -> Option<Attribute> {
        self.entries.insert(attribute.key.clone(), attribute)
    }

    pub fn get(&self, key: &str) -> Option<&Attribute> {
        self.entries.get(key)
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|a| a.value.as_str())
    }

    pub fn get_numeric(&self, key: &str) -> Option<f64> {
        self.get_string(key).and_then(parse_numeric)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.entries.values()
    }
}

impl FromIterator<Attribute> for AttributeBag {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        let mut bag = AttributeBag::new();
        for attribute in iter {
            bag.insert(attribute);
        }
        bag
    }
}

impl From<Vec<Attribute>> for AttributeBag {
    fn from(attributes: Vec<Attribute>) -> Self {
        attributes.into_iter().collect()
    }
}

impl From<AttributeBag> for Vec<Attribute> {
    fn from(bag: AttributeBag) -> Self {
        bag.entries.into_values().collect()
    }
}

/// A catalog entry for a PC component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: PartId,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub category: Category,
    #[serde(default)]
    pub attributes: AttributeBag,
}

impl Part {
    pub fn new(
        id: impl Into<PartId>,
        full_name: impl Into<String>,
        category: impl Into<Category>,
    ) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            manufacturer: None,
            model: None,
            category: category.into(),
            attributes: AttributeBag::new(),
        }
    }

    /// Builder: add (or replace) an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(Attribute::new(key, value));
        self
    }

    /// Builder: add (or replace) an attribute with a display unit
    pub fn with_attribute_unit(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        self.attributes.insert(Attribute::new(key, value).with_unit(unit));
        self
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.attributes.get_string(key)
    }

    pub fn get_numeric(&self, key: &str) -> Option<f64> {
        self.attributes.get_numeric(key)
    }

    pub fn is_category(&self, category: &Category) -> bool {
        &self.category == category
    }
}

fn default_quantity() -> u32 {
    1
}

/// A part placed in a build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildItem {
    pub part: Part,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Retailer slug the user prefers to buy this part from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_retailer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BuildItem {
    pub fn new(part: Part) -> Self {
        Self {
            part,
            quantity: 1,
            preferred_retailer: None,
            notes: None,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_retailer(mut self, retailer: impl Into<String>) -> Self {
        self.preferred_retailer = Some(retailer.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// A user-assembled parts list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Build {
    pub id: BuildId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub items: Vec<BuildItem>,
}

impl Build {
    pub fn new(id: impl Into<BuildId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            items: Vec::new(),
        }
    }

    pub fn with_item(mut self, item: BuildItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_part(self, part: Part) -> Self {
        self.with_item(BuildItem::new(part))
    }

    /// Distinct parts in first-appearance order.
    ///
    /// Quantity does not multiply a part: each catalog entry is evaluated
    /// once no matter how many items reference it.
    pub fn parts(&self) -> Vec<&Part> {
        let mut seen = HashSet::new();
        self.items
            .iter()
            .map(|item| &item.part)
            .filter(|part| seen.insert(&part.id))
            .collect()
    }

    pub fn part(&self, id: &PartId) -> Option<&Part> {
        self.items
            .iter()
            .map(|item| &item.part)
            .find(|part| &part.id == id)
    }

    /// Display name for a part id, falling back to the id itself.
    pub fn part_name(&self, id: &PartId) -> String {
        self.part(id)
            .map(|p| p.full_name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

/// Borrow a slice of parts or part references uniformly.
pub(crate) fn iter_parts<P: Borrow<Part>>(parts: &[P]) -> impl Iterator<Item = &Part> {
    parts.iter().map(|p| <P as Borrow<Part>>::borrow(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_lookup() {
        let part = Part::new("cpu-1", "AMD Ryzen 5 7600X", "cpu")
            .with_attribute_unit("tdp", "105", "W")
            .with_attribute("socket", "AM5")
            .with_attribute("padded", "  65 ");

        assert_eq!(part.get_numeric("tdp"), Some(105.0));
        assert_eq!(part.get_numeric("padded"), Some(65.0));
        assert_eq!(part.get_numeric("socket"), None);
        assert_eq!(part.get_numeric("missing"), None);
        assert_eq!(part.get_string("socket"), Some("AM5"));
    }

    #[test]
    fn test_non_finite_values_are_unparseable() {
        assert_eq!(parse_numeric("NaN"), None);
        assert_eq!(parse_numeric("inf"), None);
        assert_eq!(parse_numeric("1e3"), Some(1000.0));
        assert_eq!(parse_numeric("105W"), None);
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let bag: AttributeBag = vec![
            Attribute::new("socket", "AM4"),
            Attribute::new("socket", "AM5"),
        ]
        .into();

        assert_eq!(bag.len(), 1);
        assert_eq!(bag.get_string("socket"), Some("AM5"));
    }

    #[test]
    fn test_category_slugs() {
        assert_eq!(Category::from("psu"), Category::Psu);
        assert_eq!(Category::from("fan"), Category::Other("fan".to_string()));
        assert_eq!(String::from(Category::Other("fan".to_string())), "fan");
        assert_eq!(Category::Motherboard.to_string(), "motherboard");
    }

    #[test]
    fn test_part_deserializes_numeric_id() {
        let json = r#"{
            "id": 42,
            "full_name": "Corsair RM850x",
            "category": "psu",
            "attributes": [{"key": "wattage", "value": "850", "unit": "W"}]
        }"#;
        let part: Part = serde_json::from_str(json).expect("Should parse part");

        assert_eq!(part.id.as_str(), "42");
        assert_eq!(part.category, Category::Psu);
        assert_eq!(part.attributes.get("wattage").and_then(|a| a.unit.as_deref()), Some("W"));
    }

    #[test]
    fn test_build_parts_are_distinct() {
        let gpu = Part::new("gpu-1", "NVIDIA RTX 4070", "gpu");
        let build = Build::new("b1", "Twin")
            .with_item(BuildItem::new(gpu.clone()).with_quantity(2))
            .with_part(gpu)
            .with_part(Part::new("psu-1", "Corsair RM850x", "psu"));

        let ids: Vec<_> = build.parts().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["gpu-1", "psu-1"]);
        assert_eq!(build.part_name(&PartId::from("psu-1")), "Corsair RM850x");
        assert_eq!(build.part_name(&PartId::from("nope")), "nope");
    }
}
