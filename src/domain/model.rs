use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Extra key/value pairs folded into every top-level record of a response.
///
/// Keys keep their insertion order; setting an existing key replaces its
/// value in place. Entries are written after the base fields, and a key that
/// collides with a base field replaces it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata(Vec<(String, serde_json::Value)>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((key, value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter().map(|(k, v)| (k, v))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubRecord {
    pub name: String,
    pub quantity: i64,
}

/// Production / commercialization / processing row with its nested sub-items.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    pub item: String,
    pub quantity: i64,
    pub year: i32,
    pub sub_items: Vec<SubRecord>,
    pub metadata: Metadata,
}

/// Import / export row: one country, quantity and amount.
#[derive(Debug, Clone, PartialEq)]
pub struct BilateralRecord {
    pub country: String,
    pub quantity: i64,
    pub amount: i64,
    pub year: i32,
    pub metadata: Metadata,
}

// 基本欄位若被 metadata 覆蓋則略過
fn base_entry<M, V>(map: &mut M, metadata: &Metadata, key: &str, value: &V) -> Result<(), M::Error>
where
    M: SerializeMap,
    V: Serialize + ?Sized,
{
    if metadata.contains_key(key) {
        return Ok(());
    }
    map.serialize_entry(key, value)
}

fn overlay_entries<M: SerializeMap>(map: &mut M, metadata: &Metadata) -> Result<(), M::Error> {
    for (key, value) in metadata.iter() {
        map.serialize_entry(key, value)?;
    }
    Ok(())
}

impl Serialize for ItemRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        base_entry(&mut map, &self.metadata, "item", &self.item)?;
        base_entry(&mut map, &self.metadata, "quantity", &self.quantity)?;
        base_entry(&mut map, &self.metadata, "year", &self.year)?;
        base_entry(&mut map, &self.metadata, "sub_items", &self.sub_items)?;
        overlay_entries(&mut map, &self.metadata)?;
        map.end()
    }
}

impl Serialize for BilateralRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        base_entry(&mut map, &self.metadata, "country", &self.country)?;
        base_entry(&mut map, &self.metadata, "quantity", &self.quantity)?;
        base_entry(&mut map, &self.metadata, "amount", &self.amount)?;
        base_entry(&mut map, &self.metadata, "year", &self.year)?;
        overlay_entries(&mut map, &self.metadata)?;
        map.end()
    }
}

/// Normalized output of one request, serialized as a plain JSON array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Records {
    Item(Vec<ItemRecord>),
    Bilateral(Vec<BilateralRecord>),
}

impl Records {
    pub fn len(&self) -> usize {
        match self {
            Records::Item(records) => records.len(),
            Records::Bilateral(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Raw payload produced by the extract step.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSource {
    Html(String),
    Csv { path: String, data: Vec<u8> },
}
