use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Brand, CarModel, ImagePayload};

/// The unit of persistence: one brand and its models, stamped at save time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    /// Equal to the brand's id.
    pub id: String,
    /// Brand name at save time.
    pub name: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub brand: Brand,
    pub models: Vec<CarModel>,
}

impl SaveRecord {
    pub fn new(brand: Brand, models: Vec<CarModel>, timestamp: i64) -> Self {
        Self {
            id: brand.id.clone(),
            name: brand.name.clone(),
            timestamp,
            brand,
            models,
        }
    }

    /// A copy with every image payload removed: lore images become absent and
    /// variant images become empty.
    pub fn without_images(&self) -> SaveRecord {
        let mut stripped = self.clone();
        if let Some(lore) = stripped.brand.lore.as_mut() {
            for entry in lore.iter_mut() {
                entry.image_url = None;
            }
        }
        for model in stripped.models.iter_mut() {
            for variant in model.variants.iter_mut() {
                variant.image_url.clear();
            }
        }
        stripped
    }

    /// Decoded bytes of all inline (`data:`) images held by this record.
    pub fn inline_image_bytes(&self) -> usize {
        let lore = self
            .brand
            .lore
            .iter()
            .flatten()
            .filter_map(|entry| entry.image_url.as_deref());
        let variants = self
            .models
            .iter()
            .flat_map(|model| model.variants.iter())
            .map(|variant| variant.image_url.as_str());
        lore.chain(variants)
            .map(|url| ImagePayload::classify(url).inline_bytes())
            .sum()
    }
}

/// Keep one record per id, the one with the greatest timestamp. On a tie the
/// record seen first survives. Output order follows first appearance of each id.
pub fn dedupe(records: Vec<SaveRecord>) -> Vec<SaveRecord> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<SaveRecord> = Vec::with_capacity(records.len());
    for record in records {
        match index.get(&record.id) {
            Some(&slot) => {
                if record.timestamp > kept[slot].timestamp {
                    kept[slot] = record;
                }
            }
            None => {
                index.insert(record.id.clone(), kept.len());
                kept.push(record);
            }
        }
    }
    kept
}

/// Most recent first.
pub fn sort_newest_first(records: &mut [SaveRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// Union of `current` and `incoming`, deduplicated and sorted newest first.
pub fn merge(current: &[SaveRecord], incoming: Vec<SaveRecord>) -> Vec<SaveRecord> {
    let mut all = current.to_vec();
    all.extend(incoming);
    let mut merged = dedupe(all);
    sort_newest_first(&mut merged);
    merged
}

/// `current` with any record sharing `record.id` replaced by `record`, sorted
/// newest first. Unlike [`merge`], the replacement wins regardless of timestamp.
pub fn replace(current: &[SaveRecord], record: SaveRecord) -> Vec<SaveRecord> {
    let mut next: Vec<SaveRecord> = current
        .iter()
        .filter(|existing| existing.id != record.id)
        .cloned()
        .collect();
    next.push(record);
    sort_newest_first(&mut next);
    next
}
