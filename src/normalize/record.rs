use serde_json::Value;

use crate::clock::unix_millis;
use crate::domain::{CarModel, SaveRecord};

use super::brand::normalize_brand;
use super::fields::{array, fresh_id, object, optional_millis, optional_text};
use super::model::normalize_model;

/// `None` when `raw` is not an object or has no `brand` object.
pub fn normalize_save_record(raw: &Value) -> Option<SaveRecord> {
    let raw = raw.as_object()?;
    let brand_raw = object(raw, "brand")?;

    let id = optional_text(raw, "id")
        .or_else(|| optional_text(brand_raw, "id"))
        .unwrap_or_else(fresh_id);
    let brand = normalize_brand(brand_raw, &id);
    let name = optional_text(raw, "name").unwrap_or_else(|| brand.name.clone());
    let timestamp = optional_millis(raw, "timestamp").unwrap_or_else(unix_millis);
    let models: Vec<CarModel> = array(raw, "models")
        .map(|models| {
            models
                .iter()
                .filter_map(|model| normalize_model(model, &id))
                .collect()
        })
        .unwrap_or_default();

    Some(SaveRecord {
        id,
        name,
        timestamp,
        brand,
        models,
    })
}

/// Records that survived normalization plus how many were rejected.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedBatch {
    pub records: Vec<SaveRecord>,
    pub dropped: usize,
}

pub fn normalize_records<'a, I>(raw: I) -> NormalizedBatch
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut batch = NormalizedBatch::default();
    for value in raw {
        match normalize_save_record(value) {
            Some(record) => batch.records.push(record),
            None => batch.dropped += 1,
        }
    }
    batch
}
