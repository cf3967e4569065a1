use serde_json::{Map, Value};

use crate::domain::{Brand, BrandBrief, LoreEntry};

use super::fields::{array, fresh_id, optional_text, text, text_or};

pub(crate) const UNTITLED_BRAND: &str = "Untitled Legacy";

/// `None` for non-objects and for entries whose title, content and year are all empty.
pub fn normalize_lore_entry(raw: &Value) -> Option<LoreEntry> {
    let raw = raw.as_object()?;
    let title = text(raw, "title");
    let content = text(raw, "content");
    let year = text(raw, "year");
    if title.is_empty() && content.is_empty() && year.is_empty() {
        return None;
    }
    Some(LoreEntry {
        id: optional_text(raw, "id").unwrap_or_else(fresh_id),
        title,
        content,
        year,
        image_url: optional_text(raw, "imageUrl"),
    })
}

pub fn normalize_brand_brief(raw: &Value) -> Option<BrandBrief> {
    let raw = raw.as_object()?;
    Some(BrandBrief {
        archetype: text(raw, "archetype"),
        client_profile: text(raw, "clientProfile"),
        performance_ethos: text(raw, "performanceEthos"),
        material_ethos: text(raw, "materialEthos"),
        lighting_ethos: text(raw, "lightingEthos"),
        aero_ethos: text(raw, "aeroEthos"),
    })
}

/// Normalize a brand object. The id is supplied by the caller since it is
/// resolved at the save record level.
pub fn normalize_brand(raw: &Map<String, Value>, id: &str) -> Brand {
    let colors: Vec<String> = array(raw, "colors")
        .map(|colors| {
            colors
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let lore: Option<Vec<LoreEntry>> = array(raw, "lore")
        .map(|entries| entries.iter().filter_map(normalize_lore_entry).collect::<Vec<_>>())
        .filter(|entries| !entries.is_empty());

    Brand {
        id: id.to_string(),
        name: text_or(raw, "name", UNTITLED_BRAND),
        tagline: text(raw, "tagline"),
        history: text(raw, "history"),
        design_philosophy: text(raw, "designPhilosophy"),
        colors,
        logo_style: text(raw, "logoStyle"),
        materials: optional_text(raw, "materials"),
        lighting_signature: optional_text(raw, "lightingSignature"),
        aerodynamics: optional_text(raw, "aerodynamics"),
        established_year: optional_text(raw, "establishedYear"),
        headquarters: optional_text(raw, "headquarters"),
        lore,
        brief: raw.get("brief").and_then(normalize_brand_brief),
    }
}
