use serde::{Deserialize, Serialize};

/// A brand identity and everything the studio has generated around it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: String,
    pub name: String,
    pub tagline: String,
    pub history: String,
    pub design_philosophy: String,
    pub colors: Vec<String>,
    pub logo_style: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lighting_signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aerodynamics: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub established_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headquarters: Option<String>,
    /// `None` means lore was never generated; never `Some(vec![])`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lore: Option<Vec<LoreEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brief: Option<BrandBrief>,
}

impl Brand {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tagline: String::new(),
            history: String::new(),
            design_philosophy: String::new(),
            colors: Vec::new(),
            logo_style: String::new(),
            materials: None,
            lighting_signature: None,
            aerodynamics: None,
            established_year: None,
            headquarters: None,
            lore: None,
            brief: None,
        }
    }

    /// Lore ordered by the numeric part of each entry's year, oldest first.
    pub fn chronological_lore(&self) -> Vec<&LoreEntry> {
        let mut entries: Vec<&LoreEntry> = self.lore.iter().flatten().collect();
        entries.sort_by_key(|entry| entry.year_value());
        entries
    }
}

/// One dated chapter of a brand's history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoreEntry {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Free text such as "1954" or "Late 1960s".
    pub year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl LoreEntry {
    /// Sort key for `year`: all digits concatenated, 0 when there are none,
    /// saturating at `u64::MAX`.
    pub fn year_value(&self) -> u64 {
        let digits: String = self.year.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return 0;
        }
        digits.parse().unwrap_or(u64::MAX)
    }
}

/// The creative prompt inputs a brand was generated from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandBrief {
    pub archetype: String,
    pub client_profile: String,
    pub performance_ethos: String,
    pub material_ethos: String,
    pub lighting_ethos: String,
    pub aero_ethos: String,
}
