use serde::{Deserialize, Serialize};

/// Market segment of a car model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CarTier {
    #[serde(rename = "Entry Luxury")]
    EntryLuxury,
    #[serde(rename = "Mid-Size Luxury")]
    MidSizeLuxury,
    #[default]
    #[serde(rename = "Flagship")]
    Flagship,
    #[serde(rename = "SUV / Estate")]
    SuvEstate,
    #[serde(rename = "Hypercar")]
    Hypercar,
}

impl CarTier {
    pub const ALL: [CarTier; 5] = [
        CarTier::EntryLuxury,
        CarTier::MidSizeLuxury,
        CarTier::SuvEstate,
        CarTier::Flagship,
        CarTier::Hypercar,
    ];

    /// Tier used when a stored value is missing or unknown.
    pub const FALLBACK: CarTier = CarTier::Flagship;

    pub fn label(self) -> &'static str {
        match self {
            CarTier::EntryLuxury => "Entry Luxury",
            CarTier::MidSizeLuxury => "Mid-Size Luxury",
            CarTier::Flagship => "Flagship",
            CarTier::SuvEstate => "SUV / Estate",
            CarTier::Hypercar => "Hypercar",
        }
    }

    pub fn from_label(label: &str) -> Option<CarTier> {
        Self::ALL.into_iter().find(|tier| tier.label() == label)
    }
}

/// Keys of the engineering spec block, in display order.
pub const SPEC_KEYS: [&str; 17] = [
    "engine",
    "horsepower",
    "torque",
    "acceleration",
    "topSpeed",
    "weight",
    "drivetrain",
    "dimensions",
    "transmission",
    "dragCoefficient",
    "suspension",
    "brakes",
    "wheelDesign",
    "interiorMaterials",
    "soundSystem",
    "chassisConstruction",
    "driverAssistance",
];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarSpecs {
    pub engine: String,
    pub horsepower: String,
    pub torque: String,
    pub acceleration: String,
    pub top_speed: String,
    pub weight: String,
    pub drivetrain: String,
    pub dimensions: String,
    pub transmission: String,
    pub drag_coefficient: String,
    pub suspension: String,
    pub brakes: String,
    pub wheel_design: String,
    pub interior_materials: String,
    pub sound_system: String,
    pub chassis_construction: String,
    pub driver_assistance: String,
}

impl CarSpecs {
    /// Mutable access to a field by its stored key.
    pub fn field_mut(&mut self, key: &str) -> Option<&mut String> {
        let field = match key {
            "engine" => &mut self.engine,
            "horsepower" => &mut self.horsepower,
            "torque" => &mut self.torque,
            "acceleration" => &mut self.acceleration,
            "topSpeed" => &mut self.top_speed,
            "weight" => &mut self.weight,
            "drivetrain" => &mut self.drivetrain,
            "dimensions" => &mut self.dimensions,
            "transmission" => &mut self.transmission,
            "dragCoefficient" => &mut self.drag_coefficient,
            "suspension" => &mut self.suspension,
            "brakes" => &mut self.brakes,
            "wheelDesign" => &mut self.wheel_design,
            "interiorMaterials" => &mut self.interior_materials,
            "soundSystem" => &mut self.sound_system,
            "chassisConstruction" => &mut self.chassis_construction,
            "driverAssistance" => &mut self.driver_assistance,
            _ => return None,
        };
        Some(field)
    }
}

/// One generated rendering of a car model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarVariant {
    pub id: String,
    pub prompt: String,
    /// Inline `data:` URI or remote URL; empty once visuals are stripped.
    pub image_url: String,
    pub created_at: i64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReviewPersona {
    #[default]
    Purist,
    Futurist,
    Lifestyle,
}

impl ReviewPersona {
    pub fn from_label(label: &str) -> Option<ReviewPersona> {
        match label {
            "PURIST" => Some(ReviewPersona::Purist),
            "FUTURIST" => Some(ReviewPersona::Futurist),
            "LIFESTYLE" => Some(ReviewPersona::Lifestyle),
            _ => None,
        }
    }
}

/// A launch review from a fictional publication.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub publication: String,
    pub author: String,
    pub score: String,
    pub headline: String,
    pub summary: String,
    pub persona: ReviewPersona,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketInsight {
    /// 0 to 100.
    pub collector_score: u8,
    pub resale_value: String,
    pub target_demographic: String,
    pub market_sentiment: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelProgram {
    pub segment: String,
    pub body_style: String,
    pub target_buyer: String,
    pub price_band: String,
    pub performance_goal: String,
    pub powertrain_strategy: String,
    pub design_signature: String,
}

/// A car model designed for a brand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarModel {
    pub id: String,
    /// Back-reference to the owning brand's id.
    pub brand_id: String,
    pub name: String,
    pub tagline: String,
    pub tier: CarTier,
    pub price: String,
    pub specs: CarSpecs,
    pub visual_description: String,
    pub marketing_blurb: String,
    /// Newest first by convention.
    pub variants: Vec<CarVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<ModelProgram>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_variant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<Review>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_insight: Option<MarketInsight>,
}

impl CarModel {
    pub fn new(id: impl Into<String>, brand_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            brand_id: brand_id.into(),
            name: name.into(),
            tagline: String::new(),
            tier: CarTier::FALLBACK,
            price: String::new(),
            specs: CarSpecs::default(),
            visual_description: String::new(),
            marketing_blurb: String::new(),
            variants: Vec::new(),
            program: None,
            hero_variant_id: None,
            reviews: None,
            market_insight: None,
        }
    }

    pub fn hero_variant(&self) -> Option<&CarVariant> {
        let hero = self.hero_variant_id.as_deref()?;
        self.variants.iter().find(|variant| variant.id == hero)
    }
}
