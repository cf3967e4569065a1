use serde_json::Value;

use crate::clock::unix_millis;
use crate::domain::{
    CarModel, CarSpecs, CarTier, CarVariant, MarketInsight, ModelProgram, Review, ReviewPersona,
    SPEC_KEYS,
};

use super::fields::{array, fresh_id, optional_millis, optional_text, text, text_or};

pub(crate) const UNTITLED_MODEL: &str = "Untitled Model";

pub fn normalize_variant(raw: &Value) -> Option<CarVariant> {
    let raw = raw.as_object()?;
    Some(CarVariant {
        id: optional_text(raw, "id").unwrap_or_else(fresh_id),
        prompt: text(raw, "prompt"),
        image_url: text(raw, "imageUrl"),
        created_at: optional_millis(raw, "createdAt").unwrap_or_else(unix_millis),
    })
}

/// Every known key coerced to text; unknown keys ignored; non-objects give all-empty specs.
pub fn normalize_specs(raw: Option<&Value>) -> CarSpecs {
    let mut specs = CarSpecs::default();
    let Some(raw) = raw.and_then(Value::as_object) else {
        return specs;
    };
    for key in SPEC_KEYS {
        if let (Some(field), Some(value)) = (specs.field_mut(key), raw.get(key)) {
            if let Some(value) = value.as_str() {
                *field = value.to_string();
            }
        }
    }
    specs
}

pub fn normalize_program(raw: &Value) -> Option<ModelProgram> {
    let raw = raw.as_object()?;
    Some(ModelProgram {
        segment: text(raw, "segment"),
        body_style: text(raw, "bodyStyle"),
        target_buyer: text(raw, "targetBuyer"),
        price_band: text(raw, "priceBand"),
        performance_goal: text(raw, "performanceGoal"),
        powertrain_strategy: text(raw, "powertrainStrategy"),
        design_signature: text(raw, "designSignature"),
    })
}

pub fn normalize_review(raw: &Value) -> Option<Review> {
    let raw = raw.as_object()?;
    let persona = raw
        .get("persona")
        .and_then(Value::as_str)
        .and_then(ReviewPersona::from_label)
        .unwrap_or_default();
    Some(Review {
        publication: text(raw, "publication"),
        author: text(raw, "author"),
        score: text(raw, "score"),
        headline: text(raw, "headline"),
        summary: text(raw, "summary"),
        persona,
    })
}

pub fn normalize_market_insight(raw: &Value) -> Option<MarketInsight> {
    let raw = raw.as_object()?;
    let collector_score = raw
        .get("collectorScore")
        .and_then(Value::as_f64)
        .filter(|score| score.is_finite())
        .map(|score| score.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(0);
    Some(MarketInsight {
        collector_score,
        resale_value: text(raw, "resaleValue"),
        target_demographic: text(raw, "targetDemographic"),
        market_sentiment: text(raw, "marketSentiment"),
    })
}

/// `brand_id` is used when the model carries no back-reference of its own.
pub fn normalize_model(raw: &Value, brand_id: &str) -> Option<CarModel> {
    let raw = raw.as_object()?;

    let tier = raw
        .get("tier")
        .and_then(Value::as_str)
        .and_then(CarTier::from_label)
        .unwrap_or(CarTier::FALLBACK);

    let variants: Vec<CarVariant> = array(raw, "variants")
        .map(|variants| variants.iter().filter_map(normalize_variant).collect())
        .unwrap_or_default();

    let hero_variant_id = optional_text(raw, "heroVariantId")
        .filter(|hero| variants.iter().any(|variant| &variant.id == hero));

    let reviews: Option<Vec<Review>> = array(raw, "reviews")
        .map(|reviews| reviews.iter().filter_map(normalize_review).collect());

    Some(CarModel {
        id: optional_text(raw, "id").unwrap_or_else(fresh_id),
        brand_id: text_or(raw, "brandId", brand_id),
        name: text_or(raw, "name", UNTITLED_MODEL),
        tagline: text(raw, "tagline"),
        tier,
        price: text(raw, "price"),
        specs: normalize_specs(raw.get("specs")),
        visual_description: text(raw, "visualDescription"),
        marketing_blurb: text(raw, "marketingBlurb"),
        variants,
        program: raw.get("program").and_then(normalize_program),
        hero_variant_id,
        reviews,
        market_insight: raw.get("marketInsight").and_then(normalize_market_insight),
    })
}
