//! Domain records persisted by the vault.
//!
//! Field names serialize in camelCase so stored and exported documents keep
//! the layout earlier versions of the studio wrote.

mod brand;
mod image;
mod model;
mod record;

pub use brand::{Brand, BrandBrief, LoreEntry};
pub use image::ImagePayload;
pub use model::{
    CarModel, CarSpecs, CarTier, CarVariant, MarketInsight, ModelProgram, Review, ReviewPersona,
    SPEC_KEYS,
};
pub use record::{dedupe, merge, replace, sort_newest_first, SaveRecord};
