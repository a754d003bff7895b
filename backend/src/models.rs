use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Serialize, Deserialize};

use crate::errors::SiteError;
use crate::types::{Category, Difficulty, GrowthRate, Lang, PageRoute, Rating, Size};

fn default_rating() -> i64 {
    3
}

/// One species entry of `plants.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub common_names: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub care_tips: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub growth_rate: GrowthRate,
    // Kept as raw integers so that an out-of-range value is reported when the
    // page is rendered instead of failing the whole data file.
    #[serde(default = "default_rating")]
    pub light: i64,
    #[serde(default = "default_rating")]
    pub water: i64,
    #[serde(default = "default_rating")]
    pub humidity: i64,
    #[serde(default)]
    pub pet_safe: bool,
    #[serde(default)]
    pub toxic_to: Vec<String>,
    #[serde(default)]
    pub air_purifying: bool,
    #[serde(default)]
    pub origin: String,
}

impl PlantRecord {
    /// The light, water and humidity ratings, each checked to be within 1..=5.
    pub fn ratings(&self) -> Result<(Rating, Rating, Rating), SiteError> {
        Ok((
            Rating::new("light", self.light)?,
            Rating::new("water", self.water)?,
            Rating::new("humidity", self.humidity)?,
        ))
    }
}

/// Per-language overrides for a plant, from `plants_<lang>.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEntry {
    pub name: Option<String>,
    pub description: Option<String>,
    pub care_tips: Option<String>,
}

/// The translatable text fields of a plant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlantField {
    Name,
    Description,
    CareTips,
}

/// A plant with its text fields resolved for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlant<'a> {
    pub record: &'a PlantRecord,
    pub lang: Lang,
    pub name: String,
    pub description: String,
    pub care_tips: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub text: String,
    #[serde(default = "default_tag_color")]
    pub color: String,
}

fn default_tag_color() -> String {
    "emerald".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantMention {
    pub name: String,
    pub plant_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tip {
    #[serde(default)]
    pub icon: String,
    pub title: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mistake {
    pub title: String,
    #[serde(default)]
    pub text: String,
}

/// Article text in one language. Every field may be left out and falls back to English.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleLocale {
    pub title: Option<String>,
    pub description: Option<String>,
    pub short: Option<String>,
    pub emoji: Option<String>,
    pub badge: Option<String>,
    pub h1: Option<String>,
    pub intro: Option<String>,
    pub breadcrumb: Option<String>,
    pub plants: Vec<PlantMention>,
    pub tips: Vec<Tip>,
    pub mistakes: Vec<Mistake>,
}

/// A guide topic from `articles.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub slug: String,
    #[serde(default)]
    pub locales: BTreeMap<Lang, ArticleLocale>,
}

/// An article with every field resolved for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArticle {
    pub slug: String,
    pub lang: Lang,
    pub title: String,
    pub description: String,
    pub short: String,
    pub emoji: String,
    pub badge: String,
    pub h1: String,
    pub intro: String,
    pub breadcrumb: String,
    pub plants: Vec<PlantMention>,
    pub tips: Vec<Tip>,
    pub mistakes: Vec<Mistake>,
}

/// A page written during the current run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPage {
    pub route: PageRoute,
    pub lang: Lang,
    pub path: PathBuf,
}
