use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::errors::SiteError;

/// Output locale of a page. English is the default locale and lives at the site root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Lang {
    #[serde(rename = "en")]
    En,
    #[serde(rename = "es")]
    Es,
    #[serde(rename = "de")]
    De,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid language code: {0}")]
pub struct ParseLangError(String);

impl FromStr for Lang {
    type Err = ParseLangError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Lang::En),
            "es" => Ok(Lang::Es),
            "de" => Ok(Lang::De),
            _ => Err(ParseLangError(s.to_string())),
        }
    }
}

impl Lang {
    pub const ALL: [Lang; 3] = [Lang::En, Lang::Es, Lang::De];

    pub fn code(&self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Es => "es",
            Lang::De => "de",
        }
    }

    /// Path prefix for links: empty for English, `/es` or `/de` otherwise.
    pub fn prefix(&self) -> String {
        match self {
            Lang::En => String::new(),
            _ => format!("/{}", self.code()),
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Lang::En
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    #[serde(rename = "foliage")]
    Foliage,
    #[serde(rename = "succulent")]
    Succulent,
    #[serde(rename = "flowering")]
    Flowering,
    #[serde(rename = "palm")]
    Palm,
    #[serde(rename = "fern")]
    Fern,
    #[serde(rename = "cactus")]
    Cactus,
    #[serde(rename = "trailing")]
    Trailing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(rename = "easy")]
    Easy,
    // Older data files used "medium" for this level.
    #[default]
    #[serde(rename = "moderate", alias = "medium")]
    Moderate,
    #[serde(rename = "hard")]
    Hard,
}

impl Category {
    pub fn code(&self) -> &'static str {
        match self {
            Category::Foliage => "foliage",
            Category::Succulent => "succulent",
            Category::Flowering => "flowering",
            Category::Palm => "palm",
            Category::Fern => "fern",
            Category::Cactus => "cactus",
            Category::Trailing => "trailing",
        }
    }
}

impl Difficulty {
    pub fn code(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Moderate => "moderate",
            Difficulty::Hard => "hard",
        }
    }

    /// Maintenance rating shown in the care requirements section.
    pub fn maintenance_rating(&self) -> u8 {
        match self {
            Difficulty::Easy => 2,
            Difficulty::Moderate => 3,
            Difficulty::Hard => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Size {
    #[serde(rename = "small")]
    Small,
    #[default]
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "large")]
    Large,
}

impl Size {
    pub fn code(&self) -> &'static str {
        match self {
            Size::Small => "small",
            Size::Medium => "medium",
            Size::Large => "large",
        }
    }

    pub fn height_range(&self) -> &'static str {
        match self {
            Size::Small => "15-30 cm",
            Size::Medium => "30-90 cm",
            Size::Large => "90-180+ cm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GrowthRate {
    #[serde(rename = "slow")]
    Slow,
    #[default]
    #[serde(rename = "moderate")]
    Moderate,
    #[serde(rename = "fast")]
    Fast,
}

impl GrowthRate {
    pub fn rating(&self) -> u8 {
        match self {
            GrowthRate::Slow => 2,
            GrowthRate::Moderate => 3,
            GrowthRate::Fast => 5,
        }
    }
}

/// An integer attribute in the closed range 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(u8);

impl Rating {
    pub const MAX: u8 = 5;

    pub fn new(field: &str, value: i64) -> Result<Self, SiteError> {
        if (1..=i64::from(Self::MAX)).contains(&value) {
            Ok(Rating(value as u8))
        } else {
            Err(SiteError::RatingOutOfRange { field: field.to_string(), value })
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageKind {
    #[serde(rename = "home")]
    Home,
    #[serde(rename = "search")]
    Search,
    #[serde(rename = "quiz")]
    Quiz,
    #[serde(rename = "compare")]
    Compare,
    #[serde(rename = "faq")]
    Faq,
    #[serde(rename = "about")]
    About,
    #[serde(rename = "article-index")]
    ArticleIndex,
    #[serde(rename = "article-detail")]
    ArticleDetail,
    #[serde(rename = "plant-detail")]
    PlantDetail,
}

impl PageKind {
    pub const STATIC_PAGES: [PageKind; 6] = [
        PageKind::Home,
        PageKind::Search,
        PageKind::Quiz,
        PageKind::Compare,
        PageKind::Faq,
        PageKind::About,
    ];

    /// First path segment of the page URL, if any.
    pub fn section(&self) -> Option<&'static str> {
        match self {
            PageKind::Home => None,
            PageKind::Search => Some("search"),
            PageKind::Quiz => Some("quiz"),
            PageKind::Compare => Some("compare"),
            PageKind::Faq => Some("faq"),
            PageKind::About => Some("about"),
            PageKind::ArticleIndex | PageKind::ArticleDetail => Some("articles"),
            PageKind::PlantDetail => Some("plants"),
        }
    }

    pub fn sitemap_priority(&self) -> &'static str {
        match self {
            PageKind::Home => "1.0",
            PageKind::Search | PageKind::Quiz | PageKind::Compare => "0.9",
            PageKind::Faq | PageKind::PlantDetail | PageKind::ArticleIndex => "0.8",
            PageKind::About | PageKind::ArticleDetail => "0.7",
        }
    }
}

/// The logical location of a page, independent of its locale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageRoute {
    pub kind: PageKind,
    pub slug: Option<String>,
}

impl PageRoute {
    pub fn new(kind: PageKind) -> Self {
        PageRoute { kind, slug: None }
    }

    pub fn with_slug(kind: PageKind, slug: &str) -> Self {
        PageRoute { kind, slug: Some(slug.to_string()) }
    }

    /// Site-relative path with a trailing slash, e.g. `/es/plants/snake-plant/`.
    pub fn path(&self, lang: Lang) -> String {
        let mut path = lang.prefix();
        if let Some(section) = self.kind.section() {
            path.push('/');
            path.push_str(section);
        }
        if let Some(slug) = &self.slug {
            path.push('/');
            path.push_str(slug);
        }
        path.push('/');
        path
    }

    pub fn url(&self, base_url: &str, lang: Lang) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path(lang))
    }

    pub fn output_file(&self, root: &Path, lang: Lang) -> PathBuf {
        let mut p = root.to_path_buf();
        if !lang.is_default() {
            p.push(lang.code());
        }
        if let Some(section) = self.kind.section() {
            p.push(section);
        }
        if let Some(slug) = &self.slug {
            p.push(slug);
        }
        p.join("index.html")
    }
}
