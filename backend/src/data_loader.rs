use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::SiteError;
use crate::logger::{info, warn};
use crate::models::{
    ArticleLocale, ArticleRecord, PlantField, PlantRecord, ResolvedArticle, ResolvedPlant,
    TranslationEntry,
};
use crate::site_config::SiteConfig;
use crate::types::Lang;

lazy_static! {
    static ref RE_SLUG: Regex = Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap();
}

pub fn is_valid_slug(s: &str) -> bool {
    RE_SLUG.is_match(s)
}

/// Result of reading the plant array: the records that loaded and a message per skipped element.
#[derive(Debug, Default)]
pub struct PlantLoad {
    pub plants: Vec<PlantRecord>,
    pub skipped: Vec<String>,
}

fn read_input(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(SiteError::MissingInput(path.to_path_buf()).into());
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Parse a JSON array of plant records. The array itself must be well-formed,
/// individual elements that fail are skipped.
pub fn parse_plants(json: &str) -> Result<PlantLoad> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)
        .context("Plant data must be a JSON array")?;

    let mut load = PlantLoad::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (idx, value) in values.into_iter().enumerate() {
        let record: PlantRecord = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                load.skipped.push(format!("plant #{}: {}", idx, e));
                continue;
            }
        };

        if !is_valid_slug(&record.id) {
            load.skipped.push(format!("plant #{}: {}", idx, SiteError::InvalidSlug(record.id)));
            continue;
        }

        if !seen.insert(record.id.clone()) {
            load.skipped.push(format!("plant #{}: {}", idx, SiteError::DuplicateId(record.id)));
            continue;
        }

        load.plants.push(record);
    }

    Ok(load)
}

pub fn load_plants(path: &Path) -> Result<PlantLoad> {
    let text = read_input(path)?;
    let load = parse_plants(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    for msg in load.skipped.iter() {
        warn(&format!("Skipping {}", msg));
    }
    Ok(load)
}

pub fn load_translations(path: &Path) -> Result<HashMap<String, TranslationEntry>> {
    let text = read_input(path)?;
    let entries: HashMap<String, TranslationEntry> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(entries)
}

pub fn load_articles(path: &Path) -> Result<Vec<ArticleRecord>> {
    let text = read_input(path)?;
    let records: Vec<ArticleRecord> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut articles = Vec::new();
    for a in records {
        if !is_valid_slug(&a.slug) {
            warn(&format!("Skipping article: {}", SiteError::InvalidSlug(a.slug)));
            continue;
        }
        if !seen.insert(a.slug.clone()) {
            warn(&format!("Skipping duplicate article '{}'", a.slug));
            continue;
        }
        articles.push(a);
    }
    Ok(articles)
}

/// In-memory plant, translation and article data for one run. Never mutated after loading.
#[derive(Debug, Default)]
pub struct Catalog {
    plants: Vec<PlantRecord>,
    by_id: HashMap<String, usize>,
    translations: BTreeMap<Lang, HashMap<String, TranslationEntry>>,
    articles: Vec<ArticleRecord>,
    skipped: Vec<String>,
}

impl Catalog {
    pub fn new(plants: Vec<PlantRecord>,
               translations: BTreeMap<Lang, HashMap<String, TranslationEntry>>,
               articles: Vec<ArticleRecord>) -> Self {
        let by_id = plants.iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();
        Catalog { plants, by_id, translations, articles, skipped: Vec::new() }
    }

    /// Load every input file named by the config. Any missing or malformed file is fatal.
    pub fn load(config: &SiteConfig) -> Result<Catalog> {
        let plant_load = load_plants(&config.plants_file)?;

        let mut translations = BTreeMap::new();
        for lang in config.languages.iter().filter(|l| !l.is_default()) {
            if let Some(path) = config.translation_files.get(lang) {
                translations.insert(*lang, load_translations(path)?);
            }
        }

        let articles = load_articles(&config.articles_file)?;

        info(&format!("Loaded {} plants ({} skipped), {} articles",
                      plant_load.plants.len(), plant_load.skipped.len(), articles.len()));

        let mut catalog = Catalog::new(plant_load.plants, translations, articles);
        catalog.skipped = plant_load.skipped;
        Ok(catalog)
    }

    pub fn plants(&self) -> &[PlantRecord] {
        &self.plants
    }

    pub fn plant(&self, id: &str) -> Option<&PlantRecord> {
        self.by_id.get(id).map(|&i| &self.plants[i])
    }

    /// Plants whose detail page can be rendered. Listing pages only show and link these.
    pub fn renderable_plants(&self) -> Vec<&PlantRecord> {
        self.plants.iter().filter(|p| p.ratings().is_ok()).collect()
    }

    /// True when `id` names a known plant with a renderable detail page.
    pub fn has_plant_page(&self, id: &str) -> bool {
        self.plant(id).map(|p| p.ratings().is_ok()).unwrap_or(false)
    }

    pub fn articles(&self) -> &[ArticleRecord] {
        &self.articles
    }

    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// The translated field when present and non-empty, the English value otherwise.
    pub fn resolve(&self, plant: &PlantRecord, lang: Lang, field: PlantField) -> String {
        let translated = self.translations
            .get(&lang)
            .and_then(|t| t.get(&plant.id))
            .and_then(|entry| match field {
                PlantField::Name => entry.name.as_deref(),
                PlantField::Description => entry.description.as_deref(),
                PlantField::CareTips => entry.care_tips.as_deref(),
            })
            .filter(|s| !s.trim().is_empty());

        match translated {
            Some(s) => s.to_string(),
            None => match field {
                PlantField::Name => plant.name.clone(),
                PlantField::Description => plant.description.clone(),
                PlantField::CareTips => plant.care_tips.clone(),
            },
        }
    }

    pub fn resolve_plant<'a>(&self, plant: &'a PlantRecord, lang: Lang) -> ResolvedPlant<'a> {
        ResolvedPlant {
            record: plant,
            lang,
            name: self.resolve(plant, lang, PlantField::Name),
            description: self.resolve(plant, lang, PlantField::Description),
            care_tips: self.resolve(plant, lang, PlantField::CareTips),
        }
    }

    /// Resolve every article field for `lang`, falling back to English per field.
    /// The English title is required.
    pub fn resolve_article(&self, article: &ArticleRecord, lang: Lang) -> Result<ResolvedArticle, SiteError> {
        let empty = ArticleLocale::default();
        let en = article.locales.get(&Lang::En).unwrap_or(&empty);
        let loc = article.locales.get(&lang).unwrap_or(en);

        let pick = |f: fn(&ArticleLocale) -> &Option<String>| -> Option<String> {
            non_empty(f(loc)).or_else(|| non_empty(f(en)))
        };

        if non_empty(&en.title).is_none() {
            return Err(SiteError::MissingField {
                slug: article.slug.clone(),
                field: "title".to_string(),
            });
        }
        let title = pick(|l| &l.title).unwrap_or_default();

        Ok(ResolvedArticle {
            slug: article.slug.clone(),
            lang,
            description: pick(|l| &l.description).unwrap_or_default(),
            short: pick(|l| &l.short).unwrap_or_default(),
            emoji: pick(|l| &l.emoji).unwrap_or_else(|| "🌿".to_string()),
            badge: pick(|l| &l.badge).unwrap_or_default(),
            h1: pick(|l| &l.h1).unwrap_or_else(|| title.clone()),
            intro: pick(|l| &l.intro).unwrap_or_default(),
            breadcrumb: pick(|l| &l.breadcrumb).unwrap_or_else(|| title.clone()),
            plants: if loc.plants.is_empty() { en.plants.clone() } else { loc.plants.clone() },
            tips: if loc.tips.is_empty() { en.tips.clone() } else { loc.tips.clone() },
            mistakes: if loc.mistakes.is_empty() { en.mistakes.clone() } else { loc.mistakes.clone() },
            title,
        })
    }

    /// Every article plant mention that names an unknown plant id, per language.
    pub fn dangling_references(&self, langs: &[Lang]) -> Vec<SiteError> {
        let mut errors = Vec::new();
        for article in self.articles.iter() {
            for lang in langs {
                let Some(locale) = article.locales.get(lang) else {
                    continue;
                };
                for mention in locale.plants.iter() {
                    if self.plant(&mention.plant_id).is_none() {
                        errors.push(SiteError::DanglingReference {
                            article: article.slug.clone(),
                            lang: lang.code().to_string(),
                            plant_id: mention.plant_id.clone(),
                        });
                    }
                }
            }
        }
        errors
    }
}

fn non_empty(s: &Option<String>) -> Option<String> {
    s.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlantMention;

    fn plant(id: &str) -> PlantRecord {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": "Snake Plant",
            "description": "Hardy and upright.",
            "care_tips": "Water sparingly.",
        })).unwrap()
    }

    #[test]
    fn test_slug_regex() {
        assert!(is_valid_slug("snake-plant"));
        assert!(is_valid_slug("zz2"));
        assert!(!is_valid_slug("Snake-Plant"));
        assert!(!is_valid_slug("snake--plant"));
        assert!(!is_valid_slug("-snake"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn test_parse_plants_skips_bad_records() {
        let json = r#"[
            {"id": "snake-plant", "name": "Snake Plant"},
            {"id": "Bad Id"},
            {"name": "no id"},
            {"id": "snake-plant", "name": "Again"},
            {"id": "pothos-golden", "difficulty": "medium"}
        ]"#;
        let load = parse_plants(json).unwrap();
        let ids: Vec<&str> = load.plants.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["snake-plant", "pothos-golden"]);
        assert_eq!(load.skipped.len(), 3);
        assert_eq!(load.plants[1].light, 3);
    }

    #[test]
    fn test_parse_plants_rejects_non_array() {
        assert!(parse_plants(r#"{"id": "x"}"#).is_err());
        assert!(parse_plants("[{").is_err());
    }

    #[test]
    fn test_resolve_falls_back_per_field() {
        let mut es = HashMap::new();
        es.insert("snake-plant".to_string(), TranslationEntry {
            name: Some("Lengua de Suegra".to_string()),
            description: Some("  ".to_string()),
            care_tips: None,
        });
        let mut translations = BTreeMap::new();
        translations.insert(Lang::Es, es);

        let catalog = Catalog::new(vec![plant("snake-plant")], translations, vec![]);
        let p = catalog.plant("snake-plant").unwrap();

        assert_eq!(catalog.resolve(p, Lang::Es, PlantField::Name), "Lengua de Suegra");
        assert_eq!(catalog.resolve(p, Lang::Es, PlantField::Description), "Hardy and upright.");
        assert_eq!(catalog.resolve(p, Lang::De, PlantField::Name), "Snake Plant");
        assert_eq!(catalog.resolve_plant(p, Lang::Es).care_tips, "Water sparingly.");
    }

    #[test]
    fn test_resolve_article_requires_english_title() {
        let mut locales = BTreeMap::new();
        locales.insert(Lang::Es, ArticleLocale { title: Some("Hola".to_string()), ..Default::default() });
        let article = ArticleRecord { slug: "guide".to_string(), locales };

        let catalog = Catalog::default();
        assert!(matches!(catalog.resolve_article(&article, Lang::Es),
                         Err(SiteError::MissingField { .. })));
    }

    #[test]
    fn test_resolve_article_fallback() {
        let mut locales = BTreeMap::new();
        locales.insert(Lang::En, ArticleLocale {
            title: Some("Low Light Plants".to_string()),
            intro: Some("English intro".to_string()),
            ..Default::default()
        });
        locales.insert(Lang::De, ArticleLocale {
            title: Some("Pflanzen für wenig Licht".to_string()),
            ..Default::default()
        });
        let article = ArticleRecord { slug: "low-light".to_string(), locales };

        let r = Catalog::default().resolve_article(&article, Lang::De).unwrap();
        assert_eq!(r.title, "Pflanzen für wenig Licht");
        assert_eq!(r.intro, "English intro");
        assert_eq!(r.h1, "Pflanzen für wenig Licht");

        let r = Catalog::default().resolve_article(&article, Lang::Es).unwrap();
        assert_eq!(r.title, "Low Light Plants");
    }

    #[test]
    fn test_dangling_references() {
        let mut locales = BTreeMap::new();
        locales.insert(Lang::En, ArticleLocale {
            title: Some("Guide".to_string()),
            plants: vec![
                PlantMention { name: "Snake".to_string(), plant_id: "snake-plant".to_string(), ..Default::default() },
                PlantMention { name: "Ghost".to_string(), plant_id: "ghost-plant".to_string(), ..Default::default() },
            ],
            ..Default::default()
        });
        let article = ArticleRecord { slug: "guide".to_string(), locales };
        let catalog = Catalog::new(vec![plant("snake-plant")], BTreeMap::new(), vec![article]);

        let errors = catalog.dangling_references(&Lang::ALL);
        assert_eq!(errors, vec![SiteError::DanglingReference {
            article: "guide".to_string(),
            lang: "en".to_string(),
            plant_id: "ghost-plant".to_string(),
        }]);
    }

    #[test]
    fn test_renderable_plants_exclude_bad_ratings() {
        let plants = vec![
            serde_json::from_value(serde_json::json!({ "id": "ok-plant" })).unwrap(),
            serde_json::from_value(serde_json::json!({ "id": "wet-plant", "water": 6 })).unwrap(),
        ];
        let c = Catalog::new(plants, BTreeMap::new(), vec![]);
        let ids: Vec<&str> = c.renderable_plants().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["ok-plant"]);
        assert!(c.has_plant_page("ok-plant"));
        assert!(!c.has_plant_page("wet-plant"));
        assert!(!c.has_plant_page("ghost"));
    }
}
