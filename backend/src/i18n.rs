use std::collections::BTreeMap;

use lazy_static::lazy_static;
use serde::Deserialize;

use crate::types::{Category, Difficulty, GrowthRate, Lang, Size};

static EN_JSON: &str = include_str!("../../assets/i18n/en.json");
static ES_JSON: &str = include_str!("../../assets/i18n/es.json");
static DE_JSON: &str = include_str!("../../assets/i18n/de.json");

#[derive(Debug, Clone, Deserialize)]
pub struct UiStrings {
    pub lang_name: String,
    pub select_language: String,
    pub nav: NavStrings,
    pub footer: FooterStrings,
    pub home: HomeStrings,
    pub plant: PlantStrings,
    pub labels: LabelStrings,
    pub suitability: SuitabilityStrings,
    pub articles: ArticleStrings,
    pub search: SearchStrings,
    pub quiz: QuizStrings,
    pub compare: CompareStrings,
    pub faq: FaqStrings,
    pub about: AboutStrings,
    pub pets: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavStrings {
    pub home: String,
    pub plants: String,
    pub search: String,
    pub quiz: String,
    pub compare: String,
    pub guides: String,
    pub about: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FooterStrings {
    pub tagline: String,
    pub copyright: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HomeStrings {
    pub title: String,
    pub meta_description: String,
    pub hero_title: String,
    pub hero_subtitle: String,
    pub hero_cta: String,
    pub browse_plants: String,
    pub popular_plants: String,
    pub view_all: String,
    pub tools_title: String,
    pub quiz_title: String,
    pub quiz_desc: String,
    pub compare_title: String,
    pub compare_desc: String,
    pub search_title: String,
    pub search_desc: String,
    pub guides_teaser: String,
}

/// Plant page strings. Values containing `{name}`, `{pets}` or `{rate}` are
/// filled with [`fill`].
#[derive(Debug, Clone, Deserialize)]
pub struct PlantStrings {
    pub title_suffix: String,
    pub meta_description: String,
    pub also_known_as: String,
    pub light: String,
    pub water: String,
    pub humidity: String,
    pub size: String,
    pub growth_badge: String,
    pub air_purifying_badge: String,
    pub care_requirements: String,
    pub light_needs: String,
    pub water_needs: String,
    pub humidity_needs: String,
    pub maintenance: String,
    pub growth_rate: String,
    pub air_purification: String,
    pub about: String,
    pub origin: String,
    pub care_tips: String,
    pub is_this_for_you: String,
    pub best_for: String,
    pub not_ideal_for: String,
    pub no_major_concerns: String,
    pub compare_cta: String,
    pub pet_safe_alternatives_cta: String,
    pub pet_toxic_badge: String,
    pub pet_safe_badge: String,
    pub pet_toxic_title: String,
    pub pet_toxic_text: String,
    pub pet_safe_alternative_link: String,
    pub pet_safe_title: String,
    pub pet_safe_text: String,
    pub list_and: String,
    pub empty_description: String,
    pub empty_care_tips: String,
    pub unnamed: String,
    pub image_coming_soon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LevelTriple {
    pub easy: String,
    pub moderate: String,
    pub hard: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SizeLabels {
    pub small: String,
    pub medium: String,
    pub large: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrowthLabels {
    pub slow: String,
    pub moderate: String,
    pub fast: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryLabels {
    pub foliage: String,
    pub succulent: String,
    pub flowering: String,
    pub palm: String,
    pub fern: String,
    pub cactus: String,
    pub trailing: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelStrings {
    pub difficulty: LevelTriple,
    pub size: SizeLabels,
    pub growth: GrowthLabels,
    pub category: CategoryLabels,
    pub light_levels: Vec<String>,
    pub water_levels: Vec<String>,
    pub humidity_levels: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuitabilityStrings {
    pub low_light: String,
    pub bright_rooms: String,
    pub indirect_light: String,
    pub beginners: String,
    pub not_beginners: String,
    pub pet_homes: String,
    pub not_pet_homes: String,
    pub forgetful_waterers: String,
    pub not_travelers: String,
    pub statement_piece: String,
    pub not_small_apartments: String,
    pub desks_shelves: String,
    pub humid_rooms: String,
    pub not_dry_climates: String,
    pub air_quality: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArticleStrings {
    pub index_title: String,
    pub index_subtitle: String,
    pub updated: String,
    pub essential_tips: String,
    pub common_mistakes: String,
    pub find_perfect_plant: String,
    pub quiz_cta_text: String,
    pub take_quiz: String,
    pub explore_plants: String,
    pub coming_soon: String,
    pub back_to_guides: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchStrings {
    pub title: String,
    pub subtitle: String,
    pub placeholder: String,
    pub light_level: String,
    pub water_needs: String,
    pub difficulty: String,
    pub size: String,
    pub pet_safe: String,
    pub air_purifying: String,
    pub all: String,
    pub yes: String,
    pub no: String,
    pub plants_found: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizStrings {
    pub title: String,
    pub subtitle: String,
    pub questions: Vec<QuizQuestion>,
    pub next: String,
    pub previous: String,
    pub see_results: String,
    pub start_over: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompareStrings {
    pub title: String,
    pub subtitle: String,
    pub choose_plant: String,
    pub difficulty: String,
    pub pet_safe: String,
    pub air_purifying: String,
    pub growth_rate: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FaqStrings {
    pub title: String,
    pub subtitle: String,
    pub items: Vec<FaqItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AboutStrings {
    pub title: String,
    pub intro: String,
    pub mission_title: String,
    pub mission_text: String,
    pub contact_title: String,
    pub contact_text: String,
}

lazy_static! {
    // The bundled resources are checked by the tests below, a parse failure here is a build defect.
    static ref EN: UiStrings = serde_json::from_str(EN_JSON).expect("Invalid assets/i18n/en.json");
    static ref ES: UiStrings = serde_json::from_str(ES_JSON).expect("Invalid assets/i18n/es.json");
    static ref DE: UiStrings = serde_json::from_str(DE_JSON).expect("Invalid assets/i18n/de.json");
}

pub fn strings(lang: Lang) -> &'static UiStrings {
    match lang {
        Lang::En => &EN,
        Lang::Es => &ES,
        Lang::De => &DE,
    }
}

/// Replace `{key}` in a localized template.
pub fn fill(template: &str, key: &str, value: &str) -> String {
    template.replace(&format!("{{{}}}", key), value)
}

/// Join items as "a, b and c" with the locale's conjunction.
pub fn join_list(items: &[String], list_and: &str) -> String {
    match items {
        [] => String::new(),
        [one] => one.clone(),
        [rest @ .., last] => format!("{}{}{}", rest.join(", "), list_and, last),
    }
}

impl UiStrings {
    pub fn difficulty(&self, d: Difficulty) -> &str {
        let l = &self.labels.difficulty;
        match d {
            Difficulty::Easy => &l.easy,
            Difficulty::Moderate => &l.moderate,
            Difficulty::Hard => &l.hard,
        }
    }

    pub fn size(&self, s: Size) -> &str {
        let l = &self.labels.size;
        match s {
            Size::Small => &l.small,
            Size::Medium => &l.medium,
            Size::Large => &l.large,
        }
    }

    pub fn growth(&self, g: GrowthRate) -> &str {
        let l = &self.labels.growth;
        match g {
            GrowthRate::Slow => &l.slow,
            GrowthRate::Moderate => &l.moderate,
            GrowthRate::Fast => &l.fast,
        }
    }

    pub fn category(&self, c: Category) -> &str {
        let l = &self.labels.category;
        match c {
            Category::Foliage => &l.foliage,
            Category::Succulent => &l.succulent,
            Category::Flowering => &l.flowering,
            Category::Palm => &l.palm,
            Category::Fern => &l.fern,
            Category::Cactus => &l.cactus,
            Category::Trailing => &l.trailing,
        }
    }

    /// `value` is a validated rating, 1..=5.
    pub fn light_level(&self, value: u8) -> &str {
        level_label(&self.labels.light_levels, value)
    }

    pub fn water_level(&self, value: u8) -> &str {
        level_label(&self.labels.water_levels, value)
    }

    pub fn humidity_level(&self, value: u8) -> &str {
        level_label(&self.labels.humidity_levels, value)
    }

    /// Localized species name, the raw name when the locale has none.
    pub fn pet_name(&self, species: &str) -> String {
        self.pets
            .get(&species.to_lowercase())
            .cloned()
            .unwrap_or_else(|| species.to_string())
    }

    /// "cats and dogs" in the page locale.
    pub fn pet_list(&self, species: &[String]) -> String {
        let names: Vec<String> = species.iter().map(|s| self.pet_name(s)).collect();
        join_list(&names, &self.plant.list_and)
    }
}

fn level_label(levels: &[String], value: u8) -> &str {
    let idx = usize::from(value.saturating_sub(1));
    levels.get(idx).or(levels.last()).map(|s| s.as_str()).unwrap_or("")
}
