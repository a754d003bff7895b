use crate::i18n::UiStrings;
use crate::models::PlantRecord;
use crate::types::{Difficulty, Size};

pub const MAX_BEST_FOR: usize = 4;
pub const MAX_NOT_IDEAL: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suitability {
    pub best_for: Vec<String>,
    pub not_ideal_for: Vec<String>,
}

/// Derive the "is this plant for you" lists. Rules apply in a fixed order and
/// the lists are cut at [`MAX_BEST_FOR`] and [`MAX_NOT_IDEAL`] entries.
pub fn suitability(plant: &PlantRecord, s: &UiStrings) -> Suitability {
    let t = &s.suitability;
    let mut best: Vec<&str> = Vec::new();
    let mut not_ideal: Vec<&str> = Vec::new();

    if plant.light <= 2 {
        best.push(&t.low_light);
    } else if plant.light >= 4 {
        best.push(&t.bright_rooms);
    } else {
        best.push(&t.indirect_light);
    }

    match plant.difficulty {
        Difficulty::Easy => best.push(&t.beginners),
        Difficulty::Hard => not_ideal.push(&t.not_beginners),
        Difficulty::Moderate => {}
    }

    if plant.pet_safe {
        best.push(&t.pet_homes);
    } else {
        not_ideal.push(&t.not_pet_homes);
    }

    if plant.water <= 2 {
        best.push(&t.forgetful_waterers);
    } else if plant.water >= 4 {
        not_ideal.push(&t.not_travelers);
    }

    match plant.size {
        Size::Large => {
            best.push(&t.statement_piece);
            not_ideal.push(&t.not_small_apartments);
        }
        Size::Small => best.push(&t.desks_shelves),
        Size::Medium => {}
    }

    if plant.humidity >= 4 {
        best.push(&t.humid_rooms);
        not_ideal.push(&t.not_dry_climates);
    }

    if plant.air_purifying {
        best.push(&t.air_quality);
    }

    Suitability {
        best_for: best.into_iter().take(MAX_BEST_FOR).map(String::from).collect(),
        not_ideal_for: not_ideal.into_iter().take(MAX_NOT_IDEAL).map(String::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::strings;
    use crate::types::Lang;

    fn record(json: serde_json::Value) -> PlantRecord {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_snake_plant_lists() {
        let p = record(serde_json::json!({
            "id": "snake-plant", "light": 2, "water": 1, "humidity": 2,
            "difficulty": "easy", "size": "medium", "pet_safe": false, "air_purifying": true,
        }));
        let s = strings(Lang::En);
        let r = suitability(&p, s);
        assert_eq!(r.best_for, vec![
            s.suitability.low_light.clone(),
            s.suitability.beginners.clone(),
            s.suitability.forgetful_waterers.clone(),
            s.suitability.air_quality.clone(),
        ]);
        assert_eq!(r.not_ideal_for, vec![s.suitability.not_pet_homes.clone()]);
    }

    #[test]
    fn test_lists_are_truncated() {
        let p = record(serde_json::json!({
            "id": "big-fern", "light": 5, "water": 5, "humidity": 5,
            "difficulty": "hard", "size": "large", "pet_safe": false, "air_purifying": true,
        }));
        let s = strings(Lang::De);
        let r = suitability(&p, s);
        assert_eq!(r.best_for.len(), 4);
        assert_eq!(r.best_for[0], s.suitability.bright_rooms);
        assert_eq!(r.not_ideal_for, vec![
            s.suitability.not_beginners.clone(),
            s.suitability.not_pet_homes.clone(),
            s.suitability.not_travelers.clone(),
        ]);
    }

    #[test]
    fn test_pet_safe_moderate_has_no_concerns() {
        let p = record(serde_json::json!({
            "id": "parlor-palm", "light": 3, "water": 3, "humidity": 3, "pet_safe": true,
        }));
        let r = suitability(&p, strings(Lang::Es));
        assert!(r.not_ideal_for.is_empty());
        assert_eq!(r.best_for.len(), 2);
    }
}
