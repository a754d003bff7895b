use crate::data_loader::Catalog;
use crate::errors::SiteError;
use crate::html_content::{absolute_url, attr, breadcrumb_html, esc, href, html_page, PageShell, SchemaKind};
use crate::i18n::{fill, strings, UiStrings};
use crate::models::PlantRecord;
use crate::site_config::SiteConfig;
use crate::suitability::suitability;
use crate::types::{Category, Lang, PageKind, PageRoute, Rating};

pub fn category_emoji(category: Category) -> &'static str {
    match category {
        Category::Foliage => "🌿",
        Category::Succulent => "🪴",
        Category::Flowering => "🌸",
        Category::Palm => "🌴",
        Category::Fern => "🌱",
        Category::Cactus => "🌵",
        Category::Trailing => "🍃",
    }
}

/// One row of the care requirements section: `value` filled segments followed
/// by `5 - value` empty ones.
pub fn rating_bar_html(key: &str, label: &str, value: Rating) -> String {
    let filled = usize::from(value.value());
    let empty = usize::from(Rating::MAX) - filled;

    let mut segments = String::new();
    for _ in 0..filled {
        segments.push_str(r#"<span class="rating-segment filled h-2 w-8 rounded-full bg-emerald-500"></span>"#);
    }
    for _ in 0..empty {
        segments.push_str(r#"<span class="rating-segment empty h-2 w-8 rounded-full bg-stone-200"></span>"#);
    }

    format!(r#"<div class="flex items-center justify-between py-2" data-rating="{key}" data-value="{value}">
  <span class="text-stone-600">{label}</span>
  <div class="flex gap-1">{segments}</div>
</div>"#,
            key = attr(key),
            value = value.value(),
            label = esc(label),
            segments = segments)
}

/// Verified photo block, also inserted by the image promotion patch.
pub fn photo_block_html(src: &str, alt: &str) -> String {
    format!(r#"<div data-plant-photo class="aspect-[4/5] rounded-2xl overflow-hidden bg-stone-100"><img src="{}" alt="{}" class="w-full h-full object-cover" loading="lazy"></div>"#,
            attr(src), attr(alt))
}

/// The hero image block: the verified photo when one exists, a placeholder otherwise.
pub fn plant_image_html(plant: &PlantRecord, name: &str, s: &UiStrings, config: &SiteConfig) -> String {
    if config.is_verified_image(&plant.id) {
        photo_block_html(&config.image_src(&plant.id), name)
    } else {
        format!(r#"<div data-plant-placeholder class="aspect-[4/5] rounded-2xl bg-gradient-to-br from-emerald-100 to-emerald-300 flex flex-col items-center justify-center"><span class="text-7xl">{}</span><span class="mt-3 text-sm text-emerald-800">{}</span></div>"#,
                category_emoji(plant.category), esc(&s.plant.image_coming_soon))
    }
}

fn badge(text: &str, color: &str) -> String {
    format!(r#"<span class="px-3 py-1 rounded-full text-xs font-semibold bg-{c}-100 text-{c}-800">{t}</span>"#,
            c = color, t = esc(text))
}

fn fact(label: &str, value: &str) -> String {
    format!(r#"<div class="bg-white rounded-xl p-3 border border-stone-200"><p class="text-xs text-stone-500">{}</p><p class="font-semibold">{}</p></div>"#,
            esc(label), esc(value))
}

fn paragraphs(text: &str) -> String {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!(r#"<p class="mb-4 leading-relaxed">{}</p>"#, esc(p)))
        .collect::<Vec<String>>()
        .join("\n")
}

fn pet_block(plant: &PlantRecord, name: &str, lang: Lang, s: &UiStrings) -> String {
    if plant.pet_safe {
        return format!(r#"<div data-pet-safety="safe" class="mt-6 rounded-xl bg-emerald-50 border border-emerald-200 p-4"><p class="font-semibold text-emerald-800">{}</p><p class="text-sm text-emerald-900 mt-1">{}</p></div>"#,
                       esc(&s.plant.pet_safe_title),
                       esc(&fill(&s.plant.pet_safe_text, "name", name)));
    }

    let species = if plant.toxic_to.is_empty() {
        vec!["cats".to_string(), "dogs".to_string()]
    } else {
        plant.toxic_to.clone()
    };
    let text = fill(&fill(&s.plant.pet_toxic_text, "name", name), "pets", &s.pet_list(&species));
    let alternatives = format!("{}?pet_safe=1", href(&PageRoute::new(PageKind::Search), lang));

    format!(r#"<div data-pet-safety="toxic" class="mt-6 rounded-xl bg-amber-50 border border-amber-200 p-4"><p class="font-semibold text-amber-800">{}</p><p class="text-sm text-amber-900 mt-1">{} <a href="{}" class="underline">{}</a>.</p></div>"#,
            esc(&s.plant.pet_toxic_title),
            esc(&text),
            attr(&alternatives),
            esc(&s.plant.pet_safe_alternative_link))
}

/// Render the full plant detail page. Ratings are validated first, an out-of-range
/// value fails the page.
pub fn render_plant_page(catalog: &Catalog, plant: &PlantRecord, lang: Lang, config: &SiteConfig) -> Result<String, SiteError> {
    let (light, water, humidity) = plant.ratings()?;
    let maintenance = Rating::new("maintenance", i64::from(plant.difficulty.maintenance_rating()))?;
    let growth = Rating::new("growth", i64::from(plant.growth_rate.rating()))?;
    let air = Rating::new("air_purifying", if plant.air_purifying { 4 } else { 1 })?;

    let s = strings(lang);
    let resolved = catalog.resolve_plant(plant, lang);
    let name = if resolved.name.trim().is_empty() {
        s.plant.unnamed.clone()
    } else {
        resolved.name.clone()
    };

    let route = PageRoute::with_slug(PageKind::PlantDetail, &plant.id);

    let crumbs = breadcrumb_html(&[
        (s.nav.home.clone(), Some(href(&PageRoute::new(PageKind::Home), lang))),
        (s.nav.plants.clone(), Some(href(&PageRoute::new(PageKind::Search), lang))),
        (name.clone(), None),
    ]);

    let common_names = if plant.common_names.is_empty() {
        String::new()
    } else {
        format!(r#"<p class="mt-2 text-stone-500 italic">{}: {}</p>"#,
                esc(&s.plant.also_known_as), esc(&plant.common_names.join(", ")))
    };

    let mut badges = vec![
        badge(s.difficulty(plant.difficulty), "emerald"),
        badge(s.category(plant.category), "sky"),
        if plant.pet_safe {
            badge(&s.plant.pet_safe_badge, "emerald")
        } else {
            badge(&s.plant.pet_toxic_badge, "amber")
        },
        badge(&format!("{}: {}", s.plant.size, s.size(plant.size)), "stone"),
        badge(&fill(&s.plant.growth_badge, "rate", s.growth(plant.growth_rate)), "stone"),
    ];
    if plant.air_purifying {
        badges.push(badge(&s.plant.air_purifying_badge, "teal"));
    }

    let facts = [
        fact(&s.plant.light, s.light_level(light.value())),
        fact(&s.plant.water, s.water_level(water.value())),
        fact(&s.plant.humidity, s.humidity_level(humidity.value())),
        fact(&s.plant.size, &format!("{} ({})", s.size(plant.size), plant.size.height_range())),
    ].join("\n");

    let bars = [
        rating_bar_html("light", &s.plant.light_needs, light),
        rating_bar_html("water", &s.plant.water_needs, water),
        rating_bar_html("humidity", &s.plant.humidity_needs, humidity),
        rating_bar_html("maintenance", &s.plant.maintenance, maintenance),
        rating_bar_html("growth", &s.plant.growth_rate, growth),
        rating_bar_html("air-purifying", &s.plant.air_purification, air),
    ].join("\n");

    let description = if resolved.description.trim().is_empty() {
        format!(r#"<p class="text-stone-500 italic" data-empty-state>{}</p>"#, esc(&s.plant.empty_description))
    } else {
        paragraphs(&resolved.description)
    };

    let origin = if plant.origin.trim().is_empty() {
        String::new()
    } else {
        format!(r#"<p class="mt-2 text-sm"><strong>{}:</strong> {}</p>"#, esc(&s.plant.origin), esc(&plant.origin))
    };

    let care_tips = if resolved.care_tips.trim().is_empty() {
        format!(r#"<p class="text-stone-500 italic" data-empty-state>{}</p>"#, esc(&s.plant.empty_care_tips))
    } else {
        paragraphs(&resolved.care_tips)
    };

    let fit = suitability(plant, s);
    let best_for: String = fit.best_for.iter()
        .map(|b| format!(r#"<li class="flex gap-2"><span class="text-emerald-600">✓</span>{}</li>"#, esc(b)))
        .collect();
    let not_ideal: String = if fit.not_ideal_for.is_empty() {
        format!(r#"<li class="text-stone-500">{}</li>"#, esc(&s.plant.no_major_concerns))
    } else {
        fit.not_ideal_for.iter()
            .map(|n| format!(r#"<li class="flex gap-2"><span class="text-amber-600">✗</span>{}</li>"#, esc(n)))
            .collect()
    };

    let mut ctas = vec![format!(r#"<a href="{}" class="px-5 py-3 rounded-xl bg-emerald-600 text-white font-semibold">{}</a>"#,
                                attr(&href(&PageRoute::new(PageKind::Compare), lang)),
                                esc(&s.plant.compare_cta))];
    if !plant.pet_safe {
        ctas.push(format!(r#"<a href="{}?pet_safe=1" class="px-5 py-3 rounded-xl border border-emerald-600 text-emerald-700 font-semibold">{}</a>"#,
                          attr(&href(&PageRoute::new(PageKind::Search), lang)),
                          esc(&s.plant.pet_safe_alternatives_cta)));
    }

    let body = format!(r#"<div class="max-w-5xl mx-auto px-4 py-8" data-plant-id="{id}">
{crumbs}
<section class="grid md:grid-cols-2 gap-8" data-section="hero">
{image}
<div>
<h1 class="text-4xl font-bold text-stone-900">{name}</h1>
{common_names}
<div class="flex flex-wrap gap-2 mt-4" data-section="badges">{badges}</div>
<div class="grid grid-cols-2 gap-3 mt-6" data-section="quick-facts">
{facts}
</div>
{pet_block}
</div>
</section>
<section class="mt-12 bg-white rounded-2xl border border-stone-200 p-6" data-section="care-requirements">
<h2 class="text-2xl font-bold mb-4">{care_requirements}</h2>
{bars}
</section>
<section class="mt-12" data-section="description">
<h2 class="text-2xl font-bold mb-4">{about}</h2>
{description}
{origin}
</section>
<section class="mt-12" data-section="care-tips">
<h2 class="text-2xl font-bold mb-4">{care_tips_title}</h2>
{care_tips}
</section>
<section class="mt-12 grid md:grid-cols-2 gap-6" data-section="suitability">
<h2 class="md:col-span-2 text-2xl font-bold">{is_this_for_you}</h2>
<div class="bg-emerald-50 rounded-2xl p-6"><h3 class="font-semibold mb-3">{best_for_title}</h3><ul class="space-y-2" data-list="best-for">{best_for}</ul></div>
<div class="bg-amber-50 rounded-2xl p-6"><h3 class="font-semibold mb-3">{not_ideal_title}</h3><ul class="space-y-2" data-list="not-ideal">{not_ideal}</ul></div>
</section>
<section class="mt-12 flex flex-wrap gap-4" data-section="cta">{ctas}</section>
</div>"#,
        id = attr(&plant.id),
        crumbs = crumbs,
        image = plant_image_html(plant, &name, s, config),
        name = esc(&name),
        common_names = common_names,
        badges = badges.join(""),
        facts = facts,
        pet_block = pet_block(plant, &name, lang, s),
        care_requirements = esc(&s.plant.care_requirements),
        bars = bars,
        about = esc(&fill(&s.plant.about, "name", &name)),
        description = description,
        origin = origin,
        care_tips_title = esc(&s.plant.care_tips),
        care_tips = care_tips,
        is_this_for_you = esc(&s.plant.is_this_for_you),
        best_for_title = esc(&s.plant.best_for),
        best_for = best_for,
        not_ideal_title = esc(&s.plant.not_ideal_for),
        not_ideal = not_ideal,
        ctas = ctas.join("\n"),
    );

    let shell = PageShell {
        route: &route,
        lang,
        title: format!("{} {} | PlantFinder", name, s.plant.title_suffix),
        description: fill(&s.plant.meta_description, "name", &name),
        schema: SchemaKind::Article,
        image: if config.is_verified_image(&plant.id) {
            Some(absolute_url(config, &config.image_src(&plant.id)))
        } else {
            None
        },
    };

    html_page(&shell, &body, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bar_segments() {
        for v in 1..=5 {
            let html = rating_bar_html("light", "Light", Rating::new("light", v).unwrap());
            assert_eq!(html.matches("rating-segment filled").count(), v as usize);
            assert_eq!(html.matches("rating-segment empty").count(), 5 - v as usize);
        }
    }

    #[test]
    fn test_out_of_range_rating_fails_page() {
        let plant: PlantRecord = serde_json::from_value(serde_json::json!({
            "id": "broken", "name": "Broken", "water": 7,
        })).unwrap();
        let catalog = Catalog::new(vec![plant.clone()], Default::default(), vec![]);
        let res = render_plant_page(&catalog, &plant, Lang::En, &SiteConfig::default());
        assert_eq!(res, Err(SiteError::RatingOutOfRange { field: "water".to_string(), value: 7 }));
    }

    #[test]
    fn test_verified_image_uses_photo() {
        let plant: PlantRecord = serde_json::from_value(serde_json::json!({
            "id": "peace-lily", "name": "Peace Lily",
        })).unwrap();
        let config = SiteConfig::default();
        let s = strings(Lang::En);
        let html = plant_image_html(&plant, "Peace Lily", s, &config);
        assert!(html.contains("data-plant-photo"));
        assert!(html.contains(r#"src="/images/plants/peace-lily.png""#));

        let other = PlantRecord { id: "zz-plant".to_string(), ..plant };
        assert!(plant_image_html(&other, "ZZ", s, &config).contains("data-plant-placeholder"));
    }
}
