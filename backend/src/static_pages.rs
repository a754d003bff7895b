use crate::data_loader::Catalog;
use crate::errors::SiteError;
use crate::html_content::{attr, esc, href, html_page, PageShell, SchemaKind};
use crate::i18n::{strings, UiStrings};
use crate::models::PlantRecord;
use crate::plant_page::category_emoji;
use crate::site_config::SiteConfig;
use crate::types::{Lang, PageKind, PageRoute};

fn display_name(catalog: &Catalog, plant: &PlantRecord, lang: Lang, s: &UiStrings) -> String {
    let name = catalog.resolve_plant(plant, lang).name;
    if name.trim().is_empty() { s.plant.unnamed.clone() } else { name }
}

fn thumb(plant: &PlantRecord, name: &str, config: &SiteConfig) -> String {
    if config.is_verified_image(&plant.id) {
        format!(r#"<img src="{}" alt="{}" class="w-full aspect-[4/5] object-cover rounded-xl" loading="lazy">"#,
                attr(&config.image_src(&plant.id)), attr(name))
    } else {
        format!(r#"<div class="w-full aspect-[4/5] rounded-xl bg-gradient-to-br from-emerald-100 to-emerald-300 flex items-center justify-center text-5xl">{}</div>"#,
                category_emoji(plant.category))
    }
}

fn plant_href(plant: &PlantRecord, lang: Lang) -> String {
    href(&PageRoute::with_slug(PageKind::PlantDetail, &plant.id), lang)
}

fn home_body(catalog: &Catalog, lang: Lang, config: &SiteConfig) -> String {
    let s = strings(lang);

    let popular: String = catalog.renderable_plants().into_iter()
        .take(config.popular_plants_count)
        .map(|p| {
            let name = display_name(catalog, p, lang, s);
            format!(r#"<a href="{}" class="block bg-white rounded-2xl border border-stone-200 p-3 hover:shadow-lg" data-plant-card="{}">{}<p class="mt-3 font-semibold">{}</p><p class="text-sm text-stone-500">{}</p></a>"#,
                    attr(&plant_href(p, lang)), attr(&p.id), thumb(p, &name, config),
                    esc(&name), esc(s.difficulty(p.difficulty)))
        })
        .collect();

    let tool = |kind: PageKind, icon: &str, title: &str, desc: &str| {
        format!(r#"<a href="{}" class="block bg-white rounded-2xl border border-stone-200 p-6 hover:shadow-lg"><p class="text-4xl">{}</p><h3 class="mt-3 text-xl font-bold">{}</h3><p class="mt-2 text-stone-600">{}</p></a>"#,
                attr(&href(&PageRoute::new(kind), lang)), icon, esc(title), esc(desc))
    };

    format!(r#"<section class="bg-gradient-to-br from-emerald-700 to-emerald-900 text-white" data-section="hero">
<div class="max-w-6xl mx-auto px-4 py-20 text-center">
<h1 class="text-5xl font-bold">{hero_title}</h1>
<p class="mt-4 text-xl text-emerald-100">{hero_subtitle}</p>
<div class="mt-8 flex justify-center gap-4">
<a href="{quiz_href}" class="px-6 py-3 rounded-xl bg-white text-emerald-800 font-semibold">{hero_cta}</a>
<a href="{search_href}" class="px-6 py-3 rounded-xl border border-white font-semibold">{browse}</a>
</div>
</div>
</section>
<section class="max-w-6xl mx-auto px-4 py-12" data-section="popular">
<div class="flex items-center justify-between">
<h2 class="text-3xl font-bold">{popular_title}</h2>
<a href="{search_href}" class="text-emerald-700 font-semibold">{view_all} →</a>
</div>
<div class="grid grid-cols-2 md:grid-cols-4 gap-6 mt-6">{popular}</div>
</section>
<section class="max-w-6xl mx-auto px-4 py-12" data-section="tools">
<h2 class="text-3xl font-bold">{tools_title}</h2>
<div class="grid md:grid-cols-3 gap-6 mt-6">
{quiz_tool}
{compare_tool}
{search_tool}
</div>
</section>
<section class="max-w-6xl mx-auto px-4 py-12 text-center" data-section="guides">
<a href="{guides_href}" class="text-xl font-semibold text-emerald-700">📚 {guides_teaser} →</a>
</section>"#,
        hero_title = esc(&s.home.hero_title),
        hero_subtitle = esc(&s.home.hero_subtitle),
        quiz_href = attr(&href(&PageRoute::new(PageKind::Quiz), lang)),
        hero_cta = esc(&s.home.hero_cta),
        search_href = attr(&href(&PageRoute::new(PageKind::Search), lang)),
        browse = esc(&s.home.browse_plants),
        popular_title = esc(&s.home.popular_plants),
        view_all = esc(&s.home.view_all),
        popular = popular,
        tools_title = esc(&s.home.tools_title),
        quiz_tool = tool(PageKind::Quiz, "🎯", &s.home.quiz_title, &s.home.quiz_desc),
        compare_tool = tool(PageKind::Compare, "⚖️", &s.home.compare_title, &s.home.compare_desc),
        search_tool = tool(PageKind::Search, "🔍", &s.home.search_title, &s.home.search_desc),
        guides_href = attr(&href(&PageRoute::new(PageKind::ArticleIndex), lang)),
        guides_teaser = esc(&s.home.guides_teaser))
}

fn select(name: &str, label: &str, all: &str, options: &[(String, String)]) -> String {
    let opts: String = options.iter()
        .map(|(v, l)| format!(r#"<option value="{}">{}</option>"#, attr(v), esc(l)))
        .collect();
    format!(r#"<label class="block text-sm"><span class="text-stone-600">{}</span><select name="{}" data-filter="{}" class="mt-1 w-full border border-stone-300 rounded-lg px-2 py-1"><option value="">{}</option>{}</select></label>"#,
            esc(label), attr(name), attr(name), esc(all), opts)
}

fn level_options(levels: &[String]) -> Vec<(String, String)> {
    levels.iter().enumerate().map(|(i, l)| ((i + 1).to_string(), l.clone())).collect()
}

fn search_body(catalog: &Catalog, lang: Lang, config: &SiteConfig) -> String {
    let s = strings(lang);
    let t = &s.search;
    let yes_no = vec![("true".to_string(), t.yes.clone()), ("false".to_string(), t.no.clone())];

    let filters = [
        select("light", &t.light_level, &t.all, &level_options(&s.labels.light_levels)),
        select("water", &t.water_needs, &t.all, &level_options(&s.labels.water_levels)),
        select("difficulty", &t.difficulty, &t.all, &[
            ("easy".to_string(), s.labels.difficulty.easy.clone()),
            ("moderate".to_string(), s.labels.difficulty.moderate.clone()),
            ("hard".to_string(), s.labels.difficulty.hard.clone()),
        ]),
        select("size", &t.size, &t.all, &[
            ("small".to_string(), s.labels.size.small.clone()),
            ("medium".to_string(), s.labels.size.medium.clone()),
            ("large".to_string(), s.labels.size.large.clone()),
        ]),
        select("pet_safe", &t.pet_safe, &t.all, &yes_no),
        select("air_purifying", &t.air_purifying, &t.all, &yes_no),
    ].join("\n");

    let plants = catalog.renderable_plants();
    let cards: String = plants.iter()
        .map(|p| {
            let name = display_name(catalog, p, lang, s);
            format!(r#"<a href="{href}" class="block bg-white rounded-2xl border border-stone-200 p-3" data-plant-card="{id}" data-name="{name_attr}" data-light="{light}" data-water="{water}" data-difficulty="{difficulty}" data-size="{size}" data-pet-safe="{pet_safe}" data-air-purifying="{air}">{thumb}<p class="mt-3 font-semibold">{name}</p><p class="text-sm text-stone-500">{category}</p></a>"#,
                    href = attr(&plant_href(p, lang)),
                    id = attr(&p.id),
                    name_attr = attr(&name.to_lowercase()),
                    light = p.light,
                    water = p.water,
                    difficulty = p.difficulty.code(),
                    size = p.size.code(),
                    pet_safe = p.pet_safe,
                    air = p.air_purifying,
                    thumb = thumb(p, &name, config),
                    name = esc(&name),
                    category = esc(s.category(p.category)))
        })
        .collect();

    format!(r#"<div class="max-w-6xl mx-auto px-4 py-12">
<h1 class="text-4xl font-bold">{title}</h1>
<p class="mt-3 text-lg text-stone-600">{subtitle}</p>
<input type="search" name="q" placeholder="{placeholder}" class="mt-6 w-full border border-stone-300 rounded-xl px-4 py-3">
<div class="grid grid-cols-2 md:grid-cols-6 gap-4 mt-6" data-section="filters">
{filters}
</div>
<p class="mt-6 text-sm text-stone-500"><span data-result-count>{count}</span> {found}</p>
<div class="grid grid-cols-2 md:grid-cols-4 gap-6 mt-4" data-section="results">{cards}</div>
</div>"#,
        title = esc(&t.title),
        subtitle = esc(&t.subtitle),
        placeholder = attr(&t.placeholder),
        filters = filters,
        count = plants.len(),
        found = esc(&t.plants_found),
        cards = cards)
}

fn quiz_body(lang: Lang) -> String {
    let q = &strings(lang).quiz;

    let questions: String = q.questions.iter()
        .enumerate()
        .map(|(i, question)| {
            let options: String = question.options.iter()
                .enumerate()
                .map(|(j, o)| format!(r#"<label class="flex items-center gap-3 bg-white border border-stone-200 rounded-xl px-4 py-3"><input type="radio" name="q{}" value="{}"> {}</label>"#,
                                      i + 1, j, esc(o)))
                .collect();
            format!(r#"<fieldset class="mt-8" data-question="{}"><legend class="text-xl font-semibold">{}. {}</legend><div class="mt-4 grid gap-3">{}</div></fieldset>"#,
                    i + 1, i + 1, esc(&question.question), options)
        })
        .collect();

    format!(r#"<div class="max-w-3xl mx-auto px-4 py-12">
<h1 class="text-4xl font-bold">{}</h1>
<p class="mt-3 text-lg text-stone-600">{}</p>
<form data-section="quiz">
{}
<div class="mt-10 flex gap-4">
<button type="button" data-quiz="previous" class="px-5 py-3 rounded-xl border border-stone-300">{}</button>
<button type="button" data-quiz="next" class="px-5 py-3 rounded-xl border border-stone-300">{}</button>
<button type="submit" class="px-5 py-3 rounded-xl bg-emerald-600 text-white font-semibold">{}</button>
<button type="reset" class="px-5 py-3 rounded-xl text-stone-500">{}</button>
</div>
</form>
</div>"#,
        esc(&q.title), esc(&q.subtitle), questions,
        esc(&q.previous), esc(&q.next), esc(&q.see_results), esc(&q.start_over))
}

fn compare_body(catalog: &Catalog, lang: Lang) -> String {
    let s = strings(lang);
    let c = &s.compare;

    let options: String = catalog.renderable_plants().into_iter()
        .map(|p| format!(r#"<option value="{}">{}</option>"#, attr(&p.id), esc(&display_name(catalog, p, lang, s))))
        .collect();

    let rows: String = [
        &s.plant.light_needs,
        &s.plant.water_needs,
        &s.plant.humidity_needs,
        &c.difficulty,
        &s.plant.size,
        &c.pet_safe,
        &c.air_purifying,
        &c.growth_rate,
    ].iter()
        .map(|label| format!(r#"<tr><th class="text-left py-2 text-stone-600">{}</th><td data-compare="a"></td><td data-compare="b"></td></tr>"#,
                             esc(label)))
        .collect();

    format!(r#"<div class="max-w-4xl mx-auto px-4 py-12">
<h1 class="text-4xl font-bold">{title}</h1>
<p class="mt-3 text-lg text-stone-600">{subtitle}</p>
<div class="grid grid-cols-2 gap-6 mt-8" data-section="compare-select">
<select name="plant_a" class="border border-stone-300 rounded-xl px-3 py-2"><option value="">{choose}</option>{options}</select>
<select name="plant_b" class="border border-stone-300 rounded-xl px-3 py-2"><option value="">{choose}</option>{options}</select>
</div>
<table class="w-full mt-8" data-section="compare-table">{rows}</table>
</div>"#,
        title = esc(&c.title),
        subtitle = esc(&c.subtitle),
        choose = esc(&c.choose_plant),
        options = options,
        rows = rows)
}

fn faq_body(lang: Lang) -> String {
    let f = &strings(lang).faq;
    let items: String = f.items.iter()
        .map(|item| format!(r#"<details class="bg-white rounded-xl border border-stone-200 p-5"><summary class="font-semibold cursor-pointer">{}</summary><p class="mt-3 text-stone-600">{}</p></details>"#,
                            esc(&item.question), esc(&item.answer)))
        .collect();

    format!(r#"<div class="max-w-3xl mx-auto px-4 py-12">
<h1 class="text-4xl font-bold">{}</h1>
<p class="mt-3 text-lg text-stone-600">{}</p>
<div class="mt-8 space-y-4" data-section="faq">{}</div>
</div>"#,
        esc(&f.title), esc(&f.subtitle), items)
}

fn about_body(lang: Lang) -> String {
    let a = &strings(lang).about;
    format!(r#"<div class="max-w-3xl mx-auto px-4 py-12">
<h1 class="text-4xl font-bold">{}</h1>
<p class="mt-4 text-lg text-stone-600">{}</p>
<section class="mt-10" data-section="mission"><h2 class="text-2xl font-bold">{}</h2><p class="mt-3">{}</p></section>
<section class="mt-10" data-section="contact"><h2 class="text-2xl font-bold">{}</h2><p class="mt-3">{}</p></section>
</div>"#,
        esc(&a.title), esc(&a.intro),
        esc(&a.mission_title), esc(&a.mission_text),
        esc(&a.contact_title), esc(&a.contact_text))
}

/// Render one of the fixed pages: home, search, quiz, compare, faq or about.
pub fn render_static_page(kind: PageKind, catalog: &Catalog, lang: Lang, config: &SiteConfig) -> Result<String, SiteError> {
    let s = strings(lang);

    let (title, description, body) = match kind {
        PageKind::Home => (s.home.title.clone(), s.home.meta_description.clone(), home_body(catalog, lang, config)),
        PageKind::Search => (format!("{} | PlantFinder", s.search.title), s.search.subtitle.clone(), search_body(catalog, lang, config)),
        PageKind::Quiz => (format!("{} | PlantFinder", s.quiz.title), s.quiz.subtitle.clone(), quiz_body(lang)),
        PageKind::Compare => (format!("{} | PlantFinder", s.compare.title), s.compare.subtitle.clone(), compare_body(catalog, lang)),
        PageKind::Faq => (format!("{} | PlantFinder", s.faq.title), s.faq.subtitle.clone(), faq_body(lang)),
        PageKind::About => (s.about.title.clone(), s.about.intro.clone(), about_body(lang)),
        other => return Err(SiteError::Template(format!("{:?} is not a static page", other))),
    };

    let route = PageRoute::new(kind);
    let shell = PageShell {
        route: &route,
        lang,
        title,
        description,
        schema: SchemaKind::WebPage,
        image: None,
    };
    html_page(&shell, &body, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn catalog(n: usize) -> Catalog {
        let plants = (0..n)
            .map(|i| serde_json::from_value(serde_json::json!({
                "id": format!("plant-{}", i),
                "name": format!("Plant {}", i),
                "light": 2,
                "pet_safe": i % 2 == 0,
            })).unwrap())
            .collect();
        Catalog::new(plants, BTreeMap::new(), vec![])
    }

    #[test]
    fn test_home_lists_popular_plants() {
        let config = SiteConfig::default();
        let html = render_static_page(PageKind::Home, &catalog(10), Lang::Es, &config).unwrap();
        assert_eq!(html.matches("data-plant-card=").count(), config.popular_plants_count);
        assert!(html.contains(r#"href="/es/plants/plant-0/""#));
        assert!(html.contains(r#"<link rel="canonical" href="https://plantfinder.org/es/">"#));
    }

    #[test]
    fn test_search_cards_carry_filter_attributes() {
        let html = render_static_page(PageKind::Search, &catalog(3), Lang::En, &SiteConfig::default()).unwrap();
        assert_eq!(html.matches("data-plant-card=").count(), 3);
        assert!(html.contains(r#"data-plant-card="plant-1" data-name="plant 1" data-light="2" data-water="3" data-difficulty="moderate" data-size="medium" data-pet-safe="false" data-air-purifying="false""#));
    }

    #[test]
    fn test_listings_leave_out_plants_without_a_page() {
        let plants = vec![
            serde_json::from_value(serde_json::json!({ "id": "fine-plant", "name": "Fine" })).unwrap(),
            serde_json::from_value(serde_json::json!({ "id": "bad-plant", "name": "Bad", "light": 7 })).unwrap(),
        ];
        let c = Catalog::new(plants, BTreeMap::new(), vec![]);
        let config = SiteConfig::default();

        for kind in [PageKind::Home, PageKind::Search, PageKind::Compare] {
            let html = render_static_page(kind, &c, Lang::En, &config).unwrap();
            assert!(!html.contains("bad-plant"), "{:?}", kind);
            assert!(html.contains("fine-plant"), "{:?}", kind);
        }
        let search = render_static_page(PageKind::Search, &c, Lang::En, &config).unwrap();
        assert!(!search.contains(r#"data-light="7""#));
        assert!(search.contains("<span data-result-count>1</span>"));
    }

    #[test]
    fn test_quiz_and_faq_are_localized() {
        let c = catalog(0);
        let config = SiteConfig::default();
        let quiz = render_static_page(PageKind::Quiz, &c, Lang::De, &config).unwrap();
        assert!(quiz.contains(&strings(Lang::De).quiz.questions[0].question));
        let faq = render_static_page(PageKind::Faq, &c, Lang::Es, &config).unwrap();
        assert!(faq.contains("Preguntas Frecuentes"));
    }

    #[test]
    fn test_detail_kinds_are_rejected() {
        let res = render_static_page(PageKind::PlantDetail, &catalog(0), Lang::En, &SiteConfig::default());
        assert!(matches!(res, Err(SiteError::Template(_))));
    }
}
