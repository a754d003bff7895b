use crate::data_loader::Catalog;
use crate::errors::SiteError;
use crate::html_content::{attr, breadcrumb_html, esc, href, html_page, PageShell, SchemaKind};
use crate::i18n::strings;
use crate::logger::warn;
use crate::models::{PlantMention, ResolvedArticle};
use crate::site_config::SiteConfig;
use crate::types::{Lang, PageKind, PageRoute};

pub fn render_article_index(catalog: &Catalog, lang: Lang, config: &SiteConfig) -> Result<String, SiteError> {
    let s = strings(lang);
    let route = PageRoute::new(PageKind::ArticleIndex);

    let mut cards = Vec::new();
    for article in catalog.articles() {
        // An unresolvable article fails its own page, the index lists the rest.
        let a = match catalog.resolve_article(article, lang) {
            Ok(a) => a,
            Err(e) => {
                warn(&format!("Leaving '{}' out of the article index: {}", article.slug, e));
                continue;
            }
        };
        let target = href(&PageRoute::with_slug(PageKind::ArticleDetail, &a.slug), lang);
        cards.push(format!(r#"<a href="{}" class="block bg-white rounded-2xl border border-stone-200 p-6 hover:shadow-lg" data-article="{}">
<span class="text-4xl">{}</span>
<h2 class="mt-3 text-xl font-bold">{}</h2>
<p class="mt-2 text-stone-600">{}</p>
</a>"#,
            attr(&target), attr(&a.slug), esc(&a.emoji), esc(&a.title), esc(&a.short)));
    }

    let body = format!(r#"<div class="max-w-6xl mx-auto px-4 py-12">
<h1 class="text-4xl font-bold">{}</h1>
<p class="mt-3 text-lg text-stone-600">{}</p>
<div class="grid md:grid-cols-3 gap-6 mt-10" data-section="articles">
{}
</div>
</div>"#,
        esc(&s.articles.index_title), esc(&s.articles.index_subtitle), cards.join("\n"));

    let shell = PageShell {
        route: &route,
        lang,
        title: format!("{} | PlantFinder", s.articles.index_title),
        description: s.articles.index_subtitle.clone(),
        schema: SchemaKind::WebPage,
        image: None,
    };
    html_page(&shell, &body, config)
}

/// A numbered mention card. The name links to the plant page only when that page is rendered.
fn plant_card(idx: usize, mention: &PlantMention, linked: bool, lang: Lang, config: &SiteConfig) -> String {
    let name = if linked {
        let target = href(&PageRoute::with_slug(PageKind::PlantDetail, &mention.plant_id), lang);
        format!(r#"<a href="{}" class="hover:text-emerald-700">{}</a>"#, attr(&target), esc(&mention.name))
    } else {
        esc(&mention.name)
    };

    let image = if linked && config.is_verified_image(&mention.plant_id) {
        format!(r#"<img src="{}" alt="{}" class="w-24 h-24 rounded-xl object-cover" loading="lazy">"#,
                attr(&config.image_src(&mention.plant_id)), attr(&mention.name))
    } else {
        r#"<div class="w-24 h-24 rounded-xl bg-gradient-to-br from-emerald-100 to-emerald-300 flex items-center justify-center text-3xl">🌿</div>"#.to_string()
    };

    let tags: String = mention.tags.iter()
        .map(|t| format!(r#"<span class="px-2 py-1 rounded-full text-xs bg-{c}-100 text-{c}-800">{}</span>"#,
                         esc(&t.text), c = attr(&t.color)))
        .collect();

    format!(r#"<div class="flex gap-5 bg-white rounded-2xl border border-stone-200 p-5" data-plant-mention="{id}">
{image}
<div>
<h3 class="text-xl font-bold"><span class="text-emerald-600">{n}.</span> {name}</h3>
<p class="mt-2 text-stone-600">{desc}</p>
<div class="mt-3 flex flex-wrap gap-2">{tags}</div>
</div>
</div>"#,
        id = attr(&mention.plant_id),
        image = image,
        n = idx + 1,
        name = name,
        desc = esc(&mention.description),
        tags = tags)
}

fn article_body(catalog: &Catalog, a: &ResolvedArticle, lang: Lang, config: &SiteConfig) -> String {
    let s = strings(lang);

    let crumbs = breadcrumb_html(&[
        (s.nav.home.clone(), Some(href(&PageRoute::new(PageKind::Home), lang))),
        (s.nav.guides.clone(), Some(href(&PageRoute::new(PageKind::ArticleIndex), lang))),
        (a.breadcrumb.clone(), None),
    ]);

    let badge = if a.badge.is_empty() {
        String::new()
    } else {
        format!(r#"<span class="inline-block px-3 py-1 rounded-full text-xs font-semibold bg-emerald-100 text-emerald-800">{}</span>"#,
                esc(&a.badge))
    };

    let plants = if a.plants.is_empty() {
        format!(r#"<p class="text-stone-500 italic" data-empty-state>{}</p>"#, esc(&s.articles.coming_soon))
    } else {
        a.plants.iter()
            .enumerate()
            .map(|(i, m)| plant_card(i, m, catalog.has_plant_page(&m.plant_id), lang, config))
            .collect::<Vec<String>>()
            .join("\n")
    };

    let tips = if a.tips.is_empty() {
        String::new()
    } else {
        let items: String = a.tips.iter()
            .map(|t| format!(r#"<div class="bg-emerald-50 rounded-xl p-5"><p class="text-2xl">{}</p><h3 class="mt-2 font-semibold">{}</h3><p class="mt-1 text-sm text-stone-600">{}</p></div>"#,
                             esc(&t.icon), esc(&t.title), esc(&t.text)))
            .collect();
        format!(r#"<section class="mt-12" data-section="tips"><h2 class="text-2xl font-bold mb-4">{}</h2><div class="grid md:grid-cols-2 gap-4">{}</div></section>"#,
                esc(&s.articles.essential_tips), items)
    };

    let mistakes = if a.mistakes.is_empty() {
        String::new()
    } else {
        let items: String = a.mistakes.iter()
            .map(|m| format!(r#"<li class="bg-amber-50 rounded-xl p-4"><p class="font-semibold text-amber-900">❌ {}</p><p class="mt-1 text-sm text-stone-600">{}</p></li>"#,
                             esc(&m.title), esc(&m.text)))
            .collect();
        format!(r#"<section class="mt-12" data-section="mistakes"><h2 class="text-2xl font-bold mb-4">{}</h2><ul class="space-y-3">{}</ul></section>"#,
                esc(&s.articles.common_mistakes), items)
    };

    format!(r#"<article class="max-w-4xl mx-auto px-4 py-8" data-article="{slug}">
{crumbs}
{badge}
<h1 class="mt-4 text-4xl font-bold">{h1}</h1>
<p class="mt-2 text-sm text-stone-500">{updated}</p>
<p class="mt-6 text-lg leading-relaxed">{intro}</p>
<section class="mt-10 space-y-6" data-section="plants">
{plants}
</section>
{tips}
{mistakes}
<section class="mt-12 rounded-2xl bg-emerald-700 text-white p-8 text-center" data-section="quiz-cta">
<h2 class="text-2xl font-bold">{find_perfect}</h2>
<p class="mt-2">{quiz_text}</p>
<div class="mt-6 flex justify-center gap-4">
<a href="{quiz_href}" class="px-5 py-3 rounded-xl bg-white text-emerald-800 font-semibold">{take_quiz}</a>
<a href="{search_href}" class="px-5 py-3 rounded-xl border border-white font-semibold">{explore}</a>
</div>
</section>
<p class="mt-8"><a href="{guides_href}" class="text-emerald-700 font-semibold">← {back_to_guides}</a></p>
</article>"#,
        slug = attr(&a.slug),
        crumbs = crumbs,
        badge = badge,
        h1 = esc(&a.h1),
        updated = esc(&s.articles.updated),
        intro = esc(&a.intro),
        plants = plants,
        tips = tips,
        mistakes = mistakes,
        find_perfect = esc(&s.articles.find_perfect_plant),
        quiz_text = esc(&s.articles.quiz_cta_text),
        quiz_href = attr(&href(&PageRoute::new(PageKind::Quiz), lang)),
        take_quiz = esc(&s.articles.take_quiz),
        search_href = attr(&href(&PageRoute::new(PageKind::Search), lang)),
        explore = esc(&s.articles.explore_plants),
        guides_href = attr(&href(&PageRoute::new(PageKind::ArticleIndex), lang)),
        back_to_guides = esc(&s.articles.back_to_guides))
}

pub fn render_article_page(catalog: &Catalog, article: &ResolvedArticle, config: &SiteConfig) -> Result<String, SiteError> {
    let route = PageRoute::with_slug(PageKind::ArticleDetail, &article.slug);
    let body = article_body(catalog, article, article.lang, config);

    let shell = PageShell {
        route: &route,
        lang: article.lang,
        title: format!("{} | PlantFinder", article.title),
        description: article.description.clone(),
        schema: SchemaKind::Article,
        image: None,
    };
    html_page(&shell, &body, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use crate::models::{PlantRecord, Tag, Tip};

    fn catalog() -> Catalog {
        let plants: Vec<PlantRecord> = vec![
            serde_json::from_value(serde_json::json!({ "id": "peace-lily", "name": "Peace Lily" })).unwrap(),
            serde_json::from_value(serde_json::json!({ "id": "snake-plant", "name": "Snake Plant", "humidity": 0 })).unwrap(),
        ];
        Catalog::new(plants, BTreeMap::new(), vec![])
    }

    fn article(lang: Lang) -> ResolvedArticle {
        ResolvedArticle {
            slug: "low-light-plants".to_string(),
            lang,
            title: "Best Low Light Plants".to_string(),
            description: "Plants for dark rooms".to_string(),
            short: "Dark corners".to_string(),
            emoji: "🌑".to_string(),
            badge: "Guide".to_string(),
            h1: "Best Low Light Plants".to_string(),
            intro: "Not every room is sunny.".to_string(),
            breadcrumb: "Low Light".to_string(),
            plants: vec![],
            tips: vec![],
            mistakes: vec![],
        }
    }

    #[test]
    fn test_empty_article_shows_coming_soon() {
        let html = render_article_page(&catalog(), &article(Lang::De), &SiteConfig::default()).unwrap();
        assert!(html.contains(&strings(Lang::De).articles.coming_soon));
        assert!(html.contains(&format!(r#"<a href="/de/articles/" class="text-emerald-700 font-semibold">← {}</a>"#,
                                       strings(Lang::De).articles.back_to_guides)));
        assert!(html.contains(r#"href="https://plantfinder.org/de/articles/low-light-plants/""#));
        assert!(!html.contains(r#"data-section="tips""#));
    }

    #[test]
    fn test_numbered_plant_cards() {
        let mut a = article(Lang::Es);
        a.plants = vec![
            PlantMention {
                name: "Snake Plant".to_string(),
                plant_id: "snake-plant".to_string(),
                description: "Tough".to_string(),
                tags: vec![Tag { text: "Low light".to_string(), color: "emerald".to_string() }],
            },
            PlantMention {
                name: "Peace Lily".to_string(),
                plant_id: "peace-lily".to_string(),
                ..Default::default()
            },
        ];
        a.tips = vec![Tip { icon: "💡".to_string(), title: "Rotate".to_string(), text: "Turn pots".to_string() }];

        let html = render_article_page(&catalog(), &a, &SiteConfig::default()).unwrap();
        assert!(html.contains(r#"<span class="text-emerald-600">2.</span> <a href="/es/plants/peace-lily/""#));
        assert!(html.contains(r#"src="/images/plants/peace-lily.png""#));
        // The snake plant page is not rendered (humidity 0), so its mention is plain text.
        assert!(html.contains(r#"<span class="text-emerald-600">1.</span> Snake Plant</h3>"#));
        assert!(!html.contains("/es/plants/snake-plant/"));
        assert!(html.contains(r#"data-section="tips""#));
    }
}
