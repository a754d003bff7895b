use serde::Serialize;
use tinytemplate::TinyTemplate;

use crate::errors::SiteError;
use crate::i18n::strings;
use crate::site_config::SiteConfig;
use crate::types::{Lang, PageKind, PageRoute};

static PAGE_HTML: &str = include_str!("../../assets/templates/page.html");
static NAV_HTML: &str = include_str!("../../assets/templates/nav.html");
static FOOTER_HTML: &str = include_str!("../../assets/templates/footer.html");
static LANG_SELECTOR_HTML: &str = include_str!("../../assets/templates/lang_selector.html");

/// Text content, escaped for use between tags.
pub fn esc(s: &str) -> String {
    html_escape::encode_text(s).to_string()
}

/// Escaped for use inside a double-quoted attribute value.
pub fn attr(s: &str) -> String {
    html_escape::encode_double_quoted_attribute(s).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Article,
    WebPage,
}

/// Head metadata of one page. `title` and `description` are plain text.
#[derive(Debug, Clone)]
pub struct PageShell<'a> {
    pub route: &'a PageRoute,
    pub lang: Lang,
    pub title: String,
    pub description: String,
    pub schema: SchemaKind,
    pub image: Option<String>,
}

#[derive(Serialize)]
struct TmplContext {
    lang: String,
    title: String,
    description: String,
    canonical: String,
    hreflang_links: String,
    og_type: String,
    og_locale: String,
    og_image: String,
    analytics_html: String,
    json_ld: String,
    nav_html: String,
    content: String,
    footer_html: String,
}

#[derive(Serialize)]
struct Link {
    href: String,
    label: String,
}

#[derive(Serialize)]
struct NavContext {
    home_href: String,
    links: Vec<Link>,
    lang_selector: String,
}

#[derive(Serialize)]
struct FooterContext {
    tagline: String,
    links: Vec<Link>,
    copyright: String,
}

#[derive(Serialize)]
struct SelectorOption {
    href: String,
    label: String,
    selected: bool,
}

#[derive(Serialize)]
struct SelectorContext {
    aria_label: String,
    options: Vec<SelectorOption>,
}

fn template_err(name: &str, e: tinytemplate::error::Error) -> SiteError {
    SiteError::Template(format!("{}: {}", name, e))
}

fn render_template<C: Serialize>(name: &'static str, text: &'static str, ctx: &C) -> Result<String, SiteError> {
    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template(name, text).map_err(|e| template_err(name, e))?;
    tt.render(name, ctx).map_err(|e| template_err(name, e))
}

fn og_locale(lang: Lang) -> &'static str {
    match lang {
        Lang::En => "en_US",
        Lang::Es => "es_ES",
        Lang::De => "de_DE",
    }
}

/// Link target for a page in the given locale, prefixed with `/{lang}` except for English.
pub fn href(route: &PageRoute, lang: Lang) -> String {
    route.path(lang)
}

/// The in-navigation language selector. `options` pairs each locale with the
/// address of the same page in that locale.
pub fn lang_selector_html(current: Lang, options: &[(Lang, String)]) -> Result<String, SiteError> {
    let ctx = SelectorContext {
        aria_label: attr(&strings(current).select_language),
        options: options.iter()
            .map(|(lang, target)| SelectorOption {
                href: attr(target),
                label: esc(&strings(*lang).lang_name),
                selected: *lang == current,
            })
            .collect(),
    };
    render_template("lang_selector_html", LANG_SELECTOR_HTML, &ctx)
}

fn nav_html(route: &PageRoute, lang: Lang, config: &SiteConfig) -> Result<String, SiteError> {
    let s = strings(lang);
    let link = |kind: PageKind, label: &str| Link {
        href: attr(&href(&PageRoute::new(kind), lang)),
        label: esc(label),
    };

    let selector_options: Vec<(Lang, String)> = config.languages.iter()
        .map(|l| (*l, route.path(*l)))
        .collect();

    let ctx = NavContext {
        home_href: attr(&href(&PageRoute::new(PageKind::Home), lang)),
        links: vec![
            link(PageKind::Search, &s.nav.plants),
            link(PageKind::Quiz, &s.nav.quiz),
            link(PageKind::Compare, &s.nav.compare),
            link(PageKind::ArticleIndex, &s.nav.guides),
            link(PageKind::About, &s.nav.about),
        ],
        lang_selector: lang_selector_html(lang, &selector_options)?,
    };
    render_template("nav_html", NAV_HTML, &ctx)
}

fn footer_html(lang: Lang) -> Result<String, SiteError> {
    let s = strings(lang);
    let link = |kind: PageKind, label: &str| Link {
        href: attr(&href(&PageRoute::new(kind), lang)),
        label: esc(label),
    };

    let ctx = FooterContext {
        tagline: esc(&s.footer.tagline),
        links: vec![
            link(PageKind::Home, &s.nav.home),
            link(PageKind::Search, &s.nav.search),
            link(PageKind::Quiz, &s.nav.quiz),
            link(PageKind::Compare, &s.nav.compare),
            link(PageKind::ArticleIndex, &s.nav.guides),
            link(PageKind::Faq, &s.faq.title),
            link(PageKind::About, &s.nav.about),
        ],
        copyright: esc(&s.footer.copyright),
    };
    render_template("footer_html", FOOTER_HTML, &ctx)
}

fn hreflang_links(route: &PageRoute, config: &SiteConfig) -> String {
    let mut links: Vec<String> = config.languages.iter()
        .map(|l| format!(r#"<link rel="alternate" hreflang="{}" href="{}">"#,
                         l.code(), attr(&route.url(&config.base_url, *l))))
        .collect();
    links.push(format!(r#"<link rel="alternate" hreflang="x-default" href="{}">"#,
                       attr(&route.url(&config.base_url, Lang::En))));
    links.join("\n")
}

fn analytics_html(config: &SiteConfig) -> String {
    let Some(id) = config.analytics_id.as_deref().filter(|s| !s.trim().is_empty()) else {
        return String::new();
    };
    let id_attr = attr(id);
    let id_js = serde_json::to_string(id).unwrap_or_default().replace("</", "<\\/");
    format!(r#"<script async src="https://www.googletagmanager.com/gtag/js?id={id_attr}"></script>
<script>
  window.dataLayer = window.dataLayer || [];
  function gtag(){{dataLayer.push(arguments);}}
  gtag('js', new Date());
  gtag('config', {id_js});
</script>"#)
}

/// Serialize structured data for a `<script type="application/ld+json">` block.
/// Quotes and control characters are escaped by the serializer; `</` is escaped
/// so the text cannot close the script element.
pub fn json_ld(value: &serde_json::Value) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/")
}

fn json_ld_value(shell: &PageShell, canonical: &str) -> serde_json::Value {
    match shell.schema {
        SchemaKind::Article => {
            let mut v = serde_json::json!({
                "@context": "https://schema.org",
                "@type": "Article",
                "headline": shell.title,
                "description": shell.description,
                "url": canonical,
                "inLanguage": shell.lang.code(),
                "author": { "@type": "Organization", "name": "PlantFinder" },
                "publisher": { "@type": "Organization", "name": "PlantFinder" },
            });
            if let (Some(image), Some(obj)) = (&shell.image, v.as_object_mut()) {
                obj.insert("image".to_string(), serde_json::Value::String(image.clone()));
            }
            v
        }
        SchemaKind::WebPage => serde_json::json!({
            "@context": "https://schema.org",
            "@type": "WebPage",
            "name": shell.title,
            "description": shell.description,
            "url": canonical,
            "inLanguage": shell.lang.code(),
        }),
    }
}

/// Wrap a rendered body in the full document: head metadata, navigation and footer.
pub fn html_page(shell: &PageShell, content: &str, config: &SiteConfig) -> Result<String, SiteError> {
    let canonical = shell.route.url(&config.base_url, shell.lang);

    let ctx = TmplContext {
        lang: shell.lang.code().to_string(),
        title: attr(&shell.title),
        description: attr(&shell.description),
        canonical: attr(&canonical),
        hreflang_links: hreflang_links(shell.route, config),
        og_type: match shell.schema {
            SchemaKind::Article => "article".to_string(),
            SchemaKind::WebPage => "website".to_string(),
        },
        og_locale: og_locale(shell.lang).to_string(),
        og_image: shell.image.as_ref()
            .map(|src| format!(r#"<meta property="og:image" content="{}">"#, attr(src)))
            .unwrap_or_default(),
        analytics_html: analytics_html(config),
        json_ld: json_ld(&json_ld_value(shell, &canonical)),
        nav_html: nav_html(shell.route, shell.lang, config)?,
        content: content.to_string(),
        footer_html: footer_html(shell.lang)?,
    };

    render_template("page_html", PAGE_HTML, &ctx)
}

/// Breadcrumb trail. The last entry is the current page and is not linked.
pub fn breadcrumb_html(items: &[(String, Option<String>)]) -> String {
    let parts: Vec<String> = items.iter()
        .map(|(label, target)| match target {
            Some(t) => format!(r#"<a href="{}" class="hover:text-emerald-700">{}</a>"#, attr(t), esc(label)),
            None => format!(r#"<span class="text-stone-800">{}</span>"#, esc(label)),
        })
        .collect();
    format!(r#"<nav aria-label="Breadcrumb" class="text-sm text-stone-500 mb-6">{}</nav>"#,
            parts.join(r#" <span class="mx-1">/</span> "#))
}

/// Absolute URL of a site-relative path.
pub fn absolute_url(config: &SiteConfig, path: &str) -> String {
    format!("{}{}", config.base_url.trim_end_matches('/'), path)
}
