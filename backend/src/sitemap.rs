use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::file_writer::write_atomic;
use crate::models::GeneratedPage;
use crate::types::{Lang, PageRoute};

fn xml_escape(s: &str) -> String {
    html_escape::encode_double_quoted_attribute(s).to_string()
}

/// Build `sitemap.xml` from the pages that were actually written. Each page gets
/// one `<url>` entry with hreflang alternates for the locales its route was written in.
pub fn sitemap_xml(pages: &[GeneratedPage], base_url: &str, lastmod: &str) -> String {
    // Routes in first-seen order, with the locales each one was written in.
    let mut routes: Vec<(&PageRoute, Vec<Lang>)> = Vec::new();
    for page in pages {
        match routes.iter_mut().find(|(r, _)| *r == &page.route) {
            Some((_, langs)) => {
                if !langs.contains(&page.lang) {
                    langs.push(page.lang);
                }
            }
            None => routes.push((&page.route, vec![page.lang])),
        }
    }

    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" xmlns:xhtml="http://www.w3.org/1999/xhtml">"#);
    xml.push('\n');

    for (route, langs) in routes.iter() {
        let alternates: String = langs.iter()
            .map(|l| format!("    <xhtml:link rel=\"alternate\" hreflang=\"{}\" href=\"{}\"/>\n",
                             l.code(), xml_escape(&route.url(base_url, *l))))
            .collect();
        let x_default = if langs.contains(&Lang::En) {
            format!("    <xhtml:link rel=\"alternate\" hreflang=\"x-default\" href=\"{}\"/>\n",
                    xml_escape(&route.url(base_url, Lang::En)))
        } else {
            String::new()
        };

        for lang in langs {
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", xml_escape(&route.url(base_url, *lang))));
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", xml_escape(lastmod)));
            xml.push_str(&format!("    <priority>{}</priority>\n", route.kind.sitemap_priority()));
            xml.push_str(&alternates);
            xml.push_str(&x_default);
            xml.push_str("  </url>\n");
        }
    }

    xml.push_str("</urlset>\n");
    xml
}

pub fn write_sitemap(root: &Path, pages: &[GeneratedPage], base_url: &str) -> Result<PathBuf> {
    let lastmod = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let path = root.join("sitemap.xml");
    write_atomic(&path, sitemap_xml(pages, base_url, &lastmod).as_bytes())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PageKind;

    fn page(route: PageRoute, lang: Lang) -> GeneratedPage {
        let path = route.output_file(Path::new("site"), lang);
        GeneratedPage { route, lang, path }
    }

    #[test]
    fn test_one_url_per_written_page() {
        let plant = PageRoute::with_slug(PageKind::PlantDetail, "snake-plant");
        let pages = vec![
            page(PageRoute::new(PageKind::Home), Lang::En),
            page(plant.clone(), Lang::En),
            page(plant.clone(), Lang::Es),
        ];
        let xml = sitemap_xml(&pages, "https://plantfinder.org", "2026-01-01");

        assert_eq!(xml.matches("<url>").count(), 3);
        assert!(xml.contains("<loc>https://plantfinder.org/</loc>\n    <lastmod>2026-01-01</lastmod>\n    <priority>1.0</priority>"));
        assert!(xml.contains("<loc>https://plantfinder.org/es/plants/snake-plant/</loc>"));
        assert!(xml.contains(r#"hreflang="es" href="https://plantfinder.org/es/plants/snake-plant/""#));
        assert!(!xml.contains(r#"hreflang="de""#));
        assert_eq!(xml.matches("<priority>0.8</priority>").count(), 2);
    }

    #[test]
    fn test_urls_are_escaped() {
        let pages = vec![page(PageRoute::new(PageKind::About), Lang::En)];
        let xml = sitemap_xml(&pages, "https://example.org/?a=1&b=2", "2026-01-01");
        assert!(xml.contains("https://example.org/?a=1&amp;b=2/about/"));
        assert!(!xml.contains("a=1&b"));
    }
}
