use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::article_page::{render_article_index, render_article_page};
use crate::data_loader::Catalog;
use crate::errors::SiteError;
use crate::file_writer::write_atomic;
use crate::logger::{debug, error, format_duration, info, warn};
use crate::models::GeneratedPage;
use crate::plant_page::render_plant_page;
use crate::site_config::SiteConfig;
use crate::sitemap::write_sitemap;
use crate::static_pages::render_static_page;
use crate::types::{Lang, PageKind, PageRoute};

#[derive(Debug, Default)]
pub struct GenerationReport {
    pub written: Vec<GeneratedPage>,
    /// Pages that were not rendered, with the reason: `(path, reason)`.
    pub failed: Vec<(String, String)>,
    pub skipped_records: Vec<String>,
    pub sitemap: Option<PathBuf>,
}

pub struct SiteGenerator<'a> {
    config: &'a SiteConfig,
    catalog: &'a Catalog,
}

impl<'a> SiteGenerator<'a> {
    pub fn new(config: &'a SiteConfig, catalog: &'a Catalog) -> Self {
        SiteGenerator { config, catalog }
    }

    /// Every logical page of the site, in output order.
    pub fn routes(&self) -> Vec<PageRoute> {
        let mut routes: Vec<PageRoute> = PageKind::STATIC_PAGES.iter()
            .map(|k| PageRoute::new(*k))
            .collect();
        routes.push(PageRoute::new(PageKind::ArticleIndex));
        for article in self.catalog.articles() {
            routes.push(PageRoute::with_slug(PageKind::ArticleDetail, &article.slug));
        }
        for plant in self.catalog.plants() {
            routes.push(PageRoute::with_slug(PageKind::PlantDetail, &plant.id));
        }
        routes
    }

    /// Article plant mentions must name known plants. In strict mode the first
    /// dangling reference is returned as an error, otherwise they are only logged.
    pub fn check_references(&self) -> Result<(), SiteError> {
        let dangling = self.catalog.dangling_references(&self.config.languages);
        for e in dangling.iter() {
            if self.config.strict_references {
                error(&e.to_string());
            } else {
                warn(&e.to_string());
            }
        }
        match dangling.into_iter().next() {
            Some(e) if self.config.strict_references => Err(e),
            _ => Ok(()),
        }
    }

    pub fn render(&self, route: &PageRoute, lang: Lang) -> Result<String, SiteError> {
        let slug = route.slug.as_deref().unwrap_or_default();
        match route.kind {
            PageKind::PlantDetail => {
                let plant = self.catalog.plant(slug)
                    .ok_or_else(|| SiteError::Template(format!("unknown plant '{}'", slug)))?;
                render_plant_page(self.catalog, plant, lang, self.config)
            }
            PageKind::ArticleDetail => {
                let article = self.catalog.articles().iter()
                    .find(|a| a.slug == slug)
                    .ok_or_else(|| SiteError::Template(format!("unknown article '{}'", slug)))?;
                let resolved = self.catalog.resolve_article(article, lang)?;
                render_article_page(self.catalog, &resolved, self.config)
            }
            PageKind::ArticleIndex => render_article_index(self.catalog, lang, self.config),
            kind => render_static_page(kind, self.catalog, lang, self.config),
        }
    }

    /// Render and write every (page, language) pair, then the sitemap of the pages
    /// that were written. A page that fails to render is logged and skipped.
    pub fn generate(&self) -> Result<GenerationReport> {
        let start = Instant::now();
        self.config.validate()?;
        self.check_references()?;

        let mut report = GenerationReport {
            skipped_records: self.catalog.skipped().to_vec(),
            ..Default::default()
        };
        let root = &self.config.output_dir;

        for route in self.routes() {
            for lang in self.config.languages.iter() {
                let path = route.output_file(root, *lang);
                match self.render(&route, *lang) {
                    Ok(html) => {
                        write_atomic(&path, html.as_bytes())
                            .with_context(|| format!("Failed to write {}", path.display()))?;
                        debug(&format!("Wrote {}", path.display()));
                        report.written.push(GeneratedPage { route: route.clone(), lang: *lang, path });
                    }
                    Err(e) => {
                        warn(&format!("Skipping {}: {}", route.path(*lang), e));
                        report.failed.push((route.path(*lang), e.to_string()));
                    }
                }
            }
        }

        let sitemap = write_sitemap(root, &report.written, &self.config.base_url)?;
        report.sitemap = Some(sitemap);

        info(&format!("Generated {} pages ({} failed) in {}",
                      report.written.len(), report.failed.len(), format_duration(start.elapsed())));
        Ok(report)
    }
}

/// Load the inputs named by the config and build the whole site.
pub fn generate_site(config: &SiteConfig) -> Result<GenerationReport> {
    let catalog = Catalog::load(config)?;
    SiteGenerator::new(config, &catalog).generate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use crate::models::{ArticleLocale, ArticleRecord, PlantMention};

    fn catalog(with_dangling: bool) -> Catalog {
        let plants = vec![serde_json::from_value(serde_json::json!({ "id": "zz-plant", "name": "ZZ Plant" })).unwrap()];
        let mention = PlantMention {
            name: "Ghost".to_string(),
            plant_id: if with_dangling { "ghost".to_string() } else { "zz-plant".to_string() },
            ..Default::default()
        };
        let mut locales = BTreeMap::new();
        locales.insert(Lang::En, ArticleLocale {
            title: Some("Guide".to_string()),
            plants: vec![mention],
            ..Default::default()
        });
        Catalog::new(plants, BTreeMap::new(), vec![ArticleRecord { slug: "guide".to_string(), locales }])
    }

    #[test]
    fn test_routes_cover_every_page() {
        let config = SiteConfig::default();
        let c = catalog(false);
        let routes = SiteGenerator::new(&config, &c).routes();
        assert_eq!(routes.len(), 6 + 1 + 1 + 1);
        assert!(routes.contains(&PageRoute::with_slug(PageKind::PlantDetail, "zz-plant")));
    }

    #[test]
    fn test_strict_references_abort_before_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = SiteConfig { output_dir: dir.path().join("site"), ..Default::default() };
        let c = catalog(true);
        let res = SiteGenerator::new(&config, &c).generate();
        assert!(res.is_err());
        assert!(!config.output_dir.exists());

        let lenient = SiteConfig { strict_references: false, ..config };
        let report = SiteGenerator::new(&lenient, &c).generate().unwrap();
        assert_eq!(report.written.len(), 9 * 3);
    }
}
