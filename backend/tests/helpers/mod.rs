use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use plantfinder_backend::{Lang, SiteConfig};

pub fn sample_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../data")
}

/// A scratch directory holding a copy of the sample data, and a config that
/// reads from it and writes the site under `site/`.
pub struct TestSite {
    pub dir: TempDir,
    pub config: SiteConfig,
}

impl TestSite {
    pub fn root(&self) -> &Path {
        &self.config.output_dir
    }

    pub fn read_page(&self, rel: &str) -> String {
        fs::read_to_string(self.root().join(rel))
            .unwrap_or_else(|e| panic!("{}: {}", rel, e))
    }

    pub fn write_page(&self, rel: &str, html: &str) -> PathBuf {
        let path = self.root().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, html).unwrap();
        path
    }
}

pub fn test_site() -> TestSite {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    fs::create_dir_all(&data).unwrap();
    for name in ["plants.json", "plants_es.json", "plants_de.json", "articles.json"] {
        fs::copy(sample_data_dir().join(name), data.join(name)).unwrap();
    }

    let mut config = SiteConfig {
        output_dir: dir.path().join("site"),
        plants_file: data.join("plants.json"),
        articles_file: data.join("articles.json"),
        images_dir: dir.path().join("site/images/plants"),
        ..Default::default()
    };
    config.translation_files.insert(Lang::Es, data.join("plants_es.json"));
    config.translation_files.insert(Lang::De, data.join("plants_de.json"));

    TestSite { dir, config }
}

#[allow(dead_code)]
pub fn plant_ids(site: &TestSite) -> Vec<String> {
    let text = fs::read_to_string(&site.config.plants_file).unwrap();
    let values: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();
    values.iter()
        .filter_map(|v| v["id"].as_str().map(|s| s.to_string()))
        .collect()
}

#[allow(dead_code)]
pub fn plant_page_rel(id: &str, lang: Lang) -> String {
    match lang {
        Lang::En => format!("plants/{}/index.html", id),
        _ => format!("{}/plants/{}/index.html", lang.code(), id),
    }
}
