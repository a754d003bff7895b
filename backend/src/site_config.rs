use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Serialize, Deserialize};

use crate::errors::SiteError;
use crate::types::Lang;

pub static DEFAULT_BASE_URL: &str = "https://plantfinder.org";
pub static REPLICATE_MODEL_URL: &str =
    "https://api.replicate.com/v1/models/black-forest-labs/flux-1.1-pro/predictions";
pub static REPLICATE_PREDICTIONS_URL: &str = "https://api.replicate.com/v1/predictions";

/// Everything a generation run needs, constructed once at start-up and passed down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub output_dir: PathBuf,
    pub plants_file: PathBuf,
    pub translation_files: BTreeMap<Lang, PathBuf>,
    pub articles_file: PathBuf,
    pub languages: Vec<Lang>,
    pub analytics_id: Option<String>,
    pub verified_images: Vec<String>,
    pub image_extension: String,
    pub images_dir: PathBuf,
    pub strict_references: bool,
    pub popular_plants_count: usize,
    pub image_api: ImageApiSettings,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let mut translation_files = BTreeMap::new();
        translation_files.insert(Lang::Es, PathBuf::from("data/plants_es.json"));
        translation_files.insert(Lang::De, PathBuf::from("data/plants_de.json"));

        SiteConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from("site"),
            plants_file: PathBuf::from("data/plants.json"),
            translation_files,
            articles_file: PathBuf::from("data/articles.json"),
            languages: Lang::ALL.to_vec(),
            analytics_id: None,
            verified_images: [
                "monstera-deliciosa",
                "boston-fern",
                "pothos-golden",
                "aloe-vera",
                "jade-plant",
                "bunny-ears-cactus",
                "areca-palm",
                "haworthia-zebra",
                "peace-lily",
            ].iter().map(|s| s.to_string()).collect(),
            image_extension: "png".to_string(),
            images_dir: PathBuf::from("site/images/plants"),
            strict_references: true,
            popular_plants_count: 8,
            image_api: ImageApiSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageApiSettings {
    pub create_url: String,
    pub predictions_url: String,
    pub poll_interval_ms: u64,
    pub timeout_secs: u64,
    pub delay_between_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for ImageApiSettings {
    fn default() -> Self {
        ImageApiSettings {
            create_url: REPLICATE_MODEL_URL.to_string(),
            predictions_url: REPLICATE_PREDICTIONS_URL.to_string(),
            poll_interval_ms: 2000,
            timeout_secs: 60,
            delay_between_ms: 500,
            request_timeout_secs: 30,
        }
    }
}

impl ImageApiSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn delay_between(&self) -> Duration {
        Duration::from_millis(self.delay_between_ms)
    }
}

impl SiteConfig {
    /// Read a JSON config file. Keys that are left out keep their default values.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SiteError::MissingInput(path.to_path_buf()).into());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: SiteConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SiteError> {
        if self.languages.is_empty() {
            return Err(SiteError::Config("at least one language must be configured".to_string()));
        }
        for (i, lang) in self.languages.iter().enumerate() {
            if self.languages[..i].contains(lang) {
                return Err(SiteError::Config(format!("language '{}' is listed more than once", lang)));
            }
        }
        // The x-default alternate and the unprefixed root both point at English.
        if !self.languages.contains(&Lang::En) {
            return Err(SiteError::Config("English must be one of the configured languages".to_string()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(SiteError::Config(format!("base_url must be an absolute URL: {}", self.base_url)));
        }
        Ok(())
    }

    pub fn is_verified_image(&self, plant_id: &str) -> bool {
        self.verified_images.iter().any(|id| id == plant_id)
    }

    pub fn image_src(&self, plant_id: &str) -> String {
        format!("/images/plants/{}.{}", plant_id, self.image_extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: SiteConfig = serde_json::from_str(r#"{"output_dir": "out", "languages": ["en", "es"]}"#)
            .expect("parse");
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.languages, vec![Lang::En, Lang::Es]);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.strict_references);
        assert_eq!(config.image_api.poll_interval(), Duration::from_secs(2));
    }

    #[test]
    fn test_english_required() {
        let config = SiteConfig { languages: vec![Lang::Es], ..Default::default() };
        assert!(config.validate().is_err());
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn test_duplicate_language_rejected() {
        let config = SiteConfig { languages: vec![Lang::En, Lang::Es, Lang::En], ..Default::default() };
        assert_eq!(config.validate(),
                   Err(SiteError::Config("language 'en' is listed more than once".to_string())));

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("site.json");
        std::fs::write(&path, r#"{"languages": ["en", "en"]}"#).unwrap();
        assert!(SiteConfig::from_file(&path).is_err());
    }
}
