use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::errors::SiteError;
use crate::file_writer::write_atomic;
use crate::logger::{info, warn};
use crate::models::PlantRecord;
use crate::site_config::{ImageApiSettings, SiteConfig};
use crate::types::{Category, Size};

pub static API_TOKEN_VAR: &str = "REPLICATE_API_TOKEN";

/// Read the API token once at start-up. A missing or empty token is a configuration error.
pub fn api_token_from_env() -> Result<String, SiteError> {
    api_token(std::env::var(API_TOKEN_VAR).ok())
}

fn api_token(value: Option<String>) -> Result<String, SiteError> {
    value
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| SiteError::MissingToken(API_TOKEN_VAR.to_string()))
}

/// The subset of a prediction resource the fetcher reads.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Prediction {
    pub id: Option<String>,
    pub status: Option<String>,
    pub output: Option<serde_json::Value>,
    pub error: Option<serde_json::Value>,
}

impl Prediction {
    /// First output URL. The API returns either a string or a list of strings.
    pub fn output_url(&self) -> Option<String> {
        match self.output.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Array(items) => items.iter()
                .find_map(|v| v.as_str().map(|s| s.to_string())),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// The remote image-generation service.
pub trait PredictionApi {
    fn create(&self, prompt: &str) -> Result<Prediction>;
    fn get(&self, id: &str) -> Result<Prediction>;
    fn download(&self, url: &str) -> Result<Vec<u8>>;
}

#[derive(Serialize)]
struct PredictionInput<'a> {
    prompt: &'a str,
    aspect_ratio: &'a str,
    output_format: &'a str,
    output_quality: u8,
    safety_tolerance: u8,
    prompt_upsampling: bool,
}

#[derive(Serialize)]
struct PredictionRequest<'a> {
    input: PredictionInput<'a>,
}

pub struct ReplicateClient {
    client: reqwest::blocking::Client,
    token: String,
    settings: ImageApiSettings,
    output_format: String,
}

impl ReplicateClient {
    pub fn new(token: &str, settings: &ImageApiSettings, output_format: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(ReplicateClient {
            client,
            token: token.to_string(),
            settings: settings.clone(),
            output_format: output_format.to_string(),
        })
    }

    fn read_prediction(response: reqwest::blocking::Response) -> Result<Prediction> {
        let status = response.status();
        let prediction: Prediction = response
            .json()
            .map_err(|e| anyhow!("Failed to parse prediction response ({}): {}", status, e))?;
        if !status.is_success() {
            let msg = prediction.error_message().unwrap_or_else(|| status.to_string());
            return Err(anyhow!("API returned error status {}: {}", status, msg));
        }
        Ok(prediction)
    }
}

impl PredictionApi for ReplicateClient {
    fn create(&self, prompt: &str) -> Result<Prediction> {
        let body = PredictionRequest {
            input: PredictionInput {
                prompt,
                aspect_ratio: "4:5",
                output_format: &self.output_format,
                output_quality: 100,
                safety_tolerance: 2,
                prompt_upsampling: true,
            },
        };

        let response = self.client
            .post(&self.settings.create_url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .map_err(|e| anyhow!("Failed to create prediction: {}", e))?;

        Self::read_prediction(response)
    }

    fn get(&self, id: &str) -> Result<Prediction> {
        let url = format!("{}/{}", self.settings.predictions_url.trim_end_matches('/'), id);
        let response = self.client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| anyhow!("Failed to poll prediction {}: {}", id, e))?;

        Self::read_prediction(response)
    }

    fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client
            .get(url)
            .send()
            .map_err(|e| anyhow!("Failed to download {}: {}", url, e))?;

        if !response.status().is_success() {
            return Err(anyhow!("Download returned error status: {}", response.status()));
        }

        let bytes = response.bytes().map_err(|e| anyhow!("Failed to read image body: {}", e))?;
        Ok(bytes.to_vec())
    }
}

/// Studio photo prompt tuned to the plant's category and size.
pub fn image_prompt(plant: &PlantRecord) -> String {
    let (container, style) = match plant.category {
        Category::Succulent => ("a modern minimalist ceramic pot", "showing the succulent rosette or compact form"),
        Category::Cactus => ("a terracotta pot", "showing the distinctive cactus form and spines"),
        Category::Trailing => ("a white ceramic hanging planter", "with beautiful trailing vines cascading down"),
        Category::Fern => ("an elegant ceramic pot", "with lush feathery fronds"),
        Category::Palm => ("a woven basket planter", "with graceful arching fronds"),
        Category::Flowering => ("a decorative ceramic pot", "showcasing blooms or elegant flowers"),
        Category::Foliage => ("a minimalist white ceramic pot", "showcasing the beautiful foliage"),
    };

    let size_desc = match plant.size {
        Size::Large => "a full-sized mature",
        Size::Small => "a compact",
        Size::Medium => "a healthy",
    };

    let name = if plant.name.trim().is_empty() { plant.id.replace('-', " ") } else { plant.name.clone() };

    format!("Ultra realistic studio photograph of {size_desc} {name} houseplant in {container}, {style}. \
The plant is framed in a vertical 4:5 portrait composition, centered, with the pot at the bottom third. \
Soft diffused studio lighting, shallow depth of field creating a professional look. \
Seamless light grey studio background with subtle natural shadow under the pot. \
Professional botanical photography style, crisp focus on the plant, no props, no text, no watermarks. \
The plant should look healthy, vibrant, and true to species characteristics.")
}

/// Poll a prediction until it reaches a final state or `settings.timeout()` elapses.
/// Returns the output URL, or a failure reason.
pub fn wait_for_prediction(api: &dyn PredictionApi, id: &str, settings: &ImageApiSettings) -> Result<String, String> {
    let start = Instant::now();

    while start.elapsed() < settings.timeout() {
        match api.get(id) {
            Ok(p) => match p.status.as_deref() {
                Some("succeeded") => {
                    return p.output_url().ok_or_else(|| "succeeded without output".to_string());
                }
                Some("failed") => {
                    return Err(format!("failed: {}", p.error_message().unwrap_or_else(|| "unknown error".to_string())));
                }
                Some("canceled") => return Err("canceled".to_string()),
                _ => {}
            },
            // Transient poll errors are retried until the deadline.
            Err(e) => warn(&format!("Poll error for {}: {}", id, e)),
        }
        thread::sleep(settings.poll_interval());
    }

    Err("timeout".to_string())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImageReport {
    pub generated: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl ImageReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

pub fn image_path(config: &SiteConfig, plant_id: &str) -> PathBuf {
    config.images_dir.join(format!("{}.{}", plant_id, config.image_extension))
}

fn generate_one(api: &dyn PredictionApi, plant: &PlantRecord, path: &Path, settings: &ImageApiSettings) -> Result<usize, String> {
    let created = api.create(&image_prompt(plant)).map_err(|e| e.to_string())?;
    if let Some(msg) = created.error_message() {
        return Err(format!("API error: {}", msg));
    }
    let id = created.id.ok_or_else(|| "no prediction id returned".to_string())?;

    let url = wait_for_prediction(api, &id, settings)?;
    let bytes = api.download(&url).map_err(|e| e.to_string())?;
    write_atomic(path, &bytes).map_err(|e| e.to_string())?;
    Ok(bytes.len())
}

/// Fetch a photo for every plant without one. Failures are recorded and the batch continues.
pub fn generate_images(plants: &[PlantRecord], api: &dyn PredictionApi, config: &SiteConfig) -> ImageReport {
    let mut report = ImageReport::default();
    let settings = &config.image_api;

    for (idx, plant) in plants.iter().enumerate() {
        let path = image_path(config, &plant.id);
        let n = format!("[{}/{}]", idx + 1, plants.len());

        if path.exists() {
            info(&format!("{} Skipping {} (already exists)", n, plant.id));
            report.skipped.push(plant.id.clone());
            continue;
        }

        info(&format!("{} Generating {}", n, plant.id));
        match generate_one(api, plant, &path, settings) {
            Ok(size) => {
                info(&format!("Saved {} ({}KB)", path.display(), size / 1024));
                report.generated.push(plant.id.clone());
            }
            Err(reason) => {
                warn(&format!("Failed to generate {}: {}", plant.id, reason));
                report.failed.push((plant.id.clone(), reason));
            }
        }

        thread::sleep(settings.delay_between());
    }

    info(&format!("Images: {} generated, {} skipped, {} failed",
                  report.generated.len(), report.skipped.len(), report.failed.len()));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    struct FakeApi {
        statuses: RefCell<VecDeque<&'static str>>,
        created: RefCell<Vec<String>>,
        // Calls to `create` whose prompt contains this text fail.
        reject: Option<&'static str>,
    }

    impl FakeApi {
        fn new(statuses: &[&'static str]) -> Self {
            FakeApi {
                statuses: RefCell::new(statuses.iter().copied().collect()),
                created: RefCell::new(Vec::new()),
                reject: None,
            }
        }
    }

    impl PredictionApi for FakeApi {
        fn create(&self, prompt: &str) -> Result<Prediction> {
            self.created.borrow_mut().push(prompt.to_string());
            if let Some(needle) = self.reject {
                if prompt.contains(needle) {
                    return Err(anyhow!("connection refused"));
                }
            }
            Ok(Prediction { id: Some("p1".to_string()), status: Some("starting".to_string()), ..Default::default() })
        }

        fn get(&self, _id: &str) -> Result<Prediction> {
            let status = self.statuses.borrow_mut().pop_front().unwrap_or("processing");
            Ok(Prediction {
                id: Some("p1".to_string()),
                status: Some(status.to_string()),
                output: Some(serde_json::json!(["https://img.example/p1.png"])),
                error: Some(serde_json::Value::Null),
            })
        }

        fn download(&self, _url: &str) -> Result<Vec<u8>> {
            Ok(b"PNGDATA".to_vec())
        }
    }

    fn fast_settings() -> ImageApiSettings {
        ImageApiSettings {
            poll_interval_ms: 1,
            timeout_secs: 1,
            delay_between_ms: 0,
            ..Default::default()
        }
    }

    fn plant(id: &str, category: &str) -> PlantRecord {
        serde_json::from_value(serde_json::json!({ "id": id, "name": "Jade Plant", "category": category, "size": "small" }))
            .unwrap()
    }

    #[test]
    fn test_missing_or_blank_token() {
        let missing = SiteError::MissingToken(API_TOKEN_VAR.to_string());
        assert_eq!(api_token(None), Err(missing.clone()));
        assert_eq!(api_token(Some("   ".to_string())), Err(missing));
        assert_eq!(api_token(Some(" r8_abc\n".to_string())), Ok("r8_abc".to_string()));
    }

    #[test]
    fn test_create_error_is_recorded_and_batch_continues() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = SiteConfig {
            images_dir: dir.path().to_path_buf(),
            image_api: fast_settings(),
            ..Default::default()
        };
        let api = FakeApi { reject: Some("Aloe"), ..FakeApi::new(&["succeeded"]) };
        let mut aloe = plant("aloe-vera", "succulent");
        aloe.name = "Aloe".to_string();
        let plants = vec![aloe, plant("jade-plant", "succulent")];

        let report = generate_images(&plants, &api, &config);

        assert!(report.has_failures());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "aloe-vera");
        assert!(report.failed[0].1.contains("connection refused"));
        assert_eq!(report.generated, vec!["jade-plant".to_string()]);
        assert_eq!(api.created.borrow().len(), 2);
        assert!(!dir.path().join("aloe-vera.png").exists());
    }

    #[test]
    fn test_prompt_by_category_and_size() {
        let p = image_prompt(&plant("jade-plant", "succulent"));
        assert!(p.starts_with("Ultra realistic studio photograph of a compact Jade Plant houseplant in a modern minimalist ceramic pot"));
    }

    #[test]
    fn test_wait_until_succeeded() {
        let api = FakeApi::new(&["starting", "processing", "succeeded"]);
        assert_eq!(wait_for_prediction(&api, "p1", &fast_settings()),
                   Ok("https://img.example/p1.png".to_string()));
    }

    #[test]
    fn test_wait_reports_failure_and_timeout() {
        let api = FakeApi::new(&["failed"]);
        assert!(wait_for_prediction(&api, "p1", &fast_settings()).unwrap_err().starts_with("failed"));

        let api = FakeApi::new(&["canceled"]);
        assert_eq!(wait_for_prediction(&api, "p1", &fast_settings()), Err("canceled".to_string()));

        let api = FakeApi::new(&[]);
        assert_eq!(wait_for_prediction(&api, "p1", &fast_settings()), Err("timeout".to_string()));
    }

    #[test]
    fn test_generate_skips_existing() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = SiteConfig {
            images_dir: dir.path().to_path_buf(),
            image_api: fast_settings(),
            ..Default::default()
        };
        std::fs::write(dir.path().join("aloe-vera.png"), b"old").unwrap();

        let api = FakeApi::new(&["succeeded"]);
        let plants = vec![plant("aloe-vera", "succulent"), plant("jade-plant", "succulent")];
        let report = generate_images(&plants, &api, &config);

        assert_eq!(report.skipped, vec!["aloe-vera".to_string()]);
        assert_eq!(report.generated, vec!["jade-plant".to_string()]);
        assert_eq!(api.created.borrow().len(), 1);
        assert_eq!(std::fs::read(dir.path().join("jade-plant.png")).unwrap(), b"PNGDATA");
        assert_eq!(std::fs::read(dir.path().join("aloe-vera.png")).unwrap(), b"old");
    }
}
