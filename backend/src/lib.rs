pub mod types;
pub mod errors;
pub mod logger;
pub mod models;
pub mod site_config;
pub mod i18n;
pub mod data_loader;
pub mod html_content;
pub mod suitability;
pub mod plant_page;
pub mod article_page;
pub mod static_pages;
pub mod file_writer;
pub mod sitemap;
pub mod html_patch;
pub mod image_fetch;
pub mod generator;

pub use data_loader::Catalog;
pub use errors::SiteError;
pub use generator::{generate_site, GenerationReport, SiteGenerator};
pub use site_config::SiteConfig;
pub use types::{Lang, PageKind, PageRoute};
