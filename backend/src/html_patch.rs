use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, parse_fragment, LocalName, Namespace, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use walkdir::WalkDir;

use crate::errors::SiteError;
use crate::file_writer::write_atomic;
use crate::html_content::lang_selector_html;
use crate::logger::{info, warn};
use crate::plant_page::photo_block_html;
use crate::site_config::SiteConfig;
use crate::types::{Lang, PageKind, PageRoute};

/// Result of patching one document in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patched {
    /// The whole document re-serialized. Untouched markup keeps its tree but not
    /// its spelling: named entities become characters (`&copy;` to `©`), void and
    /// self-closed elements lose the slash (`<br/>` to `<br>`, `<path/>` to
    /// `<path></path>`) and boolean attributes gain an empty value (`disabled=""`).
    /// Unchanged documents are never re-serialized.
    Changed(String),
    Unchanged,
    /// The structure the patch hooks into is absent, the document is left alone.
    MarkerMissing(&'static str),
}

/// Per-file outcome of a patch run over an output tree.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub updated: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    pub not_listed: Vec<PathBuf>,
    pub missing_marker: Vec<(PathBuf, String)>,
    pub failed: Vec<(PathBuf, String)>,
}

impl PatchReport {
    pub fn total(&self) -> usize {
        self.updated.len() + self.unchanged.len() + self.not_listed.len()
            + self.missing_marker.len() + self.failed.len()
    }

    pub fn summary(&self) -> String {
        format!("{} files: {} updated, {} unchanged, {} not listed, {} missing marker, {} failed",
                self.total(), self.updated.len(), self.unchanged.len(), self.not_listed.len(),
                self.missing_marker.len(), self.failed.len())
    }
}

// === DOM helpers ===

fn html_ns() -> Namespace {
    Namespace::from("http://www.w3.org/1999/xhtml")
}

fn parse_html(html: &str) -> RcDom {
    parse_document(RcDom::default(), ParseOpts::default()).one(html)
}

/// Parse an HTML fragment in a `<body>` context and return its top-level nodes.
fn parse_fragment_nodes(html: &str) -> Vec<Handle> {
    let dom = parse_fragment(
        RcDom::default(),
        ParseOpts::default(),
        QualName::new(None, html_ns(), LocalName::from("body")),
        vec![],
    ).one(html);

    let root = dom.document.children.borrow().first().cloned();
    match root {
        Some(root) => root.children.borrow().clone(),
        None => Vec::new(),
    }
}

fn serialize_dom(dom: &RcDom) -> Result<String> {
    let mut out: Vec<u8> = Vec::new();
    let document: SerializableHandle = dom.document.clone().into();
    serialize(&mut out, &document, SerializeOpts {
        traversal_scope: TraversalScope::ChildrenOnly(None),
        ..Default::default()
    }).context("Failed to serialize HTML")?;
    String::from_utf8(out).context("Serialized HTML is not UTF-8")
}

fn descendants(node: &Handle, out: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        out.push(child.clone());
        descendants(child, out);
    }
}

fn find_all<F: Fn(&Handle) -> bool>(root: &Handle, pred: F) -> Vec<Handle> {
    let mut all = Vec::new();
    descendants(root, &mut all);
    all.into_iter().filter(|h| pred(h)).collect()
}

fn find_first<F: Fn(&Handle) -> bool>(root: &Handle, pred: F) -> Option<Handle> {
    find_all(root, pred).into_iter().next()
}

fn is_element(node: &Handle, tag: &str) -> bool {
    match &node.data {
        NodeData::Element { name, .. } => &*name.local == tag,
        _ => false,
    }
}

fn get_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs.borrow()
            .iter()
            .find(|a| &*a.name.local == attr_name)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

fn has_attr(node: &Handle, attr_name: &str) -> bool {
    get_attr(node, attr_name).is_some()
}

fn text_content(node: &Handle) -> String {
    let mut all = Vec::new();
    descendants(node, &mut all);
    let mut text = String::new();
    for n in all.iter() {
        if let NodeData::Text { contents } = &n.data {
            text.push_str(&contents.borrow());
        }
    }
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

fn detach(node: &Handle) {
    let parent = node.parent.take().and_then(|weak| weak.upgrade());
    if let Some(parent) = parent {
        parent.children.borrow_mut().retain(|c| !Rc::ptr_eq(c, node));
    }
}

fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// Put `replacement` where `node` is, keeping sibling order.
fn replace_node(node: &Handle, replacement: Vec<Handle>) -> bool {
    let Some(parent) = node.parent.take().and_then(|weak| weak.upgrade()) else {
        return false;
    };
    let mut children = parent.children.borrow_mut();
    let Some(idx) = children.iter().position(|c| Rc::ptr_eq(c, node)) else {
        return false;
    };
    children.remove(idx);
    for (offset, new_node) in replacement.into_iter().enumerate() {
        new_node.parent.set(Some(Rc::downgrade(&parent)));
        children.insert(idx + offset, new_node);
    }
    true
}

// === Predicates ===

fn declares_fixed_position(style: &str) -> bool {
    style.split(';').any(|decl| {
        let mut parts = decl.splitn(2, ':');
        let prop = parts.next().unwrap_or("").trim().to_lowercase();
        let value = parts.next().unwrap_or("").trim().to_lowercase();
        prop == "position" && value.starts_with("fixed")
    })
}

/// A language picker of the old layout: a fixed-position element holding a `<select>`.
fn is_legacy_picker(node: &Handle) -> bool {
    let Some(style) = get_attr(node, "style") else {
        return false;
    };
    declares_fixed_position(&style)
        && find_first(node, |n| is_element(n, "select")).is_some()
}

fn is_nav_selector(node: &Handle) -> bool {
    match &node.data {
        NodeData::Element { .. } => has_attr(node, "data-lang-selector"),
        NodeData::Comment { contents } => contents.to_lowercase().contains("language selector"),
        _ => false,
    }
}

fn is_image_placeholder(node: &Handle) -> bool {
    if !matches!(node.data, NodeData::Element { .. }) {
        return false;
    }
    if has_attr(node, "data-plant-placeholder") {
        return true;
    }
    // Pages from the first layout carried the gradient block without a marker attribute.
    let class = get_attr(node, "class").unwrap_or_default();
    let tokens: Vec<&str> = class.split_whitespace().collect();
    is_element(node, "div")
        && tokens.contains(&"aspect-[4/5]")
        && tokens.contains(&"bg-gradient-to-br")
}

// === Language selector ===

fn page_lang(doc: &Handle) -> Lang {
    find_first(doc, |n| is_element(n, "html"))
        .and_then(|html| get_attr(&html, "lang"))
        .and_then(|code| code.parse::<Lang>().ok())
        .unwrap_or(Lang::En)
}

/// Selector targets from the page's hreflang alternates, or the locale home pages.
fn selector_options(doc: &Handle) -> Vec<(Lang, String)> {
    let mut options: Vec<(Lang, String)> = Vec::new();
    for link in find_all(doc, |n| is_element(n, "link")) {
        let is_alternate = get_attr(&link, "rel")
            .map(|r| r.split_whitespace().any(|t| t.eq_ignore_ascii_case("alternate")))
            .unwrap_or(false);
        if !is_alternate {
            continue;
        }
        let (Some(hreflang), Some(target)) = (get_attr(&link, "hreflang"), get_attr(&link, "href")) else {
            continue;
        };
        let Ok(lang) = hreflang.parse::<Lang>() else {
            continue;
        };
        if !options.iter().any(|(l, _)| *l == lang) {
            options.push((lang, target));
        }
    }

    if options.is_empty() {
        let home = PageRoute::new(PageKind::Home);
        options = Lang::ALL.iter().map(|l| (*l, home.path(*l))).collect();
    }
    options
}

/// Remove legacy fixed-position pickers and make sure the first `<nav>` carries
/// the in-navigation selector.
pub fn patch_language_selector(html: &str) -> Result<Patched> {
    let dom = parse_html(html);
    let doc = dom.document.clone();

    let legacy = find_all(&doc, is_legacy_picker);
    let mut changed = !legacy.is_empty();
    for node in legacy.iter() {
        detach(node);
    }

    if find_first(&doc, is_nav_selector).is_none() {
        let Some(nav) = find_first(&doc, |n| is_element(n, "nav")) else {
            return Ok(Patched::MarkerMissing("nav"));
        };
        let selector = lang_selector_html(page_lang(&doc), &selector_options(&doc))?;
        for node in parse_fragment_nodes(&selector) {
            append_child(&nav, node);
        }
        changed = true;
    }

    if changed {
        Ok(Patched::Changed(serialize_dom(&dom)?))
    } else {
        Ok(Patched::Unchanged)
    }
}

// === Image promotion ===

fn alt_from_id(plant_id: &str) -> String {
    plant_id.split('-')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Swap the image placeholder of an allow-listed plant page for the verified photo.
pub fn promote_plant_image(html: &str, plant_id: &str, config: &SiteConfig) -> Result<Patched> {
    if !config.is_verified_image(plant_id) {
        return Ok(Patched::Unchanged);
    }

    let dom = parse_html(html);
    let doc = dom.document.clone();

    if find_first(&doc, |n| has_attr(n, "data-plant-photo")).is_some() {
        return Ok(Patched::Unchanged);
    }

    let Some(placeholder) = find_first(&doc, is_image_placeholder) else {
        return Ok(Patched::MarkerMissing("image placeholder"));
    };

    let alt = find_first(&doc, |n| is_element(n, "h1"))
        .map(|h1| text_content(&h1))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| alt_from_id(plant_id));

    let photo = parse_fragment_nodes(&photo_block_html(&config.image_src(plant_id), &alt));
    if !replace_node(&placeholder, photo) {
        return Ok(Patched::MarkerMissing("image placeholder"));
    }

    Ok(Patched::Changed(serialize_dom(&dom)?))
}

// === Output tree passes ===

fn html_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(SiteError::MissingInput(root.to_path_buf()).into());
    }
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().map(|x| x == "html").unwrap_or(false))
        .collect();
    files.sort();
    Ok(files)
}

/// Plant id of a `…/plants/{id}/index.html` page.
pub fn plant_id_from_path(path: &Path) -> Option<String> {
    let dir = path.parent()?;
    let section = dir.parent()?.file_name()?.to_str()?;
    if section != "plants" {
        return None;
    }
    dir.file_name()?.to_str().map(|s| s.to_string())
}

fn apply(report: &mut PatchReport, path: &Path, result: Result<Patched>) {
    match result {
        Ok(Patched::Changed(html)) => match write_atomic(path, html.as_bytes()) {
            Ok(()) => report.updated.push(path.to_path_buf()),
            Err(e) => {
                warn(&format!("Failed to write {}: {}", path.display(), e));
                report.failed.push((path.to_path_buf(), e.to_string()));
            }
        },
        Ok(Patched::Unchanged) => report.unchanged.push(path.to_path_buf()),
        Ok(Patched::MarkerMissing(marker)) => {
            warn(&format!("No {} found in {}, left untouched", marker, path.display()));
            report.missing_marker.push((path.to_path_buf(), marker.to_string()));
        }
        Err(e) => {
            warn(&format!("Failed to patch {}: {}", path.display(), e));
            report.failed.push((path.to_path_buf(), e.to_string()));
        }
    }
}

fn read_page(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn fix_language_selectors(root: &Path) -> Result<PatchReport> {
    let mut report = PatchReport::default();
    for path in html_files(root)? {
        let result = read_page(&path).and_then(|html| patch_language_selector(&html));
        apply(&mut report, &path, result);
    }
    info(&format!("Language selector: {}", report.summary()));
    Ok(report)
}

pub fn promote_images(root: &Path, config: &SiteConfig) -> Result<PatchReport> {
    let mut report = PatchReport::default();
    for path in html_files(root)? {
        let Some(plant_id) = plant_id_from_path(&path) else {
            continue;
        };
        if !config.is_verified_image(&plant_id) {
            report.not_listed.push(path);
            continue;
        }
        let result = read_page(&path).and_then(|html| promote_plant_image(&html, &plant_id, config));
        apply(&mut report, &path, result);
    }
    info(&format!("Image promotion: {}", report.summary()));
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY_PAGE: &str = r#"<!DOCTYPE html>
<html lang="es"><head><title>Pothos</title>
<link rel="alternate" hreflang="en" href="https://plantfinder.org/plants/pothos-golden/">
<link rel="alternate" hreflang="es" href="https://plantfinder.org/es/plants/pothos-golden/">
<link rel="alternate" hreflang="x-default" href="https://plantfinder.org/plants/pothos-golden/">
</head><body>
<nav><a href="/es/">Inicio</a></nav>
<div style="position:fixed;top:80px;right:20px;z-index:50;"><select><option>ES</option></select></div>
<div class="md:w-2/5"><div class="aspect-[4/5] bg-gradient-to-br from-emerald-100 relative"><span>🪴</span></div></div>
<h1>Pothos Dorado</h1>
</body></html>"#;

    fn changed(p: Patched) -> String {
        match p {
            Patched::Changed(s) => s,
            other => panic!("expected a change, got {:?}", other),
        }
    }

    #[test]
    fn test_fixed_position_detection() {
        assert!(declares_fixed_position("position:fixed;top:80px"));
        assert!(declares_fixed_position("z-index: 5; Position : Fixed"));
        assert!(!declares_fixed_position("position: relative"));
    }

    #[test]
    fn test_selector_relocated_into_nav() {
        let out = changed(patch_language_selector(LEGACY_PAGE).unwrap());
        assert!(!out.contains("position:fixed"));
        assert!(out.contains("data-lang-selector"));
        assert!(out.contains(r#"<option value="https://plantfinder.org/es/plants/pothos-golden/" selected="">"#));
        let nav_end = out.find("</nav>").unwrap();
        assert!(out.find("data-lang-selector").unwrap() < nav_end);

        assert_eq!(patch_language_selector(&out).unwrap(), Patched::Unchanged);
    }

    #[test]
    fn test_selector_without_nav_is_reported() {
        let html = "<html><body><p>No navigation</p></body></html>";
        assert_eq!(patch_language_selector(html).unwrap(), Patched::MarkerMissing("nav"));
    }

    #[test]
    fn test_existing_selector_comment_is_respected() {
        let html = "<html><body><nav><!-- Language selector --><div>EN</div></nav></body></html>";
        assert_eq!(patch_language_selector(html).unwrap(), Patched::Unchanged);
    }

    #[test]
    fn test_image_promotion() {
        let config = SiteConfig::default();
        let out = changed(promote_plant_image(LEGACY_PAGE, "pothos-golden", &config).unwrap());
        assert!(out.contains(r#"<img src="/images/plants/pothos-golden.png" alt="Pothos Dorado""#));
        assert!(!out.contains("bg-gradient-to-br"));
        assert!(out.contains(r#"<div class="md:w-2/5"><div data-plant-photo="""#));

        assert_eq!(promote_plant_image(&out, "pothos-golden", &config).unwrap(), Patched::Unchanged);
        assert_eq!(promote_plant_image(LEGACY_PAGE, "zz-plant", &config).unwrap(), Patched::Unchanged);
    }

    #[test]
    fn test_changed_document_normalizes_untouched_markup() {
        let html = r#"<html lang="en"><body><nav><a href="/">Home</a></nav>
<p>&copy; PlantFinder<br/></p><button disabled>Go</button></body></html>"#;
        let out = changed(patch_language_selector(html).unwrap());
        assert!(out.contains("<p>© PlantFinder<br></p>"));
        assert!(out.contains(r#"<button disabled="">Go</button>"#));
        // The normalized form is a fixed point.
        assert_eq!(patch_language_selector(&out).unwrap(), Patched::Unchanged);
    }

    #[test]
    fn test_plant_id_from_path() {
        assert_eq!(plant_id_from_path(Path::new("site/es/plants/zz-plant/index.html")),
                   Some("zz-plant".to_string()));
        assert_eq!(plant_id_from_path(Path::new("site/articles/guide/index.html")), None);
    }

    #[test]
    fn test_alt_from_id() {
        assert_eq!(alt_from_id("bunny-ears-cactus"), "Bunny Ears Cactus");
    }
}
