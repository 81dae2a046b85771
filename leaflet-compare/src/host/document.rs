//! Document manifests and viewable resolution.
//!
//! A location resolves to a [`Document`]: a tree of items describing the
//! viewables a model can be loaded from. The session only needs to pick a 2D
//! geometry item, resolve its viewable path and derive the file extension
//! used to select a loader.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

/// Item type of loadable geometry.
pub const GEOMETRY_TYPE: &str = "geometry";

/// Role of 2D geometry items.
pub const ROLE_2D: &str = "2d";

/// One node of a document manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DocumentItem {
    /// Unique id of the item.
    #[serde(default)]
    pub guid: String,

    /// Item type, e.g. `geometry` or `resource`.
    #[serde(rename = "type", default)]
    pub item_type: Option<String>,

    /// Item role, e.g. `2d` or `3d`.
    #[serde(default)]
    pub role: Option<String>,

    /// Path of the viewable file, if this item is a resource.
    #[serde(default)]
    pub urn: Option<String>,

    #[serde(default)]
    pub children: Vec<DocumentItem>,
}

impl DocumentItem {
    /// Collect this item and every descendant matching `predicate`, depth first.
    pub fn find_all<'a, F>(&'a self, predicate: &F, out: &mut Vec<&'a DocumentItem>)
    where
        F: Fn(&DocumentItem) -> bool,
    {
        if predicate(self) {
            out.push(self);
        }
        for child in &self.children {
            child.find_all(predicate, out);
        }
    }

    fn is_2d_geometry(&self) -> bool {
        self.item_type.as_deref() == Some(GEOMETRY_TYPE) && self.role.as_deref() == Some(ROLE_2D)
    }

    fn first_urn(&self) -> Option<&str> {
        if let Some(urn) = self.urn.as_deref() {
            return Some(urn);
        }
        self.children.iter().find_map(|c| c.first_urn())
    }
}

/// Resolved document manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Document {
    pub root: DocumentItem,

    /// Shared property database of the document.
    #[serde(default)]
    pub property_db_path: Option<String>,

    /// Session id forwarded to the loader for authenticated fetches.
    #[serde(default)]
    pub acm_session_id: Option<String>,
}

/// Options forwarded to the tile loader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub shared_property_db_path: Option<String>,
    pub acm_session_id: Option<String>,
}

impl Document {
    /// Parse a manifest from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Pick the geometry item to load.
    ///
    /// Prefers the item whose guid equals `item_id`; falls back to the first
    /// 2D geometry item of the document.
    pub fn geometry_item(&self, item_id: Option<&str>) -> Option<&DocumentItem> {
        let mut items = Vec::new();

        if let Some(id) = item_id {
            self.root.find_all(&|item: &DocumentItem| item.guid == id, &mut items);
        }

        if items.is_empty() {
            self.root
                .find_all(&|item: &DocumentItem| item.is_2d_geometry(), &mut items);
        }

        items.into_iter().next()
    }

    /// Path of the file backing `item`.
    pub fn viewable_path(&self, item: &DocumentItem) -> Option<String> {
        item.first_urn().map(str::to_string)
    }

    /// Loader options derived from the document.
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            shared_property_db_path: self.property_db_path.clone(),
            acm_session_id: self.acm_session_id.clone(),
        }
    }
}

fn extension_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // First `.ext` run that ends the path or precedes a query string.
    PATTERN.get_or_init(|| Regex::new(r"\.([a-z0-9]+)(\?|$)").unwrap())
}

/// Lower-cased file extension of a viewable path.
pub fn file_extension(path: &str) -> Option<String> {
    let lower = path.to_lowercase();
    extension_pattern()
        .captures(&lower)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
