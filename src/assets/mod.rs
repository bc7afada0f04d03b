//! Popup template resolution
//!
//! Templates live at the conventional path `"_UI/Popup/" + identity`. The
//! default [`TemplateLibrary`] is filled from the `[popups.<name>]` tables of
//! the configuration and/or from a directory of TOML files laid out the same
//! way on disk (`<root>/_UI/Popup/<name>.toml`).

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::VeilConfig;
use crate::error::{PopupError, PopupResult};
use crate::popup::{PopupIdentity, PopupTemplate};

/// Directory prefix every popup template is looked up under
pub const POPUP_PATH: &str = "_UI/Popup/";

/// Conventional template path for an identity
pub fn template_path<I: PopupIdentity>(identity: &I) -> String {
    format!("{}{}", POPUP_PATH, identity)
}

/// Maps a popup identity to an instantiable template.
///
/// Failing to resolve is fatal for the creation request: the registry
/// registers nothing and hands the error back to the caller.
pub trait AssetResolver<I: PopupIdentity> {
    fn resolve(&self, identity: &I) -> PopupResult<PopupTemplate>;
}

/// In-memory template store keyed by template path
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    templates: BTreeMap<String, PopupTemplate>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library holding every `[popups.<name>]` template of the config
    pub fn from_config(config: &VeilConfig) -> Self {
        let mut library = Self::new();
        for (name, template) in &config.popups {
            library.insert(name, template.clone());
        }
        library
    }

    /// Register a template under `name`, replacing any previous one
    pub fn insert(&mut self, name: &str, template: PopupTemplate) {
        let path = format!("{}{}", POPUP_PATH, name);
        if self.templates.insert(path.clone(), template).is_some() {
            debug!("📦 Replaced popup template {}", path);
        }
    }

    /// Load every `*.toml` file under `<root>/_UI/Popup/`.
    /// Returns the number of templates loaded.
    pub fn load_dir<P: AsRef<Path>>(&mut self, root: P) -> Result<usize> {
        let dir = root.as_ref().join(POPUP_PATH);
        let entries = fs::read_dir(&dir)
            .with_context(|| format!("Failed to read template directory: {}", dir.display()))?;

        let mut loaded = 0;
        for entry in entries {
            let path = entry
                .with_context(|| format!("Failed to list template directory: {}", dir.display()))?
                .path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                warn!("⚠️ Skipping template with non UTF-8 name: {}", path.display());
                continue;
            };

            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template: {}", path.display()))?;
            let template: PopupTemplate = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse template: {}", path.display()))?;

            self.insert(name, template);
            loaded += 1;
        }

        info!("📦 Loaded {} popup template(s) from {}", loaded, dir.display());
        Ok(loaded)
    }

    pub fn contains<I: PopupIdentity>(&self, identity: &I) -> bool {
        self.templates.contains_key(&template_path(identity))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Registered template paths, sorted
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

impl<I: PopupIdentity> AssetResolver<I> for TemplateLibrary {
    fn resolve(&self, identity: &I) -> PopupResult<PopupTemplate> {
        let path = template_path(identity);
        self.templates
            .get(&path)
            .cloned()
            .ok_or_else(|| PopupError::Resolution {
                identity: identity.to_string(),
                path,
                reason: "no template registered".to_string(),
            })
    }
}
