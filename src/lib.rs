//! # Veil Popup Lifecycle Library
//!
//! Creates, categorizes, stacks, queues and animates overlay panels
//! ("popups") in a layered UI. At most one live instance per identity is
//! kept for replacing creations, queued popups are shown one at a time, and
//! an instance is only destroyed after its closing animation completes.
//!
//! ## Architecture
//!
//! Veil is built on a modular architecture:
//! - `animation`: eased channel tracks and the per-popup animation controller
//! - `popup`: identities, categories, templates and popup instances
//! - `manager`: the popup registry and its four category collections
//! - `layer`: sibling and draw ordering on the popup layer
//! - `assets`: template resolution at `_UI/Popup/<identity>`
//! - `events`: count and lifecycle notifications
//! - `time`: unscaled frame clock for the driver loop
//! - `script`: demo script steps replayed by the `veil` binary
//! - `config`: configuration parsing and management
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use veil::{PopupRegistry, TemplateLibrary, VeilConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = VeilConfig::load("veil.toml")?;
//!     let mut registry = PopupRegistry::new(&config, TemplateLibrary::from_config(&config));
//!
//!     let settings = registry.create("Settings".to_string(), true, false)?;
//!     registry.close(settings);
//!     while !registry.is_idle() {
//!         registry.tick(Duration::from_millis(16));
//!     }
//!     Ok(())
//! }
//! ```

pub mod animation;
pub mod assets;
pub mod config;
pub mod error;
pub mod events;
pub mod layer;
pub mod manager;
pub mod popup;
pub mod script;
pub mod time;

// Re-export main types for easy access
pub use assets::{AssetResolver, TemplateLibrary};
pub use config::VeilConfig;
pub use error::{PopupError, PopupResult};
pub use events::PopupEvent;
pub use layer::{LayerHost, PersistentOverlay, PopupLayer};
pub use manager::PopupRegistry;
pub use popup::{
    PopupCategory, PopupId, PopupIdentity, PopupInstance, PopupPhase, PopupTemplate,
    SlideDirection,
};
pub use time::FrameClock;

/// Version information for Veil
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
