//! Demo script steps for the driver binary
//!
//! A script is a list of `verb[:argument]` steps such as `open:Settings`,
//! `enqueue:Reward`, `back` or `wait:300`, replayed against a registry
//! keyed by `String` identities.

use anyhow::{bail, Context, Result};
use log::{info, warn};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::assets::AssetResolver;
use crate::error::PopupResult;
use crate::manager::PopupRegistry;
use crate::popup::PopupCategory;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// Create and show a popup
    Open(String),
    /// Create a popup in the queue
    Enqueue(String),
    /// Create a popup, closing any live one of the same identity first
    Replace(String),
    /// Close a popup by identity
    Close(String),
    /// Close the newest System popup, else the newest UI popup
    Back,
    /// Run the navigation handler
    Navigate,
    /// Close every popup
    CloseAll,
    /// Close every popup of one category
    CloseCategory(PopupCategory),
    /// Let frames run for a while
    Wait(Duration),
}

impl ScriptStep {
    /// Apply a step to `registry`. `Wait` is the driver's business and does
    /// nothing here.
    pub fn apply<R>(&self, registry: &mut PopupRegistry<String, R>) -> PopupResult<()>
    where
        R: AssetResolver<String>,
    {
        match self {
            ScriptStep::Open(name) => {
                registry.create(name.clone(), true, false)?;
            }
            ScriptStep::Enqueue(name) => {
                registry.create(name.clone(), true, true)?;
            }
            ScriptStep::Replace(name) => {
                registry.create_replacing_same_identity(name.clone())?;
            }
            ScriptStep::Close(name) => registry.close_by_identity(name),
            ScriptStep::Back => {
                if !registry.close_last_opened() {
                    info!("↩️ Back pressed with no system or UI popup open");
                }
            }
            ScriptStep::Navigate => registry.check_close_on_navigation(),
            ScriptStep::CloseAll => registry.close_all(),
            ScriptStep::CloseCategory(category) => registry.close_all_by_category(*category),
            ScriptStep::Wait(_) => {}
        }
        Ok(())
    }
}

impl FromStr for ScriptStep {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (verb, argument) = match s.split_once(':') {
            Some((verb, argument)) => (verb, Some(argument.trim())),
            None => (s, None),
        };

        let named = |argument: Option<&str>| -> Result<String> {
            match argument {
                Some(name) if !name.is_empty() => Ok(name.to_string()),
                _ => bail!("Script step '{}' needs a popup name", s),
            }
        };

        let step = match verb {
            "open" => ScriptStep::Open(named(argument)?),
            "enqueue" => ScriptStep::Enqueue(named(argument)?),
            "replace" => ScriptStep::Replace(named(argument)?),
            "close" => ScriptStep::Close(named(argument)?),
            "back" => ScriptStep::Back,
            "navigate" => ScriptStep::Navigate,
            "close-all" => match argument {
                None => ScriptStep::CloseAll,
                Some(category) => ScriptStep::CloseCategory(
                    category
                        .parse::<PopupCategory>()
                        .with_context(|| format!("Invalid script step '{}'", s))?,
                ),
            },
            "wait" => {
                let millis: u64 = named(argument)?
                    .parse()
                    .with_context(|| format!("Invalid wait duration in '{}'", s))?;
                ScriptStep::Wait(Duration::from_millis(millis))
            }
            other => bail!("Unknown script step '{}'", other),
        };
        Ok(step)
    }
}

impl fmt::Display for ScriptStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptStep::Open(name) => write!(f, "open:{}", name),
            ScriptStep::Enqueue(name) => write!(f, "enqueue:{}", name),
            ScriptStep::Replace(name) => write!(f, "replace:{}", name),
            ScriptStep::Close(name) => write!(f, "close:{}", name),
            ScriptStep::Back => f.write_str("back"),
            ScriptStep::Navigate => f.write_str("navigate"),
            ScriptStep::CloseAll => f.write_str("close-all"),
            ScriptStep::CloseCategory(category) => write!(f, "close-all:{}", category),
            ScriptStep::Wait(duration) => write!(f, "wait:{}", duration.as_millis()),
        }
    }
}

/// Parse every step, failing on the first bad one
pub fn parse_script<S: AsRef<str>>(steps: &[S]) -> Result<Vec<ScriptStep>> {
    steps
        .iter()
        .map(|step| step.as_ref().parse())
        .collect::<Result<Vec<_>>>()
        .map_err(|e| {
            warn!("❌ Rejected demo script: {}", e);
            e
        })
}

/// Steps replayed when none are given on the command line
pub const DEFAULT_SCRIPT: &[&str] = &[
    "open:Settings",
    "open:Confirm",
    "enqueue:Reward",
    "enqueue:Quest",
    "wait:300",
    "back",
    "wait:300",
    "replace:Settings",
    "wait:100",
    "navigate",
    "wait:300",
    "close-all:queue",
    "wait:300",
    "open:Toast",
    "close-all",
    "wait:400",
];

pub fn default_script() -> Result<Vec<ScriptStep>> {
    parse_script(DEFAULT_SCRIPT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::TemplateLibrary;
    use crate::config::VeilConfig;
    use crate::popup::PopupTemplate;

    #[test]
    fn test_parse_steps() {
        assert_eq!(
            "open:Settings".parse::<ScriptStep>().unwrap(),
            ScriptStep::Open("Settings".to_string())
        );
        assert_eq!("back".parse::<ScriptStep>().unwrap(), ScriptStep::Back);
        assert_eq!(
            "close-all:system".parse::<ScriptStep>().unwrap(),
            ScriptStep::CloseCategory(PopupCategory::System)
        );
        assert_eq!(
            " wait:250 ".parse::<ScriptStep>().unwrap(),
            ScriptStep::Wait(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_parse_rejects_bad_steps() {
        assert!("open".parse::<ScriptStep>().is_err());
        assert!("open:".parse::<ScriptStep>().is_err());
        assert!("wait:soon".parse::<ScriptStep>().is_err());
        assert!("close-all:modal".parse::<ScriptStep>().is_err());
        assert!("dance".parse::<ScriptStep>().is_err());
        assert!(parse_script(&["back", "jump"][..]).is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for step in default_script().unwrap() {
            assert_eq!(step.to_string().parse::<ScriptStep>().unwrap(), step);
        }
    }

    #[test]
    fn test_default_script_parses_every_step() {
        let steps = default_script().unwrap();
        assert_eq!(steps.len(), DEFAULT_SCRIPT.len());
        assert_eq!(steps.len(), 16);
    }

    #[test]
    fn test_apply_drives_registry() {
        let mut library = TemplateLibrary::new();
        library.insert("Settings", PopupTemplate::default());
        let mut registry: PopupRegistry<String, TemplateLibrary> =
            PopupRegistry::new(&VeilConfig::default(), library);

        ScriptStep::Open("Settings".to_string())
            .apply(&mut registry)
            .unwrap();
        assert_eq!(registry.popup_count(), 1);

        assert!(ScriptStep::Open("Ghost".to_string())
            .apply(&mut registry)
            .is_err());

        ScriptStep::Back.apply(&mut registry).unwrap();
        assert!(registry.is_idle());
    }
}
