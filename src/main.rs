//! # Veil - Popup Lifecycle Demo Driver
//!
//! Replays a script of popup operations against a [`PopupRegistry`] on a
//! fixed-rate frame loop and logs every lifecycle event, so the stacking,
//! queueing and close-before-destroy behavior can be watched in the log.

use anyhow::Result;
use clap::Parser;
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::time::Duration;

use veil::popup::{PopupCategory, PopupTemplate, SlideDirection};
use veil::script::{default_script, parse_script, ScriptStep};
use veil::time::frame_interval;
use veil::{FrameClock, PersistentOverlay, PopupRegistry, TemplateLibrary, VeilConfig};

/// Upper bound on the final drain so a halted popup cannot hang the driver
const DRAIN_LIMIT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "veil")]
#[command(about = "Layered popup lifecycle manager demo driver")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "~/.config/veil/veil.toml")]
    config: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Override the frame rate of the driver loop
    #[arg(long)]
    fps: Option<u32>,

    /// Root directory holding `_UI/Popup/<name>.toml` templates
    #[arg(short, long)]
    templates: Option<PathBuf>,

    /// Script steps, e.g. `open:Settings,enqueue:Reward,wait:300,back`
    #[arg(short, long, value_delimiter = ',')]
    script: Vec<String>,
}

/// Stand-in for the always-on HUD that flagged popups raise above
struct LoggingOverlay;

impl PersistentOverlay for LoggingOverlay {
    fn bring_to_front(&mut self) {
        info!("📌 Persistent overlay brought to front");
    }
}

/// Templates used for any demo popup the configuration does not define
fn demo_templates() -> Vec<(&'static str, PopupTemplate)> {
    vec![
        (
            "Settings",
            PopupTemplate {
                slide: SlideDirection::TopToBottom,
                close_button: true,
                close_on_navigation: true,
                ..PopupTemplate::default()
            },
        ),
        (
            "Confirm",
            PopupTemplate {
                category: PopupCategory::System,
                slide: SlideDirection::BottomToTop,
                raise_above_overlay: true,
                width: 480.0,
                height: 320.0,
                ..PopupTemplate::default()
            },
        ),
        (
            "Reward",
            PopupTemplate {
                slide: SlideDirection::RightToLeft,
                ..PopupTemplate::default()
            },
        ),
        (
            "Quest",
            PopupTemplate {
                slide: SlideDirection::LeftToRight,
                ..PopupTemplate::default()
            },
        ),
        (
            "Toast",
            PopupTemplate {
                category: PopupCategory::Ignore,
                scale: false,
                width: 600.0,
                height: 80.0,
                ..PopupTemplate::default()
            },
        ),
    ]
}

fn build_library(config: &VeilConfig, templates: Option<&PathBuf>) -> Result<TemplateLibrary> {
    let mut library = TemplateLibrary::new();
    for (name, template) in demo_templates() {
        library.insert(name, template);
    }
    for (name, template) in &config.popups {
        library.insert(name, template.clone());
    }
    if let Some(root) = templates {
        library.load_dir(root)?;
    }
    info!("📦 {} popup template(s) available", library.len());
    Ok(library)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configuration is read before logging starts so its debug flag can pick
    // the filter; the outcome is reported once the logger is up.
    let loaded = VeilConfig::load(&cli.config);
    let debug = cli.debug || loaded.as_ref().is_ok_and(|config| config.general.debug);

    // Initialize logging
    let filter = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    info!("🚀 Starting Veil - Popup Lifecycle Demo");
    info!(
        "📄 Version: {} (built {}, commit {})",
        veil::VERSION,
        env!("VEIL_BUILD_DATE"),
        option_env!("VEIL_GIT_COMMIT").unwrap_or("unknown")
    );

    let mut config = match loaded {
        Ok(config) => {
            info!("✅ Configuration loaded from: {}", cli.config);
            config
        }
        Err(e) => {
            error!("❌ Failed to load configuration: {}", e);
            info!("📝 Using default configuration");
            VeilConfig::default()
        }
    };

    // Override config with CLI flags
    if let Some(fps) = cli.fps {
        config.general.fps = fps;
    }
    config.validate()?;

    let steps = if cli.script.is_empty() {
        default_script()?
    } else {
        parse_script(cli.script.as_slice())?
    };

    let library = build_library(&config, cli.templates.as_ref())?;
    let mut registry: PopupRegistry<String, TemplateLibrary> =
        PopupRegistry::new(&config, library).with_overlay(Box::new(LoggingOverlay));
    registry.on_popup_count_changed(|total| debug!("🔢 Popups open: {}", total));
    registry.add_event_listener(|event| info!("📣 {}", event));

    let mut ticker = tokio::time::interval(frame_interval(config.general.fps));
    let mut clock = FrameClock::new();

    for step in &steps {
        info!("▶️ {}", step);
        match step {
            ScriptStep::Wait(duration) => {
                let mut waited = Duration::ZERO;
                while waited < *duration {
                    ticker.tick().await;
                    let delta = clock.tick();
                    registry.tick(delta);
                    waited += delta.max(Duration::from_millis(1));
                }
            }
            step => {
                if let Err(e) = step.apply(&mut registry) {
                    warn!("⚠️ Step '{}' failed: {}", step, e);
                }
            }
        }
    }

    // Let the remaining close animations finish
    let mut drained = Duration::ZERO;
    while registry.is_animating() && drained < DRAIN_LIMIT {
        ticker.tick().await;
        let delta = clock.tick();
        registry.tick(delta);
        drained += delta.max(Duration::from_millis(1));
    }

    info!(
        "🏁 Script finished after {} frame(s) with {} popup(s) open",
        clock.frame_count(),
        registry.popup_count()
    );
    registry.shutdown();

    Ok(())
}
