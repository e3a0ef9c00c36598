use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use portfolio_gallery_core::{
    AppConfig, Dispatch, GalleryCollection, HostEvent, InteractionContext, ManualFrameScheduler,
    PageMarkup, PresentationIntent, RenderAdapter, ResponsiveImageResolver, StaticMediaHost,
    TracingRenderer,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

fn main() -> portfolio_gallery_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            script,
            markup,
            collections,
            manifest,
            config,
            width,
            reduced_motion,
        } => {
            let inputs = Inputs::load(
                markup.as_deref(),
                collections.as_deref(),
                manifest.as_deref(),
                config.as_deref(),
            )?;
            run_replay(&script, inputs, StaticMediaHost::new(width, reduced_motion))
        }
        Commands::Audit {
            collections,
            manifest,
        } => run_audit(&collections, &manifest),
    }
}

/// One entry of a replay script: a host event or a frame tick.
///
/// Reports are numbered from 1 in script order; step 0 is the initial layout
/// and the final step is teardown.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Step {
    Frame { frame: FrameTick },
    Event(HostEvent),
}

#[derive(Debug, Deserialize)]
struct FrameTick {
    time_ms: f64,
    #[serde(default)]
    scroll_y: f64,
}

#[derive(Debug, Serialize)]
struct StepReport<'a> {
    step: usize,
    intents: &'a [PresentationIntent],
    prevent_default: bool,
}

#[derive(Debug, Serialize)]
struct AuditReport {
    categories: usize,
    items: usize,
    missing: Vec<MissingSource>,
    empty_categories: Vec<String>,
}

#[derive(Debug, Serialize)]
struct MissingSource {
    category: String,
    src: String,
}

struct Inputs {
    config: AppConfig,
    markup: PageMarkup,
    collections: GalleryCollection,
    resolver: ResponsiveImageResolver,
}

impl Inputs {
    fn load(
        markup: Option<&Path>,
        collections: Option<&Path>,
        manifest: Option<&Path>,
        config: Option<&Path>,
    ) -> portfolio_gallery_core::Result<Self> {
        let markup = match markup {
            Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
            None => PageMarkup::default(),
        };
        Ok(Self {
            config: config.map(AppConfig::from_path).transpose()?.unwrap_or_default(),
            markup,
            collections: collections
                .map(GalleryCollection::from_path)
                .transpose()?
                .unwrap_or_default(),
            resolver: manifest
                .map(ResponsiveImageResolver::from_path)
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

fn run_replay(
    script: &Path,
    inputs: Inputs,
    host: StaticMediaHost,
) -> portfolio_gallery_core::Result<()> {
    tracing::info!(?script, width = host.width, "replaying interaction script");

    let steps: Vec<Step> = serde_json::from_str(&std::fs::read_to_string(script)?)?;
    let mut renderer = TracingRenderer::new();
    for (step, dispatch) in replay(steps, inputs, host) {
        report(&mut renderer, step, &dispatch)?;
    }
    tracing::info!(applied = renderer.applied(), "replay finished");
    Ok(())
}

/// Runs the script through a fresh context, returning each numbered result.
fn replay(steps: Vec<Step>, inputs: Inputs, host: StaticMediaHost) -> Vec<(usize, Dispatch)> {
    let (mut context, initial) =
        InteractionContext::builder(inputs.config, ManualFrameScheduler::new())
            .markup(inputs.markup)
            .collections(inputs.collections)
            .resolver(inputs.resolver)
            .media_host(host)
            .init();

    let teardown_step = steps.len() + 1;
    let mut reports = vec![(0, Dispatch::from(initial))];
    for (index, step) in steps.into_iter().enumerate() {
        let dispatch = match step {
            Step::Frame { frame } => {
                Dispatch::from(context.run_due_frames(frame.time_ms, frame.scroll_y))
            }
            Step::Event(event) => context.dispatch(event),
        };
        reports.push((index + 1, dispatch));
    }
    reports.push((teardown_step, Dispatch::from(context.teardown())));
    reports
}

fn report(
    renderer: &mut TracingRenderer,
    step: usize,
    dispatch: &Dispatch,
) -> portfolio_gallery_core::Result<()> {
    renderer.apply_all(&dispatch.intents);
    let line = serde_json::to_string(&StepReport {
        step,
        intents: &dispatch.intents,
        prevent_default: dispatch.prevent_default,
    })?;
    println!("{line}");
    Ok(())
}

fn run_audit(collections: &Path, manifest: &Path) -> portfolio_gallery_core::Result<()> {
    tracing::info!(?collections, ?manifest, "auditing gallery collections");

    let collections = GalleryCollection::from_path(collections)?;
    let resolver = ResponsiveImageResolver::from_path(manifest)?;

    let mut report = AuditReport {
        categories: collections.len(),
        items: 0,
        missing: Vec::new(),
        empty_categories: Vec::new(),
    };
    for (category, items) in collections.iter() {
        if items.is_empty() {
            report.empty_categories.push(category.to_string());
        }
        report.items += items.len();
        report.missing.extend(
            items
                .iter()
                .filter(|item| !resolver.contains(&item.src))
                .map(|item| MissingSource {
                    category: category.to_string(),
                    src: item.src.clone(),
                }),
        );
    }

    if !report.missing.is_empty() {
        tracing::warn!(missing = report.missing.len(), "items without responsive sources");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Portfolio gallery interaction tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a JSON script of host events and print the resulting intents.
    Replay {
        /// Path to the event script.
        script: PathBuf,
        /// Page markup snapshot.
        #[arg(long)]
        markup: Option<PathBuf>,
        /// Gallery collections, keyed by category.
        #[arg(long)]
        collections: Option<PathBuf>,
        /// Responsive image manifest.
        #[arg(long)]
        manifest: Option<PathBuf>,
        /// Optional configuration overrides.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Simulated viewport width in CSS px.
        #[arg(long, default_value_t = 1280.0)]
        width: f64,
        /// Simulate a reduced-motion preference.
        #[arg(long)]
        reduced_motion: bool,
    },
    /// Report collection items that have no responsive source-set.
    Audit {
        /// Gallery collections, keyed by category.
        collections: PathBuf,
        /// Responsive image manifest.
        manifest: PathBuf,
    },
}
