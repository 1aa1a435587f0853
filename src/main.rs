mod app;
mod canvas;
mod event;
mod theme;

use app::StoryweaveApp;
use eframe::egui;
use event::AppEvent;
use std::sync::{mpsc, Arc};
use storyweave::assistant::{AssistantBackend, LocalBackend};
use storyweave::component::{register_combinations, ComponentRegistry};
use storyweave::config::Settings;
use storyweave::story::{prepare_all, BundleStorySource, StoryError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn story_source(settings: &Settings) -> Result<BundleStorySource, StoryError> {
    match &settings.stories_path {
        Some(path) => {
            info!(path = %path.display(), "loading story bundle");
            BundleStorySource::from_path(path)
        }
        None => BundleStorySource::demo(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    init_tracing(&settings);

    let source = story_source(&settings)?;
    let (tx, rx) = mpsc::channel();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("storyweave-runtime")
        .build()?;

    let composer = settings.composer.clone();
    let events = tx.clone();
    runtime.spawn(async move {
        let mut registry = ComponentRegistry::new();
        let progress = events.clone();
        prepare_all(&source, &mut registry, move |event| {
            if progress.send(AppEvent::Preparation(event)).is_err() {
                warn!("preparation event dropped: event channel closed");
            }
        })
        .await;

        let added = register_combinations(&mut registry, &composer);
        info!(components = registry.len(), combinations = added, "registry ready");
        if events
            .send(AppEvent::RegistryReady(Box::new(registry)))
            .is_err()
        {
            warn!("registry dropped: event channel closed");
        }
    });

    let backend: Arc<dyn AssistantBackend> = Arc::new(LocalBackend::new());
    let app = StoryweaveApp::new(rx, tx, runtime.handle().clone(), backend, settings);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([1024.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Storyweave",
        native_options,
        Box::new(move |creation_context| {
            app.apply_theme(&creation_context.egui_ctx);
            Ok(Box::new(app))
        }),
    )?;

    drop(runtime);
    Ok(())
}
