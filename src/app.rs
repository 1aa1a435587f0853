use crate::canvas::Canvas;
use crate::event::AppEvent;
use crate::theme::Theme;
use eframe::egui::{self, RichText, ScrollArea};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use storyweave::assistant::{AssistantBackend, AssistantRequest, ChatThread, Role};
use storyweave::component::{ComponentRegistry, Progress};
use storyweave::config::Settings;
use storyweave::render::{GeneratedComponent, RenderNode, TreeRenderer};
use storyweave::story::codegen::write_story_file;
use storyweave::story::{generate_story_code, PreparationEvent, StoryOptions};
use tokio::runtime::Handle;
use tracing::warn;

struct Preview {
    message_id: u64,
    component: GeneratedComponent,
    node: RenderNode,
}

pub struct StoryweaveApp {
    rx: Receiver<AppEvent>,
    tx: Sender<AppEvent>,
    runtime: Handle,
    backend: Arc<dyn AssistantBackend>,
    settings: Settings,
    theme: Theme,
    registry: Option<ComponentRegistry>,
    progress: Progress,
    thread: ChatThread,
    preview: Option<Preview>,
    input_buffer: String,
    diagnostics_log: Vec<String>,
    scroll_to_bottom: bool,
}

impl StoryweaveApp {
    pub fn new(
        rx: Receiver<AppEvent>,
        tx: Sender<AppEvent>,
        runtime: Handle,
        backend: Arc<dyn AssistantBackend>,
        settings: Settings,
    ) -> Self {
        Self {
            rx,
            tx,
            runtime,
            backend,
            settings,
            theme: Theme::default(),
            registry: None,
            progress: Progress::default(),
            thread: ChatThread::new(),
            preview: None,
            input_buffer: String::new(),
            diagnostics_log: Vec::new(),
            scroll_to_bottom: false,
        }
    }

    pub fn apply_theme(&self, ctx: &egui::Context) {
        self.theme.apply_visuals(ctx);
    }

    fn timestamp() -> String {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(duration) => duration.as_secs().to_string(),
            Err(_) => "0".to_string(),
        }
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics_log
            .push(format!("[{}] {}", Self::timestamp(), message.into()));
    }

    fn is_ready(&self) -> bool {
        self.registry.is_some()
    }

    fn submit_prompt(&mut self, ctx: &egui::Context) {
        let Some(registry) = self.registry.as_ref() else {
            return;
        };
        let history = match self.thread.begin_turn(&self.input_buffer) {
            Ok(history) => history,
            Err(err) => {
                self.log_diagnostic(format!("message not sent: {err}"));
                return;
            }
        };

        let request = AssistantRequest::new(registry, history);
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let repaint = ctx.clone();
        self.runtime.spawn(async move {
            let event = match backend.respond(request).await {
                Ok(reply) => AppEvent::AssistantReplied(reply),
                Err(err) => AppEvent::AssistantFailed(err),
            };
            if tx.send(event).is_err() {
                warn!("assistant reply dropped: event channel closed");
            }
            repaint.request_repaint();
        });

        self.input_buffer.clear();
        self.scroll_to_bottom = true;
        ctx.request_repaint();
    }

    fn select_preview(&mut self, message_id: u64) {
        let Some(registry) = self.registry.as_ref() else {
            return;
        };
        let Some(component) = self
            .thread
            .messages()
            .iter()
            .find(|message| message.id == message_id)
            .and_then(|message| message.generated_component.clone())
        else {
            return;
        };

        let node = TreeRenderer::new(registry)
            .with_max_depth(self.settings.composer.max_render_depth)
            .render(&component);
        self.preview = Some(Preview {
            message_id,
            component,
            node,
        });
    }

    fn save_story(&mut self, component: &GeneratedComponent) {
        let dir = match std::env::current_dir() {
            Ok(dir) => dir,
            Err(err) => {
                self.log_diagnostic(format!("cannot resolve working directory: {err}"));
                return;
            }
        };
        match write_story_file(component, &StoryOptions::default(), &dir) {
            Ok(path) => self.log_diagnostic(format!("story saved to {}", path.display())),
            Err(err) => self.log_diagnostic(format!("failed to save story: {err}")),
        }
    }

    fn clear_conversation(&mut self) {
        self.thread.clear();
        self.preview = None;
        self.log_diagnostic("conversation cleared");
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event, ctx),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_diagnostic("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent, ctx: &egui::Context) {
        match event {
            AppEvent::Preparation(event) => self.apply_preparation(event),
            AppEvent::RegistryReady(registry) => {
                let synthetic = registry
                    .all()
                    .iter()
                    .filter(|record| record.is_synthetic())
                    .count();
                self.log_diagnostic(format!(
                    "registry ready: {} components, {synthetic} combinations",
                    registry.len() - synthetic
                ));
                self.registry = Some(*registry);
            }
            AppEvent::AssistantReplied(reply) => {
                let message = self.thread.complete_turn(reply);
                let generated = message
                    .generated_component
                    .is_some()
                    .then_some(message.id);
                if let Some(message_id) = generated {
                    self.select_preview(message_id);
                }
                self.scroll_to_bottom = true;
            }
            AppEvent::AssistantFailed(err) => {
                self.log_diagnostic(format!("assistant error: {err}"));
                self.thread.fail_turn(&err);
            }
        }
        ctx.request_repaint();
    }

    fn apply_preparation(&mut self, event: PreparationEvent) {
        match event {
            PreparationEvent::Started { total } => {
                self.progress = Progress { loaded: 0, total };
                self.log_diagnostic(format!("preparing {total} components"));
            }
            PreparationEvent::Progress(progress) => self.progress = progress,
            PreparationEvent::Prepared {
                component,
                story_id,
            } => {
                self.log_diagnostic(format!("prepared {component} from {story_id}"));
            }
            PreparationEvent::Skipped(diagnostic) => {
                self.log_diagnostic(diagnostic.to_log_line());
            }
            PreparationEvent::Finished(report) => {
                self.log_diagnostic(format!(
                    "preparation finished: {} of {} prepared, {} skipped",
                    report.prepared.len(),
                    report.total,
                    report.diagnostics.len()
                ));
            }
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        let theme = self.theme.clone();
        let mut clear = false;
        egui::TopBottomPanel::top("top_bar")
            .frame(theme.panel_frame(theme.backdrop, theme.space_s))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.strong("Storyweave");
                    ui.separator();
                    match self.registry.as_ref() {
                        Some(registry) => {
                            ui.label(
                                RichText::new(format!("{} components ready", registry.len()))
                                    .color(theme.success),
                            );
                        }
                        None => {
                            ui.label(
                                RichText::new(format!(
                                    "Loading components {}/{}",
                                    self.progress.loaded, self.progress.total
                                ))
                                .color(theme.warning),
                            );
                        }
                    }
                    ui.separator();
                    clear = ui
                        .add_enabled(
                            !self.thread.messages().is_empty() && !self.thread.is_generating(),
                            egui::Button::new("Clear chat").stroke(theme.hairline_stroke()),
                        )
                        .clicked();
                });
            });
        if clear {
            self.clear_conversation();
        }
    }

    fn render_left_panel(&mut self, ctx: &egui::Context) {
        let theme = self.theme.clone();
        let mut picked: Option<String> = None;
        egui::SidePanel::left("component_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Components");
                ui.separator();

                let Some(registry) = self.registry.as_ref() else {
                    ui.add(
                        egui::ProgressBar::new(self.progress.fraction())
                            .text(format!("{}/{}", self.progress.loaded, self.progress.total)),
                    );
                    return;
                };

                ScrollArea::vertical()
                    .id_salt("component_list")
                    .show(ui, |ui| {
                        for record in registry.all().iter().filter(|r| !r.is_synthetic()) {
                            ui.horizontal(|ui| {
                                if ui
                                    .link(record.name.as_str())
                                    .on_hover_text(record.description.as_str())
                                    .clicked()
                                {
                                    picked = Some(record.name.clone());
                                }
                                if record.is_container {
                                    ui.label(
                                        RichText::new("container")
                                            .color(theme.ink_muted)
                                            .size(11.0),
                                    );
                                }
                            });
                        }

                        let combinations: Vec<_> =
                            registry.all().iter().filter(|r| r.is_synthetic()).collect();
                        egui::CollapsingHeader::new(format!(
                            "Combinations ({})",
                            combinations.len()
                        ))
                        .default_open(false)
                        .show(ui, |ui| {
                            for record in combinations {
                                let label = format!("{} · depth {}", record.name, record.nesting_depth());
                                if ui
                                    .link(label)
                                    .on_hover_text(record.description.as_str())
                                    .clicked()
                                {
                                    picked = Some(record.name.clone());
                                }
                            }
                        });
                    });
            });

        // Seeds the composer with a bare description of the picked component.
        if let Some(name) = picked {
            let description = GeneratedComponent::new(name, Default::default());
            self.input_buffer = description.to_value().to_string();
        }
    }

    fn render_right_panel(&mut self, ctx: &egui::Context) {
        let theme = self.theme.clone();
        let mut copy = None;
        let mut save = None;
        egui::SidePanel::right("preview_panel")
            .resizable(true)
            .default_width(420.0)
            .show(ctx, |ui| {
                ui.heading("Preview");
                ui.separator();
                let Some(preview) = self.preview.as_ref() else {
                    ui.label(RichText::new("Generated components appear here").color(theme.ink_muted));
                    return;
                };

                ui.label(
                    RichText::new(format!(
                        "{} · {} elements · depth {}",
                        preview.component.component_name,
                        preview.node.element_count(),
                        preview.node.element_depth()
                    ))
                    .color(theme.ink_muted)
                    .size(12.0),
                );
                ui.horizontal(|ui| {
                    if ui.button("Copy story").clicked() {
                        copy = Some(preview.component.clone());
                    }
                    if ui.button("Save story").clicked() {
                        save = Some(preview.component.clone());
                    }
                });

                ScrollArea::vertical()
                    .id_salt("preview_canvas")
                    .show(ui, |ui| {
                        theme
                            .panel_frame(theme.backdrop, theme.space_l)
                            .show(ui, |ui| {
                                Canvas::new(&theme).show(ui, &preview.node);
                            });

                        egui::CollapsingHeader::new("Props")
                            .default_open(false)
                            .show(ui, |ui| {
                                let json = serde_json::to_string_pretty(&preview.component.props)
                                    .unwrap_or_default();
                                ui.label(RichText::new(json).monospace().color(theme.ink));
                            });
                    });
            });

        if let Some(component) = copy {
            ctx.copy_text(generate_story_code(&component, &StoryOptions::default()));
            self.log_diagnostic(format!("story for {} copied", component.component_name));
        }
        if let Some(component) = save {
            self.save_story(&component);
        }
    }

    fn render_center_panel(&mut self, ctx: &egui::Context) {
        let theme = self.theme.clone();
        let mut previewed: Option<u64> = None;
        let mut dismiss = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Chat");
            ui.separator();

            let transcript_height = (ui.available_height() - 170.0).max(120.0);
            let selected = self.preview.as_ref().map(|preview| preview.message_id);
            ScrollArea::vertical()
                .id_salt("chat_transcript")
                .max_height(transcript_height)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for message in self.thread.messages() {
                        let (speaker, color) = match message.role {
                            Role::User => ("You", theme.accent),
                            Role::Assistant => ("Assistant", theme.success),
                        };
                        theme.card_frame().show(ui, |ui| {
                            ui.set_width(ui.available_width());
                            ui.label(RichText::new(speaker).color(color).size(12.0));
                            ui.label(RichText::new(&message.content).color(theme.ink));
                            if let Some(component) = &message.generated_component {
                                ui.horizontal(|ui| {
                                    ui.label(
                                        RichText::new(&component.component_name)
                                            .color(theme.ink_muted)
                                            .monospace(),
                                    );
                                    let label = if selected == Some(message.id) {
                                        "Showing"
                                    } else {
                                        "Preview"
                                    };
                                    if ui.button(label).clicked() {
                                        previewed = Some(message.id);
                                    }
                                });
                            }
                        });
                    }

                    if self.thread.is_generating() {
                        ui.label(RichText::new("Generating...").color(theme.ink_muted));
                    }

                    if self.scroll_to_bottom {
                        ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                    }
                });
            self.scroll_to_bottom = false;

            if let Some(error) = self.thread.error() {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(error).color(theme.danger));
                    dismiss = ui.small_button("Dismiss").clicked();
                });
            }

            ui.separator();
            egui::CollapsingHeader::new("Diagnostics")
                .default_open(false)
                .show(ui, |ui| {
                    ScrollArea::vertical()
                        .id_salt("diagnostics_log")
                        .max_height(90.0)
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for entry in &self.diagnostics_log {
                                ui.label(entry);
                            }
                        });
                });

            ui.separator();
            let ready = self.is_ready();
            let input_enabled = ready && !self.thread.is_generating();
            let hint = if !ready {
                "Loading components..."
            } else if self.thread.is_generating() {
                "Waiting for response..."
            } else {
                "Describe the UI you want to build..."
            };

            let mut send_now = false;
            theme.composer_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    let width = ui.available_width() - 80.0;
                    let response = ui.add_enabled(
                        input_enabled,
                        egui::TextEdit::singleline(&mut self.input_buffer)
                            .desired_width(width)
                            .hint_text(hint),
                    );
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        send_now = true;
                    }

                    let clicked = ui
                        .add_enabled(
                            input_enabled && !self.input_buffer.trim().is_empty(),
                            egui::Button::new("Send"),
                        )
                        .clicked();
                    send_now |= clicked;
                });
            });

            if send_now && input_enabled {
                self.submit_prompt(ctx);
            }
        });

        if dismiss {
            self.thread.dismiss_error();
        }
        if let Some(message_id) = previewed {
            self.select_preview(message_id);
        }
    }
}

impl eframe::App for StoryweaveApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events(ctx);
        if !self.is_ready() {
            // Preparation runs off the UI thread and has no context to wake.
            ctx.request_repaint_after(Duration::from_millis(100));
        }
        self.render_top_bar(ctx);
        self.render_left_panel(ctx);
        self.render_right_panel(ctx);
        self.render_center_panel(ctx);
    }
}
