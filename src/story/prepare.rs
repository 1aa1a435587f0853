use crate::component::{extract, ComponentRegistry, Progress};
use crate::story::{one_story_per_component, StorySource};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreparationEvent {
    Started { total: usize },
    Progress(Progress),
    Prepared { component: String, story_id: String },
    Skipped(PreparationDiagnostic),
    Finished(PreparationReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparationDiagnostic {
    pub component: String,
    pub story_id: String,
    pub reason: String,
}

impl PreparationDiagnostic {
    pub fn to_log_line(&self) -> String {
        format!(
            "story skipped component={} story_id={} reason={}",
            self.component, self.story_id, self.reason
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparationReport {
    pub total: usize,
    pub prepared: Vec<String>,
    pub diagnostics: Vec<PreparationDiagnostic>,
}

/// Loads one story per component, strictly one at a time, and registers what
/// each yields. Failures are logged and skipped; the loop always finishes.
pub async fn prepare_all<S, F>(
    source: &S,
    registry: &mut ComponentRegistry,
    mut emit: F,
) -> PreparationReport
where
    S: StorySource + ?Sized,
    F: FnMut(PreparationEvent),
{
    let mut report = PreparationReport::default();

    let index = match source.fetch_index().await {
        Ok(index) => index,
        Err(error) => {
            warn!(%error, "failed to fetch story index");
            report.diagnostics.push(PreparationDiagnostic {
                component: String::new(),
                story_id: String::new(),
                reason: format!("index unavailable: {error}"),
            });
            emit(PreparationEvent::Finished(report.clone()));
            return report;
        }
    };

    let targets = one_story_per_component(index.entries());
    report.total = targets.len();
    for (component, _) in &targets {
        registry.register_pending(component);
    }
    emit(PreparationEvent::Started {
        total: targets.len(),
    });

    for (component, story_id) in targets {
        if registry.has(&component) {
            emit(PreparationEvent::Progress(registry.progress()));
            continue;
        }

        let skip_reason = match source.load_story(&story_id).await {
            Ok(Some(story)) => match extract(&story.context()) {
                Some(record) => {
                    let name = record.name.clone();
                    if registry.register(record) {
                        registry.forget_pending(&component);
                        report.prepared.push(name.clone());
                        emit(PreparationEvent::Prepared {
                            component: name,
                            story_id: story_id.clone(),
                        });
                        None
                    } else {
                        warn!(
                            component = %component,
                            extracted = %name,
                            story_id = %story_id,
                            "duplicate component extracted"
                        );
                        Some(format!("component `{name}` already registered"))
                    }
                }
                None => Some("story has no extractable component".to_string()),
            },
            Ok(None) => Some("story has no metadata".to_string()),
            Err(error) => {
                warn!(component = %component, story_id = %story_id, %error, "failed to load story");
                Some(error.to_string())
            }
        };

        if let Some(reason) = skip_reason {
            registry.forget_pending(&component);
            let diagnostic = PreparationDiagnostic {
                component,
                story_id,
                reason,
            };
            report.diagnostics.push(diagnostic.clone());
            emit(PreparationEvent::Skipped(diagnostic));
        }
        emit(PreparationEvent::Progress(registry.progress()));
    }

    info!(
        prepared = report.prepared.len(),
        skipped = report.diagnostics.len(),
        "story preparation finished"
    );
    emit(PreparationEvent::Finished(report.clone()));
    report
}
