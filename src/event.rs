use storyweave::assistant::{AssistantReply, BackendError};
use storyweave::component::ComponentRegistry;
use storyweave::story::PreparationEvent;

#[derive(Debug)]
pub enum AppEvent {
    Preparation(PreparationEvent),
    /// Fully prepared registry, combinations included.
    RegistryReady(Box<ComponentRegistry>),
    AssistantReplied(AssistantReply),
    AssistantFailed(BackendError),
}
