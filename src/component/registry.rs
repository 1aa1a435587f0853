use crate::component::ComponentRecord;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub loaded: usize,
    pub total: usize,
}

impl Progress {
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            return 1.0;
        }
        self.loaded as f32 / self.total as f32
    }

    pub fn is_complete(&self) -> bool {
        self.loaded >= self.total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type ProgressListener = Box<dyn FnMut(Progress) + Send>;

/// Name-keyed store of component records. The first record registered under
/// a name wins; iteration follows insertion order.
#[derive(Default)]
pub struct ComponentRegistry {
    records: Vec<ComponentRecord>,
    by_name: HashMap<String, usize>,
    pending: BTreeSet<String>,
    listeners: Vec<(ListenerId, ProgressListener)>,
    next_listener: u64,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, record: ComponentRecord) -> bool {
        self.pending.remove(&record.name);
        if self.by_name.contains_key(&record.name) {
            return false;
        }

        debug!(component = %record.name, synthetic = record.is_synthetic(), "component registered");
        self.by_name.insert(record.name.clone(), self.records.len());
        self.records.push(record);
        self.notify_progress();
        true
    }

    /// Marks a component as known but not yet extracted.
    pub fn register_pending(&mut self, name: &str) {
        if self.by_name.contains_key(name) {
            return;
        }
        if self.pending.insert(name.to_string()) {
            self.notify_progress();
        }
    }

    /// Drops a pending entry whose story could not be loaded.
    pub fn forget_pending(&mut self, name: &str) {
        if self.pending.remove(name) {
            self.notify_progress();
        }
    }

    pub fn get(&self, name: &str) -> Option<&ComponentRecord> {
        self.by_name.get(name).map(|index| &self.records[*index])
    }

    pub fn has(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn all(&self) -> &[ComponentRecord] {
        &self.records
    }

    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|record| record.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resets records and pending entries. Listeners stay subscribed and are
    /// not notified.
    pub fn clear(&mut self) {
        self.records.clear();
        self.by_name.clear();
        self.pending.clear();
    }

    pub fn progress(&self) -> Progress {
        Progress {
            loaded: self.records.len(),
            total: self.records.len() + self.pending.len(),
        }
    }

    pub fn pending_names(&self) -> Vec<&str> {
        self.pending.iter().map(String::as_str).collect()
    }

    pub fn is_fully_loaded(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn on_progress<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(Progress) + Send + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    fn notify_progress(&mut self) {
        let progress = self.progress();
        for (_, listener) in &mut self.listeners {
            listener(progress);
        }
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("names", &self.names())
            .field("pending", &self.pending)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ComponentRef;
    use crate::schema::PropsSchema;
    use std::sync::{Arc, Mutex};

    fn record(name: &str) -> ComponentRecord {
        ComponentRecord::new(
            name,
            format!("A {name} component"),
            PropsSchema::default(),
            ComponentRef::host(name),
        )
    }

    #[test]
    fn register_is_idempotent_per_name() {
        let mut registry = ComponentRegistry::new();
        assert!(registry.register(record("Button")));
        assert_eq!(registry.len(), 1);

        let mut replacement = record("Button");
        replacement.description = "second".into();
        assert!(!registry.register(replacement));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("Button").map(|record| record.description.as_str()),
            Some("A Button component")
        );
    }

    #[test]
    fn all_keeps_insertion_order() {
        let mut registry = ComponentRegistry::new();
        for name in ["Stack", "Button", "Alert"] {
            registry.register(record(name));
        }
        assert_eq!(registry.names(), vec!["Stack", "Button", "Alert"]);
        assert!(registry.has("Alert"));
        assert!(!registry.has("Card"));
    }

    #[test]
    fn pending_entries_drive_progress() {
        let mut registry = ComponentRegistry::new();
        registry.register_pending("Button");
        registry.register_pending("Card");
        assert_eq!(registry.progress(), Progress { loaded: 0, total: 2 });
        assert!(!registry.is_fully_loaded());

        registry.register(record("Button"));
        assert_eq!(registry.progress(), Progress { loaded: 1, total: 2 });
        assert_eq!(registry.pending_names(), vec!["Card"]);

        registry.register_pending("Button");
        assert_eq!(registry.pending_names(), vec!["Card"]);

        registry.forget_pending("Card");
        assert!(registry.is_fully_loaded());
        assert_eq!(registry.progress(), Progress { loaded: 1, total: 1 });
    }

    #[test]
    fn listeners_hear_progress_until_removed() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut registry = ComponentRegistry::new();
        let id = registry.on_progress(move |progress| {
            if let Ok(mut seen) = sink.lock() {
                seen.push(progress);
            }
        });

        registry.register_pending("Button");
        registry.register(record("Button"));
        registry.register(record("Button"));
        assert!(registry.remove_listener(id));
        registry.register(record("Card"));

        let seen = seen.lock().expect("listener log");
        assert_eq!(
            *seen,
            vec![
                Progress { loaded: 0, total: 1 },
                Progress { loaded: 1, total: 1 },
            ]
        );
    }

    #[test]
    fn clear_resets_everything() {
        let mut registry = ComponentRegistry::new();
        registry.register(record("Button"));
        registry.register_pending("Card");
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.progress(), Progress::default());
    }

    #[test]
    fn empty_progress_is_complete() {
        assert_eq!(Progress::default().fraction(), 1.0);
        assert!(Progress { loaded: 3, total: 3 }.is_complete());
    }
}
