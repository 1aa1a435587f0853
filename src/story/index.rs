use crate::story::StoryIndexEntry;

/// Groups story ids by component name, keeping first-seen order.
pub fn unique_components<'a, I>(entries: I) -> Vec<(String, Vec<String>)>
where
    I: IntoIterator<Item = &'a StoryIndexEntry>,
{
    let mut components: Vec<(String, Vec<String>)> = Vec::new();
    for entry in entries.into_iter().filter(|entry| entry.is_story()) {
        let name = entry.component_name();
        match components.iter_mut().find(|(known, _)| known.as_str() == name) {
            Some((_, ids)) => ids.push(entry.id.clone()),
            None => components.push((name.to_string(), vec![entry.id.clone()])),
        }
    }
    components
}

/// The first story of each component, which is enough to extract metadata.
pub fn one_story_per_component<'a, I>(entries: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = &'a StoryIndexEntry>,
{
    unique_components(entries)
        .into_iter()
        .filter_map(|(name, ids)| ids.into_iter().next().map(|id| (name, id)))
        .collect()
}

pub fn story_ids<'a, I>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a StoryIndexEntry>,
{
    entries
        .into_iter()
        .filter(|entry| entry.is_story())
        .map(|entry| entry.id.clone())
        .collect()
}
