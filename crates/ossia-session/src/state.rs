use std::collections::HashMap;

use crate::model::{CreatorRecord, ViewerIdentity};

/// Lookup from creator `url` to its position in the creator list.
///
/// Always rebuilt from the list, never edited on its own. When several
/// records share a `url` the later one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatorIndex {
    by_url: HashMap<String, usize>,
}

impl CreatorIndex {
    pub fn build(creators: &[CreatorRecord]) -> Self {
        let by_url = creators
            .iter()
            .enumerate()
            .map(|(position, creator)| (creator.url.clone(), position))
            .collect();
        Self { by_url }
    }

    pub fn position(&self, url: &str) -> Option<usize> {
        self.by_url.get(url).copied()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.by_url.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.by_url.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_url.is_empty()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.by_url.keys().map(String::as_str)
    }
}

/// Everything the session knows about the current viewer.
///
/// `identity` is all-or-nothing: authorized exactly when it is `Some`.
/// `creators == None` means not loaded (or the last load failed); an empty
/// list means loaded with no creators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    identity: Option<ViewerIdentity>,
    creators: Option<Vec<CreatorRecord>>,
    index: CreatorIndex,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authorized(&self) -> bool {
        self.identity.is_some()
    }

    pub fn identity(&self) -> Option<&ViewerIdentity> {
        self.identity.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.id.as_str())
    }

    pub fn username(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.username.as_str())
    }

    pub fn display_name(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.display_name.as_str())
    }

    pub fn has_avatar(&self) -> bool {
        self.identity.as_ref().is_some_and(|i| i.has_avatar)
    }

    pub fn creators(&self) -> Option<&[CreatorRecord]> {
        self.creators.as_deref()
    }

    pub fn creator_index(&self) -> &CreatorIndex {
        &self.index
    }

    pub fn creator_by_url(&self, url: &str) -> Option<&CreatorRecord> {
        let position = self.index.position(url)?;
        self.creators.as_ref()?.get(position)
    }

    /// Returns false if the identity was already the same.
    pub(crate) fn set_identity(&mut self, identity: ViewerIdentity) -> bool {
        if self.identity.as_ref() == Some(&identity) {
            return false;
        }
        self.identity = Some(identity);
        true
    }

    /// Returns false if there was nothing to clear.
    pub(crate) fn clear_identity(&mut self) -> bool {
        self.identity.take().is_some()
    }

    /// Replace the creator list wholesale and rebuild the index.
    pub(crate) fn set_creators(&mut self, creators: Option<Vec<CreatorRecord>>) -> bool {
        if self.creators == creators {
            return false;
        }
        self.index = match &creators {
            Some(list) => CreatorIndex::build(list),
            None => CreatorIndex::default(),
        };
        self.creators = creators;
        true
    }

    pub(crate) fn reset(&mut self) -> bool {
        if *self == Self::default() {
            return false;
        }
        *self = Self::default();
        true
    }
}
