//! Cache tags and the query-key ↔ tag graph.
//!
//! Queries declare the tags they *provide*; mutations declare the tags they
//! *invalidate*. The graph answers "which cached queries does this mutation
//! touch" without knowing anything about specific resources.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::Result;

/// Identity part of a [`Tag`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagId {
    /// The collection as a whole (any list query of the resource)
    List,
    /// One record
    Id(i64),
    /// Wildcard used in invalidations: every tag of the kind
    Any,
}

/// Label attached to cached results and to mutations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    pub kind: String,
    pub id: TagId,
}

impl Tag {
    pub fn list(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: TagId::List,
        }
    }

    pub fn id(kind: impl Into<String>, id: i64) -> Self {
        Self {
            kind: kind.into(),
            id: TagId::Id(id),
        }
    }

    pub fn any(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: TagId::Any,
        }
    }

    /// Whether invalidating `self` reaches a query that provided `provided`.
    pub fn matches(&self, provided: &Tag) -> bool {
        self.kind == provided.kind && (self.id == TagId::Any || self.id == provided.id)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            TagId::List => write!(f, "{}:LIST", self.kind),
            TagId::Id(id) => write!(f, "{}:{}", self.kind, id),
            TagId::Any => write!(f, "{}:*", self.kind),
        }
    }
}

/// Cache identity of a query: endpoint name plus canonical JSON of its
/// arguments. Different arguments give different entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    pub endpoint: String,
    pub args: String,
}

impl QueryKey {
    pub fn new<A: Serialize + ?Sized>(endpoint: &str, args: &A) -> Result<Self> {
        Ok(Self {
            endpoint: endpoint.to_string(),
            args: serde_json::to_string(args)?,
        })
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.endpoint, self.args)
    }
}

/// Bipartite graph between query keys and the tags they provide.
#[derive(Debug, Default)]
pub struct TagGraph {
    tags_by_key: HashMap<QueryKey, HashSet<Tag>>,
    keys_by_tag: HashMap<Tag, HashSet<QueryKey>>,
}

impl TagGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tags provided by `key`, replacing whatever it provided before.
    pub fn attach(&mut self, key: &QueryKey, tags: impl IntoIterator<Item = Tag>) {
        self.detach(key);
        let tags: HashSet<Tag> = tags.into_iter().collect();
        for tag in &tags {
            self.keys_by_tag
                .entry(tag.clone())
                .or_default()
                .insert(key.clone());
        }
        self.tags_by_key.insert(key.clone(), tags);
    }

    /// Remove `key` and all its edges.
    pub fn detach(&mut self, key: &QueryKey) {
        let Some(tags) = self.tags_by_key.remove(key) else {
            return;
        };
        for tag in tags {
            if let Some(keys) = self.keys_by_tag.get_mut(&tag) {
                keys.remove(key);
                if keys.is_empty() {
                    self.keys_by_tag.remove(&tag);
                }
            }
        }
    }

    /// Every key providing at least one tag matched by `invalidated`.
    pub fn keys_for(&self, invalidated: &[Tag]) -> HashSet<QueryKey> {
        let mut keys = HashSet::new();
        for tag in invalidated {
            if tag.id == TagId::Any {
                for (provided, provided_keys) in &self.keys_by_tag {
                    if tag.matches(provided) {
                        keys.extend(provided_keys.iter().cloned());
                    }
                }
            } else if let Some(provided_keys) = self.keys_by_tag.get(tag) {
                keys.extend(provided_keys.iter().cloned());
            }
        }
        keys
    }

    pub fn tags_of(&self, key: &QueryKey) -> Option<&HashSet<Tag>> {
        self.tags_by_key.get(key)
    }

    pub fn clear(&mut self) {
        self.tags_by_key.clear();
        self.keys_by_tag.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.tags_by_key.is_empty()
    }
}
