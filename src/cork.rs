//! Deferred-commit tag output queue
//!
//! Committed tags are not emitted immediately: they are parked in an ordered
//! queue so that later matches in the same file can still amend earlier
//! entries, typically to attach a parent scope, before the caller observes
//! anything. Queue indices are stable from commit until drain, and drain
//! yields each session's tags exactly once, in commit order.

use crate::error::{QueueIndexError, ScriptRuntimeError};
use crate::kinds::KindTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A tag under construction during one script run.
///
/// Becomes immutable once committed to the queue.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PendingTag {
    /// Display name of the tagged construct.
    pub name: String,
    /// Index into the language's kind table.
    pub kind_index: usize,
    /// Byte offset where the tag's extent starts.
    pub start: usize,
    /// Byte offset where the tag's extent ends, when known.
    pub end: Option<usize>,
    /// Queue index of the enclosing tag, when known.
    pub scope: Option<usize>,
    /// Free-form fields a script or caller attached.
    pub extras: BTreeMap<String, String>,
}

/// A committed symbol-table entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Display name of the tagged construct.
    pub name: String,
    /// Index into the language's kind table.
    pub kind_index: usize,
    /// Byte offset where the tag's extent starts.
    pub start: usize,
    /// Byte offset where the tag's extent ends, when known.
    pub end: Option<usize>,
    /// Queue index of the enclosing tag, when patched in.
    pub scope: Option<usize>,
    /// Free-form fields a script or caller attached.
    pub extras: BTreeMap<String, String>,
}

impl From<PendingTag> for Tag {
    fn from(pending: PendingTag) -> Self {
        Tag {
            name: pending.name,
            kind_index: pending.kind_index,
            start: pending.start,
            end: pending.end,
            scope: pending.scope,
            extras: pending.extras,
        }
    }
}

/// A single field update applied to an already-committed tag.
#[derive(Debug, Clone, PartialEq)]
pub enum TagPatch {
    /// Set the end offset of the extent.
    End(usize),
    /// Set the enclosing tag's queue index.
    Scope(usize),
    /// Attach or overwrite a free-form field.
    Extra(String, String),
}

/// Ordered buffer of committed tags with look-back patching.
#[derive(Debug, Clone, Default)]
pub struct CorkQueue {
    entries: Vec<Tag>,
}

impl CorkQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a committed tag, returning its stable queue index.
    pub fn append(&mut self, tag: Tag) -> usize {
        self.entries.push(tag);
        self.entries.len() - 1
    }

    /// Validate and commit a pending tag.
    ///
    /// The name must be non-empty and the kind index must be registered.
    /// This is the shared gate for script `_commit` and simple rules.
    pub fn commit(
        &mut self,
        pending: PendingTag,
        kinds: &KindTable,
    ) -> Result<usize, ScriptRuntimeError> {
        if pending.name.is_empty() {
            return Err(ScriptRuntimeError::EmptyTagName);
        }
        if kinds.lookup(pending.kind_index).is_none() {
            return Err(ScriptRuntimeError::InvalidKind(format!(
                "index {}",
                pending.kind_index
            )));
        }
        Ok(self.append(pending.into()))
    }

    /// Patch a field of an already-committed entry.
    pub fn patch(&mut self, index: usize, patch: TagPatch) -> Result<(), QueueIndexError> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(QueueIndexError { index, len })?;
        match patch {
            TagPatch::End(end) => entry.end = Some(end),
            TagPatch::Scope(scope) => entry.scope = Some(scope),
            TagPatch::Extra(key, value) => {
                entry.extras.insert(key, value);
            }
        }
        Ok(())
    }

    /// Read an entry without draining.
    pub fn get(&self, index: usize) -> Option<&Tag> {
        self.entries.get(index)
    }

    /// Number of committed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the queue holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drain all entries in commit order, leaving the queue empty.
    ///
    /// Tags whose kind is disabled are dropped here, the last gate before
    /// output, so scripts can compute with disabled kinds and queue indices
    /// recorded earlier stay meaningful until this point.
    pub fn drain(&mut self, kinds: &KindTable) -> Vec<Tag> {
        std::mem::take(&mut self.entries)
            .into_iter()
            .filter(|tag| kinds.is_enabled(tag.kind_index))
            .collect()
    }
}
