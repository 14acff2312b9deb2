//! Kind table for tag classification
//!
//! Every committed tag carries a kind: a category such as "section" with a
//! stable index and a one-letter alias. Kinds are registered in order while a
//! language is being defined and the table is frozen afterwards, so an index
//! handed to a script stays valid for the language's whole lifetime.
//! Disabling a kind never moves indices; it only suppresses matching tags at
//! drain time.

use crate::error::DefineError;
use serde::{Deserialize, Serialize};

/// One registered tag category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindDefinition {
    /// One-letter alias, unique within a language.
    pub letter: char,
    /// Singular name, e.g. "section".
    pub name: String,
    /// Plural name, e.g. "sections".
    pub plural_name: String,
    /// Whether tags of this kind are emitted at drain time.
    pub enabled: bool,
}

/// Ordered collection of kind definitions.
///
/// Index assignment follows registration order and is stable for the
/// language's lifetime.
#[derive(Debug, Clone, Default)]
pub struct KindTable {
    kinds: Vec<KindDefinition>,
}

impl KindTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self { kinds: Vec::new() }
    }

    /// Register a kind and return its stable index.
    ///
    /// Fails if the letter is already taken; a duplicate letter would make
    /// `lookup_by_letter` ambiguous.
    pub fn define(
        &mut self,
        letter: char,
        name: &str,
        plural_name: &str,
        enabled: bool,
    ) -> Result<usize, DefineError> {
        if self.lookup_by_letter(letter).is_some() {
            return Err(DefineError::DuplicateKindLetter(letter));
        }
        self.kinds.push(KindDefinition {
            letter,
            name: name.to_string(),
            plural_name: plural_name.to_string(),
            enabled,
        });
        Ok(self.kinds.len() - 1)
    }

    /// Look up a kind by its stable index.
    pub fn lookup(&self, index: usize) -> Option<&KindDefinition> {
        self.kinds.get(index)
    }

    /// Look up a kind by its one-letter alias.
    pub fn lookup_by_letter(&self, letter: char) -> Option<&KindDefinition> {
        self.kinds.iter().find(|k| k.letter == letter)
    }

    /// Index of the kind with the given letter.
    pub fn index_by_letter(&self, letter: char) -> Option<usize> {
        self.kinds.iter().position(|k| k.letter == letter)
    }

    /// Index of the kind with the given singular name.
    pub fn index_by_name(&self, name: &str) -> Option<usize> {
        self.kinds.iter().position(|k| k.name == name)
    }

    /// Toggle emission of a kind without moving any index.
    ///
    /// Returns false if no kind carries the letter.
    pub fn enable(&mut self, letter: char, enabled: bool) -> bool {
        match self.kinds.iter_mut().find(|k| k.letter == letter) {
            Some(kind) => {
                kind.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Whether the kind at `index` is currently emitted.
    pub fn is_enabled(&self, index: usize) -> bool {
        self.kinds.get(index).map(|k| k.enabled).unwrap_or(false)
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Check if the table has no kinds.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Iterate over the definitions in index order.
    pub fn iter(&self) -> impl Iterator<Item = &KindDefinition> {
        self.kinds.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> KindTable {
        let mut table = KindTable::new();
        table.define('c', "chapter", "chapters", true).unwrap();
        table.define('s', "section", "sections", true).unwrap();
        table.define('S', "subsection", "subsections", true).unwrap();
        table
    }

    #[test]
    fn test_define_assigns_indices_in_order() {
        let table = sample_table();
        assert_eq!(table.lookup(0).unwrap().name, "chapter");
        assert_eq!(table.lookup(1).unwrap().name, "section");
        assert_eq!(table.lookup(2).unwrap().name, "subsection");
        assert_eq!(table.lookup(3), None);
    }

    #[test]
    fn test_duplicate_letter_rejected() {
        let mut table = sample_table();
        assert_eq!(
            table.define('s', "slide", "slides", true),
            Err(DefineError::DuplicateKindLetter('s'))
        );
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_lookup_by_letter() {
        let table = sample_table();
        assert_eq!(table.lookup_by_letter('S').unwrap().name, "subsection");
        assert_eq!(table.lookup_by_letter('x'), None);
        assert_eq!(table.index_by_letter('c'), Some(0));
    }

    #[test]
    fn test_disable_keeps_indices_stable() {
        let mut table = sample_table();
        assert!(table.enable('s', false));
        assert_eq!(table.index_by_name("subsection"), Some(2));
        assert!(!table.is_enabled(1));
        assert!(table.is_enabled(2));
        // The disabled kind is still resolvable for scripts.
        assert_eq!(table.lookup(1).unwrap().name, "section");
    }

    #[test]
    fn test_enable_unknown_letter() {
        let mut table = sample_table();
        assert!(!table.enable('z', false));
    }
}
