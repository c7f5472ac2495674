//! The interning table shared by the lexer and the semantic passes.
//!
//! Every lexical token carries a [`StringId`] instead of its own copy of
//! the text; interning the same text twice returns the same handle, so
//! handles can be compared by id.

use rustc_hash::FxHashMap;

/// Canonical handle for a piece of interned source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringId(u32);

#[derive(Debug, Default)]
pub struct StringSet {
    map: FxHashMap<String, StringId>,
    strings: Vec<String>,
}

impl StringSet {
    pub fn new() -> Self {
        StringSet {
            map: FxHashMap::default(),
            strings: Vec::new(),
        }
    }

    /// Interns `text`, returning the existing handle if it was seen before.
    pub fn intern(&mut self, text: &str) -> StringId {
        if let Some(&id) = self.map.get(text) {
            return id;
        }

        let id = StringId(self.strings.len() as u32);
        self.strings.push(text.to_string());
        self.map.insert(text.to_string(), id);
        id
    }

    pub fn resolve(&self, id: StringId) -> &str {
        &self.strings[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
