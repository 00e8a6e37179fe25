use std::collections::HashMap;

/// Identifier of an interned string.
///
/// Comparing two `StringId`s is equivalent to comparing the strings they were
/// interned from, with one twist: [`StringTable::UNKNOWN`] marks a string that
/// was never interned and compares unequal to every real id.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd, Debug)]
pub(crate) struct StringId(usize);

/// Interns the strings that appear as operands in registered expressions.
///
/// Event values go through the read-only [`StringTable::lookup`]: a string
/// that no expression mentions cannot influence a match beyond "differs from
/// every operand", so it maps to the sentinel instead of growing the table.
pub(crate) struct StringTable {
    by_values: HashMap<String, StringId>,
    by_ids: Vec<String>,
}

impl StringTable {
    pub const UNKNOWN: StringId = StringId(0);

    pub fn new() -> Self {
        Self {
            by_values: HashMap::new(),
            // Slot 0 is reserved for the sentinel and never handed out.
            by_ids: vec![String::new()],
        }
    }

    pub fn lookup(&self, value: &str) -> StringId {
        self.by_values.get(value).copied().unwrap_or(Self::UNKNOWN)
    }

    pub fn intern(&mut self, value: &str) -> StringId {
        if let Some(id) = self.by_values.get(value) {
            return *id;
        }
        let id = StringId(self.by_ids.len());
        self.by_ids.push(value.to_owned());
        self.by_values.insert(value.to_owned(), id);
        id
    }

    pub fn resolve(&self, id: StringId) -> &str {
        &self.by_ids[id.0]
    }
}
