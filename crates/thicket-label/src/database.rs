// crates/thicket-label/src/database.rs

//! The box database: a name <-> [`BoxId`] table plus each box's raw
//! textual tree-automaton definition.
//!
//! This crate only owns the *names* and raw definition text (`spec.md` §6:
//! "newline-separated name + textual TA"); parsing a definition into a
//! `TreeAut` is `thicket-fold`'s job, since that is the crate that already
//! depends on `thicket-automata` — keeping the parse out of here avoids a
//! dependency cycle between the two crates.

use crate::boxes::BoxId;
use std::collections::HashMap;
use std::fmt;

/// Box names are interned here, not in [`crate::arena::LabelArena`]: boxes
/// are named by the user/front end, not structurally deduplicated.
#[derive(Debug, Default, Clone)]
pub struct BoxManager {
    names: Vec<String>,
    by_name: HashMap<String, BoxId>,
    definitions: HashMap<BoxId, String>,
}

/// Error raised while parsing a box-database text file.
#[derive(Debug)]
pub struct MalformedEntry {
    pub line: usize,
    pub reason: String,
}

impl fmt::Display for MalformedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

impl std::error::Error for MalformedEntry {}

impl BoxManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `name`, registering a fresh one if it is new.
    pub fn intern_name(&mut self, name: &str) -> BoxId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = BoxId(u32::try_from(self.names.len()).expect("box database overflow"));
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        id
    }

    #[must_use]
    pub fn name_of(&self, id: BoxId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<BoxId> {
        self.by_name.get(name).copied()
    }

    /// Registers (or overwrites, per `spec.md`'s "duplicate name
    /// overwrites" load semantics) the raw TA text for a box.
    pub fn define(&mut self, name: &str, ta_text: impl Into<String>) -> BoxId {
        let id = self.intern_name(name);
        self.definitions.insert(id, ta_text.into());
        id
    }

    #[must_use]
    pub fn definition(&self, id: BoxId) -> Option<&str> {
        self.definitions.get(&id).map(String::as_str)
    }

    /// Parses a box-database text file: each entry is a name line followed
    /// by its textual TA definition, up to the next name line (name lines
    /// start in column 0 with no leading whitespace; TA body lines are
    /// indented). Loading is idempotent: a repeated name overwrites the
    /// earlier definition, matching the file-format note in `spec.md` §6.
    pub fn load_text(&mut self, text: &str) -> Result<(), MalformedEntry> {
        let mut current: Option<(String, String)> = None;
        for (idx, raw_line) in text.lines().enumerate() {
            if raw_line.trim().is_empty() {
                continue;
            }
            let is_header = !raw_line.starts_with(char::is_whitespace);
            if is_header {
                if let Some((name, body)) = current.take() {
                    self.define(&name, body);
                }
                current = Some((raw_line.trim().to_string(), String::new()));
            } else {
                match current.as_mut() {
                    Some((_, body)) => {
                        body.push_str(raw_line.trim_start());
                        body.push('\n');
                    }
                    None => {
                        return Err(MalformedEntry {
                            line: idx + 1,
                            reason: "TA body line before any box name".to_string(),
                        });
                    }
                }
            }
        }
        if let Some((name, body)) = current {
            self.define(&name, body);
        }
        Ok(())
    }

    /// Serializes the database back to the newline-separated text format.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (idx, name) in self.names.iter().enumerate() {
            let id = BoxId(u32::try_from(idx).expect("box database overflow"));
            out.push_str(name);
            out.push('\n');
            if let Some(def) = self.definitions.get(&id) {
                for line in def.lines() {
                    out.push_str("  ");
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }
        out
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_text() {
        let mut db = BoxManager::new();
        db.define("sll-seg", "q0 -> data(NULL)\n  q0 -> node(sel(0,8,0))(q0)\n");
        let text = db.to_text();
        let mut reloaded = BoxManager::new();
        reloaded.load_text(&text).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.definition(reloaded.id_of("sll-seg").unwrap()).is_some());
    }

    #[test]
    fn duplicate_name_overwrites() {
        let mut db = BoxManager::new();
        let text = "box-a\n  q0 -> data(1)\nbox-a\n  q0 -> data(2)\n";
        db.load_text(text).unwrap();
        assert_eq!(db.len(), 1);
        let id = db.id_of("box-a").unwrap();
        assert!(db.definition(id).unwrap().contains('2'));
    }

    #[test]
    fn body_before_any_name_is_an_error() {
        let mut db = BoxManager::new();
        let err = db.load_text("  q0 -> data(1)\n").unwrap_err();
        assert_eq!(err.line, 1);
    }
}
