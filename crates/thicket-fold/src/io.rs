// crates/thicket-fold/src/io.rs

//! Parsing a box's raw definition text (as stored by
//! [`thicket_label::BoxManager`]) into a [`TreeAut`], and pretty-printing
//! one back to that text form.
//!
//! `thicket-label` deliberately stores box definitions as opaque strings to
//! avoid depending on `thicket-automata`; this module is where that text
//! actually becomes/comes from a tree automaton, one line per transition:
//!
//! ```text
//! q0 -> leaf null
//! q1 -> node [sel(0,8,0)] (q0)
//! final q1
//! ```
//!
//! A leaf transition names a [`Data`] value; a node transition names a
//! bracketed list of box items (in offset order, lining up with the
//! parenthesized child-state list) and its children. `final <state>`
//! marks a state as accepting. States are plain identifiers (`q0`, `q1`,
//! ...), allocated on first mention in file order.

use std::collections::HashMap;
use std::fmt::Write as _;
use thicket_automata::{State, TreeAut};
use thicket_core::{Data, RootIdx, SelData};
use thicket_label::{AbstractBox, BoxId, DataId, Label, LabelArena};

/// A malformed line in a box definition's textual TA body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub reason: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

impl std::error::Error for ParseError {}

struct StateNames {
    by_name: HashMap<String, State>,
}

impl StateNames {
    fn new() -> Self {
        Self { by_name: HashMap::new() }
    }

    fn resolve(&mut self, ta: &mut TreeAut, name: &str) -> State {
        if let Some(&s) = self.by_name.get(name) {
            return s;
        }
        let s = ta.fresh_state();
        self.by_name.insert(name.to_string(), s);
        s
    }
}

/// Parses one box's textual TA definition (the body `BoxManager` stores
/// per name) into a [`TreeAut`], interning every label through `arena`.
pub fn parse_ta(text: &str, arena: &mut LabelArena) -> Result<TreeAut, ParseError> {
    let mut ta = TreeAut::new();
    let mut names = StateNames::new();
    let mut next_data_id = 0u32;

    for (idx, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        let line_no = idx + 1;
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("final ") {
            let s = names.resolve(&mut ta, rest.trim());
            ta.add_final(s);
            continue;
        }
        let Some((lhs_name, rhs_text)) = line.split_once("->") else {
            return Err(ParseError {
                line: line_no,
                reason: "expected '<state> -> ...'".to_string(),
            });
        };
        let rhs = names.resolve(&mut ta, lhs_name.trim());
        let rhs_text = rhs_text.trim();

        if let Some(data_text) = rhs_text.strip_prefix("leaf ") {
            let data = parse_data(data_text.trim(), line_no)?;
            let label = arena.intern(Label::Data(data, DataId(next_data_id)));
            next_data_id += 1;
            ta.add_transition(vec![], label, rhs);
            continue;
        }

        if let Some(node_text) = rhs_text.strip_prefix("node ") {
            let (items_text, children_text) = split_node_body(node_text, line_no)?;
            let items = parse_items(items_text, line_no)?;
            let children: Vec<&str> = children_text
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            let lhs: Vec<State> = children
                .iter()
                .map(|c| names.resolve(&mut ta, c))
                .collect();
            let label = arena.intern(Label::Node(items));
            ta.add_transition(lhs, label, rhs);
            continue;
        }

        return Err(ParseError {
            line: line_no,
            reason: "expected 'leaf ...' or 'node ...'".to_string(),
        });
    }

    Ok(ta)
}

fn split_node_body(text: &str, line: usize) -> Result<(&str, &str), ParseError> {
    let items_start = text
        .find('[')
        .ok_or_else(|| ParseError { line, reason: "node label missing '[...]' item list".to_string() })?;
    let items_end = text
        .find(']')
        .ok_or_else(|| ParseError { line, reason: "node label missing closing ']'".to_string() })?;
    let children_start = text[items_end..]
        .find('(')
        .map(|p| items_end + p)
        .ok_or_else(|| ParseError { line, reason: "node label missing '(...)' child list".to_string() })?;
    let children_end = text.rfind(')').ok_or_else(|| ParseError {
        line,
        reason: "node label missing closing ')'".to_string(),
    })?;
    Ok((&text[items_start + 1..items_end], &text[children_start + 1..children_end]))
}

fn parse_items(text: &str, line: usize) -> Result<Vec<(u32, AbstractBox)>, ParseError> {
    let mut offset = 0u32;
    let mut out = Vec::new();
    for item in text.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let b = parse_abstract_box(item, line)?;
        out.push((offset, b));
        offset += 1;
    }
    Ok(out)
}

fn parse_abstract_box(text: &str, line: usize) -> Result<AbstractBox, ParseError> {
    if text == "data" {
        return Ok(AbstractBox::Data);
    }
    if let Some(inner) = text.strip_prefix("box(").and_then(|s| s.strip_suffix(')')) {
        let id: u32 = inner.trim().parse().map_err(|_| ParseError {
            line,
            reason: format!("bad box id '{inner}'"),
        })?;
        return Ok(AbstractBox::Box(BoxId(id)));
    }
    if let Some(inner) = text.strip_prefix("type(").and_then(|s| s.strip_suffix(')')) {
        return Ok(AbstractBox::Type(thicket_label::TypeBox { name: inner.trim().to_string() }));
    }
    if let Some(inner) = text.strip_prefix("sel(").and_then(|s| s.strip_suffix(')')) {
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(ParseError { line, reason: format!("sel(...) needs 3 fields, got '{inner}'") });
        }
        let offset: u32 = parts[0].parse().map_err(|_| ParseError { line, reason: "bad sel offset".to_string() })?;
        let size: u32 = parts[1].parse().map_err(|_| ParseError { line, reason: "bad sel size".to_string() })?;
        let displ: i32 = parts[2].parse().map_err(|_| ParseError { line, reason: "bad sel displacement".to_string() })?;
        return Ok(AbstractBox::Selector(SelData::new(offset, size, displ)));
    }
    Err(ParseError { line, reason: format!("unrecognized box item '{text}'") })
}

fn parse_data(text: &str, line: usize) -> Result<Data, ParseError> {
    match text {
        "null" | "NULL" => Ok(Data::Null),
        "undef" => Ok(Data::Undef),
        _ => {
            if let Some(inner) = text.strip_prefix("ref(").and_then(|s| s.strip_suffix(')')) {
                let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
                if parts.len() != 2 {
                    return Err(ParseError { line, reason: format!("ref(...) needs 2 fields, got '{inner}'") });
                }
                let root: u32 = parts[0].parse().map_err(|_| ParseError { line, reason: "bad ref root".to_string() })?;
                let displ: i32 = parts[1].parse().map_err(|_| ParseError { line, reason: "bad ref displ".to_string() })?;
                return Ok(Data::Ref { root: RootIdx::new(root), displ });
            }
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Data::Int(n));
            }
            Err(ParseError { line, reason: format!("unrecognized data literal '{text}'") })
        }
    }
}

/// Pretty-prints `ta` back to the textual form [`parse_ta`] accepts,
/// naming states `q0`, `q1`, ... in a stable, deterministic order.
#[must_use]
pub fn print_ta(ta: &TreeAut, arena: &LabelArena) -> String {
    let mut names: HashMap<State, String> = HashMap::new();
    for (i, &s) in ta.states().iter().enumerate() {
        names.insert(s, format!("q{i}"));
    }
    let name_of = |s: State| names.get(&s).cloned().unwrap_or_else(|| format!("q{}", s.0));

    let mut out = String::new();
    for t in ta.transitions() {
        let rhs_name = name_of(t.rhs);
        match arena.get(t.label) {
            Label::Data(d, _) => {
                let _ = writeln!(out, "{rhs_name} -> leaf {}", print_data(d));
            }
            Label::Node(items) => {
                let items_text = items
                    .iter()
                    .map(|(_, b)| print_box(b))
                    .collect::<Vec<_>>()
                    .join(", ");
                let children_text = t.lhs.iter().map(|&c| name_of(c)).collect::<Vec<_>>().join(", ");
                let _ = writeln!(out, "{rhs_name} -> node [{items_text}] ({children_text})");
            }
            Label::VData(_) => {
                let _ = writeln!(out, "{rhs_name} -> leaf undef");
            }
        }
    }
    for &f in ta.final_states() {
        let _ = writeln!(out, "final {}", name_of(f));
    }
    out
}

fn print_data(d: &Data) -> String {
    match d {
        Data::Null => "null".to_string(),
        Data::Undef => "undef".to_string(),
        Data::Int(n) => n.to_string(),
        Data::Ref { root, displ } => format!("ref({}, {displ})", root.index()),
        other => other.to_string(),
    }
}

fn print_box(b: &AbstractBox) -> String {
    match b {
        AbstractBox::Data => "data".to_string(),
        AbstractBox::Box(id) => format!("box({})", id.0),
        AbstractBox::Type(t) => format!("type({})", t.name),
        AbstractBox::Selector(s) => format!("sel({}, {}, {})", s.offset, s.size, s.displacement),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_leaf_and_a_node_transition() {
        let mut arena = LabelArena::new();
        let text = "q0 -> leaf null\nq1 -> node [sel(0, 8, 0)] (q0)\nfinal q1\n";
        let ta = parse_ta(text, &mut arena).unwrap();
        assert_eq!(ta.transitions().len(), 2);
        assert_eq!(ta.final_states().len(), 1);
    }

    #[test]
    fn round_trips_through_print_and_parse() {
        let mut arena = LabelArena::new();
        let text = "q0 -> leaf null\nq1 -> node [sel(0, 8, 0)] (q0)\nfinal q1\n";
        let ta = parse_ta(text, &mut arena).unwrap();
        let printed = print_ta(&ta, &arena);
        let mut arena2 = LabelArena::new();
        let reparsed = parse_ta(&printed, &mut arena2).unwrap();
        assert_eq!(reparsed.transitions().len(), ta.transitions().len());
        assert_eq!(reparsed.final_states().len(), ta.final_states().len());
    }

    #[test]
    fn rejects_a_line_missing_an_arrow() {
        let mut arena = LabelArena::new();
        let err = parse_ta("garbage line\n", &mut arena).unwrap_err();
        assert_eq!(err.line, 1);
    }
}
