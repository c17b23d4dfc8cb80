// crates/thicket-witness/src/lib.rs

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! Renders a real program error's path into an SV-Comp GraphML witness
//! (`spec.md` §6, "Trace output"): one `node` per step, `entry` on the
//! first and `violation` on the last, one `edge` per step carrying
//! `originfile`/`originline` and an optional `sourcecode` token.
//! Consecutive instructions at the same line and column collapse into a
//! single edge.

use anyhow::Result;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use thicket_core::ir::SourceLoc;

/// One step of a witnessed path: the location it executed at, and, if the
/// caller has the original source handy, the token(s) to attach to the
/// edge leaving it.
#[derive(Clone, Debug)]
pub struct WitnessStep {
    pub loc: SourceLoc,
    pub sourcecode: Option<String>,
}

impl From<SourceLoc> for WitnessStep {
    fn from(loc: SourceLoc) -> Self {
        Self { loc, sourcecode: None }
    }
}

/// Renders `steps` into a GraphML witness document.
///
/// `steps` is empty only for a path that faulted on its very first
/// instruction; the witness then has an entry node that is also the
/// violation node.
pub fn render(steps: &[WitnessStep]) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    write_prologue(&mut writer)?;

    let mut node_number = 1u32;
    let mut i = 0;
    while i < steps.len() {
        let step = &steps[i];
        if let Some(next) = steps.get(i + 1) {
            if step.loc.same_position(next.loc) {
                i += 1;
                continue;
            }
        }
        write_node(&mut writer, node_number, node_number == 1)?;
        write_edge(&mut writer, node_number, step)?;
        node_number += 1;
        i += 1;
    }
    write_violation_node(&mut writer, node_number)?;
    write_epilogue(&mut writer)?;

    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8(bytes)?)
}

/// Convenience entry point for callers that only have bare locations, no
/// recovered source text.
pub fn render_locs(locs: &[SourceLoc]) -> Result<String> {
    let steps: Vec<WitnessStep> = locs.iter().copied().map(WitnessStep::from).collect();
    render(&steps)
}

fn write_prologue(writer: &mut Writer<Cursor<Vec<u8>>>) -> Result<()> {
    writer.write_event(Event::Decl(quick_xml::events::BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut graphml = BytesStart::new("graphml");
    graphml.push_attribute(("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"));
    graphml.push_attribute(("xmlns", "http://graphml.graphdrawing.org/xmlns"));
    writer.write_event(Event::Start(graphml))?;

    write_key(writer, "originline", "int", "edge", None)?;
    write_key(writer, "originfile", "string", "edge", Some("<command-line>"))?;
    write_key(writer, "sourcecode", "string", "edge", None)?;
    write_key(writer, "nodetype", "string", "node", Some("path"))?;
    write_key(writer, "frontier", "boolean", "node", Some("false"))?;
    write_key(writer, "violation", "boolean", "node", Some("false"))?;
    write_key(writer, "entry", "boolean", "node", Some("false"))?;
    write_key(writer, "sink", "boolean", "node", Some("false"))?;

    let mut graph = BytesStart::new("graph");
    graph.push_attribute(("edgedefault", "directed"));
    writer.write_event(Event::Start(graph))?;
    write_data(writer, "sourcecodelang", "C")?;
    Ok(())
}

fn write_key(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    id: &str,
    attr_type: &str,
    target: &str,
    default: Option<&str>,
) -> Result<()> {
    let mut key = BytesStart::new("key");
    key.push_attribute(("attr.name", id));
    key.push_attribute(("attr.type", attr_type));
    key.push_attribute(("for", target));
    key.push_attribute(("id", id));
    match default {
        Some(value) => {
            writer.write_event(Event::Start(key))?;
            write_data(writer, "default", value)?;
            writer.write_event(Event::End(BytesEnd::new("key")))?;
        }
        None => writer.write_event(Event::Empty(key))?,
    }
    Ok(())
}

fn write_data(writer: &mut Writer<Cursor<Vec<u8>>>, key: &str, text: &str) -> Result<()> {
    let mut data = BytesStart::new("data");
    data.push_attribute(("key", key));
    writer.write_event(Event::Start(data))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new("data")))?;
    Ok(())
}

fn write_node(writer: &mut Writer<Cursor<Vec<u8>>>, number: u32, is_entry: bool) -> Result<()> {
    let name = node_name(number);
    let node = BytesStart::new("node").with_attributes([("id", name.as_str())]);
    if is_entry {
        writer.write_event(Event::Start(node))?;
        write_data(writer, "entry", "true")?;
        writer.write_event(Event::End(BytesEnd::new("node")))?;
    } else {
        writer.write_event(Event::Empty(node))?;
    }
    Ok(())
}

fn write_violation_node(writer: &mut Writer<Cursor<Vec<u8>>>, number: u32) -> Result<()> {
    let name = node_name(number);
    let node = BytesStart::new("node").with_attributes([("id", name.as_str())]);
    writer.write_event(Event::Start(node))?;
    write_data(writer, "violation", "true")?;
    writer.write_event(Event::End(BytesEnd::new("node")))?;
    Ok(())
}

fn write_edge(writer: &mut Writer<Cursor<Vec<u8>>>, number: u32, step: &WitnessStep) -> Result<()> {
    let source = node_name(number);
    let target = node_name(number + 1);
    let edge = BytesStart::new("edge").with_attributes([("source", source.as_str()), ("target", target.as_str())]);
    writer.write_event(Event::Start(edge))?;
    if let Some(code) = &step.sourcecode {
        write_data(writer, "sourcecode", code)?;
    }
    write_data(writer, "originfile", &step.loc.file.to_string())?;
    write_data(writer, "originline", &step.loc.line.to_string())?;
    writer.write_event(Event::End(BytesEnd::new("edge")))?;
    Ok(())
}

fn write_epilogue(writer: &mut Writer<Cursor<Vec<u8>>>) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new("graph")))?;
    writer.write_event(Event::End(BytesEnd::new("graphml")))?;
    Ok(())
}

fn node_name(number: u32) -> String {
    format!("A{number}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: u32, column: u32) -> SourceLoc {
        SourceLoc::new(0, line, column)
    }

    #[test]
    fn empty_path_still_renders_a_single_entry_violation_node() {
        let doc = render(&[]).unwrap();
        assert!(doc.contains("graphml"));
        assert!(doc.contains(r#"id="A1""#));
    }

    #[test]
    fn adjacent_same_position_instructions_collapse_into_one_edge() {
        let steps = vec![
            WitnessStep::from(loc(10, 4)),
            WitnessStep::from(loc(10, 4)),
            WitnessStep::from(loc(11, 2)),
        ];
        let doc = render(&steps).unwrap();
        let edge_count = doc.matches("<edge").count();
        assert_eq!(edge_count, 2);
    }

    #[test]
    fn the_last_node_carries_the_violation_marker() {
        let steps = vec![WitnessStep::from(loc(1, 1)), WitnessStep::from(loc(2, 1))];
        let doc = render(&steps).unwrap();
        assert!(doc.contains(r#"<data key="violation">true</data>"#));
        assert!(doc.contains(r#"id="A3""#));
    }

    #[test]
    fn originfile_and_originline_are_carried_on_each_edge() {
        let steps = vec![WitnessStep::from(SourceLoc::new(7, 42, 1))];
        let doc = render(&steps).unwrap();
        assert!(doc.contains(r#"<data key="originfile">7</data>"#));
        assert!(doc.contains(r#"<data key="originline">42</data>"#));
    }
}
