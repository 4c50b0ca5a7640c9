//! [`MarkupDocument`] → XML text using quick-xml's writer.
//!
//! Output is deterministic: attribute order is preserved, indentation is
//! computed from the tree alone, and the XML declaration is rewritten into a
//! single canonical form.
//!
//! Names, characters, comments and processing instructions are checked
//! before they are written, so a tree that cannot round-trip as XML fails
//! with [`Error::Markup`] instead of producing broken text.

use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};

use super::validate;
use super::{Element, MarkupDocument, Node};
use crate::error::{Error, Result};

const INDENT: &str = "  ";

/// Options controlling serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Indent element-only content.
    pub pretty_print: bool,
    /// Encoding name to declare (already canonicalized by the caller).
    pub encoding: String,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            pretty_print: true,
            encoding: "utf-8".to_string(),
        }
    }
}

impl MarkupDocument {
    /// Serialize to XML text with a normalized declaration.
    pub fn serialize(&self, options: &SerializeOptions) -> Result<String> {
        let mut writer = Writer::new(Vec::new());

        write(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some(options.encoding.as_str()), None)),
        )?;
        newline(&mut writer)?;

        if let Some(ref doctype) = self.doctype {
            if doctype.contains('>') {
                return Err(Error::Markup(format!("DOCTYPE {doctype:?} contains \">\"")));
            }
            write(&mut writer, Event::DocType(BytesText::from_escaped(doctype)))?;
            newline(&mut writer)?;
        }

        let depth = options.pretty_print.then_some(0);
        write_element(&mut writer, &self.root, depth)?;
        if options.pretty_print {
            newline(&mut writer)?;
        }

        let text = String::from_utf8(writer.into_inner())
            .map_err(|e| Error::Markup(format!("serializer produced invalid UTF-8: {e}")))?;

        Ok(normalize_declaration(&text, &options.encoding))
    }
}

/// Rewrite a leading XML declaration into
/// `<?xml version='1.0' encoding='<encoding in lower case>'?>`.
///
/// Serializers disagree on quoting and on the case of the encoding name
/// (`UTF-8` vs `utf-8`); the output must not depend on which one ran.
/// Text without a leading declaration is returned unchanged.
pub fn normalize_declaration(text: &str, encoding: &str) -> String {
    let Some(rest) = text.strip_prefix("<?xml") else {
        return text.to_string();
    };
    let Some(end) = rest.find("?>") else {
        return text.to_string();
    };

    let mut out = String::with_capacity(text.len());
    out.push_str("<?xml version='1.0' encoding='");
    out.push_str(&encoding.to_ascii_lowercase());
    out.push_str("'?>");
    out.push_str(&rest[end + 2..]);
    out
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Markup(e.to_string()))
}

fn newline(writer: &mut Writer<Vec<u8>>) -> Result<()> {
    write(writer, Event::Text(BytesText::from_escaped("\n")))
}

fn indent(writer: &mut Writer<Vec<u8>>, depth: usize) -> Result<()> {
    let ws = format!("\n{}", INDENT.repeat(depth));
    write(writer, Event::Text(BytesText::from_escaped(ws)))
}

/// Write an element. `depth` is `Some` while indenting, `None` inside mixed
/// content where whitespace would change the document.
fn write_element(writer: &mut Writer<Vec<u8>>, el: &Element, depth: Option<usize>) -> Result<()> {
    validate::check_name(&el.name, "element")?;
    validate::check_attributes(&el.name, &el.attributes)?;

    let mut start = BytesStart::new(el.name.as_str());
    for (key, value) in &el.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if el.children.is_empty() {
        return write(writer, Event::Empty(start));
    }

    write(writer, Event::Start(start))?;

    // Any text child, whitespace included, is content: indent nothing below.
    let has_text = el.children.iter().any(|n| matches!(n, Node::Text(_)));
    let child_depth = match depth {
        Some(d) if !has_text => Some(d + 1),
        _ => None,
    };

    for child in &el.children {
        if let Some(d) = child_depth {
            indent(writer, d)?;
        }
        write_node(writer, child, child_depth)?;
    }

    if let (Some(d), Some(_)) = (depth, child_depth) {
        indent(writer, d)?;
    }

    write(writer, Event::End(BytesEnd::new(el.name.as_str())))
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node, depth: Option<usize>) -> Result<()> {
    match node {
        Node::Element(el) => write_element(writer, el, depth),
        Node::Text(text) => {
            validate::check_text(text)?;
            write(
                writer,
                Event::Text(BytesText::from_escaped(partial_escape(text.as_str()))),
            )
        }
        Node::Comment(text) => {
            validate::check_comment(text)?;
            write(writer, Event::Comment(BytesText::from_escaped(text)))
        }
        Node::ProcessingInstruction(content) => {
            validate::check_processing_instruction(content)?;
            write(writer, Event::PI(BytesPI::new(content)))
        }
    }
}
