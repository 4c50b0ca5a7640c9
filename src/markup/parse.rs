//! Markup text → [`MarkupDocument`] using quick-xml's pull reader.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::validate::is_xml_char;
use super::{Element, MarkupDocument, Node};
use crate::error::{Error, Result};

impl MarkupDocument {
    /// Parse well-formed markup into a tree.
    ///
    /// The XML declaration is discarded; a DOCTYPE is kept. Text is kept
    /// exactly, whitespace included (see [`parse_template`](Self::parse_template)).
    pub fn parse(content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().check_end_names = true;

        let mut doctype = None;
        let mut root: Option<Element> = None;
        let mut stack: Vec<Element> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| {
                Error::Markup(format!("{e} at byte {}", reader.error_position()))
            })?;

            match event {
                Event::Start(e) => {
                    ensure_single_root(&root, &stack)?;
                    stack.push(start_element(&reader, &e)?);
                }
                Event::Empty(e) => {
                    ensure_single_root(&root, &stack)?;
                    let el = start_element(&reader, &e)?;
                    attach(&mut stack, &mut root, Node::Element(el));
                }
                Event::End(e) => {
                    let Some(el) = stack.pop() else {
                        return Err(Error::Markup(format!(
                            "unexpected closing tag </{}>",
                            String::from_utf8_lossy(e.name().as_ref())
                        )));
                    };
                    attach(&mut stack, &mut root, Node::Element(el));
                }
                Event::Text(e) => {
                    let text = String::from_utf8_lossy(e.as_ref());
                    push_text(&mut stack, &text)?;
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(e.as_ref());
                    push_text(&mut stack, &text)?;
                }
                Event::GeneralRef(e) => {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    let Some(resolved) = resolve_entity(&entity) else {
                        return Err(Error::Markup(format!("unknown entity &{entity};")));
                    };
                    push_text(&mut stack, &resolved)?;
                }
                Event::Comment(e) => {
                    if let Some(parent) = stack.last_mut() {
                        parent
                            .children
                            .push(Node::Comment(String::from_utf8_lossy(e.as_ref()).into()));
                    }
                }
                Event::PI(e) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(Node::ProcessingInstruction(
                            String::from_utf8_lossy(e.as_ref()).into(),
                        ));
                    }
                }
                Event::DocType(e) => {
                    doctype = Some(String::from_utf8_lossy(e.as_ref()).trim().to_string());
                }
                Event::Decl(_) => {}
                Event::Eof => break,
            }
        }

        if let Some(open) = stack.last() {
            return Err(Error::Markup(format!("unclosed element <{}>", open.name)));
        }
        let root = root.ok_or_else(|| Error::Markup("no root element".to_string()))?;

        Ok(Self { doctype, root })
    }

    /// Parse and drop indentation-only text nodes.
    pub fn parse_template(content: &str) -> Result<Self> {
        let mut doc = Self::parse(content)?;
        strip_blank_text(&mut doc.root);
        Ok(doc)
    }
}

fn ensure_single_root(root: &Option<Element>, stack: &[Element]) -> Result<()> {
    if stack.is_empty() && root.is_some() {
        return Err(Error::Markup("multiple root elements".to_string()));
    }
    Ok(())
}

fn start_element(reader: &Reader<&[u8]>, e: &BytesStart) -> Result<Element> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut el = Element::new(name);

    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::Markup(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|err| Error::Markup(err.to_string()))?;
        el.attributes.push((key, value.into_owned()));
    }

    Ok(el)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if let Node::Element(el) = node {
                *root = Some(el);
            }
        }
    }
}

fn push_text(stack: &mut [Element], text: &str) -> Result<()> {
    let Some(parent) = stack.last_mut() else {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err(Error::Markup("text outside of root element".to_string()));
    };

    // Entity references split text into several events; merge them back.
    if let Some(Node::Text(prev)) = parent.children.last_mut() {
        prev.push_str(text);
    } else {
        parent.children.push(Node::Text(text.to_string()));
    }
    Ok(())
}

/// Drop whitespace-only text nodes left over from source indentation.
fn strip_blank_text(el: &mut Element) {
    el.children
        .retain(|n| !matches!(n, Node::Text(t) if t.trim().is_empty()));
    for child in &mut el.children {
        if let Node::Element(inner) = child {
            strip_blank_text(inner);
        }
    }
}

/// Resolve a predefined or numeric entity name (without `&` and `;`).
///
/// Only the five XML entities are known; HTML names such as `nbsp` are not
/// declared in an XHTML document and must be written as `&#160;`.
fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    let code = if let Some(hex) = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
    {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        entity.strip_prefix('#')?.parse::<u32>().ok()?
    };
    char::from_u32(code)
        .filter(|c| is_xml_char(*c))
        .map(|c| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_document() {
        let doc = MarkupDocument::parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>Hi</title></head><body><p class="x">a</p></body></html>"#,
        )
        .unwrap();

        assert_eq!(doc.doctype.as_deref(), Some("html"));
        assert_eq!(doc.root.name, "html");
        assert_eq!(doc.title().as_deref(), Some("Hi"));
        let p = doc.root.find_first("p").unwrap();
        assert_eq!(p.attribute("class"), Some("x"));
    }

    #[test]
    fn test_parse_resolves_entities_into_one_text_node() {
        let doc = MarkupDocument::parse("<p>Fish &amp; Chips &#x2014; &#233;t&#233;</p>").unwrap();
        assert_eq!(doc.root.children.len(), 1);
        assert_eq!(doc.root.text_content(), "Fish & Chips \u{2014} été");
    }

    #[test]
    fn test_parse_unescapes_attributes() {
        let doc = MarkupDocument::parse(r#"<a title="a &lt; b"/>"#).unwrap();
        assert_eq!(doc.root.attribute("title"), Some("a < b"));
    }

    #[test]
    fn test_parse_keeps_comments_and_cdata() {
        let doc = MarkupDocument::parse("<div><!-- note --><![CDATA[x < y]]></div>").unwrap();
        assert_eq!(doc.root.children[0], Node::Comment(" note ".into()));
        assert_eq!(doc.root.text_content(), "x < y");
    }

    #[test]
    fn test_parse_rejects_mismatched_tags() {
        assert!(matches!(
            MarkupDocument::parse("<html><body></html>"),
            Err(Error::Markup(_))
        ));
    }

    #[test]
    fn test_parse_rejects_unclosed() {
        assert!(matches!(
            MarkupDocument::parse("<html><body>"),
            Err(Error::Markup(_))
        ));
    }

    #[test]
    fn test_parse_rejects_empty_and_multiple_roots() {
        assert!(MarkupDocument::parse("").is_err());
        assert!(MarkupDocument::parse("   ").is_err());
        assert!(MarkupDocument::parse("<a/><b/>").is_err());
        assert!(MarkupDocument::parse("text only").is_err());
    }

    #[test]
    fn test_parse_template_strips_indentation() {
        let doc = MarkupDocument::parse_template(
            "<html>\n  <head>\n    <title>x</title>\n  </head>\n  <body/>\n</html>\n",
        )
        .unwrap();
        assert_eq!(doc.root.children.len(), 2);
        let head = doc.root.find_first("head").unwrap();
        assert_eq!(head.children.len(), 1);
    }

    #[test]
    fn test_resolve_entity() {
        assert_eq!(resolve_entity("amp").as_deref(), Some("&"));
        assert_eq!(resolve_entity("#65").as_deref(), Some("A"));
        assert_eq!(resolve_entity("#x41").as_deref(), Some("A"));
        assert_eq!(resolve_entity("bogus"), None);
        assert_eq!(resolve_entity("nbsp"), None);
        assert_eq!(resolve_entity("#1"), None);
        assert_eq!(resolve_entity("#xD800"), None);
    }

    #[test]
    fn test_parse_rejects_html_only_entities() {
        assert!(matches!(
            MarkupDocument::parse("<p>a&nbsp;b</p>"),
            Err(Error::Markup(_))
        ));
        let doc = MarkupDocument::parse("<p>a&#160;b</p>").unwrap();
        assert_eq!(doc.root.text_content(), "a\u{a0}b");
    }
}
