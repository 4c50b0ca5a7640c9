//! XHTML builder: one document section → one [`MarkupDocument`].
//!
//! The builder starts from a [`Template`] (or the default scaffold), injects
//! the section title into `head/title`, then appends the section heading and
//! content at the template's insertion point:
//!
//! - the first element with `id="content"`, if the template has one
//! - otherwise `body`

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::document::Section;
use crate::error::{Error, Result};
use crate::markup::{Element, MarkupDocument, Node, XHTML_NAMESPACE};
use crate::util::decode_text;

/// `id` of the element that receives section content in a template.
pub const CONTENT_ID: &str = "content";

/// Markup scaffold merged with section content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    document: MarkupDocument,
    source: Option<PathBuf>,
}

impl Template {
    /// Load a template from disk.
    ///
    /// The file must be well-formed markup with an `html` root containing a
    /// `body`. Any failure is reported as [`Error::TemplateLoad`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading template");

        let bytes = fs::read(path).map_err(|e| Error::template(path, e))?;
        let text = decode_text(&bytes);
        let document =
            MarkupDocument::parse_template(&text).map_err(|e| Error::template(path, e))?;

        validate_scaffold(&document).map_err(|reason| Error::template(path, reason))?;

        Ok(Self {
            document,
            source: Some(path.to_path_buf()),
        })
    }

    /// Parse a template from markup text.
    pub fn from_markup(markup: &str) -> Result<Self> {
        let document = MarkupDocument::parse_template(markup)?;
        validate_scaffold(&document).map_err(Error::Markup)?;
        Ok(Self {
            document,
            source: None,
        })
    }

    /// Minimal XHTML scaffold: an empty title and an empty body.
    pub fn default_scaffold() -> Self {
        let root = Element::new("html")
            .with_attribute("xmlns", XHTML_NAMESPACE)
            .with_child(Element::new("head").with_child(Element::new("title")))
            .with_child(Element::new("body"));
        Self {
            document: MarkupDocument::new(root),
            source: None,
        }
    }

    /// Path the template was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn document(&self) -> &MarkupDocument {
        &self.document
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::default_scaffold()
    }
}

fn validate_scaffold(document: &MarkupDocument) -> std::result::Result<(), String> {
    if document.root.local_name() != "html" {
        return Err(format!(
            "root element is <{}>, expected <html>",
            document.root.name
        ));
    }
    if document.root.find_first("body").is_none() {
        return Err("no <body> element".to_string());
    }
    Ok(())
}

/// Builds the XHTML document for one section.
///
/// # Example
///
/// ```
/// use folio::{Section, XhtmlBuilder};
/// use folio::document::ContentNode;
///
/// let section = Section::titled("Intro").with_content(ContentNode::paragraph("Hello"));
/// let mut builder = XhtmlBuilder::new("Intro", None)?;
/// builder.add_content_from_section(&section);
///
/// let document = builder.into_document();
/// assert_eq!(document.title().as_deref(), Some("Intro"));
/// # Ok::<(), folio::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct XhtmlBuilder {
    title: String,
    document: MarkupDocument,
}

impl XhtmlBuilder {
    /// Create a builder, loading the template from `template_path` if given.
    pub fn new(title: &str, template_path: Option<&Path>) -> Result<Self> {
        let title = validate_title(title)?;
        let template = match template_path {
            Some(path) => Template::load(path)?,
            None => Template::default_scaffold(),
        };
        Ok(Self::compose(title, template))
    }

    /// Create a builder from an already loaded template.
    pub fn with_template(title: &str, template: Template) -> Result<Self> {
        let title = validate_title(title)?;
        Ok(Self::compose(title, template))
    }

    fn compose(title: &str, template: Template) -> Self {
        let mut document = template.document;
        inject_title(&mut document.root, title);
        Self {
            title: title.to_string(),
            document,
        }
    }

    /// Append a section's heading and content at the insertion point.
    ///
    /// Content nodes are copied as-is: names, attributes, text, and order are
    /// unchanged. Subsections are rendered separately and are not included.
    /// A blank heading is rendered with the document title instead.
    pub fn add_content_from_section(&mut self, section: &Section) {
        let heading = &section.heading;
        let level = heading.level.clamp(1, 6);
        let text = match heading.title.trim() {
            "" => self.title.as_str(),
            text => text,
        };
        let heading_el = Element::new(format!("h{level}")).with_text(text);

        let Some(target) = insertion_point(&mut self.document.root) else {
            // scaffolds are validated to contain a body
            return;
        };
        target.children.push(Node::Element(heading_el));
        target
            .children
            .extend(section.content.iter().map(Node::from));
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn xhtml_document(&self) -> &MarkupDocument {
        &self.document
    }

    pub fn into_document(self) -> MarkupDocument {
        self.document
    }
}

fn validate_title(title: &str) -> Result<&str> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidTitle(title.to_string()));
    }
    Ok(trimmed)
}

/// Replace every `head/title` with a single title, creating `head` if needed.
fn inject_title(root: &mut Element, title: &str) {
    if root.find_first("head").is_none() {
        root.children.insert(0, Node::Element(Element::new("head")));
    }
    let Some(head) = root.find_first_mut("head") else {
        return;
    };

    let position = head.remove_children_named("title").unwrap_or(0);
    let title_el = Element::new("title").with_text(title);
    head.children.insert(position, Node::Element(title_el));
}

/// Element that receives section content.
fn insertion_point(root: &mut Element) -> Option<&mut Element> {
    if root.find_by_id(CONTENT_ID).is_some() {
        return root.find_by_id_mut(CONTENT_ID);
    }
    root.find_first_mut("body")
}
