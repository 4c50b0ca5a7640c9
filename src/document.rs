//! Input document model.
//!
//! A [`RootElement`] holds a tree of [`Section`]s, each with one [`Heading`]
//! and an ordered list of [`ContentNode`]s. The model is produced elsewhere
//! (parsers, importers); the rendering pipeline only reads it.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A node of section content.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum ContentNode {
    /// A named element with ordered attributes and children.
    Element {
        name: String,
        #[cfg_attr(feature = "serde", serde(default))]
        attributes: Vec<(String, String)>,
        #[cfg_attr(feature = "serde", serde(default))]
        children: Vec<ContentNode>,
    },
    /// Character data.
    Text { text: String },
    /// A comment, kept verbatim.
    Comment { text: String },
}

impl ContentNode {
    /// Create an element with no attributes.
    pub fn element(name: impl Into<String>, children: Vec<ContentNode>) -> Self {
        Self::Element {
            name: name.into(),
            attributes: Vec::new(),
            children,
        }
    }

    /// Create an element with attributes.
    pub fn element_with_attributes(
        name: impl Into<String>,
        attributes: Vec<(String, String)>,
        children: Vec<ContentNode>,
    ) -> Self {
        Self::Element {
            name: name.into(),
            attributes,
            children,
        }
    }

    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Shorthand for `<p>text</p>`.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::element("p", vec![Self::text(text)])
    }
}

/// The title-bearing element of a section.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Heading {
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default = "default_level"))]
    pub level: u8,
}

#[cfg(feature = "serde")]
fn default_level() -> u8 {
    1
}

impl Heading {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            level: 1,
        }
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

/// A titled subtree of document content, rendered as one output file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Section {
    pub heading: Heading,
    #[cfg_attr(feature = "serde", serde(default))]
    pub content: Vec<ContentNode>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub subsections: Vec<Section>,
}

impl Section {
    pub fn new(heading: Heading) -> Self {
        Self {
            heading,
            content: Vec::new(),
            subsections: Vec::new(),
        }
    }

    /// Create a level-1 section with the given title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self::new(Heading::new(title))
    }

    pub fn with_content(mut self, node: ContentNode) -> Self {
        self.content.push(node);
        self
    }

    pub fn with_subsection(mut self, section: Section) -> Self {
        self.subsections.push(section);
        self
    }

    pub fn heading(&self) -> &Heading {
        &self.heading
    }

    pub fn content(&self) -> &[ContentNode] {
        &self.content
    }
}

/// The document root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RootElement {
    #[cfg_attr(feature = "serde", serde(default))]
    pub sections: Vec<Section>,
}

impl RootElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Number of sections, nested ones included.
    pub fn section_count(&self) -> usize {
        fn count(sections: &[Section]) -> usize {
            sections
                .iter()
                .map(|s| 1 + count(&s.subsections))
                .sum()
        }
        count(&self.sections)
    }

    /// Iterate all sections in document order (parents before their subsections).
    ///
    /// Each call starts a fresh traversal.
    pub fn sections(&self) -> Sections<'_> {
        Sections {
            stack: vec![self.sections.iter()],
        }
    }
}

/// Pre-order iterator over a [`RootElement`]'s sections.
pub struct Sections<'a> {
    stack: Vec<std::slice::Iter<'a, Section>>,
}

impl<'a> Iterator for Sections<'a> {
    type Item = &'a Section;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(section) => {
                    if !section.subsections.is_empty() {
                        self.stack.push(section.subsections.iter());
                    }
                    return Some(section);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested() -> RootElement {
        RootElement::new()
            .with_section(
                Section::titled("Part One")
                    .with_subsection(Section::titled("Chapter 1"))
                    .with_subsection(
                        Section::titled("Chapter 2").with_subsection(Section::titled("Aside")),
                    ),
            )
            .with_section(Section::titled("Part Two"))
    }

    #[test]
    fn test_section_count_includes_nested() {
        assert_eq!(nested().section_count(), 5);
        assert_eq!(RootElement::new().section_count(), 0);
    }

    #[test]
    fn test_sections_preorder() {
        let root = nested();
        let titles: Vec<_> = root.sections().map(|s| s.heading().title()).collect();
        assert_eq!(
            titles,
            vec!["Part One", "Chapter 1", "Chapter 2", "Aside", "Part Two"]
        );
    }

    #[test]
    fn test_sections_restartable() {
        let root = nested();
        let first: Vec<_> = root.sections().collect();
        let second: Vec<_> = root.sections().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), root.section_count());
    }

    #[test]
    fn test_heading_default_level() {
        let heading = Heading::new("Intro");
        assert_eq!(heading.level, 1);
        assert_eq!(heading.with_level(3).level, 3);
    }
}
