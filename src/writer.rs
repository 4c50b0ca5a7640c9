//! XHTML writer: serialization, atomic persistence, and per-section output.
//!
//! Every write goes through the same steps: serialize the document, then
//! (unless simulating) write the bytes to `<path>.tmp` and rename that file
//! onto `<path>`. Readers of `<path>` see either the old file or the complete
//! new one, never a partial write.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::builder::{Template, XhtmlBuilder};
use crate::document::RootElement;
use crate::error::{Error, Result};
use crate::markup::{MarkupDocument, SerializeOptions};
use crate::naming::generate_section_file_name;
use crate::util::{declared_name, encode_text, resolve_output_encoding};

/// Extension of emitted files.
pub const XHTML_EXTENSION: &str = "xhtml";

/// Suffix appended to a target path while it is being written.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Configuration for XHTML output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    /// Indent element-only content. Default `true`.
    pub pretty_print: bool,
    /// Encoding label for both the declaration and the file bytes. Default `"utf-8"`.
    pub encoding: String,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            pretty_print: true,
            encoding: "utf-8".to_string(),
        }
    }
}

/// Writes rendered sections as XHTML files.
///
/// # Example
///
/// ```no_run
/// use folio::{RootElement, Section, XhtmlWriter};
///
/// let document = RootElement::new()
///     .with_section(Section::titled("Intro"))
///     .with_section(Section::titled("Chapter 1"));
///
/// let written = XhtmlWriter::new().write_as_many_documents("out", &document, None, false)?;
/// assert_eq!(written.len(), 2);
/// # Ok::<(), folio::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct XhtmlWriter {
    config: WriterConfig,
}

impl XhtmlWriter {
    /// Create a new writer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the writer with custom settings.
    pub fn with_config(mut self, config: WriterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Whether [`write_as_single_document`](Self::write_as_single_document)
    /// is available. Always `false` for now.
    pub fn supports_single_document(&self) -> bool {
        false
    }

    /// Serialize a document to encoded bytes.
    pub fn serialize(&self, document: &MarkupDocument) -> Result<Vec<u8>> {
        let encoding = resolve_output_encoding(&self.config.encoding)?;
        let options = SerializeOptions {
            pretty_print: self.config.pretty_print,
            encoding: declared_name(encoding),
        };

        let text = document.serialize(&options)?;
        Ok(encode_text(&text, encoding).into_owned())
    }

    /// Serialize `document` and, unless `simulate` is set, replace `path`
    /// atomically with the result.
    pub fn write_to_file(
        &self,
        path: impl AsRef<Path>,
        document: &MarkupDocument,
        simulate: bool,
    ) -> Result<()> {
        let path = path.as_ref();
        debug!(path = %path.display(), simulate, "writing XHTML document");

        let bytes = self.serialize(document)?;

        if !simulate {
            persist_atomically(path, &bytes)?;
        }
        Ok(())
    }

    /// Render the whole document into one file.
    ///
    /// Not implemented: always returns [`Error::NotSupported`] without touching
    /// the filesystem. Check [`supports_single_document`](Self::supports_single_document)
    /// to avoid the error.
    pub fn write_as_single_document(
        &self,
        path: impl AsRef<Path>,
        _document_content: &RootElement,
        _template_path: Option<&Path>,
        _simulate: bool,
    ) -> Result<()> {
        Err(Error::NotSupported(format!(
            "single-document output ({})",
            path.as_ref().display()
        )))
    }

    /// Render each section into its own file under `output_directory`.
    ///
    /// Sections are processed in document order. The first failure stops the
    /// run; files already written stay in place. Returns the paths of the
    /// emitted files (the paths that would be written when simulating).
    pub fn write_as_many_documents(
        &self,
        output_directory: impl AsRef<Path>,
        document_content: &RootElement,
        template_path: Option<&Path>,
        simulate: bool,
    ) -> Result<Vec<PathBuf>> {
        let output_directory = output_directory.as_ref();
        let template = template_path.map(Template::load).transpose()?;
        if let Some(source) = template.as_ref().and_then(Template::source) {
            debug!(template = %source.display(), "using template for every section");
        }

        let section_count = document_content.section_count();
        let mut written = Vec::with_capacity(section_count);

        for (section_index, section) in document_content.sections().enumerate() {
            let title = section_title(section.heading().title(), section_index);

            let mut builder = match template {
                Some(ref template) => XhtmlBuilder::with_template(&title, template.clone())?,
                None => XhtmlBuilder::new(&title, None)?,
            };
            builder.add_content_from_section(section);

            let file_name = generate_section_file_name(&title, section_index, section_count);
            let path = output_directory.join(format!("{file_name}.{XHTML_EXTENSION}"));

            self.write_to_file(&path, builder.xhtml_document(), simulate)?;
            written.push(path);
        }

        info!(
            directory = %output_directory.display(),
            sections = written.len(),
            simulate,
            "wrote sections"
        );
        Ok(written)
    }
}

/// Title for a section: the trimmed heading, or `Section <n>` when the
/// heading is blank.
fn section_title(heading: &str, index: usize) -> String {
    match heading.trim() {
        "" => format!("Section {}", index + 1),
        title => title.to_string(),
    }
}

/// `<path>.tmp`, next to `path`.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Write `bytes` to `path` through a temporary sibling file.
pub fn persist_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    StagedFile::write(path, bytes)?.commit()
}

/// Fully written temporary file waiting to replace its target.
///
/// Dropping a `StagedFile` without calling [`commit`](Self::commit) leaves the
/// temporary file on disk and the target untouched.
#[derive(Debug)]
#[must_use = "a staged file does nothing until committed"]
pub struct StagedFile {
    temp: PathBuf,
    target: PathBuf,
}

impl StagedFile {
    /// Write all bytes to the temporary path and flush them to disk.
    pub fn write(target: &Path, bytes: &[u8]) -> Result<Self> {
        let temp = temp_path_for(target);

        let mut file = File::create(&temp).map_err(|e| Error::io(&temp, e))?;
        file.write_all(bytes).map_err(|e| Error::io(&temp, e))?;
        file.sync_all().map_err(|e| Error::io(&temp, e))?;

        Ok(Self {
            temp,
            target: target.to_path_buf(),
        })
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Rename the temporary file onto the target, replacing it.
    pub fn commit(self) -> Result<()> {
        fs::rename(&self.temp, &self.target).map_err(|e| Error::io(&self.target, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ContentNode, Section};
    use crate::markup::Element;

    fn document(title: &str) -> MarkupDocument {
        let mut builder = XhtmlBuilder::new(title, None).unwrap();
        builder.add_content_from_section(
            &Section::titled(title).with_content(ContentNode::paragraph("Body text")),
        );
        builder.into_document()
    }

    #[test]
    fn test_default_config() {
        let writer = XhtmlWriter::new();
        assert!(writer.config().pretty_print);
        assert_eq!(writer.config().encoding, "utf-8");
        assert!(!writer.supports_single_document());
    }

    #[test]
    fn test_temp_path_for() {
        assert_eq!(
            temp_path_for(Path::new("out/0-intro.xhtml")),
            PathBuf::from("out/0-intro.xhtml.tmp")
        );
    }

    #[test]
    fn test_serialize_declaration_matches_encoding() {
        let writer = XhtmlWriter::new().with_config(WriterConfig {
            pretty_print: false,
            encoding: "UTF-8".to_string(),
        });
        let bytes = writer.serialize(&document("Intro")).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("<?xml version='1.0' encoding='utf-8'?>\n<html"));
        assert!(text.contains("<title>Intro</title>"));
    }

    #[test]
    fn test_serialize_latin1() {
        let writer = XhtmlWriter::new().with_config(WriterConfig {
            pretty_print: true,
            encoding: "latin1".to_string(),
        });
        let doc = MarkupDocument::new(Element::new("p").with_text("café \u{2603}"));
        let bytes = writer.serialize(&doc).unwrap();

        assert!(bytes.starts_with(b"<?xml version='1.0' encoding='windows-1252'?>"));
        let needle = b"caf\xe9 &#9731;";
        assert!(bytes.windows(needle.len()).any(|w| w == needle));
    }

    #[test]
    fn test_serialize_unknown_encoding() {
        let writer = XhtmlWriter::new().with_config(WriterConfig {
            pretty_print: true,
            encoding: "no-such-encoding".to_string(),
        });
        assert!(matches!(
            writer.serialize(&document("Intro")),
            Err(Error::UnsupportedEncoding(_))
        ));
    }

    #[test]
    fn test_write_to_file_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.xhtml");
        fs::write(&path, "old").unwrap();

        XhtmlWriter::new()
            .write_to_file(&path, &document("New"), false)
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("<title>New</title>"));
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_uncommitted_stage_leaves_target_intact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.xhtml");
        fs::write(&path, "original").unwrap();

        let staged = StagedFile::write(&path, b"replacement").unwrap();
        assert_eq!(staged.target(), path.as_path());
        let temp = staged.temp_path().to_path_buf();
        drop(staged);

        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
        assert_eq!(fs::read_to_string(&temp).unwrap(), "replacement");
    }

    #[test]
    fn test_commit_overwrites_stale_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.xhtml");
        fs::write(temp_path_for(&path), "debris from a crashed run").unwrap();

        persist_atomically(&path, b"fresh").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "fresh");
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_write_into_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("a.xhtml");
        let err = XhtmlWriter::new()
            .write_to_file(&path, &document("X"), false)
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_section_title_fallback() {
        assert_eq!(section_title("  Intro ", 0), "Intro");
        assert_eq!(section_title("", 4), "Section 5");
        assert_eq!(section_title(" \n", 0), "Section 1");
    }
}
