//! Well-formedness checks applied while serializing.
//!
//! Productions follow XML 1.0 (fifth edition): `Char`, `Name`, `Comment`, `PI`.

use crate::error::{Error, Result};

/// `Char` production. Surrogates cannot occur in a Rust `char`.
pub(crate) fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{fffe}' && c != '\u{ffff}')
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{c0}'..='\u{d6}'
        | '\u{d8}'..='\u{f6}'
        | '\u{f8}'..='\u{2ff}'
        | '\u{370}'..='\u{37d}'
        | '\u{37f}'..='\u{1fff}'
        | '\u{200c}'..='\u{200d}'
        | '\u{2070}'..='\u{218f}'
        | '\u{2c00}'..='\u{2fef}'
        | '\u{3001}'..='\u{d7ff}'
        | '\u{f900}'..='\u{fdcf}'
        | '\u{fdf0}'..='\u{fffd}'
        | '\u{10000}'..='\u{effff}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{b7}'
            | '\u{300}'..='\u{36f}'
            | '\u{203f}'..='\u{2040}')
}

/// `Name` production.
pub(crate) fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_name_start_char) && chars.all(is_name_char)
}

fn check_chars(text: &str, what: &str) -> Result<()> {
    match text.chars().find(|c| !is_xml_char(*c)) {
        Some(c) => Err(Error::Markup(format!(
            "{what} contains forbidden character U+{:04X}",
            c as u32
        ))),
        None => Ok(()),
    }
}

pub(crate) fn check_name(name: &str, what: &str) -> Result<()> {
    if is_xml_name(name) {
        Ok(())
    } else {
        Err(Error::Markup(format!("invalid {what} name {name:?}")))
    }
}

pub(crate) fn check_attributes(element: &str, attributes: &[(String, String)]) -> Result<()> {
    for (i, (key, value)) in attributes.iter().enumerate() {
        check_name(key, "attribute")?;
        if attributes[..i].iter().any(|(k, _)| k == key) {
            return Err(Error::Markup(format!(
                "duplicate attribute {key:?} on <{element}>"
            )));
        }
        check_chars(value, "attribute value")?;
    }
    Ok(())
}

pub(crate) fn check_text(text: &str) -> Result<()> {
    check_chars(text, "text")
}

pub(crate) fn check_comment(text: &str) -> Result<()> {
    if text.contains("--") || text.ends_with('-') {
        return Err(Error::Markup(format!(
            "comment {text:?} contains \"--\" or ends with \"-\""
        )));
    }
    check_chars(text, "comment")
}

pub(crate) fn check_processing_instruction(content: &str) -> Result<()> {
    let target = content.split(|c: char| c.is_ascii_whitespace()).next().unwrap_or("");
    check_name(target, "processing instruction target")?;
    if target.eq_ignore_ascii_case("xml") {
        return Err(Error::Markup("reserved processing instruction target \"xml\"".into()));
    }
    if content.contains("?>") {
        return Err(Error::Markup(format!(
            "processing instruction {content:?} contains \"?>\""
        )));
    }
    check_chars(content, "processing instruction")
}
