//! Output file naming.
//!
//! Section files are named `<ordinal>-<slug>`: the zero-based ordinal is
//! zero-padded to the width of the section count, so names are unique within
//! one document and sort lexicographically in document order.

/// Longest slug kept in a file name, in bytes.
pub const MAX_SLUG_LEN: usize = 48;

/// Slug used when a title has no usable characters.
pub const FALLBACK_SLUG: &str = "section";

/// Generate a GitHub-style slug from text.
///
/// Converts text to lowercase, replaces spaces and special characters with hyphens,
/// and removes consecutive/leading/trailing hyphens.
///
/// # Examples
///
/// ```
/// use folio::naming::slugify;
///
/// assert_eq!(slugify("Chapter One"), "chapter-one");
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
/// ```
pub fn slugify(text: &str) -> String {
    text.chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() {
                Some(c.to_ascii_lowercase())
            } else if c.is_whitespace() || c == '-' || c == '_' {
                Some('-')
            } else {
                None
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Cut a slug to at most `max` bytes, preferring a word boundary.
fn truncate_slug(slug: &str, max: usize) -> &str {
    if slug.len() <= max {
        return slug;
    }
    // slugs are ASCII, any byte index is a char boundary
    let cut = &slug[..max];
    match cut.rfind('-') {
        Some(pos) if pos > 0 => &cut[..pos],
        _ => cut.trim_end_matches('-'),
    }
}

/// Number of decimal digits needed to print `n`.
fn digits(n: usize) -> usize {
    n.max(1).ilog10() as usize + 1
}

/// Build the file name (without extension) for a section.
///
/// `index` is the zero-based position of the section and `count` the total
/// number of sections in the document.
///
/// # Examples
///
/// ```
/// use folio::naming::generate_section_file_name;
///
/// assert_eq!(generate_section_file_name("Intro", 0, 3), "0-intro");
/// assert_eq!(generate_section_file_name("Chapter 1", 7, 150), "007-chapter-1");
/// assert_eq!(generate_section_file_name("???", 12, 150), "012-section");
/// ```
pub fn generate_section_file_name(title: &str, index: usize, count: usize) -> String {
    let slug = slugify(title);
    let slug = match truncate_slug(&slug, MAX_SLUG_LEN) {
        "" => FALLBACK_SLUG,
        s => s,
    };
    let width = digits(count);
    format!("{index:0width$}-{slug}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_simple() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn test_slugify_with_punctuation() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
    }

    #[test]
    fn test_slugify_underscores_and_hyphens() {
        assert_eq!(slugify("hello_world"), "hello-world");
        assert_eq!(slugify("hello--world"), "hello-world");
        assert_eq!(slugify("-hello-"), "hello");
    }

    #[test]
    fn test_slugify_non_ascii_dropped() {
        assert_eq!(slugify("Café Été"), "caf-t");
        assert_eq!(slugify("第一章"), "");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("   "), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_digits() {
        assert_eq!(digits(0), 1);
        assert_eq!(digits(1), 1);
        assert_eq!(digits(9), 1);
        assert_eq!(digits(10), 2);
        assert_eq!(digits(150), 3);
        assert_eq!(digits(1000), 4);
    }

    #[test]
    fn test_truncate_slug_on_word_boundary() {
        assert_eq!(truncate_slug("alpha-beta-gamma", 12), "alpha-beta");
        assert_eq!(truncate_slug("alphabetagamma", 5), "alpha");
        assert_eq!(truncate_slug("short", 48), "short");
    }

    #[test]
    fn test_file_name_padding_follows_count() {
        assert_eq!(generate_section_file_name("A", 0, 9), "0-a");
        assert_eq!(generate_section_file_name("A", 0, 10), "00-a");
        assert_eq!(generate_section_file_name("A", 99, 100), "099-a");
    }

    #[test]
    fn test_file_name_duplicate_titles_distinct() {
        let a = generate_section_file_name("Chapter 1", 1, 3);
        let b = generate_section_file_name("Chapter 1", 2, 3);
        assert_ne!(a, b);
    }

    #[test]
    fn test_file_name_long_title_truncated() {
        let title = "word ".repeat(40);
        let name = generate_section_file_name(&title, 3, 5);
        assert!(name.len() <= MAX_SLUG_LEN + 2);
        assert!(name.starts_with("3-word-word"));
        assert!(!name.ends_with('-'));
    }

    #[test]
    fn test_file_name_index_past_count_does_not_panic() {
        assert_eq!(generate_section_file_name("x", 12, 5), "12-x");
    }
}
