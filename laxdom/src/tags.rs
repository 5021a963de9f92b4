//! Tag classification tables.
//!
//! These encode HTML's informal auto-closing behaviour. The parser consults
//! them instead of special-casing tags at each call site. All lookups ignore
//! ASCII case, so `br`, `BR` and `Br` are the same tag.

/// HTML void elements: never have children, never get an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Default raw-text elements, whose content is captured verbatim.
pub(crate) const DEFAULT_BLOCK_TEXT_ELEMENTS: &[&str] = &["script", "noscript", "style", "pre"];

/// Elements that start a new line in [`structured_text`](crate::Document::structured_text).
///
/// See <https://developer.mozilla.org/en-US/docs/Web/HTML/Block-level_elements>.
const BLOCK_ELEMENTS: &[&str] = &[
    // headings
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "hgroup",
    // d*
    "details", "dialog", "dd", "div", "dt",
    // f*
    "fieldset", "figcaption", "figure", "footer", "form",
    // tables
    "table", "td", "tr",
    // everything else
    "address", "article", "aside", "blockquote", "br", "hr", "li", "main", "nav", "ol", "p", "pre",
    "section", "ul",
];

/// `(open, openers)`: an open `open` element is closed when any of `openers` starts.
const CLOSED_BY_OPENING: &[(&str, &[&str])] = &[
    ("li", &["li"]),
    ("p", &["p", "div"]),
    ("b", &["div"]),
    ("td", &["td", "th"]),
    ("th", &["td", "th"]),
    ("h1", &["h1"]),
    ("h2", &["h2"]),
    ("h3", &["h3"]),
    ("h4", &["h4"]),
    ("h5", &["h5"]),
    ("h6", &["h6"]),
];

/// `(open, closers)`: an open `open` element is closed on the way to a matching
/// end tag when that end tag is one of `closers`.
const CLOSED_BY_CLOSING: &[(&str, &[&str])] = &[
    ("li", &["ul", "ol"]),
    ("a", &["div"]),
    ("b", &["div"]),
    ("i", &["div"]),
    ("p", &["div"]),
    ("td", &["tr", "table"]),
    ("th", &["tr", "table"]),
];

fn contains(list: &[&str], tag: &str) -> bool {
    list.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

fn lookup(
    table: &'static [(&'static str, &'static [&'static str])],
    tag: &str,
) -> Option<&'static [&'static str]> {
    table
        .iter()
        .find(|(open, _)| open.eq_ignore_ascii_case(tag))
        .map(|(_, set)| *set)
}

/// Whether `tag` is a void element.
pub fn is_void_element(tag: &str) -> bool {
    contains(VOID_ELEMENTS, tag)
}

/// Whether `tag` forces a line break in structured text.
pub fn is_block_element(tag: &str) -> bool {
    contains(BLOCK_ELEMENTS, tag)
}

/// Whether an open `open` element is implicitly closed by a new `<opening>` tag.
pub fn is_closed_by_opening(open: &str, opening: &str) -> bool {
    lookup(CLOSED_BY_OPENING, open).is_some_and(|set| contains(set, opening))
}

/// Whether an open `open` element is implicitly closed by a `</closing>` tag
/// that belongs to one of its ancestors.
pub fn is_closed_by_closing(open: &str, closing: &str) -> bool {
    lookup(CLOSED_BY_CLOSING, open).is_some_and(|set| contains(set, closing))
}

/// Whether `tag` is an anchor, which may never nest inside another anchor.
pub(crate) fn is_anchor(tag: &str) -> bool {
    tag == "a" || tag == "A"
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_void_elements_ignore_case() {
        assert!(is_void_element("br"));
        assert!(is_void_element("BR"));
        assert!(is_void_element("Img"));
        assert!(!is_void_element("div"));
    }

    #[test]
    fn test_closed_by_opening() {
        assert!(is_closed_by_opening("p", "div"));
        assert!(is_closed_by_opening("P", "p"));
        assert!(is_closed_by_opening("td", "TH"));
        assert!(!is_closed_by_opening("div", "p"));
        assert!(!is_closed_by_opening("h1", "h2"));
    }

    #[test]
    fn test_closed_by_closing() {
        assert!(is_closed_by_closing("li", "ul"));
        assert!(is_closed_by_closing("LI", "OL"));
        assert!(is_closed_by_closing("td", "table"));
        assert!(!is_closed_by_closing("li", "div"));
        assert!(!is_closed_by_closing("span", "div"));
    }

    #[test]
    fn test_br_is_a_block_element() {
        assert!(is_block_element("br"));
        assert!(is_block_element("TD"));
        assert!(!is_block_element("span"));
    }
}
