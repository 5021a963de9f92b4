// =============================================================================
// Parser behaviour on well-formed and malformed input
// =============================================================================

use laxdom::{Document, NodeId, NodeKind, ParseOptions, parse, parse_with_options};
use regex::Regex;

fn element_children(doc: &Document, id: NodeId) -> Vec<NodeId> {
    doc.child_elements(id).collect()
}

fn tag(doc: &Document, id: NodeId) -> &str {
    doc.tag(id).expect("should be an element")
}

/// Count of non-whitespace characters across all text nodes.
fn visible_chars(doc: &Document) -> usize {
    doc.descendants(doc.root())
        .filter_map(|n| doc.text_data(n))
        .map(|t| t.raw_text().chars().filter(|c| !c.is_whitespace()).count())
        .sum()
}

#[test]
fn test_void_element_closure() {
    let doc = parse("<br><br/><img src=\"x\">");
    let children = doc.child_nodes(doc.root());
    assert_eq!(children.len(), 3);
    for child in children {
        assert!(doc.is_element(child));
        assert_eq!(doc.first_child(child), None);
    }
}

#[test]
fn test_raw_text_isolation() {
    let doc = parse("<script>if (a<b) {}</script>");
    let script = doc.first_child(doc.root()).expect("should have script");
    assert_eq!(tag(&doc, script), "script");

    let children = doc.child_nodes(script);
    assert_eq!(children.len(), 1);
    let text = doc.text_data(children[0]).expect("should be a text node");
    assert_eq!(text.raw_text(), "if (a<b) {}");
}

#[test]
fn test_implicit_closing() {
    let doc = parse("<p>one<p>two");
    let children = element_children(&doc, doc.root());
    assert_eq!(children.len(), 2);
    assert!(children.iter().all(|&c| tag(&doc, c) == "p"));
    assert_eq!(doc.text(children[0]), "one");
    assert_eq!(doc.text(children[1]), "two");
}

#[test]
fn test_anchor_nesting_guard() {
    let doc = parse("<a href=1>x<a href=2>y</a>");
    let anchors = doc.get_elements_by_tag_name(doc.root(), "a");
    assert_eq!(anchors.len(), 2);
    for a in anchors {
        assert!(
            doc.ancestors(a).all(|p| doc.tag(p) != Some("a")),
            "anchor nested inside another anchor: {}",
            doc.to_html()
        );
    }
}

#[test]
fn test_anchor_guard_through_wrappers() {
    let doc = parse("<a href=\"/1\"><span>x<a href=\"/2\">y</a></span>");
    let anchors = doc.get_elements_by_tag_name(doc.root(), "a");
    assert_eq!(anchors.len(), 2);
    assert!(anchors.iter().all(|&a| doc.parent(a) == Some(doc.root())));
}

#[test]
fn test_anchor_guard_resets_after_close() {
    let doc = parse("<a>x</a><span><a>y</a></span>");
    let span = doc.get_elements_by_tag_name(doc.root(), "span")[0];
    let anchors = doc.get_elements_by_tag_name(doc.root(), "a");
    assert_eq!(anchors.len(), 2);
    assert_eq!(doc.parent(anchors[0]), Some(doc.root()));
    assert_eq!(doc.parent(anchors[1]), Some(span));
    assert_eq!(doc.to_html(), "<a>x</a><span><a>y</a></span>");
}

#[test]
fn test_end_tag_matches_other_case() {
    let doc = parse("<div><SPAN>x</span>y</div>");
    let div = doc.first_child(doc.root()).unwrap();
    let children = doc.child_nodes(div);
    assert_eq!(children.len(), 2);
    assert_eq!(tag(&doc, children[0]), "SPAN");
    assert_eq!(doc.raw_text(children[1]), "y");
    assert_eq!(doc.to_html(), "<div><SPAN>x</SPAN>y</div>");
}

#[test]
fn test_unterminated_last_tag() {
    let doc = parse("a<b");
    assert_eq!(doc.to_html(), "a<b></b>");

    let doc = parse("a<b c");
    let b = doc.get_elements_by_tag_name(doc.root(), "b")[0];
    let element = doc.element(b).unwrap();
    assert_eq!(element.raw_attrs(), "c");
    assert!(element.has_attribute("c"));
    assert_eq!(doc.to_html(), "a<b c></b>");
}

#[test]
fn test_structured_text_blocking() {
    let doc = parse("<div>a<p>b</p>c</div>");
    let text = doc.structured_text(doc.root());
    assert_eq!(text.lines().collect::<Vec<_>>(), ["a", "b", "c"]);
}

#[test]
fn test_single_root_for_malformed_input() {
    let inputs = [
        "",
        "   ",
        "plain text",
        "<",
        "<div",
        "</div>",
        "<div><span>",
        "</p></p></p>",
        "<ul><li><ul><li>deep",
        "<table><td>x</tr></b></table>",
        "<!-- unterminated",
        "<script>never closed <b>",
        "<div><div><div>x</div>",
        "<p><div><p>mixed</div></p>",
        "<<<>>>",
        "<a><a><a>",
    ];
    for input in inputs {
        let doc = parse(input);
        assert!(
            matches!(doc.kind(doc.root()), NodeKind::Document),
            "bad root for {input:?}"
        );
        assert_eq!(doc.parent(doc.root()), None);
        for node in doc.descendants(doc.root()) {
            assert!(
                doc.ancestors(node).any(|a| a == doc.root()),
                "node outside the root for {input:?}"
            );
        }
    }
}

#[test]
fn test_recovery_keeps_text() {
    let tag_pattern = Regex::new(r"<[^>]*>").unwrap();
    let inputs = [
        "<div><span>one<b>two</div>three",
        "<section><div><div>four</section>five",
        "<ul><li>a<li>b</ol>c",
        "<p>x<p>y<p>z",
        "<em><strong>deep</em></strong>tail",
    ];
    for input in inputs {
        let doc = parse(input);
        let expected: usize = tag_pattern
            .replace_all(input, "")
            .chars()
            .filter(|c| !c.is_whitespace())
            .count();
        assert_eq!(visible_chars(&doc), expected, "text lost for {input:?}");
    }
}

#[test]
fn test_serialize_parse_idempotence() {
    let inputs = [
        "<div class=\"a b\" id=\"main\"><p>Hello <b>world</b></p><ul><li>1</li><li>2</li></ul></div>",
        "<table><tr><td>a</td><td>b</td></tr></table>",
        "<p>a &amp; b<br>c</p><img src=\"x.png\" alt=\"x\">",
        "<section><h1>Title</h1><article><p>one</p><p>two</p></article></section>",
        "<script>var x = '<div>';</script><style>p > a { color: red }</style>",
        "<input checked type=\"checkbox\"><label for=\"c\">c</label>",
    ];
    for input in inputs {
        let first = parse(input);
        let html = first.to_html();
        let second = parse(&html);
        assert_eq!(second.to_html(), html, "not idempotent for {input:?}");
        assert_eq!(second.structure(second.root()), first.structure(first.root()));
        assert_eq!(html, input);
    }
}

#[test]
fn test_whitespace_text_is_preserved() {
    let doc = parse("<ul>\n  <li>A</li>\n  <li>B</li>\n</ul>");
    let ul = doc.first_child(doc.root()).unwrap();
    assert_eq!(doc.child_nodes(ul).len(), 5);
}

#[test]
fn test_lower_case_option() {
    let doc = parse_with_options(
        "<DIV><SPAN>x</SPAN></DIV>",
        ParseOptions::new().lower_case_tag_name(),
    );
    assert_eq!(doc.to_html(), "<div><span>x</span></div>");
}

#[test]
fn test_case_preserved_by_default() {
    let doc = parse("<DIV>x</DIV>");
    let div = doc.first_child(doc.root()).unwrap();
    let element = doc.element(div).unwrap();
    assert_eq!(element.raw_tag_name(), "DIV");
    assert_eq!(element.tag_name(), "DIV");
    assert_eq!(element.local_name(), "div");
}

#[test]
fn test_doctype_is_text() {
    let doc = parse("<!DOCTYPE html><html><body>x</body></html>");
    let first = doc.first_child(doc.root()).unwrap();
    assert_eq!(doc.raw_text(first), "<!DOCTYPE html>");
    assert_eq!(doc.to_html(), "<!DOCTYPE html><html><body>x</body></html>");
}

#[test]
fn test_entities_decoded_only_on_request() {
    let doc = parse("<p title=\"&lt;x&gt;\">&copy; 2024 &amp; co</p>");
    let p = doc.first_child(doc.root()).unwrap();
    assert_eq!(doc.raw_text(p), "&copy; 2024 &amp; co");
    assert_eq!(doc.text(p), "\u{a9} 2024 & co");
    let element = doc.element(p).unwrap();
    assert_eq!(element.get_attribute("title"), Some("<x>"));
    assert_eq!(
        element.raw_attributes().get("title"),
        Some(&Some("&lt;x&gt;".to_string()))
    );
}

#[test]
fn test_ranges_cover_source() {
    let html = "<div><p>hi</p></div>";
    let doc = parse(html);
    let div = doc.first_child(doc.root()).unwrap();
    let p = doc.first_child(div).unwrap();
    assert_eq!(doc.range(doc.root()), Some(0..html.len()));
    assert_eq!(doc.range(div), Some(0..html.len()));
    assert_eq!(&html[doc.range(p).unwrap()], "<p>hi</p>");
}
