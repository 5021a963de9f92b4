#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let html = String::from_utf8_lossy(data);

    let partial = laxdom::base_parse(&html, laxdom::ParseOptions::default().with_comments());
    assert_eq!(partial.open_elements[0], partial.document.root());

    let doc = partial.recover();
    let root = doc.root();
    assert!(matches!(doc.kind(root), laxdom::NodeKind::Document));
    assert_eq!(doc.parent(root), None);

    for node in doc.descendants(root) {
        assert!(doc.ancestors(node).any(|a| a == root));
        if doc.is_void(node) {
            assert_eq!(doc.first_child(node), None, "void element with children");
        }
        if let Some(range) = doc.range(node) {
            assert!(range.start <= range.end && range.end <= html.len());
        }
    }

    let _ = doc.to_html();
    let _ = doc.structured_text(root);
    let _ = doc.structure(root);
});
