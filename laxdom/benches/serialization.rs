use divan::{Bencher, black_box};
use std::sync::LazyLock;

fn main() {
    divan::main();
}

fn page(sections: usize) -> String {
    let mut html = String::from("<main id=\"content\">");
    for i in 0..sections {
        html.push_str(&format!(
            "<section class=\"post post-{i}\"><h2>Post {i}</h2>\
             <p>Some <b>bold</b> and <i>italic</i> text &amp; an entity.</p>\
             <ul><li>first</li><li>second</li></ul><br></section>\n"
        ));
    }
    html.push_str("</main>");
    html
}

static SMALL_HTML: LazyLock<String> = LazyLock::new(|| page(10));
static LARGE_HTML: LazyLock<String> = LazyLock::new(|| page(1000));

#[divan::bench]
fn serialize_small(bencher: Bencher) {
    let doc = laxdom::parse(&SMALL_HTML);
    bencher.bench_local(|| {
        let html = black_box(&doc).to_html();
        black_box(html);
    });
}

#[divan::bench]
fn serialize_large(bencher: Bencher) {
    let doc = laxdom::parse(&LARGE_HTML);
    bencher.bench_local(|| {
        let html = black_box(&doc).to_html();
        black_box(html);
    });
}

#[divan::bench]
fn structured_text_large(bencher: Bencher) {
    let doc = laxdom::parse(&LARGE_HTML);
    bencher.bench_local(|| {
        let text = black_box(&doc).structured_text(doc.root());
        black_box(text);
    });
}

#[divan::bench]
fn set_class_and_serialize(bencher: Bencher) {
    let doc = laxdom::parse(&SMALL_HTML);
    let sections = doc.get_elements_by_tag_name(doc.root(), "section");
    bencher.bench_local(|| {
        let mut doc = doc.clone();
        for &section in &sections {
            if let Some(element) = doc.element_mut(section) {
                let _ = element.class_list_mut().toggle("active");
            }
        }
        black_box(doc.to_html());
    });
}
