use divan::{Bencher, black_box};
use std::sync::LazyLock;

fn main() {
    divan::main();
}

/// A blog-like page with `sections` sections of well-formed markup.
fn page(sections: usize) -> String {
    let mut html = String::from("<!DOCTYPE html><html><head><title>Bench</title>");
    html.push_str("<style>body > main { margin: 0 auto; }</style></head><body><main id=\"content\">");
    for i in 0..sections {
        html.push_str(&format!(
            "<section class=\"post post-{i}\"><h2>Post {i}</h2>\
             <p>Some <b>bold</b> and <i>italic</i> text with an \
             <a href=\"/posts/{i}\">link</a> &amp; an entity.</p>\
             <ul><li>first</li><li>second</li><li>third</li></ul>\
             <img src=\"/img/{i}.png\" alt=\"picture {i}\"><br>\
             <script>if (a < b) {{ render({i}); }}</script></section>\n"
        ));
    }
    html.push_str("</main></body></html>");
    html
}

/// The same amount of content with most end tags left out.
fn sloppy_page(sections: usize) -> String {
    let mut html = String::new();
    for i in 0..sections {
        html.push_str(&format!(
            "<div class=item><p>para {i}<p>another <b>bold<i>both</b> text\
             <ul><li>one<li>two<li>three</ul><a href=#{i}>x<a href=#y>y\
             <table><tr><td>1<td>2</table></span></div>\n"
        ));
    }
    html
}

static SMALL_HTML: LazyLock<String> = LazyLock::new(|| page(10));
static MEDIUM_HTML: LazyLock<String> = LazyLock::new(|| page(100));
static LARGE_HTML: LazyLock<String> = LazyLock::new(|| page(1000));
static SLOPPY_HTML: LazyLock<String> = LazyLock::new(|| sloppy_page(500));

#[divan::bench]
fn parse_small(bencher: Bencher) {
    bencher.bench_local(|| {
        let doc = laxdom::parse(black_box(&SMALL_HTML));
        black_box(doc);
    });
}

#[divan::bench]
fn parse_medium(bencher: Bencher) {
    bencher.bench_local(|| {
        let doc = laxdom::parse(black_box(&MEDIUM_HTML));
        black_box(doc);
    });
}

#[divan::bench]
fn parse_large(bencher: Bencher) {
    bencher.bench_local(|| {
        let doc = laxdom::parse(black_box(&LARGE_HTML));
        black_box(doc);
    });
}

#[divan::bench]
fn parse_sloppy(bencher: Bencher) {
    bencher.bench_local(|| {
        let doc = laxdom::parse(black_box(&SLOPPY_HTML));
        black_box(doc);
    });
}

#[divan::bench]
fn base_parse_without_recovery(bencher: Bencher) {
    bencher.bench_local(|| {
        let partial = laxdom::base_parse(black_box(&SLOPPY_HTML), laxdom::ParseOptions::default());
        black_box(partial);
    });
}
