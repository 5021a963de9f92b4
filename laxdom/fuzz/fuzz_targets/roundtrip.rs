#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug, Clone)]
enum Node {
    Text(FuzzText),
    Comment(FuzzText),
    // Block elements
    Div {
        class: Option<AttrValue>,
        id: Option<AttrValue>,
        children: Vec<Node>,
    },
    P {
        class: Option<AttrValue>,
        text: FuzzText,
    },
    H1 {
        text: FuzzText,
    },
    Section {
        children: Vec<Node>,
    },
    // Lists
    Ul {
        children: Vec<Node>,
    },
    Li {
        text: FuzzText,
    },
    // Table
    Table {
        children: Vec<Node>,
    },
    Tr {
        children: Vec<Node>,
    },
    Td {
        children: Vec<Node>,
    },
    // Inline elements
    Span {
        class: Option<AttrValue>,
        text: FuzzText,
    },
    A {
        href: Option<AttrValue>,
        text: FuzzText,
    },
    B {
        text: FuzzText,
    },
    // Raw text
    Script {
        body: FuzzText,
    },
    // Void elements
    Br,
    Img {
        src: Option<AttrValue>,
        alt: Option<AttrValue>,
    },
}

#[derive(Arbitrary, Debug, Clone)]
struct FuzzText(
    #[arbitrary(with = |u: &mut arbitrary::Unstructured| {
        let len = u.int_in_range(0..=30)?;
        let mut s = String::with_capacity(len);
        for _ in 0..len {
            // No '<': text must not be able to start markup
            let c = match u.int_in_range::<u8>(0..=14)? {
                0..=9 => u.int_in_range(b'a'..=b'z')? as char,
                10 => '>',
                11 => '&',
                12 => '"',
                13 => ' ',
                14 => '\n',
                _ => unreachable!(),
            };
            s.push(c);
        }
        Ok(s)
    })]
    String,
);

#[derive(Arbitrary, Debug, Clone)]
struct AttrValue(
    #[arbitrary(with = |u: &mut arbitrary::Unstructured| {
        let len = u.int_in_range(0..=20)?;
        let mut s = String::with_capacity(len);
        for _ in 0..len {
            let c = match u.int_in_range::<u8>(0..=12)? {
                0..=8 => u.int_in_range(b'a'..=b'z')? as char,
                9 => '-',
                10 => '_',
                11 => '/',
                12 => ' ',
                _ => unreachable!(),
            };
            s.push(c);
        }
        Ok(s)
    })]
    String,
);

fn attr(name: &str, value: &Option<AttrValue>) -> String {
    value
        .as_ref()
        .map(|v| format!(" {name}=\"{}\"", v.0))
        .unwrap_or_default()
}

impl Node {
    fn to_html(&self, depth: usize) -> String {
        // Limit depth to prevent stack overflow
        if depth > 5 {
            return String::new();
        }

        let fmt_children = |children: &[Node], limit: usize| -> String {
            children
                .iter()
                .take(limit)
                .map(|c| c.to_html(depth + 1))
                .collect()
        };

        match self {
            Node::Text(s) => s.0.clone(),
            Node::Comment(s) => format!("<!--{}-->", s.0.replace('>', "")),
            Node::Div {
                class,
                id,
                children,
            } => format!(
                "<div{}{}>{}</div>",
                attr("class", class),
                attr("id", id),
                fmt_children(children, 4)
            ),
            Node::P { class, text } => format!("<p{}>{}</p>", attr("class", class), text.0),
            Node::H1 { text } => format!("<h1>{}</h1>", text.0),
            Node::Section { children } => {
                format!("<section>{}</section>", fmt_children(children, 4))
            }
            Node::Ul { children } => format!("<ul>{}</ul>", fmt_children(children, 5)),
            Node::Li { text } => format!("<li>{}</li>", text.0),
            Node::Table { children } => format!("<table>{}</table>", fmt_children(children, 6)),
            Node::Tr { children } => format!("<tr>{}</tr>", fmt_children(children, 6)),
            Node::Td { children } => format!("<td>{}</td>", fmt_children(children, 2)),
            Node::Span { class, text } => {
                format!("<span{}>{}</span>", attr("class", class), text.0)
            }
            Node::A { href, text } => format!("<a{}>{}</a>", attr("href", href), text.0),
            Node::B { text } => format!("<b>{}</b>", text.0),
            Node::Script { body } => format!("<script>{}</script>", body.0),
            Node::Br => "<br>".to_string(),
            Node::Img { src, alt } => format!("<img{}{}>", attr("src", src), attr("alt", alt)),
        }
    }
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    nodes: Vec<Node>,
    lower_case: bool,
}

fuzz_target!(|input: FuzzInput| {
    let html: String = input.nodes.iter().take(5).map(|n| n.to_html(0)).collect();
    let options = || {
        let options = laxdom::ParseOptions::default();
        if input.lower_case {
            options.lower_case_tag_name()
        } else {
            options
        }
    };

    let first = laxdom::parse_with_options(&html, options());
    let first_html = first.to_html();

    let second = laxdom::parse_with_options(&first_html, options());
    let second_html = second.to_html();

    assert_eq!(
        first_html, second_html,
        "serialization is not a fixed point\ninput: {html}"
    );
    assert_eq!(
        first.structure(first.root()),
        second.structure(second.root())
    );
});
