//! Element payload: tag name plus the attribute store.
//!
//! The raw attribute string is the source of truth. Two maps are derived from
//! it on first access and cached: the raw map (original key case, undecoded
//! values) and the decoded map (lower-cased keys, entity-decoded values).
//! Every mutation rewrites the raw string and drops both caches before
//! returning.

use compact_str::CompactString;
use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use std::cell::OnceCell;
use std::sync::LazyLock;

use crate::class_list::ClassList;
use crate::error::DomError;
use crate::serialize::quote_attribute;
use crate::text::decode;

/// Matches one `name`, `name=value`, `name="value"` or `name='value'` pair.
static RAW_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)([a-z()#][a-z0-9_:()#-]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|(\S+)))?"#)
        .expect("attribute pattern is valid")
});

/// Matches only `id` and `class`, which the parser needs up front.
static KEY_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)(id|class)\s*=\s*(?:"([^"]*)"|'([^']*)'|(\S+))"#)
        .expect("key attribute pattern is valid")
});

/// Attribute map as scanned: original key case, `None` for bare attributes.
pub type RawAttributes = IndexMap<String, Option<String>>;

/// The `id` and `class` attributes pulled out of an attribute payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyAttributes {
    pub id: Option<String>,
    pub class: Option<String>,
}

impl KeyAttributes {
    /// Scan a raw attribute payload for `id` and `class`. Later occurrences win.
    pub fn scan(raw: &str) -> Self {
        let mut key = KeyAttributes::default();
        for caps in KEY_ATTRIBUTE.captures_iter(raw) {
            let value = first_non_empty(&caps, 2..=4).map(str::to_string);
            if caps[1].eq_ignore_ascii_case("id") {
                key.id = value;
            } else {
                key.class = value;
            }
        }
        key
    }
}

fn first_non_empty<'h>(
    caps: &regex::Captures<'h>,
    groups: std::ops::RangeInclusive<usize>,
) -> Option<&'h str> {
    groups
        .filter_map(|i| caps.get(i))
        .map(|m| m.as_str())
        .find(|v| !v.is_empty())
}

fn parse_raw_attributes(raw: &str) -> RawAttributes {
    let mut attrs = RawAttributes::new();
    for caps in RAW_ATTRIBUTE.captures_iter(raw) {
        let value = first_non_empty(&caps, 2..=4).map(str::to_string);
        attrs.insert(caps[1].to_string(), value);
    }
    attrs
}

/// Render an attribute map back into a raw attribute string.
///
/// Bare and empty attributes are written as the name alone.
fn render_raw_attributes<'a>(attrs: impl IntoIterator<Item = (&'a str, Option<&'a str>)>) -> String {
    let mut out = String::new();
    for (name, value) in attrs {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(name);
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            out.push('=');
            out.push_str(&quote_attribute(value));
        }
    }
    out
}

fn split_classes(value: &str) -> IndexSet<CompactString> {
    value.split_whitespace().map(CompactString::from).collect()
}

/// Element payload stored in the arena.
#[derive(Debug, Clone)]
pub struct ElementData {
    tag: CompactString,
    raw_attrs: String,
    id: String,
    pub(crate) classes: IndexSet<CompactString>,
    raw_cache: OnceCell<RawAttributes>,
    decoded_cache: OnceCell<IndexMap<String, String>>,
}

impl ElementData {
    /// Create an element from a tag name and a raw attribute string.
    pub fn new(tag: impl Into<CompactString>, raw_attrs: impl Into<String>) -> Self {
        let raw_attrs = raw_attrs.into();
        let key = KeyAttributes::scan(&raw_attrs);
        Self::from_parts(tag.into(), key, raw_attrs)
    }

    /// Create an element whose `id`/`class` were already extracted from `raw_attrs`.
    ///
    /// When `raw_attrs` is empty, the key attributes are written into it.
    pub fn from_parts(tag: CompactString, key: KeyAttributes, raw_attrs: String) -> Self {
        let classes = key.class.as_deref().map(split_classes).unwrap_or_default();
        let raw_attrs = if raw_attrs.is_empty() {
            let id = key.id.as_deref().map(|id| ("id", Some(id)));
            let class = (!classes.is_empty()).then(|| classes.iter().map(|c| c.as_str()));
            let class_value = class.map(|c| c.collect::<Vec<_>>().join(" "));
            render_raw_attributes(
                id.into_iter()
                    .chain(class_value.as_deref().map(|c| ("class", Some(c)))),
            )
        } else {
            raw_attrs
        };
        ElementData {
            tag,
            raw_attrs,
            id: key.id.unwrap_or_default(),
            classes,
            raw_cache: OnceCell::new(),
            decoded_cache: OnceCell::new(),
        }
    }

    /// Tag name exactly as scanned.
    pub fn raw_tag_name(&self) -> &str {
        &self.tag
    }

    /// Upper-cased tag name, as the DOM's `tagName`.
    pub fn tag_name(&self) -> String {
        self.tag.to_uppercase().into_string()
    }

    /// Lower-cased tag name, as the DOM's `localName`.
    pub fn local_name(&self) -> String {
        self.tag.to_lowercase().into_string()
    }

    /// The raw attribute string.
    pub fn raw_attrs(&self) -> &str {
        &self.raw_attrs
    }

    /// The `id` attribute, or an empty string.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Class tokens in insertion order.
    pub fn class_list(&self) -> &IndexSet<CompactString> {
        &self.classes
    }

    /// Mutable view of the class tokens; every change is written back to the
    /// `class` attribute.
    pub fn class_list_mut(&mut self) -> ClassList<'_> {
        ClassList::new(self)
    }

    /// Class tokens joined with single spaces.
    pub fn class_names(&self) -> String {
        self.classes
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Attributes with their original key case and undecoded values.
    pub fn raw_attributes(&self) -> &RawAttributes {
        self.raw_cache
            .get_or_init(|| parse_raw_attributes(&self.raw_attrs))
    }

    /// Attributes with lower-cased keys and decoded values.
    pub fn attrs(&self) -> &IndexMap<String, String> {
        self.decoded_cache.get_or_init(|| {
            let mut attrs = IndexMap::new();
            for (key, value) in self.raw_attributes() {
                attrs.insert(key.to_lowercase(), decode(value.as_deref().unwrap_or("")));
            }
            attrs
        })
    }

    /// Attributes with their original key case and decoded values.
    pub fn attributes(&self) -> IndexMap<String, String> {
        self.raw_attributes()
            .iter()
            .map(|(key, value)| (key.clone(), decode(value.as_deref().unwrap_or(""))))
            .collect()
    }

    /// Decoded value of an attribute, looked up case-insensitively.
    pub fn get_attribute(&self, key: &str) -> Option<&str> {
        self.attrs().get(&key.to_lowercase()).map(String::as_str)
    }

    /// Whether an attribute is present, looked up case-insensitively.
    pub fn has_attribute(&self, key: &str) -> bool {
        self.attrs().contains_key(&key.to_lowercase())
    }

    /// Set an attribute value.
    ///
    /// An existing attribute with the same name in any case keeps its stored
    /// key case. An empty value is written as a bare attribute.
    pub fn set_attribute(&mut self, key: &str, value: &str) -> Result<(), DomError> {
        if key.is_empty() {
            return Err(DomError::invalid_arguments(
                "setAttribute requires a non-empty attribute name",
            ));
        }
        if key.contains(|c: char| c.is_whitespace() || c == '=') {
            return Err(DomError::invalid_arguments(format!(
                "'{key}' is not a valid attribute name"
            )));
        }
        self.store(key, Some(value));
        if key.eq_ignore_ascii_case("id") {
            self.id = value.to_string();
        } else if key.eq_ignore_ascii_case("class") {
            self.classes = split_classes(value);
        }
        Ok(())
    }

    /// Remove an attribute, matching its name case-insensitively.
    pub fn remove_attribute(&mut self, key: &str) {
        let lower = key.to_lowercase();
        let mut attrs = self.take_raw_attributes();
        attrs.retain(|k, _| k.to_lowercase() != lower);
        self.replace_raw_attributes(&attrs);
        if lower == "id" {
            self.id.clear();
        } else if lower == "class" {
            self.classes.clear();
        }
    }

    /// Replace every attribute. `None` or empty values become bare attributes.
    pub fn set_attributes<K, V>(&mut self, attributes: impl IntoIterator<Item = (K, Option<V>)>)
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let attributes: Vec<(K, Option<V>)> = attributes.into_iter().collect();
        self.raw_attrs = render_raw_attributes(
            attributes
                .iter()
                .map(|(k, v)| (k.as_ref(), v.as_ref().map(|v| v.as_ref()))),
        );
        self.invalidate();

        let lookup = |name: &str| {
            attributes
                .iter()
                .rev()
                .find(|(k, _)| k.as_ref().eq_ignore_ascii_case(name))
                .and_then(|(_, v)| v.as_ref().map(|v| v.as_ref().to_string()))
        };
        self.id = lookup("id").unwrap_or_default();
        self.classes = lookup("class").as_deref().map(split_classes).unwrap_or_default();
    }

    /// Write the class tokens back into the `class` attribute.
    pub(crate) fn write_class_attribute(&mut self) {
        let value = self.class_names();
        self.store("class", Some(&value));
    }

    /// Insert or update one entry and regenerate the raw string.
    fn store(&mut self, key: &str, value: Option<&str>) {
        let lower = key.to_lowercase();
        let mut attrs = self.take_raw_attributes();
        let key = attrs
            .keys()
            .find(|k| k.to_lowercase() == lower)
            .cloned()
            .unwrap_or_else(|| key.to_string());
        attrs.insert(key, value.map(str::to_string));
        self.replace_raw_attributes(&attrs);
    }

    fn take_raw_attributes(&mut self) -> RawAttributes {
        self.raw_cache
            .take()
            .unwrap_or_else(|| parse_raw_attributes(&self.raw_attrs))
    }

    fn replace_raw_attributes(&mut self, attrs: &RawAttributes) {
        self.raw_attrs =
            render_raw_attributes(attrs.iter().map(|(k, v)| (k.as_str(), v.as_deref())));
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.raw_cache = OnceCell::new();
        self.decoded_cache = OnceCell::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_key_attributes_scan() {
        let key = KeyAttributes::scan(r#"href="x" ID='main' class="a  b""#);
        assert_eq!(key.id.as_deref(), Some("main"));
        assert_eq!(key.class.as_deref(), Some("a  b"));

        let key = KeyAttributes::scan(r#"data-id="nope" class=solo"#);
        assert_eq!(key.id, None);
        assert_eq!(key.class.as_deref(), Some("solo"));
    }

    #[test]
    fn test_raw_attributes_keep_case_and_bare_names() {
        let el = ElementData::new("input", r#"Type="text" disabled value='a&amp;b'"#);
        let raw = el.raw_attributes();
        assert_eq!(raw.get("Type"), Some(&Some("text".to_string())));
        assert_eq!(raw.get("disabled"), Some(&None));
        assert_eq!(raw.get("value"), Some(&Some("a&amp;b".to_string())));
    }

    #[test]
    fn test_decoded_attributes_are_lower_cased() {
        let el = ElementData::new("input", r#"Type="text" disabled value='a&amp;b'"#);
        assert_eq!(el.get_attribute("type"), Some("text"));
        assert_eq!(el.get_attribute("TYPE"), Some("text"));
        assert_eq!(el.get_attribute("value"), Some("a&b"));
        assert_eq!(el.get_attribute("disabled"), Some(""));
        assert!(el.has_attribute("Disabled"));
        assert!(!el.has_attribute("checked"));
        assert_eq!(el.attributes().get("Type").map(String::as_str), Some("text"));
    }

    #[test]
    fn test_set_attribute_preserves_stored_key_case() {
        let mut el = ElementData::new("a", r#"HREF="/old""#);
        let _ = el.attrs();
        el.set_attribute("href", "/new").unwrap();
        assert_eq!(el.raw_attrs(), r#"HREF="/new""#);
        assert_eq!(el.get_attribute("href"), Some("/new"));
    }

    #[test]
    fn test_set_attribute_quotes_values() {
        let mut el = ElementData::new("div", "");
        el.set_attribute("title", r#"say "hi""#).unwrap();
        assert_eq!(el.raw_attrs(), r#"title="say &quot;hi&quot;""#);
        assert_eq!(el.get_attribute("title"), Some(r#"say "hi""#));

        el.set_attribute("hidden", "").unwrap();
        assert_eq!(el.raw_attrs(), r#"title="say &quot;hi&quot;" hidden"#);
    }

    #[test]
    fn test_set_attribute_rejects_empty_name() {
        let mut el = ElementData::new("div", r#"id="x""#);
        let err = el.set_attribute("", "v").unwrap_err();
        assert!(matches!(err, DomError::InvalidArguments { .. }));
        assert_eq!(el.raw_attrs(), r#"id="x""#);
    }

    #[test]
    fn test_set_attribute_mirrors_id_and_class() {
        let mut el = ElementData::new("div", "");
        el.set_attribute("id", "main").unwrap();
        el.set_attribute("class", "a b").unwrap();
        assert_eq!(el.id(), "main");
        let classes: Vec<&str> = el.class_list().iter().map(|c| c.as_str()).collect();
        assert_eq!(classes, ["a", "b"]);
    }

    #[test]
    fn test_remove_attribute_invalidates_caches() {
        let mut el = ElementData::new("div", r#"id="x" class="c" data-k="v""#);
        assert_eq!(el.get_attribute("data-k"), Some("v"));
        el.remove_attribute("DATA-K");
        assert_eq!(el.get_attribute("data-k"), None);
        assert_eq!(el.raw_attrs(), r#"id="x" class="c""#);

        el.remove_attribute("id");
        assert_eq!(el.id(), "");
        assert_eq!(el.raw_attrs(), r#"class="c""#);
    }

    #[test]
    fn test_set_attributes_replaces_everything() {
        let mut el = ElementData::new("div", r#"id="x" class="c""#);
        let _ = el.attrs();
        el.set_attributes([("id", Some("y")), ("checked", None)]);
        assert_eq!(el.raw_attrs(), r#"id="y" checked"#);
        assert_eq!(el.id(), "y");
        assert!(el.class_list().is_empty());
        assert_eq!(el.get_attribute("class"), None);
        assert_eq!(el.get_attribute("checked"), Some(""));
    }

    #[test]
    fn test_from_parts_writes_key_attributes_when_raw_is_empty() {
        let key = KeyAttributes {
            id: Some("main".to_string()),
            class: Some("a b".to_string()),
        };
        let el = ElementData::from_parts("div".into(), key, String::new());
        assert_eq!(el.raw_attrs(), r#"id="main" class="a b""#);
    }

    #[test]
    fn test_tag_name_cases() {
        let el = ElementData::new("Section", "");
        assert_eq!(el.raw_tag_name(), "Section");
        assert_eq!(el.tag_name(), "SECTION");
        assert_eq!(el.local_name(), "section");
    }
}
