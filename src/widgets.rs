// src/widgets.rs

use std::sync::LazyLock;

use regex::Regex;

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9-]*)\b([^>]*)>").expect("valid tag regex")
});

/// Elements that never have children.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

static CLASS_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bclass\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid class regex"));

static ID_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bid\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid id regex"));

/// Material Design components the pages use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    /// `.mdc-button`
    Ripple,
    /// `.mdc-text-field`
    TextField,
    /// `.mdc-form-field` wrapping an `.mdc-radio`
    RadioFormField,
    /// `.mdc-data-table`
    DataTable,
}

/// An element that needs a component attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    pub kind: WidgetKind,
    /// Position of the element among all opening tags.
    pub element_index: usize,
    pub id: Option<String>,
}

/// Whatever actually instantiates the components.
pub trait WidgetHost {
    fn attach(&mut self, widget: &Widget);
}

struct Element {
    classes: Vec<String>,
    id: Option<String>,
    /// One past the index of the element's last descendant.
    end: usize,
}

impl Element {
    fn has(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

fn first_group(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().to_string())
}

/// Opening tags in document order, each knowing where its subtree ends.
/// Elements left unclosed run to the end of the markup.
fn elements(markup: &str) -> Vec<Element> {
    let mut elements: Vec<Element> = Vec::new();
    let mut open: Vec<(String, usize)> = Vec::new();

    for tag in TAG.captures_iter(markup) {
        let name = tag[2].to_ascii_lowercase();
        if !tag[1].is_empty() {
            if let Some(pos) = open.iter().rposition(|(n, _)| *n == name) {
                let here = elements.len();
                for (_, index) in open.drain(pos..) {
                    elements[index].end = here;
                }
            }
            continue;
        }

        let attrs = &tag[3];
        let index = elements.len();
        elements.push(Element {
            classes: first_group(&CLASS_ATTR, attrs)
                .map(|c| c.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            id: first_group(&ID_ATTR, attrs),
            end: index + 1,
        });
        let self_closing = attrs.trim_end().ends_with('/');
        if !self_closing && !VOID_ELEMENTS.contains(&name.as_str()) {
            open.push((name, index));
        }
    }

    let total = elements.len();
    for (_, index) in open {
        elements[index].end = total;
    }
    elements
}

/// Lists the widgets in `markup` in document order.
///
/// A form field counts as a radio field only when an `.mdc-radio` sits
/// inside it.
pub fn discover(markup: &str) -> Vec<Widget> {
    let elements = elements(markup);
    elements
        .iter()
        .enumerate()
        .filter_map(|(i, el)| {
            let kind = if el.has("mdc-button") {
                WidgetKind::Ripple
            } else if el.has("mdc-text-field") {
                WidgetKind::TextField
            } else if el.has("mdc-form-field")
                && elements[i + 1..el.end].iter().any(|inner| inner.has("mdc-radio"))
            {
                WidgetKind::RadioFormField
            } else if el.has("mdc-data-table") {
                WidgetKind::DataTable
            } else {
                return None;
            };
            Some(Widget {
                kind,
                element_index: i,
                id: el.id.clone(),
            })
        })
        .collect()
}

/// Attaches every widget found in `markup` once. Returns how many.
pub fn attach_all(host: &mut dyn WidgetHost, markup: &str) -> usize {
    let widgets = discover(markup);
    for w in &widgets {
        host.attach(w);
    }
    tracing::debug!("Attached {} widgets", widgets.len());
    widgets.len()
}
