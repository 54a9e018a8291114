// src/models/answer.rs

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::models::form::FormData;

static INPUT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<input\b([^>]*)>").expect("valid input regex"));

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("valid attribute regex")
});

/// What kind of scoring input an element is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    /// A radio button of a score group (`ans-<id>-score`).
    Choice { checked: bool },
    /// A free-text custom score (`ans-<id>-custom-score`).
    Text,
}

/// One `<input>` of the scoring form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreInput {
    pub id: String,
    pub name: String,
    pub value: String,
    pub kind: InputKind,
}

/// The scoring inputs of a rendered answer listing, in document order.
///
/// Rebuilt from scratch every time the server re-renders the listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreInputs {
    inputs: Vec<ScoreInput>,
}

impl ScoreInputs {
    pub fn new(inputs: Vec<ScoreInput>) -> Self {
        Self { inputs }
    }

    /// Collects radio and text inputs from an HTML fragment.
    ///
    /// Inputs without an id cannot be addressed and are dropped; other input
    /// types (hidden, submit, ...) are ignored.
    pub fn from_fragment(html: &str) -> Self {
        let mut inputs = Vec::new();
        for tag in INPUT_TAG.captures_iter(html) {
            let attrs = parse_attributes(&tag[1]);
            let lookup = |key: &str| {
                attrs
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(key))
                    .map(|(_, v)| v.clone())
            };
            let Some(id) = lookup("id") else {
                continue;
            };
            let input_type = lookup("type").unwrap_or_else(|| "text".to_string());
            let kind = match input_type.to_ascii_lowercase().as_str() {
                "radio" | "checkbox" => InputKind::Choice {
                    checked: lookup("checked").is_some(),
                },
                "text" | "number" => InputKind::Text,
                _ => continue,
            };
            inputs.push(ScoreInput {
                name: lookup("name").unwrap_or_else(|| id.clone()),
                value: lookup("value").unwrap_or_default(),
                id,
                kind,
            });
        }
        Self { inputs }
    }

    pub fn get(&self, id: &str) -> Option<&ScoreInput> {
        self.inputs.iter().find(|i| i.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoreInput> {
        self.inputs.iter()
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Selects the choice input with `id`, clearing the rest of its group.
    /// Returns false when there is no such choice.
    pub fn check(&mut self, id: &str) -> bool {
        let Some(group) = self
            .inputs
            .iter()
            .find(|i| i.id == id && matches!(i.kind, InputKind::Choice { .. }))
            .map(|i| i.name.clone())
        else {
            return false;
        };
        for input in self.inputs.iter_mut().filter(|i| i.name == group) {
            if let InputKind::Choice { checked } = &mut input.kind {
                *checked = input.id == id;
            }
        }
        true
    }

    /// Sets the value of the text input with `id`.
    pub fn set_text(&mut self, id: &str, value: &str) -> bool {
        match self
            .inputs
            .iter_mut()
            .find(|i| i.id == id && i.kind == InputKind::Text)
        {
            Some(input) => {
                input.value = value.to_string();
                true
            }
            None => false,
        }
    }

    /// Id of the selected choice in group `name`.
    pub fn checked_in(&self, name: &str) -> Option<&str> {
        self.inputs
            .iter()
            .find(|i| i.name == name && i.kind == InputKind::Choice { checked: true })
            .map(|i| i.id.as_str())
    }

    /// What submitting the scoring form would send: every text input and the
    /// checked choices.
    pub fn to_form(&self) -> FormData {
        self.inputs
            .iter()
            .filter(|i| !matches!(i.kind, InputKind::Choice { checked: false }))
            .map(|i| (i.name.clone(), i.value.clone()))
            .collect()
    }
}

impl ScoreInputs {
    /// Rewrites the `<input>` tags of `html` to show the current state:
    /// `checked` follows each choice, `value` follows each text input.
    /// Tags with no matching input are left as they are.
    pub fn project(&self, html: &str) -> String {
        INPUT_TAG
            .replace_all(html, |caps: &Captures| {
                let attrs = parse_attributes(&caps[1]);
                let input = attrs
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case("id"))
                    .and_then(|(_, id)| self.get(id));
                match input {
                    Some(input) => render_input(&attrs, input),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

fn render_input(attrs: &[(String, String)], input: &ScoreInput) -> String {
    let mut tag = String::from("<input");
    for (key, value) in attrs {
        let replaced = key.eq_ignore_ascii_case("checked")
            || (input.kind == InputKind::Text && key.eq_ignore_ascii_case("value"));
        if !replaced {
            tag.push_str(&format!(" {}=\"{}\"", key, encode_entities(value)));
        }
    }
    match input.kind {
        InputKind::Text => {
            tag.push_str(&format!(" value=\"{}\"", encode_entities(&input.value)));
        }
        InputKind::Choice { checked: true } => tag.push_str(" checked"),
        InputKind::Choice { checked: false } => {}
    }
    tag.push('>');
    tag
}

fn encode_entities(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn parse_attributes(raw: &str) -> Vec<(String, String)> {
    ATTRIBUTE
        .captures_iter(raw)
        .map(|c| {
            let value = c
                .get(2)
                .or_else(|| c.get(3))
                .or_else(|| c.get(4))
                .map(|m| decode_entities(m.as_str()))
                .unwrap_or_default();
            (c[1].to_string(), value)
        })
        .collect()
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#34;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
