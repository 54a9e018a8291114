// src/models/question.rs

use serde::{Deserialize, Deserializer, Serialize};

/// Answer type of a question, as the server names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    TextAnswer,
    LongTextAnswer,
    #[serde(rename = "INT64_ANSWER")]
    Int64Answer,
    FloatAnswer,
    BoolAnswer,
    MultipleChoiceAnswer,
}

impl QuestionType {
    /// Value of the `qn-type` field in the question form.
    pub fn form_code(self) -> &'static str {
        match self {
            QuestionType::TextAnswer => "text",
            QuestionType::LongTextAnswer => "longtext",
            QuestionType::Int64Answer => "int",
            QuestionType::FloatAnswer => "float",
            QuestionType::BoolAnswer => "bool",
            QuestionType::MultipleChoiceAnswer => "mcq",
        }
    }

    pub fn from_form_code(code: &str) -> Option<Self> {
        match code {
            "text" => Some(QuestionType::TextAnswer),
            "longtext" => Some(QuestionType::LongTextAnswer),
            "int" => Some(QuestionType::Int64Answer),
            "float" => Some(QuestionType::FloatAnswer),
            "bool" => Some(QuestionType::BoolAnswer),
            "mcq" => Some(QuestionType::MultipleChoiceAnswer),
            _ => None,
        }
    }

    /// Parses the wire name (`TEXT_ANSWER`, ...).
    pub fn from_wire(name: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(name.to_string())).ok()
    }
}

/// One option of a multiple choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    #[serde(default)]
    pub html_body: String,
}

/// A question as returned by `GET /api/quizmaster/question/{id}`.
///
/// Ids come as JSON strings (`"13"`) from the server's proto encoder; plain
/// numbers are accepted too. `type` is kept raw so an unknown type can be
/// reported instead of failing the whole load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(deserialize_with = "de_id")]
    pub id: i64,
    #[serde(deserialize_with = "de_id")]
    pub quiz_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub html_body: String,
    #[serde(rename = "type", default)]
    pub question_type: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl Question {
    pub fn kind(&self) -> Option<QuestionType> {
        QuestionType::from_wire(&self.question_type)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Num(i64),
    Text(String),
}

/// Accepts an id encoded either as a JSON number or a numeric string.
pub fn de_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawId::deserialize(deserializer)? {
        RawId::Num(n) => Ok(n),
        RawId::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// An id returned as the whole body of a create / submit call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewId(pub i64);

impl<'de> Deserialize<'de> for NewId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        de_id(deserializer).map(NewId)
    }
}
