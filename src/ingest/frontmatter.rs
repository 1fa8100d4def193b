//! Front matter parsing for source documents.
//!
//! ```text
//! ---
//! stage: 초등학교
//! grade: 1-2학년
//! genre: [일기, 생활문]
//! ---
//! body text...
//! ```

use std::collections::BTreeMap;

use serde_yaml::Value;

use super::error::{IngestError, IngestResult};
use crate::store::FieldValue;

/// Line that opens and closes the front matter block.
pub const FRONT_MATTER_MARKER: &str = "---";

/// One front matter value: plain text or a list of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Text(String),
    List(Vec<String>),
}

impl MetaValue {
    /// Text form; lists are joined with `,`.
    pub fn as_text(&self) -> String {
        match self {
            MetaValue::Text(s) => s.clone(),
            MetaValue::List(items) => items.join(","),
        }
    }
}

impl From<MetaValue> for FieldValue {
    fn from(value: MetaValue) -> Self {
        match value {
            MetaValue::Text(s) => FieldValue::String(s),
            MetaValue::List(items) => FieldValue::from(items),
        }
    }
}

/// A parsed source file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceDocument {
    pub metadata: BTreeMap<String, MetaValue>,
    pub body: String,
}

impl SourceDocument {
    /// Non-empty text of a metadata field.
    pub fn meta_text(&self, key: &str) -> Option<String> {
        self.metadata
            .get(key)
            .map(MetaValue::as_text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

/// Splits and parses a source file.
///
/// Without an opening marker on the very first line the whole file is the body.
pub fn parse_source(text: &str) -> IngestResult<SourceDocument> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok(SourceDocument::default());
    };
    if !is_marker(first) {
        return Ok(SourceDocument {
            metadata: BTreeMap::new(),
            body: text.trim().to_string(),
        });
    }

    let mut yaml = String::new();
    let mut consumed = first.len();
    let mut closed = false;
    for line in lines {
        consumed += line.len();
        if is_marker(line) {
            closed = true;
            break;
        }
        yaml.push_str(line);
    }
    if !closed {
        return Err(IngestError::UnterminatedFrontMatter);
    }

    Ok(SourceDocument {
        metadata: parse_metadata(&yaml)?,
        body: text[consumed..].trim().to_string(),
    })
}

fn is_marker(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']).trim_end() == FRONT_MATTER_MARKER
}

fn parse_metadata(yaml: &str) -> IngestResult<BTreeMap<String, MetaValue>> {
    if yaml.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let mapping = match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(mapping) => mapping,
        Value::Null => return Ok(BTreeMap::new()),
        _ => return Err(IngestError::NotAMapping),
    };

    let mut metadata = BTreeMap::new();
    for (key, value) in mapping {
        let key = scalar_text(&key).ok_or(IngestError::NotAMapping)?;
        let value = match value {
            Value::Null => continue,
            Value::Sequence(items) => MetaValue::List(
                items
                    .iter()
                    .map(|item| {
                        scalar_text(item).ok_or_else(|| IngestError::UnsupportedValue {
                            key: key.clone(),
                        })
                    })
                    .collect::<IngestResult<Vec<_>>>()?,
            ),
            other => MetaValue::Text(
                scalar_text(&other)
                    .ok_or_else(|| IngestError::UnsupportedValue { key: key.clone() })?,
            ),
        };
        metadata.insert(key, value);
    }
    Ok(metadata)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}
