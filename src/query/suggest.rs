//! Suggesters sent under the `suggest` key

use serde_json::{Map, Value};

/// Kind of suggester
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggesterKind {
    Term,
    Phrase,
    Completion,
}

impl SuggesterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Term => "term",
            Self::Phrase => "phrase",
            Self::Completion => "completion",
        }
    }
}

/// A single named suggester
#[derive(Debug, Clone, PartialEq)]
pub struct Suggester {
    pub name: String,
    pub kind: SuggesterKind,
    pub field: String,
    /// Input text; sent as `prefix` for completion suggesters
    pub text: Option<String>,
    pub size: Option<u32>,
    /// Extra suggester-specific settings
    pub params: Map<String, Value>,
}

impl Suggester {
    pub fn new(name: impl Into<String>, kind: SuggesterKind, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            field: field.into(),
            text: None,
            size: None,
            params: Map::new(),
        }
    }

    pub fn term(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, SuggesterKind::Term, field)
    }

    pub fn phrase(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, SuggesterKind::Phrase, field)
    }

    pub fn completion(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, SuggesterKind::Completion, field)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    fn to_value(&self) -> Value {
        let mut settings = self.params.clone();
        settings.insert("field".to_string(), Value::String(self.field.clone()));
        if let Some(size) = self.size {
            settings.insert("size".to_string(), Value::from(size));
        }

        let mut body = Map::new();
        if let Some(ref text) = self.text {
            let key = match self.kind {
                SuggesterKind::Completion => "prefix",
                _ => "text",
            };
            body.insert(key.to_string(), Value::String(text.clone()));
        }
        body.insert(self.kind.as_str().to_string(), Value::Object(settings));
        Value::Object(body)
    }
}

/// A set of suggesters sharing an optional global text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Suggest {
    text: Option<String>,
    suggesters: Vec<Suggester>,
}

impl Suggest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a single suggester
    pub fn from_suggester(suggester: Suggester) -> Self {
        let mut suggest = Self::new();
        suggest.add_suggester(suggester);
        suggest
    }

    /// Text used by every suggester without its own
    pub fn set_global_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(text.into());
        self
    }

    pub fn add_suggester(&mut self, suggester: Suggester) -> &mut Self {
        self.suggesters.push(suggester);
        self
    }

    pub fn suggesters(&self) -> &[Suggester] {
        &self.suggesters
    }

    pub fn is_empty(&self) -> bool {
        self.suggesters.is_empty()
    }

    pub fn to_value(&self) -> Value {
        let mut body = Map::new();
        if let Some(ref text) = self.text {
            body.insert("text".to_string(), Value::String(text.clone()));
        }
        for suggester in &self.suggesters {
            body.insert(suggester.name.clone(), suggester.to_value());
        }
        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_suggest_serialization() {
        let mut suggest = Suggest::new();
        suggest
            .set_global_text("rsut")
            .add_suggester(Suggester::term("spelling", "title").with_size(3))
            .add_suggester(Suggester::completion("titles", "title.suggest").with_text("ru"));

        assert_eq!(
            suggest.to_value(),
            json!({
                "text": "rsut",
                "spelling": {"term": {"field": "title", "size": 3}},
                "titles": {"prefix": "ru", "completion": {"field": "title.suggest"}}
            })
        );
    }

    #[test]
    fn test_phrase_params() {
        let suggest = Suggest::from_suggester(
            Suggester::phrase("did_you_mean", "body")
                .with_text("noble prize")
                .with_param("gram_size", json!(2)),
        );

        assert_eq!(
            suggest.to_value()["did_you_mean"],
            json!({"text": "noble prize", "phrase": {"field": "body", "gram_size": 2}})
        );
        assert_eq!(suggest.suggesters().len(), 1);
    }
}
