use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Renders a serialized record value as JSON text, compact or indented.
#[derive(Debug, Clone, Default)]
pub struct JsonRenderer {
    indent: Option<usize>,
}

impl JsonRenderer {
    pub fn compact() -> Self {
        Self { indent: None }
    }

    pub fn pretty() -> Self {
        Self { indent: Some(2) }
    }

    pub fn with_indent(indent: usize) -> Self {
        Self {
            indent: Some(indent),
        }
    }

    pub fn render(&self, value: &Value) -> Result<String, serde_json::Error> {
        match self.indent {
            None => serde_json::to_string(value),
            Some(width) => {
                let indent = vec![b' '; width];
                let mut out = Vec::new();
                let formatter = PrettyFormatter::with_indent(&indent);
                let mut serializer = Serializer::with_formatter(&mut out, formatter);
                value.serialize(&mut serializer)?;
                Ok(String::from_utf8_lossy(&out).into_owned())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compact_renders_one_line() {
        let rendered = JsonRenderer::compact()
            .render(&json!({"message": "ok", "extra_tags": []}))
            .unwrap();

        assert!(!rendered.contains('\n'));
        assert!(rendered.contains(r#""message":"ok""#));
    }

    #[test]
    fn pretty_renders_with_requested_indent() {
        let rendered = JsonRenderer::with_indent(4)
            .render(&json!({"message": "ok"}))
            .unwrap();

        assert!(rendered.contains("\n    \"message\""));
    }

    #[test]
    fn keys_are_rendered_in_sorted_order() {
        let rendered = JsonRenderer::compact()
            .render(&json!({"b": 1, "a": 2}))
            .unwrap();

        assert_eq!(rendered, r#"{"a":2,"b":1}"#);
    }
}
