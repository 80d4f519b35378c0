use super::{FILTERED, Filter, FilterDecision, FilterError, Scope, joined_content_type};
use crate::record::{LogRecord, MultiValueMap};
use serde_json::Value;
use std::collections::BTreeMap;

/// Redaction schema walked against a parsed JSON body: a leaf marks the
/// field for redaction, a node recurses into a nested object.
#[derive(Debug, Clone)]
pub enum BodySchema {
    Redact,
    Node(BTreeMap<String, BodySchema>),
}

impl BodySchema {
    pub fn node<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, BodySchema)>,
        S: Into<String>,
    {
        BodySchema::Node(
            fields
                .into_iter()
                .map(|(name, schema)| (name.into(), schema))
                .collect(),
        )
    }

    /// A node marking each named field for redaction.
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::node(names.into_iter().map(|name| (name, BodySchema::Redact)))
    }
}

/// Redacts schema-selected fields inside JSON bodies.
///
/// Only fires when the scoped side's `Content-Type` contains
/// `application/json` and the body is non-empty. Schema keys absent from
/// the body are skipped. A body that fails to parse is left exactly as it
/// was and the failure is surfaced, so a record can never carry a
/// partially redacted re-serialization.
pub struct JsonSchemaRedact {
    schema: BodySchema,
    scope: Scope,
}

impl JsonSchemaRedact {
    pub fn new(schema: BodySchema, scope: Scope) -> Self {
        Self { schema, scope }
    }

    fn redact_side(
        &self,
        body: &mut Option<String>,
        headers: &MultiValueMap,
    ) -> Result<(), FilterError> {
        let Some(text) = body.as_ref().filter(|b| !b.is_empty()) else {
            return Ok(());
        };

        if !joined_content_type(headers).contains("application/json") {
            return Ok(());
        }

        let mut parsed: Value = serde_json::from_str(text)?;
        redact_value(&self.schema, &mut parsed);
        *body = Some(serde_json::to_string(&parsed)?);

        Ok(())
    }
}

impl Filter for JsonSchemaRedact {
    fn apply(&self, record: &mut LogRecord) -> Result<FilterDecision, FilterError> {
        let Some(exchange) = record.exchange_mut() else {
            return Ok(FilterDecision::Keep);
        };

        if self.scope.applies_to_request() {
            self.redact_side(&mut exchange.request_body, &exchange.request_headers)?;
        }

        if self.scope.applies_to_response() {
            self.redact_side(&mut exchange.response_body, &exchange.response_headers)?;
        }

        Ok(FilterDecision::Keep)
    }
}

fn redact_value(schema: &BodySchema, value: &mut Value) {
    match schema {
        // A leaf over an object value redacts the whole subtree.
        BodySchema::Redact => *value = Value::String(FILTERED.to_string()),
        BodySchema::Node(fields) => {
            let Some(object) = value.as_object_mut() else {
                return;
            };
            for (name, nested) in fields {
                if let Some(field) = object.get_mut(name) {
                    redact_value(nested, field);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_record(body: &str) -> LogRecord {
        let mut record = LogRecord::request_response();
        let exchange = record.exchange_mut().unwrap();
        exchange.add_response_header("content-type", "application/json");
        exchange.set_response_body(body);
        record
    }

    fn response_body(record: &LogRecord) -> Value {
        serde_json::from_str(record.exchange().unwrap().response_body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn redacts_matching_keys_only() {
        let filter = JsonSchemaRedact::new(BodySchema::fields(["key"]), Scope::All);
        let mut record = json_record(r#"{"key": "secret", "other": "x"}"#);

        filter.apply(&mut record).unwrap();
        let body = response_body(&record);
        assert_eq!(body["key"], "<filtered>");
        assert_eq!(body["other"], "x");
    }

    #[test]
    fn absent_schema_keys_are_skipped() {
        let filter = JsonSchemaRedact::new(BodySchema::fields(["key"]), Scope::All);
        let mut record = json_record(r#"{"other": "x"}"#);

        filter.apply(&mut record).unwrap();
        assert_eq!(response_body(&record), serde_json::json!({"other": "x"}));
    }

    #[test]
    fn nested_schema_recurses() {
        let schema = BodySchema::node([(
            "user",
            BodySchema::node([("password", BodySchema::Redact)]),
        )]);
        let filter = JsonSchemaRedact::new(schema, Scope::All);
        let mut record =
            json_record(r#"{"user": {"password": "hunter2", "name": "ada"}, "id": 7}"#);

        filter.apply(&mut record).unwrap();
        let body = response_body(&record);
        assert_eq!(body["user"]["password"], "<filtered>");
        assert_eq!(body["user"]["name"], "ada");
        assert_eq!(body["id"], 7);
    }

    #[test]
    fn leaf_over_object_redacts_the_subtree() {
        let filter = JsonSchemaRedact::new(BodySchema::fields(["user"]), Scope::All);
        let mut record = json_record(r#"{"user": {"password": "hunter2"}}"#);

        filter.apply(&mut record).unwrap();
        assert_eq!(response_body(&record)["user"], "<filtered>");
    }

    #[test]
    fn non_json_content_type_never_fires() {
        let filter = JsonSchemaRedact::new(BodySchema::fields(["key"]), Scope::All);
        let mut record = LogRecord::request_response();
        let exchange = record.exchange_mut().unwrap();
        exchange.add_response_header("content-type", "text/plain");
        exchange.set_response_body("key=secret");

        filter.apply(&mut record).unwrap();
        assert_eq!(
            record.exchange().unwrap().response_body.as_deref(),
            Some("key=secret")
        );
    }

    #[test]
    fn malformed_json_fails_closed() {
        let filter = JsonSchemaRedact::new(BodySchema::fields(["key"]), Scope::All);
        let mut record = json_record(r#"{"key": "secret""#);

        assert!(filter.apply(&mut record).is_err());
        // Body is exactly as received, never partially rewritten.
        assert_eq!(
            record.exchange().unwrap().response_body.as_deref(),
            Some(r#"{"key": "secret""#)
        );
    }

    #[test]
    fn scope_limits_which_side_is_parsed() {
        let filter = JsonSchemaRedact::new(BodySchema::fields(["key"]), Scope::ResponseOnly);
        let mut record = LogRecord::request_response();
        let exchange = record.exchange_mut().unwrap();
        exchange.add_request_header("content-type", "application/json");
        exchange.set_request_body(r#"{"key": "secret"}"#);

        filter.apply(&mut record).unwrap();
        assert_eq!(
            record.exchange().unwrap().request_body.as_deref(),
            Some(r#"{"key": "secret"}"#)
        );
    }
}
