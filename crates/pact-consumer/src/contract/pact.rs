//! Consumer/provider contract container.

use super::interaction::Interaction;
use super::types::{Metadata, PactDocument, Pacticipant};
use crate::error::{MatcherError, MockServiceError};

/// Ordered interactions between one consumer and one provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Pact {
    consumer: String,
    provider: String,
    interactions: Vec<Interaction>,
}

impl Pact {
    pub fn new(consumer: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            consumer: consumer.into(),
            provider: provider.into(),
            interactions: Vec::new(),
        }
    }

    pub fn consumer(&self) -> &str {
        &self.consumer
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Append an interaction and return a handle to keep describing it.
    pub fn add_interaction(&mut self, interaction: Interaction) -> &mut Interaction {
        self.interactions.push(interaction);
        let last = self.interactions.len() - 1;
        &mut self.interactions[last]
    }

    /// Build the wire document. Fails on the first malformed matcher.
    pub fn to_document(&self) -> Result<PactDocument, MatcherError> {
        self.document_for(&self.interactions)
    }

    /// Build a document holding only `interactions`, under this pact's names.
    pub(crate) fn document_for(
        &self,
        interactions: &[Interaction],
    ) -> Result<PactDocument, MatcherError> {
        let interactions = interactions
            .iter()
            .map(Interaction::to_record)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PactDocument {
            consumer: Pacticipant {
                name: self.consumer.clone(),
            },
            provider: Pacticipant {
                name: self.provider.clone(),
            },
            interactions,
            metadata: Metadata::default(),
        })
    }

    /// Pretty-printed JSON. Output is byte-for-byte stable for equal pacts.
    pub fn serialize(&self) -> Result<Vec<u8>, MockServiceError> {
        let document = self.to_document()?;
        Ok(serde_json::to_vec_pretty(&document)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyValue;
    use crate::contract::{Method, PactDocument};
    use crate::matchers::{
        each_like, each_like_range, includes_like, includes_like_with, regex_like, something_like,
        Combine,
    };
    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    fn test_pact(body: BodyValue) -> Pact {
        let mut pact = Pact::new("test-consumer", "test-provider");
        pact.add_interaction(Interaction::upon_receiving("test Encodable Pact"))
            .given_with_params(
                "an alligator with the given name exists",
                [("name", json!("Mary"))],
            )
            .with_request(Method::Get, "/")
            .query_param("max_results", "100")
            .request_header("Content-Type", "application/json; charset=UTF-8")
            .request_body(body)
            .will_respond_with(200);
        pact
    }

    fn request_rules(pact: &Pact, path: &str) -> serde_json::Value {
        let bytes = pact.serialize().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        value["interactions"][0]["request"]["matchingRules"]["body"][path].clone()
    }

    #[test]
    fn test_sets_each_like_min_max() {
        let template = BodyValue::object([
            ("dob", something_like("2016-07-19")),
            ("id", something_like("1600309982")),
            ("name", something_like("FVsWAGZTFGPLhWjLuBOd")),
        ]);
        let pact = test_pact(BodyValue::object([(
            "data",
            BodyValue::object([("array1", each_like_range(template, 1, Some(5)).unwrap())]),
        )]));

        assert_json_eq!(
            request_rules(&pact, "$.data.array1"),
            json!({"matchers": [{"match": "type", "min": 1, "max": 5}]})
        );
        assert_json_eq!(
            request_rules(&pact, "$.data.array1[*].dob"),
            json!({"matchers": [{"match": "type"}]})
        );
    }

    #[test]
    fn test_sets_includes_like_or() {
        let pact = test_pact(BodyValue::object([(
            "data",
            includes_like_with(["2020-12-31", "2019-12-31"], Combine::Or),
        )]));
        let rules = request_rules(&pact, "$.data");
        assert_eq!(rules["combine"], json!("OR"));
        assert_eq!(rules["matchers"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_round_trip() {
        let pact = test_pact(BodyValue::object([
            ("data", BodyValue::from(each_like(something_like(1)))),
            (
                "date",
                BodyValue::from(regex_like("2020-12-31", r"\d{4}-\d{2}-\d{2}")),
            ),
        ]));
        let document = pact.to_document().unwrap();
        let bytes = pact.serialize().unwrap();
        let decoded: PactDocument = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, document);
        assert_eq!(
            decoded.interactions[0].request.body,
            Some(json!({"data": [1], "date": "2020-12-31"}))
        );
    }

    #[test]
    fn test_serialize_is_deterministic() {
        let body = BodyValue::object([
            ("b", BodyValue::from(something_like("x"))),
            ("a", BodyValue::from(includes_like(["y", "z"]))),
        ]);
        let first = test_pact(body.clone()).serialize().unwrap();
        let second = test_pact(body).serialize().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_serialize_propagates_matcher_errors() {
        let pact = test_pact(BodyValue::object([("bad", regex_like("x", "("))]));
        assert!(matches!(
            pact.serialize(),
            Err(MockServiceError::MalformedMatcherConfig(_))
        ));
    }

    #[test]
    fn test_document_layout() {
        let pact = test_pact(BodyValue::object([("data", something_like("2016-07-19"))]));
        let value = serde_json::to_value(pact.to_document().unwrap()).unwrap();
        assert_eq!(value["consumer"], json!({"name": "test-consumer"}));
        assert_eq!(value["provider"], json!({"name": "test-provider"}));
        assert_eq!(
            value["interactions"][0]["request"]["query"],
            json!({"max_results": ["100"]})
        );
        assert_eq!(
            value["metadata"]["pactSpecification"]["version"],
            json!("3.0.0")
        );
    }
}
