//! Interaction builder.

use super::types::{InteractionRecord, MatchingRules, ProviderState, RequestRecord, ResponseRecord};
use crate::body::BodyValue;
use crate::error::MatcherError;
use crate::extract::extract;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// HTTP method of an expected request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: BTreeMap<String, Vec<String>>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<BodyValue>,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            method: Method::Get,
            path: "/".to_string(),
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Option<BodyValue>,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: 200,
            headers: BTreeMap::new(),
            body: None,
        }
    }
}

/// One expected request/response pair between consumer and provider.
///
/// The `description` and provider state combination should be unique within
/// a contract.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Interaction {
    pub description: String,
    pub provider_states: Vec<ProviderState>,
    pub request: Request,
    pub response: Response,
}

impl Interaction {
    pub fn upon_receiving(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    /// Add a provider state without parameters.
    pub fn given(&mut self, state: impl Into<String>) -> &mut Self {
        self.provider_states.push(ProviderState {
            name: state.into(),
            params: BTreeMap::new(),
        });
        self
    }

    pub fn given_with_params<K, I>(&mut self, state: impl Into<String>, params: I) -> &mut Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, serde_json::Value)>,
    {
        self.provider_states.push(ProviderState {
            name: state.into(),
            params: params.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        });
        self
    }

    pub fn with_request(&mut self, method: Method, path: impl Into<String>) -> &mut Self {
        self.request.method = method;
        self.request.path = path.into();
        self
    }

    /// Append a query parameter value. Repeated names keep every value.
    pub fn query_param(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.request
            .query
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    pub fn request_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.request.headers.insert(name.into(), value.into());
        self
    }

    pub fn request_body(&mut self, body: impl Into<BodyValue>) -> &mut Self {
        self.request.body = Some(body.into());
        self
    }

    pub fn will_respond_with(&mut self, status: u16) -> &mut Self {
        self.response.status = status;
        self
    }

    pub fn response_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.response.headers.insert(name.into(), value.into());
        self
    }

    pub fn response_body(&mut self, body: impl Into<BodyValue>) -> &mut Self {
        self.response.body = Some(body.into());
        self
    }

    /// Serialized form with bodies split into examples and matching rules.
    pub fn to_record(&self) -> Result<InteractionRecord, MatcherError> {
        let (request_body, request_rules) = split_body(self.request.body.as_ref())?;
        let (response_body, response_rules) = split_body(self.response.body.as_ref())?;

        Ok(InteractionRecord {
            description: self.description.clone(),
            provider_states: self.provider_states.clone(),
            request: RequestRecord {
                method: self.request.method.as_str().to_string(),
                path: self.request.path.clone(),
                query: self.request.query.clone(),
                headers: self.request.headers.clone(),
                body: request_body,
                matching_rules: request_rules,
            },
            response: ResponseRecord {
                status: self.response.status,
                headers: self.response.headers.clone(),
                body: response_body,
                matching_rules: response_rules,
            },
        })
    }
}

type SplitBody = (Option<serde_json::Value>, Option<MatchingRules>);

fn split_body(body: Option<&BodyValue>) -> Result<SplitBody, MatcherError> {
    match body {
        None => Ok((None, None)),
        Some(body) => {
            let extracted = extract(body)?;
            Ok((
                Some(extracted.example),
                MatchingRules::from_body(extracted.rules),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::{equal_to, something_like};
    use serde_json::json;

    #[test]
    fn test_builder_chain() {
        let mut interaction = Interaction::upon_receiving("a request for an alligator");
        interaction
            .given_with_params(
                "an alligator with the given name exists",
                [("name", json!("Mary"))],
            )
            .with_request(Method::Get, "/alligators")
            .query_param("max_results", "100")
            .query_param("max_results", "200")
            .request_header("X-Value", "testCode")
            .will_respond_with(201)
            .response_header("Content-Type", "application/json")
            .response_body(BodyValue::object([("name", something_like("Mary"))]));

        assert_eq!(interaction.request.query["max_results"], vec!["100", "200"]);
        assert_eq!(interaction.response.status, 201);
        assert_eq!(interaction.provider_states[0].params["name"], json!("Mary"));
    }

    #[test]
    fn test_record_serialization() {
        let mut interaction = Interaction::upon_receiving("test Encodable Pact");
        interaction
            .given("an alligator exists")
            .with_request(Method::Post, "/")
            .request_body(BodyValue::object([("data", equal_to("2016-07-19"))]))
            .will_respond_with(200);

        let record = interaction.to_record().unwrap();
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "description": "test Encodable Pact",
                "providerStates": [{"name": "an alligator exists"}],
                "request": {
                    "method": "POST",
                    "path": "/",
                    "body": {"data": "2016-07-19"},
                    "matchingRules": {"body": {"$.data": {"matchers": [{"match": "equality"}]}}}
                },
                "response": {"status": 200}
            })
        );
    }

    #[test]
    fn test_method_serializes_uppercase() {
        assert_eq!(serde_json::to_value(Method::Delete).unwrap(), json!("DELETE"));
        assert_eq!(Method::Patch.to_string(), "PATCH");
    }
}
