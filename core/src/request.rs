//! Request descriptions consumed by the pipeline.
//!
//! A `RequestSpec` is immutable once built. `RequestSpecBuilder::build`
//! checks that every `:name` placeholder in the endpoint template has a
//! matching path parameter, so a spec that exists can always be resolved
//! into a URL without leftover placeholders.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::SpecError;
use crate::http::HttpMethod;

/// How the pipeline decodes a successful response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseKind {
    #[default]
    Json,
    Blob,
    Text,
}

/// A request body before serialization.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    /// Opaque payload (e.g. multipart form data) sent as-is.
    Form {
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

impl RequestBody {
    pub fn is_form(&self) -> bool {
        matches!(self, RequestBody::Form { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    endpoint: String,
    method: HttpMethod,
    path_params: BTreeMap<String, String>,
    query_params: Vec<(String, String)>,
    body: Option<RequestBody>,
    requires_auth: bool,
    response_kind: ResponseKind,
}

impl RequestSpec {
    pub fn builder(method: HttpMethod, endpoint: impl Into<String>) -> RequestSpecBuilder {
        RequestSpecBuilder {
            spec: RequestSpec {
                endpoint: endpoint.into(),
                method,
                path_params: BTreeMap::new(),
                query_params: Vec::new(),
                body: None,
                requires_auth: true,
                response_kind: ResponseKind::Json,
            },
            error: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> RequestSpecBuilder {
        Self::builder(HttpMethod::Get, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> RequestSpecBuilder {
        Self::builder(HttpMethod::Post, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> RequestSpecBuilder {
        Self::builder(HttpMethod::Put, endpoint)
    }

    pub fn patch(endpoint: impl Into<String>) -> RequestSpecBuilder {
        Self::builder(HttpMethod::Patch, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> RequestSpecBuilder {
        Self::builder(HttpMethod::Delete, endpoint)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path_params(&self) -> &BTreeMap<String, String> {
        &self.path_params
    }

    /// Query entries in insertion order. Absent and empty values were
    /// dropped when the builder received them.
    pub fn query_params(&self) -> &[(String, String)] {
        &self.query_params
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    pub fn response_kind(&self) -> ResponseKind {
        self.response_kind
    }
}

#[derive(Debug)]
pub struct RequestSpecBuilder {
    spec: RequestSpec,
    error: Option<SpecError>,
}

impl RequestSpecBuilder {
    pub fn path_param(mut self, name: &str, value: impl fmt::Display) -> Self {
        self.spec.path_params.insert(name.to_string(), value.to_string());
        self
    }

    /// Adds or replaces a query entry. Empty strings are omitted.
    pub fn query(mut self, name: &str, value: impl fmt::Display) -> Self {
        let value = value.to_string();
        self.spec.query_params.retain(|(k, _)| k != name);
        if !value.is_empty() {
            self.spec.query_params.push((name.to_string(), value));
        }
        self
    }

    /// Adds a query entry only when `value` is present.
    pub fn query_opt<V: fmt::Display>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(name, value),
            None => self,
        }
    }

    /// Flattens a serializable filter object into query entries. `null`
    /// fields are omitted; strings are used unquoted; numbers and booleans
    /// use their JSON text form.
    pub fn query_object<T: Serialize + ?Sized>(mut self, filters: &T) -> Self {
        match serde_json::to_value(filters) {
            Ok(Value::Object(map)) => {
                for (name, value) in map {
                    if let Some(text) = query_text(&value) {
                        self = self.query(&name, text);
                    }
                }
                self
            }
            Ok(Value::Null) => self,
            Ok(other) => {
                let err = <serde_json::Error as serde::ser::Error>::custom(format!(
                    "query filters must be an object, got {other}"
                ));
                self.error.get_or_insert(SpecError::Body(err));
                self
            }
            Err(err) => {
                self.error.get_or_insert(SpecError::Body(err));
                self
            }
        }
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => self.spec.body = Some(RequestBody::Json(value)),
            Err(err) => {
                self.error.get_or_insert(SpecError::Body(err));
            }
        }
        self
    }

    pub fn form(mut self, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        self.spec.body = Some(RequestBody::Form {
            content_type,
            bytes,
        });
        self
    }

    pub fn requires_auth(mut self, requires_auth: bool) -> Self {
        self.spec.requires_auth = requires_auth;
        self
    }

    pub fn response_kind(mut self, kind: ResponseKind) -> Self {
        self.spec.response_kind = kind;
        self
    }

    pub fn build(self) -> Result<RequestSpec, SpecError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        for segment in parse_template(&self.spec.endpoint) {
            if let Segment::Placeholder(name) = segment {
                if !self.spec.path_params.contains_key(name) {
                    return Err(SpecError::MissingPathParam {
                        endpoint: self.spec.endpoint.clone(),
                        name: name.to_string(),
                    });
                }
            }
        }
        Ok(self.spec)
    }
}

fn query_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

/// Splits an endpoint template into literal text and `:name` placeholders.
/// A `:` not followed by a name character stays literal.
pub(crate) fn parse_template(template: &str) -> Vec<Segment<'_>> {
    let bytes = template.as_bytes();
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b':' {
            let name_start = i + 1;
            let mut end = name_start;
            while end < bytes.len() && is_name_byte(bytes[end]) {
                end += 1;
            }
            if end > name_start {
                if literal_start < i {
                    segments.push(Segment::Literal(&template[literal_start..i]));
                }
                segments.push(Segment::Placeholder(&template[name_start..end]));
                literal_start = end;
                i = end;
                continue;
            }
        }
        i += 1;
    }
    if literal_start < template.len() {
        segments.push(Segment::Literal(&template[literal_start..]));
    }
    segments
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn template_segments() {
        assert_eq!(
            parse_template("/users/:id/toggle-status"),
            vec![
                Segment::Literal("/users/"),
                Segment::Placeholder("id"),
                Segment::Literal("/toggle-status"),
            ]
        );
    }

    #[test]
    fn bare_colon_is_literal() {
        assert_eq!(
            parse_template("/time/12:/x"),
            vec![Segment::Literal("/time/12:/x")]
        );
    }

    #[test]
    fn adjacent_placeholders() {
        assert_eq!(
            parse_template("/:a/:b_2"),
            vec![
                Segment::Literal("/"),
                Segment::Placeholder("a"),
                Segment::Literal("/"),
                Segment::Placeholder("b_2"),
            ]
        );
    }

    #[test]
    fn build_rejects_missing_path_param() {
        let err = RequestSpec::get("/hr/applications/:id/notes").build().unwrap_err();
        match err {
            SpecError::MissingPathParam { name, .. } => assert_eq!(name, "id"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn build_accepts_extra_path_params() {
        let spec = RequestSpec::get("/users")
            .path_param("id", 7)
            .build()
            .unwrap();
        assert_eq!(spec.path_params().get("id").map(String::as_str), Some("7"));
    }

    #[test]
    fn defaults() {
        let spec = RequestSpec::get("/dashboard/stats").build().unwrap();
        assert!(spec.requires_auth());
        assert_eq!(spec.response_kind(), ResponseKind::Json);
        assert!(spec.body().is_none());
        assert!(spec.query_params().is_empty());
    }

    #[test]
    fn query_skips_absent_and_empty_values() {
        let spec = RequestSpec::get("/registrations")
            .query_opt("search", None::<&str>)
            .query("role", "")
            .query("page", 2)
            .build()
            .unwrap();
        assert_eq!(spec.query_params(), &[("page".to_string(), "2".to_string())]);
    }

    #[test]
    fn query_replaces_same_key() {
        let spec = RequestSpec::get("/hr/interviews")
            .query("status", "upcoming")
            .query("status", "past")
            .build()
            .unwrap();
        assert_eq!(
            spec.query_params(),
            &[("status".to_string(), "past".to_string())]
        );
    }

    #[test]
    fn query_object_flattens_fields() {
        let spec = RequestSpec::get("/internships")
            .query_object(&json!({ "status": "Posted", "workMode": null, "unreadOnly": false }))
            .build()
            .unwrap();
        let params = spec.query_params();
        assert!(params.contains(&("status".to_string(), "Posted".to_string())));
        assert!(params.contains(&("unreadOnly".to_string(), "false".to_string())));
        assert!(!params.iter().any(|(k, _)| k == "workMode"));
    }

    #[test]
    fn query_object_rejects_non_object() {
        let err = RequestSpec::get("/internships")
            .query_object(&json!([1, 2]))
            .build()
            .unwrap_err();
        assert!(matches!(err, SpecError::Body(_)));
    }

    #[test]
    fn json_body_is_captured() {
        let spec = RequestSpec::patch("/users/:id/toggle-status")
            .path_param("id", 3)
            .json(&json!({ "isEnabled": true }))
            .build()
            .unwrap();
        assert_eq!(
            spec.body(),
            Some(&RequestBody::Json(json!({ "isEnabled": true })))
        );
    }
}
