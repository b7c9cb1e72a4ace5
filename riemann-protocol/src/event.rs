//! Typed wrapper over the schema event.
//!
//! Every schema field has a getter and a setter. Two fields behave
//! differently from a plain assignment:
//!
//! - `tags`: [`Event::set_tags`] appends to the existing sequence. Assigning
//!   `["a"]` then `["b"]` yields `["a", "b"]`. Use [`Event::replace_tags`] to
//!   overwrite.
//! - `attributes`: [`Event::set_attributes`] takes a mapping and stringifies
//!   every value into an attribute record.
//!
//! The event metric is stored in the schema's `metric_f` field; [`Event::metric`]
//! and [`Event::set_metric`] read and write it.

use crate::error::{json_type_name, ProtocolError};
use crate::proto;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt::Display;

/// A monitoring event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    inner: proto::Event,
    /// Caller-supplied parameters with no schema field. Never serialized.
    extra: BTreeMap<String, Value>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a schema event.
    pub fn from_proto(inner: proto::Event) -> Self {
        Self {
            inner,
            extra: BTreeMap::new(),
        }
    }

    /// Builds an event from a parameter object such as
    /// `{"service": "cpu", "metric": 0.5, "tags": ["prod"]}`.
    ///
    /// Known keys go through the matching setter. Unknown keys are kept in
    /// [`Event::extra`] and are not part of the serialized event. `null`
    /// values leave the field unset.
    pub fn from_params(params: &Value) -> Result<Self, ProtocolError> {
        let map = params
            .as_object()
            .ok_or_else(|| ProtocolError::InvalidParams(json_type_name(params)))?;

        let mut event = Self::new();
        for (key, value) in map {
            event.set_param(key, value)?;
        }
        Ok(event)
    }

    fn set_param(&mut self, key: &str, value: &Value) -> Result<(), ProtocolError> {
        if value.is_null() {
            return Ok(());
        }

        match key {
            "service" => self.set_service(expect_str("service", value)?),
            "state" => self.set_state(expect_str("state", value)?),
            "host" => self.set_host(expect_str("host", value)?),
            "description" => self.set_description(expect_str("description", value)?),
            "metric" | "metric_f" => self.set_metric(expect_f64("metric", value)? as f32),
            "metric_d" => self.set_metric_d(expect_f64("metric_d", value)?),
            "metric_sint64" => self.set_metric_sint64(expect_i64("metric_sint64", value)?),
            "time" => self.set_time(expect_i64("time", value)?),
            "time_micros" => self.set_time_micros(expect_i64("time_micros", value)?),
            "ttl" => self.set_ttl(expect_f64("ttl", value)? as f32),
            "tags" => {
                let tags = value.as_array().ok_or(ProtocolError::InvalidField {
                    field: "tags",
                    expected: "array of strings",
                })?;
                let tags = tags
                    .iter()
                    .map(|t| {
                        t.as_str().map(str::to_string).ok_or(ProtocolError::InvalidField {
                            field: "tags",
                            expected: "array of strings",
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                self.set_tags(tags);
            }
            "attributes" => self.set_attributes_json(value)?,
            _ => {
                self.extra.insert(key.to_string(), value.clone());
            }
        }
        Ok(())
    }

    pub fn service(&self) -> Option<&str> {
        self.inner.service.as_deref()
    }

    pub fn set_service(&mut self, service: impl Into<String>) {
        self.inner.service = Some(service.into());
    }

    pub fn state(&self) -> Option<&str> {
        self.inner.state.as_deref()
    }

    pub fn set_state(&mut self, state: impl Into<String>) {
        self.inner.state = Some(state.into());
    }

    pub fn host(&self) -> Option<&str> {
        self.inner.host.as_deref()
    }

    pub fn set_host(&mut self, host: impl Into<String>) {
        self.inner.host = Some(host.into());
    }

    pub fn description(&self) -> Option<&str> {
        self.inner.description.as_deref()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.inner.description = Some(description.into());
    }

    /// The event metric (schema field `metric_f`).
    pub fn metric(&self) -> Option<f32> {
        self.inner.metric_f
    }

    /// Sets the event metric (schema field `metric_f`).
    pub fn set_metric(&mut self, metric: f32) {
        self.inner.metric_f = Some(metric);
    }

    pub fn metric_d(&self) -> Option<f64> {
        self.inner.metric_d
    }

    pub fn set_metric_d(&mut self, metric: f64) {
        self.inner.metric_d = Some(metric);
    }

    pub fn metric_sint64(&self) -> Option<i64> {
        self.inner.metric_sint64
    }

    pub fn set_metric_sint64(&mut self, metric: i64) {
        self.inner.metric_sint64 = Some(metric);
    }

    /// Event time in seconds since the Unix epoch.
    pub fn time(&self) -> Option<i64> {
        self.inner.time
    }

    pub fn set_time(&mut self, time: i64) {
        self.inner.time = Some(time);
    }

    /// Event time in microseconds since the Unix epoch.
    pub fn time_micros(&self) -> Option<i64> {
        self.inner.time_micros
    }

    pub fn set_time_micros(&mut self, time_micros: i64) {
        self.inner.time_micros = Some(time_micros);
    }

    /// Seconds the event stays valid in the server index.
    pub fn ttl(&self) -> Option<f32> {
        self.inner.ttl
    }

    pub fn set_ttl(&mut self, ttl: f32) {
        self.inner.ttl = Some(ttl);
    }

    pub fn tags(&self) -> &[String] {
        &self.inner.tags
    }

    /// Appends tags to the existing sequence.
    pub fn set_tags<I, T>(&mut self, tags: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.inner.tags.extend(tags.into_iter().map(Into::into));
    }

    /// Replaces the tag sequence.
    pub fn replace_tags<I, T>(&mut self, tags: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.inner.tags.clear();
        self.set_tags(tags);
    }

    pub fn attributes(&self) -> &[proto::Attribute] {
        &self.inner.attributes
    }

    /// Returns the value of the first attribute named `key`.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.inner
            .attributes
            .iter()
            .find(|a| a.key == key)
            .and_then(|a| a.value.as_deref())
    }

    /// Adds one attribute record per mapping entry, stringifying each value.
    ///
    /// Records are appended in iteration order; existing records are kept.
    pub fn set_attributes<I, K, V>(&mut self, attributes: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Display,
    {
        for (key, value) in attributes {
            self.inner.attributes.push(proto::Attribute {
                key: key.into(),
                value: Some(value.to_string()),
            });
        }
    }

    /// Adds attribute records from a JSON object.
    ///
    /// String values are copied as-is; any other value is stored as its JSON
    /// text (`1` becomes `"1"`, `true` becomes `"true"`). Fails when `value`
    /// is not an object.
    pub fn set_attributes_json(&mut self, value: &Value) -> Result<(), ProtocolError> {
        let map = value
            .as_object()
            .ok_or_else(|| ProtocolError::InvalidAttributes(json_type_name(value)))?;

        self.set_attributes(map.iter().map(|(k, v)| {
            let v = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.as_str(), v)
        }));
        Ok(())
    }

    /// Returns a caller-supplied parameter that has no schema field.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Stores a value outside the schema. It is not serialized.
    pub fn set_extra(&mut self, key: impl Into<String>, value: Value) {
        self.extra.insert(key.into(), value);
    }

    pub fn as_proto(&self) -> &proto::Event {
        &self.inner
    }

    pub fn into_proto(self) -> proto::Event {
        self.inner
    }

    /// Renders the schema fields that are set as a JSON object.
    pub fn to_json(&self) -> Value {
        let e = &self.inner;
        let mut out = Map::new();

        if let Some(ref v) = e.host {
            out.insert("host".into(), json!(v));
        }
        if let Some(ref v) = e.service {
            out.insert("service".into(), json!(v));
        }
        if let Some(ref v) = e.state {
            out.insert("state".into(), json!(v));
        }
        if let Some(ref v) = e.description {
            out.insert("description".into(), json!(v));
        }
        if let Some(v) = e.metric_f {
            out.insert("metric".into(), json!(v));
        }
        if let Some(v) = e.metric_d {
            out.insert("metric_d".into(), json!(v));
        }
        if let Some(v) = e.metric_sint64 {
            out.insert("metric_sint64".into(), json!(v));
        }
        if let Some(v) = e.time {
            out.insert("time".into(), json!(v));
        }
        if let Some(v) = e.time_micros {
            out.insert("time_micros".into(), json!(v));
        }
        if let Some(v) = e.ttl {
            out.insert("ttl".into(), json!(v));
        }
        if !e.tags.is_empty() {
            out.insert("tags".into(), json!(e.tags));
        }
        if !e.attributes.is_empty() {
            let attrs: Map<String, Value> = e
                .attributes
                .iter()
                .map(|a| (a.key.clone(), json!(a.value.as_deref().unwrap_or(""))))
                .collect();
            out.insert("attributes".into(), Value::Object(attrs));
        }

        Value::Object(out)
    }
}

impl From<proto::Event> for Event {
    fn from(inner: proto::Event) -> Self {
        Self::from_proto(inner)
    }
}

impl From<Event> for proto::Event {
    fn from(event: Event) -> Self {
        event.inner
    }
}

fn expect_str<'a>(field: &'static str, value: &'a Value) -> Result<&'a str, ProtocolError> {
    value.as_str().ok_or(ProtocolError::InvalidField {
        field,
        expected: "string",
    })
}

fn expect_f64(field: &'static str, value: &Value) -> Result<f64, ProtocolError> {
    value.as_f64().ok_or(ProtocolError::InvalidField {
        field,
        expected: "number",
    })
}

fn expect_i64(field: &'static str, value: &Value) -> Result<i64, ProtocolError> {
    value.as_i64().ok_or(ProtocolError::InvalidField {
        field,
        expected: "integer",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_is_metric_f() {
        let mut event = Event::new();
        event.set_metric(2.5);

        assert_eq!(event.metric(), Some(2.5));
        assert_eq!(event.as_proto().metric_f, Some(2.5));
        assert_eq!(event.as_proto().metric_d, None);

        let event = Event::from_proto(proto::Event {
            metric_f: Some(7.0),
            ..Default::default()
        });
        assert_eq!(event.metric(), Some(7.0));
    }

    #[test]
    fn test_tags_accumulate() {
        let mut event = Event::new();
        event.set_tags(["a"]);
        event.set_tags(["b"]);
        assert_eq!(event.tags(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_replace_tags() {
        let mut event = Event::new();
        event.set_tags(["a", "b"]);
        event.replace_tags(["c"]);
        assert_eq!(event.tags(), &["c".to_string()]);
    }

    #[test]
    fn test_attributes_are_stringified() {
        let mut event = Event::new();
        event
            .set_attributes_json(&json!({"x": 1, "y": "s"}))
            .unwrap();

        assert_eq!(event.attributes().len(), 2);
        assert_eq!(event.attribute("x"), Some("1"));
        assert_eq!(event.attribute("y"), Some("s"));
    }

    #[test]
    fn test_set_attributes_display_values() {
        let mut event = Event::new();
        event.set_attributes([("count", 3)]);
        event.set_attributes([("ratio", 0.5)]);

        assert_eq!(event.attribute("count"), Some("3"));
        assert_eq!(event.attribute("ratio"), Some("0.5"));
    }

    #[test]
    fn test_attributes_reject_non_mapping() {
        let mut event = Event::new();
        let err = event.set_attributes_json(&json!(["x", 1])).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidAttributes("array")));
        assert!(event.attributes().is_empty());
    }

    #[test]
    fn test_from_params() {
        let event = Event::from_params(&json!({
            "host": "web-1",
            "service": "cpu",
            "metric": 0.25,
            "state": "ok",
            "description": "load",
            "ttl": 60,
            "time": 1700000000,
            "tags": ["prod", "linux"],
            "attributes": {"cores": 8, "arch": "x86_64"},
        }))
        .unwrap();

        assert_eq!(event.host(), Some("web-1"));
        assert_eq!(event.service(), Some("cpu"));
        assert_eq!(event.metric(), Some(0.25));
        assert_eq!(event.state(), Some("ok"));
        assert_eq!(event.description(), Some("load"));
        assert_eq!(event.ttl(), Some(60.0));
        assert_eq!(event.time(), Some(1700000000));
        assert_eq!(event.tags(), &["prod".to_string(), "linux".to_string()]);
        assert_eq!(event.attribute("cores"), Some("8"));
        assert_eq!(event.attribute("arch"), Some("x86_64"));
    }

    #[test]
    fn test_from_params_unknown_keys_are_local() {
        let event = Event::from_params(&json!({
            "service": "disk",
            "owner": "ops",
        }))
        .unwrap();

        assert_eq!(event.extra("owner"), Some(&json!("ops")));

        // Not carried into the schema event
        let plain = Event::from_params(&json!({"service": "disk"})).unwrap();
        assert_eq!(event.as_proto(), plain.as_proto());
    }

    #[test]
    fn test_from_params_null_leaves_field_unset() {
        let event = Event::from_params(&json!({"service": "x", "metric": null})).unwrap();
        assert_eq!(event.metric(), None);
    }

    #[test]
    fn test_from_params_type_errors() {
        let err = Event::from_params(&json!({"ttl": "soon"})).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidField { field: "ttl", .. }));

        let err = Event::from_params(&json!({"tags": "prod"})).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidField { field: "tags", .. }));

        let err = Event::from_params(&json!({"attributes": "k=v"})).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidAttributes("string")));

        let err = Event::from_params(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidParams("array")));
    }

    #[test]
    fn test_to_json_skips_unset_fields() {
        let mut event = Event::new();
        event.set_service("api");
        event.set_metric(1.0);
        event.set_tags(["a"]);

        let value = event.to_json();
        assert_eq!(value["service"], "api");
        assert_eq!(value["metric"], 1.0);
        assert_eq!(value["tags"], json!(["a"]));
        assert!(value.get("host").is_none());
        assert!(value.get("attributes").is_none());
    }
}
