//! Typed wrapper over the top-level `Msg` envelope.

use crate::error::ProtocolError;
use crate::event::Event;
use crate::proto;
use bytes::Bytes;
use prost::Message as _;
use serde_json::Value;
use std::collections::BTreeMap;

/// A request or response envelope.
///
/// A message is created from a list of events, from a query string, from raw
/// bytes received off the wire, or empty. An empty message is also what the
/// client hands back when a request could not be delivered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    inner: proto::Msg,
    extra: BTreeMap<String, Value>,
}

impl Message {
    /// Creates an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a message carrying the given events.
    pub fn from_events<I>(events: I) -> Self
    where
        I: IntoIterator<Item = Event>,
    {
        Self::from_proto(proto::Msg {
            events: events.into_iter().map(Event::into_proto).collect(),
            ..Default::default()
        })
    }

    /// Creates a query request.
    pub fn from_query(query: impl Into<String>) -> Self {
        Self::from_proto(proto::Msg {
            query: Some(proto::Query {
                string: Some(query.into()),
            }),
            ..Default::default()
        })
    }

    /// Decodes a message from its serialized form.
    pub fn from_raw(raw: &[u8]) -> Result<Self, ProtocolError> {
        let inner = proto::Msg::decode(raw)?;
        Ok(Self::from_proto(inner))
    }

    /// Wraps a schema message.
    pub fn from_proto(inner: proto::Msg) -> Self {
        Self {
            inner,
            extra: BTreeMap::new(),
        }
    }

    /// Serializes the message.
    pub fn raw(&self) -> Bytes {
        Bytes::from(self.inner.encode_to_vec())
    }

    /// Size of the serialized message in bytes.
    pub fn encoded_len(&self) -> usize {
        self.inner.encoded_len()
    }

    /// Returns true if no schema field is set.
    pub fn is_empty(&self) -> bool {
        self.inner == proto::Msg::default()
    }

    /// Server acknowledgement. Absent counts as `false`.
    pub fn ok(&self) -> bool {
        self.inner.ok.unwrap_or(false)
    }

    pub fn set_ok(&mut self, ok: bool) {
        self.inner.ok = Some(ok);
    }

    /// Error text returned by the server.
    pub fn error(&self) -> Option<&str> {
        self.inner.error.as_deref()
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.inner.error = Some(error.into());
    }

    pub fn query(&self) -> Option<&str> {
        self.inner.query.as_ref().and_then(|q| q.string.as_deref())
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.inner.query = Some(proto::Query {
            string: Some(query.into()),
        });
    }

    /// Returns the carried events, each in a freshly built wrapper.
    ///
    /// Wrappers are not cached: changes made to a returned event do not
    /// affect the message. Use [`Message::push_event`] to add events.
    pub fn events(&self) -> Vec<Event> {
        self.inner
            .events
            .iter()
            .cloned()
            .map(Event::from_proto)
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.inner.events.len()
    }

    pub fn push_event(&mut self, event: Event) {
        self.inner.events.push(event.into_proto());
    }

    /// Returns a value stored under a name outside the schema.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Stores a value on the message. It is never serialized.
    pub fn set_extra(&mut self, key: impl Into<String>, value: Value) {
        self.extra.insert(key.into(), value);
    }

    pub fn as_proto(&self) -> &proto::Msg {
        &self.inner
    }

    pub fn into_proto(self) -> proto::Msg {
        self.inner
    }
}

impl From<proto::Msg> for Message {
    fn from(inner: proto::Msg) -> Self {
        Self::from_proto(inner)
    }
}
