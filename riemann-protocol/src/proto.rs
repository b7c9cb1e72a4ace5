//! Protobuf schema for the Riemann wire format.
//!
//! Mirrors `proto.proto` as shipped with the Riemann server (proto2). Only the
//! messages a client exchanges are declared here; the server-side `State`
//! message is deprecated and omitted. Field tags must never change.

/// A single key/value attribute attached to an event.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Attribute {
    #[prost(string, required, tag = "1")]
    pub key: String,
    #[prost(string, optional, tag = "2")]
    pub value: Option<String>,
}

/// A monitoring event.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Event {
    #[prost(int64, optional, tag = "1")]
    pub time: Option<i64>,
    #[prost(string, optional, tag = "2")]
    pub state: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub service: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub host: Option<String>,
    #[prost(string, optional, tag = "5")]
    pub description: Option<String>,
    #[prost(string, repeated, tag = "7")]
    pub tags: Vec<String>,
    #[prost(float, optional, tag = "8")]
    pub ttl: Option<f32>,
    #[prost(message, repeated, tag = "9")]
    pub attributes: Vec<Attribute>,
    #[prost(int64, optional, tag = "10")]
    pub time_micros: Option<i64>,
    #[prost(sint64, optional, tag = "13")]
    pub metric_sint64: Option<i64>,
    #[prost(double, optional, tag = "14")]
    pub metric_d: Option<f64>,
    #[prost(float, optional, tag = "15")]
    pub metric_f: Option<f32>,
}

/// A query expression, e.g. `service = "cpu" and state = "critical"`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Query {
    #[prost(string, optional, tag = "1")]
    pub string: Option<String>,
}

/// Top-level envelope for both requests and responses.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Msg {
    #[prost(bool, optional, tag = "2")]
    pub ok: Option<bool>,
    #[prost(string, optional, tag = "3")]
    pub error: Option<String>,
    #[prost(message, optional, tag = "5")]
    pub query: Option<Query>,
    #[prost(message, repeated, tag = "6")]
    pub events: Vec<Event>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message as _;

    #[test]
    fn test_empty_msg_encodes_to_nothing() {
        let msg = Msg::default();
        assert!(msg.encode_to_vec().is_empty());
    }

    #[test]
    fn test_field_tags_on_the_wire() {
        // ok = true is field 2, varint: key 0x10, value 0x01
        let msg = Msg {
            ok: Some(true),
            ..Default::default()
        };
        assert_eq!(msg.encode_to_vec(), vec![0x10, 0x01]);

        // query.string = "x" is field 5 (len-delimited) wrapping field 1
        let msg = Msg {
            query: Some(Query {
                string: Some("x".to_string()),
            }),
            ..Default::default()
        };
        assert_eq!(msg.encode_to_vec(), vec![0x2a, 0x03, 0x0a, 0x01, b'x']);
    }

    #[test]
    fn test_metric_f_tag() {
        let event = Event {
            metric_f: Some(1.0),
            ..Default::default()
        };
        // field 15, wire type 5 (32-bit): (15 << 3) | 5 = 0x7d
        let bytes = event.encode_to_vec();
        assert_eq!(bytes[0], 0x7d);
        assert_eq!(&bytes[1..], &1.0f32.to_le_bytes());
    }
}
