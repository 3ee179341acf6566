use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tandem_rpc_service::{JsonSerializer, Serializer, SerializerError};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Status {
    message: String,
    retry_count: u32,
}

#[test]
fn argument_tuples_encode_as_json_arrays() {
    let serializer = JsonSerializer;
    let body = serializer.encode(&("hi",)).expect("encode failed");
    assert_eq!(body, b"[\"hi\"]");

    let body = serializer.encode(&(1, "two", 3.0)).expect("encode failed");
    assert_eq!(body, b"[1,\"two\",3.0]");
}

#[test]
fn values_round_trip() {
    let serializer = JsonSerializer;
    let original = Status {
        message: "ready".to_string(),
        retry_count: 2,
    };

    let bytes = serializer.encode(&original).expect("encode failed");
    let decoded: Status = serializer.decode(&bytes).expect("decode failed");
    assert_eq!(decoded, original);
}

#[test]
fn member_names_match_case_insensitively() {
    let serializer = JsonSerializer;
    let decoded: Status = serializer
        .decode(br#"{"Message":"ok","RETRY_COUNT":3}"#)
        .expect("mixed-case member names must decode");

    assert_eq!(
        decoded,
        Status {
            message: "ok".to_string(),
            retry_count: 3,
        }
    );
}

#[test]
fn exact_member_names_win_over_the_fold() {
    let serializer = JsonSerializer;
    // The strict pass already succeeds here; the tolerant retry must not
    // run and overwrite `message` with the upper-cased duplicate.
    let decoded: Status = serializer
        .decode(br#"{"message":"exact","MESSAGE":"folded","retry_count":0}"#)
        .expect("decode failed");

    assert_eq!(decoded.message, "exact");
}

#[test]
fn nested_members_fold_too() {
    #[derive(Debug, PartialEq, Deserialize)]
    struct Outer {
        inner: Status,
    }

    let serializer = JsonSerializer;
    let decoded: Outer = serializer
        .decode(br#"{"Inner":{"MESSAGE":"deep","Retry_Count":1}}"#)
        .expect("nested mixed-case members must decode");

    assert_eq!(decoded.inner.message, "deep");
    assert_eq!(decoded.inner.retry_count, 1);
}

#[test]
fn map_valued_members_keep_their_keys() {
    #[derive(Debug, Deserialize)]
    struct Labeled {
        labels: HashMap<String, i64>,
        retry_count: u32,
    }

    let serializer = JsonSerializer;
    // The member names need the tolerant re-match, but the keys inside the
    // map are data and must come through byte for byte.
    let decoded: Labeled = serializer
        .decode(br#"{"Labels":{"UPPER":1,"MiXeD":2},"RETRY_COUNT":4}"#)
        .expect("mixed-case member names must decode");

    assert_eq!(decoded.retry_count, 4);
    assert_eq!(decoded.labels.get("UPPER"), Some(&1));
    assert_eq!(decoded.labels.get("MiXeD"), Some(&2));
    assert_eq!(decoded.labels.get("upper"), None);
}

#[test]
fn passthrough_value_members_keep_their_keys() {
    #[derive(Debug, Deserialize)]
    struct WithExtra {
        extra: serde_json::Value,
        retry_count: u32,
    }

    let serializer = JsonSerializer;
    let decoded: WithExtra = serializer
        .decode(br#"{"Extra":{"CamelKey":true},"Retry_Count":2}"#)
        .expect("mixed-case member names must decode");

    assert_eq!(decoded.retry_count, 2);
    assert_eq!(decoded.extra["CamelKey"], serde_json::Value::Bool(true));
    assert!(decoded.extra.get("camelkey").is_none());
}

#[test]
fn optional_members_fold_or_default() {
    #[derive(Debug, Deserialize)]
    struct Annotated {
        message: String,
        note: Option<String>,
    }

    let serializer = JsonSerializer;

    let decoded: Annotated = serializer
        .decode(br#"{"MESSAGE":"x"}"#)
        .expect("absent optional member must decode");
    assert_eq!(decoded.message, "x");
    assert_eq!(decoded.note, None);

    let decoded: Annotated = serializer
        .decode(br#"{"MESSAGE":"x","NOTE":"y"}"#)
        .expect("mixed-case optional member must decode");
    assert_eq!(decoded.note.as_deref(), Some("y"));
}

#[test]
fn shape_mismatch_is_a_decode_error() {
    let serializer = JsonSerializer;
    let result = serializer.decode::<Status>(br#"{"unrelated":true}"#);
    assert!(matches!(result, Err(SerializerError::Decode(_))));
}

#[test]
fn malformed_json_is_a_decode_error() {
    let serializer = JsonSerializer;
    let result = serializer.decode::<Status>(b"{not json");
    assert!(matches!(result, Err(SerializerError::Decode(_))));
}
