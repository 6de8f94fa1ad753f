use dynawrap::{
    codec::{ChangeEvent, StreamError},
    decode_change_event, Record, TableAttribute,
};
use serde_json::{json, Value};

mod common;

#[derive(Debug, PartialEq, Record)]
#[dynawrap(pk = "USER#SIGNUP", sk = "TS#{timestamp}")]
struct Signup {
    username: Option<String>,
    timestamp: Option<String>,
    email: Option<String>,
}

#[derive(Debug, PartialEq, Record)]
#[dynawrap(pk = "ITEM#{item_id}", sk = "DETAIL#{detail_id}")]
struct MockItem {
    item_id: Option<String>,
    detail_id: Option<String>,
    name: Option<String>,
}

fn stream_record(image: Value) -> Value {
    json!({
        "eventID": "81193db2e4b50f75909a915b236d96ac",
        "eventName": "INSERT",
        "eventVersion": "1.1",
        "eventSource": "aws:dynamodb",
        "awsRegion": "eu-west-2",
        "dynamodb": {
            "ApproximateCreationDateTime": 1746399467.0,
            "Keys": {
                "SK": {"S": "TS#2025-05-04T22:57:47"},
                "PK": {"S": "USER#SIGNUP"},
            },
            "NewImage": image,
            "SequenceNumber": "7416300002271126548794192",
            "SizeBytes": 143,
            "StreamViewType": "NEW_IMAGE",
        },
        "eventSourceARN": "arn:aws:dynamodb:eu-west-2:123456789012:table/events/stream/2025-05-03T08:57:00.290",
    })
}

fn signup_image() -> Value {
    json!({
        "SK": {"S": "TS#2025-05-04T22:57:47"},
        "PK": {"S": "USER#SIGNUP"},
        "email": {"S": "tester@example.com"},
        "timestamp": {"S": "2025-05-04T22:57:47"},
        "username": {"S": "tester-001"},
    })
}

#[test]
fn test_from_change_event() {
    let signup = Signup::from_change_event(&stream_record(signup_image()))
        .expect("Failed to read stream record");

    assert_eq!(
        signup,
        Signup {
            username: Some("tester-001".into()),
            timestamp: Some("2025-05-04T22:57:47".into()),
            email: Some("tester@example.com".into()),
        }
    );
}

#[test]
fn test_decoded_image_keeps_keys() {
    let image = decode_change_event(&stream_record(signup_image())).unwrap();

    assert_eq!(image.get("PK"), Some(&TableAttribute::from("USER#SIGNUP")));
    assert_eq!(image.get("SK"), Some(&TableAttribute::from("TS#2025-05-04T22:57:47")));
    assert_eq!(image.get("username"), Some(&TableAttribute::from("tester-001")));
}

#[test]
fn test_change_event_metadata() {
    let event: ChangeEvent = serde_json::from_value(stream_record(signup_image())).unwrap();

    assert_eq!(event.event_id.as_deref(), Some("81193db2e4b50f75909a915b236d96ac"));
    assert_eq!(event.event_name.as_deref(), Some("INSERT"));

    let record = event.record().unwrap();
    assert_eq!(record.sequence_number.as_deref(), Some("7416300002271126548794192"));
    assert_eq!(event.keys().unwrap().map(|keys| keys.len()), Some(2));
}

#[test]
fn test_missing_partition_key() {
    let record = stream_record(json!({
        "SK": {"S": "DETAIL#2"},
        "item_id": {"S": "1"},
        "detail_id": {"S": "2"},
        "name": {"S": "MissingPK"},
    }));

    let err = crate::assert_err!(MockItem::from_change_event(&record));
    assert!(matches!(err, StreamError::MalformedRecord(_)));
}

#[test]
fn test_keys_only_record() {
    let record = stream_record(json!({
        "SK": {"S": "DETAIL#2"},
        "PK": {"S": "ITEM#1"},
    }));

    let err = crate::assert_err!(MockItem::from_change_event(&record));
    assert_eq!(err, StreamError::EmptyRecord);
}

#[test]
fn test_pattern_mismatch() {
    let err = crate::assert_err!(MockItem::from_change_event(&stream_record(signup_image())));

    assert_eq!(
        err,
        StreamError::PatternMismatch {
            pk: "USER#SIGNUP".into(),
            sk: "TS#2025-05-04T22:57:47".into(),
            type_name: "MockItem".into(),
        }
    );
}

#[test]
fn test_stream_record_for_other_item() {
    let record = stream_record(json!({
        "PK": {"S": "ITEM#1"},
        "SK": {"S": "DETAIL#2"},
        "item_id": {"S": "1"},
        "detail_id": {"S": "2"},
        "name": {"S": "Streamed"},
    }));

    let item = MockItem::from_change_event(&record).unwrap();
    assert_eq!(item.name.as_deref(), Some("Streamed"));
}
