//! Payload codec behaviour: messages, timestamp fallback and precision loss.

use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use simple_http::codec::{self, timestamp};
use simple_http::{ClientConfig, Codec, ErrorKind, HttpError};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct TestModel {
    message: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Deployment {
    service: String,
    #[serde(with = "timestamp")]
    started_at: DateTime<Utc>,
    #[serde(with = "timestamp::option", default)]
    finished_at: Option<DateTime<Utc>>,
}

#[test]
fn decodes_message() -> anyhow::Result<()> {
    let result: TestModel = codec::decode(br#"{"message":"Hello, World!"}"#)?;
    assert_eq!(result.message, "Hello, World!");
    Ok(())
}

#[test]
fn encodes_message() -> anyhow::Result<()> {
    let obj = TestModel {
        message: "Hello, World!".to_string(),
    };
    let json = String::from_utf8(codec::encode(&obj)?)?;
    assert_eq!(json, r#"{"message":"Hello, World!"}"#);
    Ok(())
}

#[test]
fn truncated_json_is_an_error() {
    let err = codec::decode::<TestModel>(br#"{"message":"Hel"#).unwrap_err();
    assert!(matches!(err, HttpError::MalformedJson(_)));
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn wrong_shape_is_an_error() {
    let err = codec::decode::<TestModel>(br#"{"text":"Hello"}"#).unwrap_err();
    assert!(matches!(err, HttpError::ShapeMismatch(_)));
}

#[test]
fn single_format_timestamps_round_trip_byte_identical() -> anyhow::Result<()> {
    let input = br#"{"service":"api","started_at":"2019-02-27T10:00:00+00:00","finished_at":"2019-02-27T10:05:30+00:00"}"#;

    let deployment: Deployment = codec::decode(input)?;
    assert_eq!(codec::encode(&deployment)?, input);
    Ok(())
}

#[test]
fn accepts_both_timestamp_forms() -> anyhow::Result<()> {
    let long: Deployment =
        codec::decode(br#"{"service":"api","started_at":"2019-02-27T10:00:00.123+00:00"}"#)?;
    let short: Deployment =
        codec::decode(br#"{"service":"api","started_at":"2019-02-27T10:00:00+00:00"}"#)?;

    assert_eq!(long.started_at.timestamp_subsec_millis(), 123);
    assert_eq!(short.started_at.timestamp_subsec_millis(), 0);
    assert_eq!(long.started_at.with_nanosecond(0), Some(short.started_at));
    assert_eq!(
        short.started_at,
        Utc.with_ymd_and_hms(2019, 2, 27, 10, 0, 0).unwrap()
    );
    assert_eq!(short.finished_at, None);
    Ok(())
}

#[test]
fn encoding_truncates_fractional_seconds() -> anyhow::Result<()> {
    let input = br#"{"service":"api","started_at":"2019-02-27T10:00:00.123+00:00","finished_at":null}"#;

    let deployment: Deployment = codec::decode(input)?;
    let encoded = String::from_utf8(codec::encode(&deployment)?)?;
    assert_eq!(
        encoded,
        r#"{"service":"api","started_at":"2019-02-27T10:00:00+00:00","finished_at":null}"#
    );

    let reread: Deployment = codec::decode(encoded.as_bytes())?;
    assert_ne!(reread.started_at, deployment.started_at);
    assert_eq!(deployment.started_at.with_nanosecond(0), Some(reread.started_at));
    Ok(())
}

#[test]
fn unmatched_timestamp_is_reported() {
    let err = codec::decode::<Deployment>(br#"{"service":"api","started_at":"2019-02-27"}"#)
        .unwrap_err();
    assert!(
        matches!(&err, HttpError::InvalidTimestamp { value, .. } if value == "2019-02-27"),
        "got {err:?}"
    );
}

#[test]
fn codec_from_config_uses_configured_formats() -> anyhow::Result<()> {
    let config = ClientConfig::from_toml_str(
        r#"
        [codec]
        accepted_formats = ["%Y-%m-%d %H:%M:%S%.f %:z", "%Y-%m-%dT%H:%M:%S%:z"]
        output_format = "%Y-%m-%d %H:%M:%S %:z"
        "#,
    )?;
    let codec = Codec::from_config(&config.codec)?;

    let deployment: Deployment =
        codec.decode(br#"{"service":"db","started_at":"2019-02-27 10:00:00.5 +01:00"}"#)?;
    assert_eq!(deployment.started_at.hour(), 9);

    let encoded = String::from_utf8(codec.encode(&deployment)?)?;
    assert!(encoded.contains(r#""started_at":"2019-02-27 09:00:00 +00:00""#));
    Ok(())
}
