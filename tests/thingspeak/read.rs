use crate::mock::*;
use asyncts::network::application::thingspeak::{
    Client, Options, ReadValue, ResultCode, SerdeExtractor, USER_AGENT,
};

const FEED: &str = r#"{"created_at":"2024-06-01T10:00:00Z","entry_id":118,"field1":"23.5","field2":"on","field3":"-7","field4":null,"latitude":"40.416775","longitude":"-3.703790","elevation":"667","status":"heating"}"#;

fn text(value: &str) -> ReadValue {
    ReadValue::Text(value.try_into().unwrap())
}

#[test]
fn test_read_string_field() {
    let client = client();
    client.read_string_field(12345, 3, None).unwrap();
    establish(&client);
    assert_eq!(
        sent(&client),
        format!(
            "GET /channels/12345/fields/3/last HTTP/1.1\r\n\
             Host: api.thingspeak.com\r\n\
             User-Agent: {USER_AGENT}\r\n\
             \r\n"
        )
    );

    respond(&client, "HTTP/1.1 200 OK", "hello");
    assert_eq!(reads(), vec![(ResultCode::Success, text("hello"))]);
    assert!(writes().is_empty());
}

#[test]
fn test_numeric_field_reads() {
    let client = client();
    client.read_float_field(1, 1, Some("READKEY")).unwrap();
    establish(&client);
    assert!(sent(&client).contains("X-THINGSPEAKAPIKEY: READKEY\r\n"));
    respond(&client, "HTTP/1.1 200 OK", "23.5");
    hang_up(&client);

    client.read_int_field(1, 2, None).unwrap();
    establish(&client);
    respond(&client, "HTTP/1.1 200 OK", "-7");
    hang_up(&client);

    client.read_long_field(1, 3, None).unwrap();
    establish(&client);
    respond(&client, "HTTP/1.1 200 OK", "9999999999");
    hang_up(&client);

    assert_eq!(
        reads(),
        vec![
            (ResultCode::Success, ReadValue::Float(23.5)),
            (ResultCode::Success, ReadValue::Int(-7)),
            (ResultCode::Success, ReadValue::Long(9_999_999_999)),
        ]
    );
}

#[test]
fn test_failed_read_reports_default_value() {
    let client = client();
    client.read_float_field(1, 1, Some("WRONG")).unwrap();
    establish(&client);
    respond(&client, "HTTP/1.1 400 Bad Request", "-1");
    assert_eq!(reads(), vec![(ResultCode::BadApiKey, ReadValue::Float(0.0))]);
}

#[test]
fn test_read_multiple_fields() {
    let client = client();
    client.read_multiple_fields(777, Some("READKEY")).unwrap();
    establish(&client);
    assert!(sent(&client).starts_with(
        "GET /channels/777/feeds/last.txt?status=true&location=true HTTP/1.1\r\n"
    ));
    respond(&client, "HTTP/1.1 200 OK", FEED);

    let reported = reads();
    assert_eq!(reported.len(), 1);
    let (code, value) = &reported[0];
    assert_eq!(*code, ResultCode::Success);
    assert_eq!(value.as_feed(), Some(&client.last_feed()));

    assert_eq!(client.field_as_string(1), "23.5");
    assert_eq!(client.field_as_float(1), 23.5);
    assert_eq!(client.field_as_float(2), 0.0);
    assert_eq!(client.field_as_int(3), -7);
    assert_eq!(client.field_as_long(3), -7);
    assert_eq!(client.field_as_string(4), "");
    assert_eq!(client.field_as_string(9), "");
    assert_eq!(client.status(), "heating");
    assert_eq!(client.created_at(), "2024-06-01T10:00:00Z");
    assert_eq!(client.latitude(), 40.416775);
    assert_eq!(client.longitude(), -3.70379);
    assert_eq!(client.elevation(), 667.0);
}

#[test]
fn test_failed_feed_read_keeps_previous_entry() {
    let client = client();
    client.read_multiple_fields(777, None).unwrap();
    establish(&client);
    respond(&client, "HTTP/1.1 200 OK", FEED);
    hang_up(&client);
    let before = client.last_feed();

    client.read_multiple_fields(777, None).unwrap();
    establish(&client);
    respond(&client, "HTTP/1.1 404 Not Found", "-1");

    let reported = reads();
    assert_eq!(reported[1].0, ResultCode::BadAddress);
    assert_eq!(reported[1].1.as_feed(), Some(&before));
    assert_eq!(client.last_feed(), before);
}

#[test]
fn test_read_status_and_created_at() {
    let client = client();
    client.read_status(5, None).unwrap();
    establish(&client);
    assert!(sent(&client).starts_with(
        "GET /channels/5/feeds/last.txt?status=true&location=true HTTP/1.1\r\n"
    ));
    respond(&client, "HTTP/1.1 200 OK", FEED);
    hang_up(&client);

    client.with_transport(|t| t.sent.clear());
    client.read_created_at(5, None).unwrap();
    establish(&client);
    assert!(sent(&client).starts_with("GET /channels/5/feeds/last.txt HTTP/1.1\r\n"));
    respond(&client, "HTTP/1.1 200 OK", FEED);

    assert_eq!(
        reads(),
        vec![
            (ResultCode::Success, text("heating")),
            (ResultCode::Success, text("2024-06-01T10:00:00Z")),
        ]
    );
}

#[test]
fn test_read_raw() {
    let client = client();
    client.read_raw(42, "/feeds.json?results=2", None).unwrap();
    establish(&client);
    assert!(sent(&client).starts_with("GET /channels/42/feeds.json?results=2 HTTP/1.1\r\n"));
    respond(&client, "HTTP/1.1 200 OK", "{\"feeds\":[]}");
    assert_eq!(reads(), vec![(ResultCode::Success, text("{\"feeds\":[]}"))]);
}

#[test]
fn test_read_invalid_field() {
    let client = client();
    assert_eq!(
        client.read_string_field(1, 0, None),
        Err(ResultCode::InvalidFieldNumber)
    );
    client.with_transport(|t| assert!(t.connects.is_empty()));
    client.poll(0);
    assert_eq!(reads(), vec![(ResultCode::InvalidFieldNumber, text(""))]);
}

#[test]
fn test_serde_extractor_client() {
    let client = Client::with_extractor(MockTransport::new(), Options::default(), SerdeExtractor);
    client.on_read_response(record_read).unwrap();
    client.read_multiple_fields(777, None).unwrap();
    client.with_transport(|t| t.connected = true);
    client.on_connect();
    client.on_data(response("HTTP/1.1 200 OK", FEED).as_bytes());

    assert_eq!(reads().len(), 1);
    assert_eq!(client.field_as_string(2), "on");
    assert_eq!(client.status(), "heating");
}

#[test]
fn test_non_utf8_body_is_bad_response() {
    let client = client();
    client.read_string_field(1, 1, None).unwrap();
    establish(&client);
    client.on_data(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\n\xff\xfe");
    assert_eq!(reads(), vec![(ResultCode::BadResponse, text(""))]);
}
