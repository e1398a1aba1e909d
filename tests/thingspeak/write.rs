use crate::mock::*;
use asyncts::network::application::thingspeak::{ResultCode, State, USER_AGENT};

#[test]
fn test_single_field_write() {
    let client = client();
    client.set_field(1, "23.5").unwrap();
    client.write_fields(Some("WRITEKEY")).unwrap();

    assert_eq!(client.state(), State::Connecting);
    client.with_transport(|t| {
        assert_eq!(t.connects, vec![("api.thingspeak.com".to_string(), 80)]);
        assert!(t.sent.is_empty());
    });

    establish(&client);
    assert_eq!(client.state(), State::Connected);
    assert_eq!(
        sent(&client),
        format!(
            "POST /update HTTP/1.1\r\n\
             Host: api.thingspeak.com\r\n\
             User-Agent: {USER_AGENT}\r\n\
             X-THINGSPEAKAPIKEY: WRITEKEY\r\n\
             Content-Type: application/x-www-form-urlencoded\r\n\
             Content-Length: 25\r\n\
             \r\n\
             field1=23.5&headers=false"
        )
    );

    respond(&client, "HTTP/1.1 200 OK", "1");
    assert_eq!(writes(), vec![ResultCode::Success]);
    assert_eq!(client.last_code(), ResultCode::Success);
    assert_eq!(client.state(), State::Closing);
    client.with_transport(|t| assert_eq!(t.close_calls, 1));

    hang_up(&client);
    assert_eq!(client.state(), State::Idle);
    assert_eq!(writes().len(), 1);
}

#[test]
fn test_write_fields_consumes_staged_values() {
    let client = client();
    client.set_field(2, 7i32).unwrap();
    client.set_latitude(51.5);
    client.set_status("calibrating").unwrap();
    client.write_fields(None).unwrap();
    assert!(client.staged().is_empty());

    establish(&client);
    let request = sent(&client);
    assert!(request.ends_with(
        "\r\n\r\nfield2=7&lat=51.500000&status=calibrating&headers=false"
    ));
    assert!(!request.contains("X-THINGSPEAKAPIKEY"));
}

#[test]
fn test_write_with_nothing_staged() {
    let client = client();
    assert_eq!(client.write_fields(None), Err(ResultCode::MissingFields));

    // Reported on the next poll, never from inside the call.
    assert!(writes().is_empty());
    assert_eq!(client.state(), State::Complete);
    client.with_transport(|t| {
        assert!(t.connects.is_empty());
        assert!(t.sent.is_empty());
    });

    client.poll(0);
    assert_eq!(writes(), vec![ResultCode::MissingFields]);
    assert_eq!(client.state(), State::Idle);

    client.poll(1);
    assert_eq!(writes().len(), 1);
}

#[test]
fn test_zero_entry_id_is_not_inserted() {
    let client = client();
    client.write_field(3, 1.5f32, Some("KEY")).unwrap();
    establish(&client);
    respond(&client, "HTTP/1.1 200 OK", "0");
    assert_eq!(writes(), vec![ResultCode::NotInserted]);
    assert_eq!(client.last_code().code(), -401);
}

#[test]
fn test_invalid_field_number_sends_nothing() {
    let client = client();
    assert_eq!(
        client.write_field(9, 1i32, None),
        Err(ResultCode::InvalidFieldNumber)
    );
    client.with_transport(|t| {
        assert!(t.connects.is_empty());
        assert!(t.sent.is_empty());
    });
    client.poll(0);
    assert_eq!(writes(), vec![ResultCode::InvalidFieldNumber]);
    assert!(client.is_idle());
}

#[test]
fn test_float_out_of_range() {
    let client = client();
    assert_eq!(
        client.write_field(1, 999_999_000_000.0f64, None),
        Err(ResultCode::OutOfRange)
    );
    client.poll(0);
    assert_eq!(writes(), vec![ResultCode::OutOfRange]);

    assert_eq!(client.set_field(1, -1.0e12f64), Err(ResultCode::OutOfRange));
    assert!(client.staged().is_empty());
}

#[test]
fn test_write_field_leaves_staged_values() {
    let client = client();
    client.set_field(5, "kept").unwrap();
    client.write_field(1, 42i64, None).unwrap();
    establish(&client);
    assert!(sent(&client).ends_with("\r\n\r\nfield1=42&headers=false"));
    assert_eq!(client.staged().field(5), Some("kept"));
}

#[test]
fn test_write_raw() {
    let client = client();
    client.write_raw("field1=10&field2=20", Some("KEY")).unwrap();
    establish(&client);
    let request = sent(&client);
    assert!(request.contains("Content-Length: 33\r\n"));
    assert!(request.ends_with("\r\n\r\nfield1=10&field2=20&headers=false"));
}

#[test]
fn test_http_errors_are_reported_as_is() {
    for (status_line, expected) in [
        ("HTTP/1.1 400 Bad Request", ResultCode::BadApiKey),
        ("HTTP/1.1 404 Not Found", ResultCode::BadAddress),
        ("HTTP/1.1 500 Internal Server Error", ResultCode::HttpStatus(500)),
    ] {
        let client = client();
        client.write_field(1, 1i32, Some("WRONG")).unwrap();
        establish(&client);
        respond(&client, status_line, "-1");
        assert_eq!(writes().last(), Some(&expected));
    }
    assert_eq!(writes().len(), 3);
}

#[test]
fn test_request_follows_send_window() {
    let client = client();
    client.with_transport(|t| t.window = 16);
    client.set_field(1, "a fairly long value to spread over several segments").unwrap();
    client.write_fields(Some("KEY")).unwrap();

    establish(&client);
    assert_eq!(client.with_transport(|t| t.sent.len()), 16);

    let mut acks = 0;
    while !sent(&client).ends_with("&headers=false") {
        client.on_ack(16, 3);
        acks += 1;
        assert!(acks < 100);
    }
    assert!(client.with_transport(|t| t.send_calls) > 1);

    respond(&client, "HTTP/1.1 200 OK", "17");
    assert_eq!(writes(), vec![ResultCode::Success]);
}

#[test]
fn test_response_in_single_bytes() {
    let client = client();
    client.write_field(1, 2i32, None).unwrap();
    establish(&client);
    for byte in response("HTTP/1.1 200 OK", "12").as_bytes() {
        assert!(writes().is_empty());
        client.on_data(std::slice::from_ref(byte));
    }
    assert_eq!(writes(), vec![ResultCode::Success]);
}

#[test]
fn test_already_connected_transport_sends_immediately() {
    let client = client();
    client.with_transport(|t| t.connected = true);
    client.write_field(1, 2i32, None).unwrap();
    assert_eq!(client.state(), State::Connected);
    client.with_transport(|t| {
        assert!(t.connects.is_empty());
        assert!(!t.sent.is_empty());
    });
}

#[test]
fn test_send_failure_is_unexpected() {
    let client = client();
    client.with_transport(|t| t.fail_send = true);
    client.write_field(1, 2i32, None).unwrap();
    establish(&client);
    assert_eq!(writes(), vec![ResultCode::UnexpectedFail]);
}
