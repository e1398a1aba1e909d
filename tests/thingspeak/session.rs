use crate::mock::*;
use asyncts::network::application::thingspeak::{ResultCode, State};
use asyncts::network::error::Error;

fn record_other_write(_code: ResultCode) {}

#[test]
fn test_busy_client_refuses_everything() {
    let client = client();
    client.write_field(1, 1i32, None).unwrap();
    establish(&client);
    let (sent_before, connects_before) = client.with_transport(|t| (t.sent.clone(), t.connects.len()));

    client.set_field(2, "staged while busy").unwrap();
    assert_eq!(client.write_fields(None), Err(ResultCode::ConnectFailed));
    assert_eq!(client.write_field(9, 1i32, None), Err(ResultCode::ConnectFailed));
    assert_eq!(client.read_status(1, None), Err(ResultCode::ConnectFailed));
    assert_eq!(
        client.on_write_response(record_other_write),
        Err(ResultCode::ConnectFailed)
    );

    client.with_transport(|t| {
        assert_eq!(t.sent, sent_before);
        assert_eq!(t.connects.len(), connects_before);
    });
    assert_eq!(client.state(), State::Connected);
    assert_eq!(client.staged().field(2), Some("staged while busy"));

    // The refused calls did not disturb the exchange in flight.
    respond(&client, "HTTP/1.1 200 OK", "5");
    assert_eq!(writes(), vec![ResultCode::Success]);
}

#[test]
fn test_exactly_one_callback_per_exchange() {
    let client = client();
    client.write_field(1, 1i32, None).unwrap();
    establish(&client);
    respond(&client, "HTTP/1.1 200 OK", "5");
    client.on_error(Error::ConnectionReset);
    client.on_data(b"trailing");
    hang_up(&client);
    client.poll(100_000);
    client.on_disconnect();

    assert_eq!(writes(), vec![ResultCode::Success]);
    assert!(client.is_idle());
}

#[test]
fn test_response_progress_states() {
    let client = client();
    client.read_string_field(1, 1, None).unwrap();
    establish(&client);

    client.on_data(b"HTTP/1.1 200 OK\r\nContent-Len");
    assert_eq!(client.state(), State::Connected);
    client.on_data(b"gth: 4\r\n\r\n");
    assert_eq!(client.state(), State::HeadersReceived);
    client.on_data(b"ab");
    assert_eq!(client.state(), State::BodyInProgress);
    client.on_data(b"cd");
    assert_eq!(client.state(), State::Closing);
    assert_eq!(reads().len(), 1);
}

#[test]
fn test_close_that_disconnects_releases_at_once() {
    let client = client();
    client.with_transport(|t| t.close_disconnects = true);
    client.write_field(1, 1i32, None).unwrap();
    establish(&client);
    respond(&client, "HTTP/1.1 200 OK", "5");
    assert!(client.is_idle());

    client.write_field(1, 2i32, None).unwrap();
    assert_eq!(client.state(), State::Connecting);
}

#[test]
fn test_closing_released_by_poll() {
    let client = client();
    client.write_field(1, 1i32, None).unwrap();
    establish(&client);
    respond(&client, "HTTP/1.1 200 OK", "5");
    assert_eq!(client.state(), State::Closing);

    client.poll(10);
    assert_eq!(client.state(), State::Closing);
    client.with_transport(|t| t.connected = false);
    client.poll(20);
    assert!(client.is_idle());
}

#[test]
fn test_synchronous_connect_failure() {
    let client = client();
    client.with_transport(|t| t.fail_connect = true);
    assert_eq!(client.write_field(1, 1i32, None), Err(ResultCode::ConnectFailed));
    assert!(writes().is_empty());

    client.poll(0);
    assert_eq!(writes(), vec![ResultCode::ConnectFailed]);
    assert!(client.is_idle());
}

#[test]
fn test_connect_error_notification() {
    let client = client();
    client.write_field(1, 1i32, None).unwrap();
    client.on_error(Error::ConnectionRefused);
    assert_eq!(writes(), vec![ResultCode::ConnectFailed]);
    assert!(client.is_idle());
    client.with_transport(|t| assert!(t.sent.is_empty()));
}

#[test]
fn test_disconnect_before_response() {
    let client = client();
    client.write_field(1, 1i32, None).unwrap();
    establish(&client);
    hang_up(&client);
    assert_eq!(writes(), vec![ResultCode::UnexpectedFail]);
    assert!(client.is_idle());
}

#[test]
fn test_disconnect_mid_response() {
    let client = client();
    client.read_float_field(1, 1, None).unwrap();
    establish(&client);
    client.on_data(b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\n12");
    hang_up(&client);
    assert_eq!(reads().len(), 1);
    assert_eq!(reads()[0].0, ResultCode::BadResponse);
    assert!(client.is_idle());
}

#[test]
fn test_transport_timeout_error() {
    let client = client();
    client.write_field(1, 1i32, None).unwrap();
    establish(&client);
    client.on_error(Error::Timeout);
    assert_eq!(writes(), vec![ResultCode::Timeout]);
    client.with_transport(|t| assert_eq!(t.close_calls, 1));
}

#[test]
fn test_inactivity_timeout() {
    let client = client();
    client.set_timeout(5_000);
    client.with_transport(|t| {
        assert_eq!(t.rx_timeout, 5_000);
        assert_eq!(t.ack_timeout, 5_000);
    });

    client.write_field(1, 1i32, None).unwrap();
    client.poll(1_000);
    establish(&client);
    client.poll(3_000);
    client.poll(7_999);
    assert!(writes().is_empty());

    client.poll(8_000);
    assert_eq!(writes(), vec![ResultCode::Timeout]);
    assert_eq!(client.last_code(), ResultCode::Timeout);
    client.with_transport(|t| assert_eq!(t.close_calls, 1));

    hang_up(&client);
    assert!(client.is_idle());
}

#[test]
fn test_malformed_response() {
    let client = client();
    client.write_field(1, 1i32, None).unwrap();
    establish(&client);
    client.on_data(b"220 smtp.example.com ESMTP\r\n");
    assert_eq!(writes(), vec![ResultCode::BadResponse]);
    client.with_transport(|t| assert_eq!(t.close_calls, 1));
}

#[test]
fn test_default_timeouts_applied() {
    let client = client();
    assert_eq!(client.options().timeout_ms, 30_000);
    client.with_transport(|t| assert_eq!(t.rx_timeout, 30_000));
    assert!(!client.debug());
    client.set_debug(true);
    assert!(client.debug());
}

#[test]
fn test_data_outside_exchange_is_ignored() {
    let client = client();
    client.on_data(b"HTTP/1.1 200 OK\r\n\r\n");
    client.on_ack(10, 1);
    client.on_connect();
    assert!(client.is_idle());
    assert!(writes().is_empty() && reads().is_empty());
}
