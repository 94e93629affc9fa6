use keepwire::constants::DEFAULT_BUFFER_SIZE;
use keepwire::frame::flags::ExchangePattern;
use keepwire::frame::{CallFrame, FrameCodecs, ReturnFrame, ReturnValue, Value, ValueType};
use keepwire::session::{exchange, serve_connection};
use keepwire::tls::{
    KeyMaterial, RustlsEngineFactory, TlsEngineFactory, TlsSettings, TrustMaterial,
};
use keepwire::transport::{Channel, TlsChannel};
use rustls::pki_types::{CertificateDer, PrivatePkcs8KeyDer};
use std::net::{TcpListener, TcpStream};
use std::thread;

fn self_signed() -> (CertificateDer<'static>, PrivatePkcs8KeyDer<'static>) {
    let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_owned()]).unwrap();
    (
        CertificateDer::from(certified.cert.der().to_vec()),
        PrivatePkcs8KeyDer::from(certified.key_pair.serialize_der()),
    )
}

fn factories(protocol: &str) -> (RustlsEngineFactory, RustlsEngineFactory) {
    let (cert, key) = self_signed();

    let mut server = TlsSettings::server(KeyMaterial::InMemory {
        certificate_chain: vec![cert.clone()],
        private_key: key.into(),
    });
    server.protocol = protocol.to_owned();

    let mut client = TlsSettings::client(TrustMaterial::InMemory(vec![cert]));
    client.protocol = protocol.to_owned();

    (
        RustlsEngineFactory::server_from_settings(&server).unwrap(),
        RustlsEngineFactory::client_from_settings(&client).unwrap(),
    )
}

fn echo_call(payload: String) -> CallFrame {
    let mut call = CallFrame::new(
        "example.Echo",
        "echo",
        vec![ValueType::Str],
        vec![Value::Str(payload)],
    )
    .unwrap();
    call.set_exchange_pattern(ExchangePattern::InOut);
    call.set_keep_alive(true);
    call
}

fn echo_over_tls(protocol: &str) {
    let (server_factory, client_factory) = factories(protocol);
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let engine = server_factory.create_server_engine().unwrap();
        let mut channel = TlsChannel::establish(stream, engine, DEFAULT_BUFFER_SIZE).unwrap();

        let echo = |mut call: CallFrame| ReturnFrame::success(call.take_arguments().remove(0));
        let served =
            serve_connection(&mut channel, &FrameCodecs::default(), &echo, true).unwrap();
        channel.close();
        served
    });

    let engine = client_factory.create_client_engine("localhost").unwrap();
    let stream = TcpStream::connect(addr).unwrap();
    let mut channel = TlsChannel::establish(stream, engine, DEFAULT_BUFFER_SIZE).unwrap();
    let codecs = FrameCodecs::default();

    // Small calls first, then payloads spanning many TLS records.
    let sizes = [0usize, 1, 100, 16 * 1024, 16 * 1024 + 1, 100_000];
    for size in sizes {
        let payload = "x".repeat(size);
        let outcome = exchange(&mut channel, &codecs, &echo_call(payload.clone()), None).unwrap();
        assert!(outcome.keep_alive);
        assert_eq!(
            outcome.return_frame.into_result(),
            ReturnValue::Value(Value::Str(payload))
        );
    }

    channel.close();
    assert!(channel.is_closed());
    assert_eq!(server.join().unwrap(), sizes.len());
}

#[test]
fn test_echo_over_tls12() {
    echo_over_tls("TLSv1.2");
}

#[test]
fn test_echo_over_tls13() {
    echo_over_tls("TLSv1.3");
}

#[test]
fn test_untrusted_server_certificate_fails_the_handshake() {
    let (server_factory, _) = factories("TLS");
    let (_, stranger_factory) = factories("TLS");

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let engine = server_factory.create_server_engine().unwrap();
        TlsChannel::establish(stream, engine, DEFAULT_BUFFER_SIZE).is_err()
    });

    let engine = stranger_factory.create_client_engine("localhost").unwrap();
    let stream = TcpStream::connect(addr).unwrap();
    assert!(TlsChannel::establish(stream, engine, DEFAULT_BUFFER_SIZE).is_err());
    assert!(server.join().unwrap());
}

#[test]
fn test_client_factory_rejects_invalid_server_name() {
    let (_, client_factory) = factories("TLS");
    assert!(client_factory.create_client_engine("not a host name!").is_err());
}
