use example_keepwire_service_definition::echo::{Echo, EchoBytes, EchoText};
use keepwire::tls::{KeyMaterial, TlsSettings, TrustMaterial};
use keepwire_rpc_service::{CallError, RpcCall, TransportError};
use keepwire_rpc_service_endpoint::{EndpointRegistry, InterfaceTable, RpcServiceEndpoint};
use keepwire_socket_client::{ClientConfig, SocketClient};
use keepwire_socket_server::SocketConnector;
use rand::Rng;
use rustls::pki_types::{CertificateDer, PrivatePkcs8KeyDer};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

struct Identity {
    cert: CertificateDer<'static>,
    key: PrivatePkcs8KeyDer<'static>,
}

fn identity() -> Identity {
    let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_owned()]).unwrap();
    Identity {
        cert: CertificateDer::from(certified.cert.der().to_vec()),
        key: PrivatePkcs8KeyDer::from(certified.key_pair.serialize_der()),
    }
}

fn start_echo_connector(identity: &Identity, protocol: &str) -> SocketConnector {
    let registry = Arc::new(EndpointRegistry::new());
    registry
        .register_interface(
            InterfaceTable::builder::<Echo>()
                .method::<EchoText, _>(Ok)
                .method::<EchoBytes, _>(Ok)
                .build(),
        )
        .unwrap();

    let mut settings = TlsSettings::server(KeyMaterial::InMemory {
        certificate_chain: vec![identity.cert.clone()],
        private_key: identity.key.clone_key().into(),
    });
    settings.protocol = protocol.to_owned();

    let mut connector = SocketConnector::tls(&settings).unwrap();
    connector
        .set_bind_address(IpAddr::V4(Ipv4Addr::LOCALHOST))
        .unwrap();
    connector.set_port(0).unwrap();
    connector.set_core_threads(1).unwrap();
    connector
        .set_handler(Arc::new(RpcServiceEndpoint::new(registry)))
        .unwrap();
    connector.start().unwrap();
    connector
}

fn tls_client(connector: &SocketConnector, trusted: &Identity, keep_alive: bool) -> SocketClient {
    let port = connector.local_addr().unwrap().port();
    let mut config = ClientConfig::for_service("localhost", port);
    config.keep_alive = keep_alive;

    let settings = TlsSettings::client(TrustMaterial::InMemory(vec![trusted.cert.clone()]));
    SocketClient::tls(config, &settings).unwrap()
}

#[test]
fn test_tls_echo_with_growing_payloads() {
    let identity = identity();
    let connector = start_echo_connector(&identity, "TLSv1.2");
    let client = tls_client(&connector, &identity, true);
    let mut rng = rand::rng();

    for n in 0..20_000usize {
        let mut payload = vec![0u8; (n % 1024) * 9];
        rng.fill(&mut payload[..]);

        let echoed = EchoBytes::call(&client, payload.clone()).unwrap();
        assert_eq!(echoed, payload, "payload {n} came back altered");
    }

    assert_eq!(client.connection_count(), 1);
    client.dispose();
}

#[test]
fn test_tls13_round_trips() {
    let identity = identity();
    let connector = start_echo_connector(&identity, "TLSv1.3");
    let client = tls_client(&connector, &identity, true);

    let text = "The rain in spain stays mainly in the plain.".to_owned();
    assert_eq!(EchoText::call(&client, text.clone()).unwrap(), text);
    assert_eq!(EchoText::call(&client, text.clone()).unwrap(), text);
    assert_eq!(client.connection_count(), 1);
    client.dispose();
}

#[test]
fn test_tls_without_keep_alive() {
    let identity = identity();
    let connector = start_echo_connector(&identity, "TLSv1.2");
    let client = tls_client(&connector, &identity, false);

    let text = "The rain in spain stays mainly in the plain.".to_owned();
    for _ in 0..3 {
        assert_eq!(EchoText::call(&client, text.clone()).unwrap(), text);
        assert!(!client.is_connected());
    }
    assert_eq!(client.connection_count(), 3);
}

#[test]
fn test_tls_dispose_after_call() {
    let identity = identity();
    let connector = start_echo_connector(&identity, "TLSv1.2");
    let client = tls_client(&connector, &identity, true);

    client.dispose();
    client.dispose();
    assert_eq!(EchoText::call(&client, "x".to_owned()).unwrap(), "x");
    client.dispose();
    client.dispose();
    assert!(!client.is_connected());
}

#[test]
fn test_untrusted_server_is_a_transport_failure() {
    let served = identity();
    let stranger = identity();
    let connector = start_echo_connector(&served, "TLSv1.2");
    let client = tls_client(&connector, &stranger, true);

    let err = EchoText::call(&client, "x".to_owned()).unwrap_err();
    assert!(matches!(err, CallError::Transport(TransportError::Io(_))));
    assert!(!client.is_connected());
}
