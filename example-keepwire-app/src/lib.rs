//! Service implementations for the example definitions, and the wiring that
//! puts them behind a socket connector.

use example_keepwire_service_definition::echo::{Echo, EchoBytes, EchoText};
use example_keepwire_service_definition::greeting::{Greet, Greeting};
use example_keepwire_service_definition::some_test_methods::{
    Add, Log, SomeTestMethods, Sleep, ThrowUndeclared,
};
use example_keepwire_service_definition::throw_exception::{
    IO_EXCEPTION, TEST_EXCEPTION_MESSAGE, ThrowDeclared, ThrowException,
};
use keepwire::ConfigurationError;
use keepwire::frame::RemoteFailure;
use keepwire_rpc_service_endpoint::{
    EndpointPolicy, EndpointRegistry, InterfaceTable, RpcEndpoint, RpcServiceEndpoint,
};
use keepwire_socket_server::{ConnectorConfig, ConnectorError, SocketConnector};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub struct GreetingService;

impl RpcEndpoint for GreetingService {
    fn interfaces(self: Arc<Self>) -> Vec<InterfaceTable> {
        vec![
            InterfaceTable::builder::<Greeting>()
                .method::<Greet, _>(|()| Ok("Hello world!".to_owned()))
                .build(),
        ]
    }
}

pub struct EchoService;

impl RpcEndpoint for EchoService {
    fn interfaces(self: Arc<Self>) -> Vec<InterfaceTable> {
        vec![
            InterfaceTable::builder::<Echo>()
                .method::<EchoText, _>(Ok)
                .method::<EchoBytes, _>(Ok)
                .build(),
        ]
    }
}

pub struct SomeTestMethodsService;

impl RpcEndpoint for SomeTestMethodsService {
    fn interfaces(self: Arc<Self>) -> Vec<InterfaceTable> {
        vec![
            InterfaceTable::builder::<SomeTestMethods>()
                .method::<Add, _>(|(a, b)| {
                    a.checked_add(b)
                        .ok_or_else(|| RemoteFailure::new("ArithmeticException", "integer overflow"))
                })
                .method::<Log, _>(|message| {
                    tracing::info!("remote log: {message}");
                    Ok(())
                })
                .method::<Sleep, _>(|millis| {
                    let millis = u64::try_from(millis).map_err(|_| {
                        RemoteFailure::new("IllegalArgumentException", "negative sleep time")
                    })?;
                    thread::sleep(Duration::from_millis(millis));
                    Ok(())
                })
                .method::<ThrowUndeclared, _>(|()| {
                    Err(RemoteFailure::new("IllegalStateException", TEST_EXCEPTION_MESSAGE))
                })
                .build(),
        ]
    }
}

pub struct ThrowExceptionService;

impl RpcEndpoint for ThrowExceptionService {
    fn interfaces(self: Arc<Self>) -> Vec<InterfaceTable> {
        vec![
            InterfaceTable::builder::<ThrowException>()
                .method::<ThrowDeclared, _>(|_| {
                    Err(RemoteFailure::new(IO_EXCEPTION, TEST_EXCEPTION_MESSAGE))
                })
                .build(),
        ]
    }
}

/// A registry holding every example service.
pub fn example_registry() -> Result<Arc<EndpointRegistry>, ConfigurationError> {
    let registry = Arc::new(EndpointRegistry::new());
    registry.register_endpoint(Arc::new(GreetingService))?;
    registry.register_endpoint(Arc::new(EchoService))?;
    registry.register_endpoint(Arc::new(SomeTestMethodsService))?;
    registry.register_endpoint(Arc::new(ThrowExceptionService))?;
    Ok(registry)
}

/// Starts a plain connector serving the example services on loopback.
/// Port `0` picks a free port; read it back with `local_addr()`.
pub fn start_example_connector(port: u16) -> Result<SocketConnector, ConnectorError> {
    let endpoint = RpcServiceEndpoint::with_policy(example_registry()?, EndpointPolicy::default());

    let mut connector = SocketConnector::new()
        .with_config(ConnectorConfig::bound_to(IpAddr::V4(Ipv4Addr::LOCALHOST), port))?;
    connector.set_handler(Arc::new(endpoint))?;
    connector.start()?;
    Ok(connector)
}
