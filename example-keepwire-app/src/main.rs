use example_keepwire_app::start_example_connector;
use example_keepwire_service_definition::greeting::Greet;
use example_keepwire_service_definition::some_test_methods::{Add, Log, ThrowUndeclared};
use example_keepwire_service_definition::throw_exception::ThrowDeclared;
use keepwire_rpc_service::RpcCall;
use keepwire_socket_client::{ClientConfig, SocketClient};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Bind to a random available port
    let mut connector = start_example_connector(0)?;
    let port = connector.local_addr().map(|addr| addr.port()).unwrap_or_default();

    {
        let client = SocketClient::new(ClientConfig::for_service("127.0.0.1", port))?;

        println!("greet(): {:?}", Greet::call(&client, ())?);
        println!("add(2, 40): {:?}", Add::call(&client, (2, 40))?);
        Log::call_in_only(&client, "sent without waiting for a reply".to_owned())?;

        // A declared failure comes back as-is, an undeclared one as a
        // transport failure.
        println!(
            "throw_exception(\"x\"): {:?}",
            ThrowDeclared::call(&client, "x".to_owned())
        );
        println!("throw_exception(): {:?}", ThrowUndeclared::call(&client, ()));

        println!("connections opened: {}", client.connection_count());
        client.dispose();
    }

    connector.stop()?;
    Ok(())
}
