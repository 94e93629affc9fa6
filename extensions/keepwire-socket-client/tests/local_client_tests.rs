use example_keepwire_service_definition::echo::{Echo, EchoText};
use example_keepwire_service_definition::greeting::{Greet, Greeting};
use example_keepwire_service_definition::some_test_methods::{Log, SomeTestMethods};
use example_keepwire_service_definition::throw_exception::{
    IO_EXCEPTION, TEST_EXCEPTION_MESSAGE, ThrowDeclared, ThrowException,
};
use keepwire::cookie;
use keepwire::frame::{CallFrame, RemoteFailure, ReturnFrame, Value};
use keepwire::session::CallHandler;
use keepwire_rpc_service::{CallError, RpcCall};
use keepwire_rpc_service_endpoint::{
    EndpointPolicy, EndpointRegistry, InterfaceTable, RpcServiceEndpoint,
};
use keepwire_socket_client::LocalClient;
use std::sync::{Arc, Mutex};

fn endpoint(policy: EndpointPolicy, log_book: Arc<Mutex<Vec<String>>>) -> Arc<RpcServiceEndpoint> {
    let registry = Arc::new(EndpointRegistry::new());
    registry
        .register_interface(
            InterfaceTable::builder::<Greeting>()
                .method::<Greet, _>(|()| Ok("Hello world!".to_owned()))
                .build(),
        )
        .unwrap();
    registry
        .register_interface(
            InterfaceTable::builder::<ThrowException>()
                .method::<ThrowDeclared, _>(|_| {
                    Err(RemoteFailure::new(IO_EXCEPTION, TEST_EXCEPTION_MESSAGE))
                })
                .build(),
        )
        .unwrap();
    registry
        .register_interface(
            InterfaceTable::builder::<SomeTestMethods>()
                .method::<Log, _>(move |message| {
                    log_book.lock().unwrap().push(message);
                    Ok(())
                })
                .build(),
        )
        .unwrap();
    registry
        .register_interface(
            InterfaceTable::builder::<Echo>()
                .method::<EchoText, _>(|text| {
                    cookie::set(Some(text.into_bytes()));
                    Ok("cookie replaced".to_owned())
                })
                .build(),
        )
        .unwrap();

    Arc::new(RpcServiceEndpoint::with_policy(registry, policy))
}

#[test]
fn test_local_call_keeps_the_session() {
    let client = LocalClient::new(endpoint(EndpointPolicy::default(), Default::default()));

    assert_eq!(Greet::call(&client, ()).unwrap(), "Hello world!");
    assert_eq!(Greet::call(&client, ()).unwrap(), "Hello world!");
    assert!(client.is_connected());
    assert_eq!(client.connection_count(), 1);

    client.dispose();
    client.dispose();
    assert!(!client.is_connected());
}

#[test]
fn test_local_call_without_keep_alive_ends_each_session() {
    let client = LocalClient::new(endpoint(EndpointPolicy::default(), Default::default()))
        .with_keep_alive(false);

    Greet::call(&client, ()).unwrap();
    Greet::call(&client, ()).unwrap();
    assert!(!client.is_connected());
    assert_eq!(client.connection_count(), 2);
}

#[test]
fn test_local_declared_failure() {
    let client = LocalClient::new(endpoint(EndpointPolicy::default(), Default::default()));

    let err = ThrowDeclared::call(&client, "x".to_owned()).unwrap_err();
    assert!(matches!(err, CallError::Remote(failure) if failure.kind == IO_EXCEPTION));
}

#[test]
fn test_local_subtype_of_declared_failure() {
    let registry = Arc::new(EndpointRegistry::new());
    registry
        .register_interface(
            InterfaceTable::builder::<ThrowException>()
                .method::<ThrowDeclared, _>(|name| {
                    Err(RemoteFailure::new("FileNotFoundException", format!("{name} is gone"))
                        .with_supertype(IO_EXCEPTION))
                })
                .build(),
        )
        .unwrap();
    let client = LocalClient::new(Arc::new(RpcServiceEndpoint::new(registry)));

    match ThrowDeclared::call(&client, "x".to_owned()) {
        Err(CallError::Remote(failure)) => {
            assert_eq!(failure.kind, "FileNotFoundException");
            assert!(failure.is_kind_of(IO_EXCEPTION));
        }
        other => panic!("expected a declared failure, got {other:?}"),
    }
}

#[test]
fn test_local_in_only() {
    let log_book: Arc<Mutex<Vec<String>>> = Default::default();
    let client = LocalClient::new(endpoint(EndpointPolicy::default(), log_book.clone()));

    Log::call_in_only(&client, "hello".to_owned()).unwrap();
    assert_eq!(*log_book.lock().unwrap(), vec!["hello".to_owned()]);
}

#[test]
fn test_local_frames_carry_the_client_flags() {
    let seen = Arc::new(Mutex::new(None));
    let recorder = seen.clone();
    let handler: Arc<dyn CallHandler> = Arc::new(move |call: CallFrame| -> ReturnFrame {
        *recorder.lock().unwrap() = Some((call.is_in_out(), call.is_keep_alive()));
        ReturnFrame::success(Value::from("ok"))
    });

    let client = LocalClient::new(handler.clone()).with_keep_alive(false);
    assert_eq!(Greet::call(&client, ()).unwrap(), "ok");
    assert_eq!(*seen.lock().unwrap(), Some((true, false)));

    let client = LocalClient::new(handler);
    Log::call_in_only(&client, "x".to_owned()).unwrap();
    assert_eq!(*seen.lock().unwrap(), Some((false, true)));
}

#[test]
fn test_handler_cookie_does_not_leak_into_the_caller() {
    let client = LocalClient::new(endpoint(EndpointPolicy::default(), Default::default()));

    cookie::set(Some(b"mine".to_vec()));
    assert_eq!(EchoText::call(&client, "theirs".to_owned()).unwrap(), "cookie replaced");
    assert_eq!(cookie::get(), Some(b"mine".to_vec()));
    cookie::clear();
}

#[test]
fn test_local_cookie_round_trip() {
    let policy = EndpointPolicy {
        accept_cookies: true,
        send_cookies: true,
        ..EndpointPolicy::default()
    };
    let client =
        LocalClient::new(endpoint(policy, Default::default())).with_cookies(true, true);

    cookie::set(Some(b"mine".to_vec()));
    EchoText::call(&client, "theirs".to_owned()).unwrap();
    assert_eq!(cookie::get(), Some(b"theirs".to_vec()));
    cookie::clear();
}
