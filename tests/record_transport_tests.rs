use keepwire::io::CursorBuffer;
use keepwire::tls::{EngineResult, EngineStatus, HandshakeStatus, RecordTransport, TlsEngine};
use std::io;
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

const GREETING: &[u8] = b"hi";
const CLOSE_MARKER: u8 = 0;

/// An engine with a scripted handshake and a trivial record format:
/// `[len u8][payload]`, where a zero length is the close notification.
struct ScriptedEngine {
    script: Vec<HandshakeStatus>,
    step: usize,
    started: bool,
    tasks_run: Arc<AtomicUsize>,
    outbound_closed: bool,
    close_sent: bool,
    inbound_done: bool,
    /// Report `Closed` while unwrapping handshake records.
    fail_handshake: bool,
}

impl ScriptedEngine {
    fn new(tasks_run: Arc<AtomicUsize>) -> Self {
        Self {
            script: vec![
                HandshakeStatus::NeedTask,
                HandshakeStatus::NeedWrap,
                HandshakeStatus::NeedUnwrap,
            ],
            step: 0,
            started: false,
            tasks_run,
            outbound_closed: false,
            close_sent: false,
            inbound_done: false,
            fail_handshake: false,
        }
    }

    fn current(&self) -> Option<HandshakeStatus> {
        if self.started {
            self.script.get(self.step).copied()
        } else {
            None
        }
    }

    fn result(&self, status: EngineStatus, consumed: usize, produced: usize) -> EngineResult {
        EngineResult {
            status,
            handshake_status: self.handshake_status(),
            bytes_consumed: consumed,
            bytes_produced: produced,
        }
    }
}

impl TlsEngine for ScriptedEngine {
    fn begin_handshake(&mut self) -> io::Result<()> {
        self.started = true;
        Ok(())
    }

    fn handshake_status(&self) -> HandshakeStatus {
        self.current().unwrap_or(HandshakeStatus::NotHandshaking)
    }

    fn wrap(
        &mut self,
        src: &mut CursorBuffer,
        dst: &mut CursorBuffer,
    ) -> io::Result<EngineResult> {
        if self.current() == Some(HandshakeStatus::NeedWrap) {
            dst.put_slice(GREETING);
            self.step += 1;
            return Ok(self.result(EngineStatus::Ok, 0, GREETING.len()));
        }

        if self.outbound_closed {
            if self.close_sent {
                return Ok(self.result(EngineStatus::Closed, 0, 0));
            }
            dst.put_u8(CLOSE_MARKER);
            self.close_sent = true;
            return Ok(self.result(EngineStatus::Closed, 0, 1));
        }

        let fragment = src.remaining().min(255).min(dst.remaining().saturating_sub(1));
        if fragment == 0 {
            return Ok(self.result(EngineStatus::BufferOverflow, 0, 0));
        }
        dst.put_u8(fragment as u8);
        dst.put_slice(&src.chunk()[..fragment]);
        src.advance(fragment);
        Ok(self.result(EngineStatus::Ok, fragment, fragment + 1))
    }

    fn unwrap(
        &mut self,
        src: &mut CursorBuffer,
        dst: &mut CursorBuffer,
    ) -> io::Result<EngineResult> {
        if self.current() == Some(HandshakeStatus::NeedUnwrap) {
            if self.fail_handshake {
                return Ok(self.result(EngineStatus::Closed, 0, 0));
            }
            if src.remaining() < GREETING.len() {
                return Ok(self.result(EngineStatus::BufferUnderflow, 0, 0));
            }
            if &src.chunk()[..GREETING.len()] != GREETING {
                return Err(io::Error::new(io::ErrorKind::InvalidData, "bad greeting"));
            }
            src.advance(GREETING.len());
            self.step += 1;
            return Ok(self.result(EngineStatus::Ok, GREETING.len(), 0));
        }

        if self.inbound_done {
            return Ok(self.result(EngineStatus::Closed, 0, 0));
        }

        let Some(&length) = src.chunk().first() else {
            return Ok(self.result(EngineStatus::BufferUnderflow, 0, 0));
        };
        if length == CLOSE_MARKER {
            src.advance(1);
            self.inbound_done = true;
            return Ok(self.result(EngineStatus::Closed, 1, 0));
        }

        let length = length as usize;
        if src.remaining() < length + 1 {
            return Ok(self.result(EngineStatus::BufferUnderflow, 0, 0));
        }
        if dst.remaining() < length {
            return Ok(self.result(EngineStatus::BufferOverflow, 0, 0));
        }
        dst.put_slice(&src.chunk()[1..=length]);
        src.advance(length + 1);
        Ok(self.result(EngineStatus::Ok, length + 1, length))
    }

    fn run_delegated_task(&mut self) -> io::Result<()> {
        self.tasks_run.fetch_add(1, Ordering::SeqCst);
        if self.current() == Some(HandshakeStatus::NeedTask) {
            self.step += 1;
        }
        Ok(())
    }

    fn close_outbound(&mut self) {
        self.outbound_closed = true;
    }

    fn close_inbound(&mut self) {
        self.inbound_done = true;
    }

    fn is_outbound_done(&self) -> bool {
        self.close_sent
    }

    fn is_inbound_done(&self) -> bool {
        self.inbound_done
    }

    fn application_buffer_size(&self) -> usize {
        255
    }

    fn packet_buffer_size(&self) -> usize {
        512
    }
}

fn socket_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    let (server, _) = listener.accept().unwrap();
    (client, server)
}

fn read_exactly(transport: &mut RecordTransport<TcpStream>, expected_len: usize) -> Vec<u8> {
    let mut received = Vec::new();
    let mut app_in = CursorBuffer::with_capacity(255);
    while received.len() < expected_len {
        app_in.clear();
        match transport.read(&mut app_in).unwrap() {
            Some(_) => received.extend_from_slice(app_in.chunk()),
            None => break,
        }
    }
    received
}

#[test]
fn test_handshake_data_and_closing_exchange() {
    let (client_socket, server_socket) = socket_pair();
    let tasks_run = Arc::new(AtomicUsize::new(0));

    let payload: Vec<u8> = (0..2000u32).map(|i| (i % 251) as u8).collect();
    let expected = payload.clone();

    let server_tasks = tasks_run.clone();
    let server = thread::spawn(move || {
        let engine = Box::new(ScriptedEngine::new(server_tasks));
        let mut transport = RecordTransport::new(server_socket, engine);
        transport.handshake().unwrap();

        let received = read_exactly(&mut transport, expected.len());

        // Echo it back, then wait for the client's close notification.
        let mut app_out = CursorBuffer::with_capacity(received.len());
        app_out.put_slice(&received);
        app_out.flip();
        transport.write(&mut app_out).unwrap();

        transport.read_closing_message().unwrap();
        assert!(transport.engine().is_inbound_done());
        transport.write_closing_message().unwrap();
        received
    });

    let engine = Box::new(ScriptedEngine::new(tasks_run.clone()));
    let mut transport = RecordTransport::new(client_socket, engine);
    transport.handshake().unwrap();

    let mut app_out = CursorBuffer::with_capacity(payload.len());
    app_out.put_slice(&payload);
    app_out.flip();
    transport.write(&mut app_out).unwrap();
    assert!(!app_out.has_remaining());

    let echoed = read_exactly(&mut transport, payload.len());
    assert_eq!(echoed, payload);

    transport.write_closing_message().unwrap();
    transport.read_closing_message().unwrap();

    assert_eq!(server.join().unwrap(), payload);
    assert_eq!(tasks_run.load(Ordering::SeqCst), 2, "one delegated task per side");
}

#[test]
fn test_read_after_close_notification_is_end_of_stream() {
    let (client_socket, server_socket) = socket_pair();
    let tasks_run = Arc::new(AtomicUsize::new(0));

    let server_tasks = tasks_run.clone();
    let server = thread::spawn(move || {
        let mut transport =
            RecordTransport::new(server_socket, Box::new(ScriptedEngine::new(server_tasks)));
        transport.handshake().unwrap();
        transport.write_closing_message().unwrap();
    });

    let mut transport =
        RecordTransport::new(client_socket, Box::new(ScriptedEngine::new(tasks_run)));
    transport.handshake().unwrap();

    let mut app_in = CursorBuffer::with_capacity(255);
    assert_eq!(transport.read(&mut app_in).unwrap(), None);
    server.join().unwrap();
}

#[test]
fn test_peer_vanishing_mid_handshake_is_unexpected_eof() {
    let (client_socket, server_socket) = socket_pair();
    drop(server_socket);

    let engine = Box::new(ScriptedEngine::new(Arc::new(AtomicUsize::new(0))));
    let mut transport = RecordTransport::new(client_socket, engine);

    let err = transport.handshake().unwrap_err();
    assert!(
        matches!(
            err.kind(),
            io::ErrorKind::UnexpectedEof
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::BrokenPipe
        ),
        "unexpected error kind: {err}"
    );
}

#[test]
fn test_unexpected_handshake_status_is_fatal() {
    let (client_socket, server_socket) = socket_pair();

    let server = thread::spawn(move || {
        let engine = ScriptedEngine::new(Arc::new(AtomicUsize::new(0)));
        let mut transport = RecordTransport::new(server_socket, Box::new(engine));
        // The client bails out; this side only needs to get past its wrap.
        let _ = transport.handshake();
    });

    let mut engine = ScriptedEngine::new(Arc::new(AtomicUsize::new(0)));
    engine.fail_handshake = true;
    let mut transport = RecordTransport::new(client_socket, Box::new(engine));

    let err = transport.handshake().unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);

    drop(transport);
    server.join().unwrap();
}

#[test]
fn test_handshake_requires_empty_buffers() {
    let (client_socket, server_socket) = socket_pair();
    let tasks_run = Arc::new(AtomicUsize::new(0));

    let server_tasks = tasks_run.clone();
    let server = thread::spawn(move || {
        let mut transport =
            RecordTransport::new(server_socket, Box::new(ScriptedEngine::new(server_tasks)));
        transport.handshake().unwrap();
        let mut app_out = CursorBuffer::with_capacity(8);
        app_out.put_slice(b"leftover");
        app_out.flip();
        transport.write(&mut app_out).unwrap();
        transport
    });

    let mut transport =
        RecordTransport::new(client_socket, Box::new(ScriptedEngine::new(tasks_run)));
    transport.handshake().unwrap();
    let server_transport = server.join().unwrap();

    // Wait until the record is buffered but not yet unwrapped.
    while transport.buffered_ciphertext() == 0 {
        let mut app_in = CursorBuffer::with_capacity(0);
        if transport.read(&mut app_in).is_err() {
            break;
        }
    }

    assert!(transport.handshake().is_err());
    drop(server_transport);
}
