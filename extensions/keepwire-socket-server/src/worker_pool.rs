use crate::ConnectionSecurity;
use keepwire::constants::STOP_POLL_INTERVAL;
use keepwire::frame::FrameCodecs;
use keepwire::session::{CallHandler, serve_while_running};
use std::collections::HashMap;
use std::io;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use std::thread;
use std::time::{Duration, Instant};

/// What every worker needs to serve a connection.
pub(crate) struct ServeContext {
    pub handler: Arc<dyn CallHandler>,
    pub codecs: FrameCodecs,
    pub security: ConnectionSecurity,
    pub buffer_size: usize,
    pub idle_timeout: Option<Duration>,
}

/// State shared by the workers of one connector run.
///
/// The listener mutex doubles as the accept lock: one worker at a time
/// blocks in `accept`.
pub(crate) struct WorkerPool {
    listener: Mutex<Option<TcpListener>>,
    local_addr: SocketAddr,
    should_run: AtomicBool,
    running: AtomicUsize,
    engaged: AtomicUsize,
    max_threads: usize,
    next_worker: AtomicUsize,
    live_sockets: Mutex<HashMap<u64, TcpStream>>,
    next_connection: AtomicU64,
    context: ServeContext,
}

impl WorkerPool {
    pub fn new(listener: TcpListener, max_threads: usize, context: ServeContext) -> io::Result<Self> {
        Ok(Self {
            local_addr: listener.local_addr()?,
            listener: Mutex::new(Some(listener)),
            should_run: AtomicBool::new(true),
            running: AtomicUsize::new(0),
            engaged: AtomicUsize::new(0),
            max_threads,
            next_worker: AtomicUsize::new(0),
            live_sockets: Mutex::new(HashMap::new()),
            next_connection: AtomicU64::new(0),
            context,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    pub fn engaged(&self) -> usize {
        self.engaged.load(Ordering::SeqCst)
    }

    /// Reserves a slot and starts a worker in it.
    pub fn spawn_worker(self: &Arc<Self>) -> io::Result<()> {
        self.running.fetch_add(1, Ordering::SeqCst);
        self.start_reserved_worker()
    }

    /// Starts a worker for a slot already counted in `running`.
    fn start_reserved_worker(self: &Arc<Self>) -> io::Result<()> {
        let n = self.next_worker.fetch_add(1, Ordering::SeqCst);
        let pool = Arc::clone(self);

        let spawned = thread::Builder::new()
            .name(format!("keepwire-connector-{}-{}", self.local_addr, n))
            .spawn(move || pool.run_worker());

        match spawned {
            Ok(_) => Ok(()),
            Err(err) => {
                self.running.fetch_sub(1, Ordering::SeqCst);
                Err(err)
            }
        }
    }

    fn run_worker(self: Arc<Self>) {
        tracing::debug!("connector worker started");

        while let Some((stream, peer)) = self.accept_next() {
            let engaged = self.engaged.fetch_add(1, Ordering::SeqCst) + 1;
            self.grow_if_saturated(engaged);

            self.serve(stream, peer);

            self.engaged.fetch_sub(1, Ordering::SeqCst);
        }

        self.running.fetch_sub(1, Ordering::SeqCst);
        tracing::debug!("connector worker stopped");
    }

    /// Blocks for the next connection. `None` once the pool is stopping.
    fn accept_next(&self) -> Option<(TcpStream, SocketAddr)> {
        loop {
            let accepted = {
                let guard = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
                if !self.should_run() {
                    return None;
                }
                guard.as_ref()?.accept()
            };

            match accepted {
                Ok(_) if !self.should_run() => return None,
                Ok(pair) => return Some(pair),
                Err(err) if !self.should_run() => {
                    tracing::debug!("accept interrupted by shutdown: {err}");
                    return None;
                }
                Err(err) => tracing::warn!("accept failed: {err}"),
            }
        }
    }

    /// Adds one worker when every running worker holds a connection.
    fn grow_if_saturated(self: &Arc<Self>, engaged: usize) {
        let mut running = self.running.load(Ordering::SeqCst);

        while engaged >= running && running < self.max_threads {
            match self.running.compare_exchange(
                running,
                running + 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => {
                    tracing::debug!("all {running} workers engaged, adding one");
                    if let Err(err) = self.start_reserved_worker() {
                        tracing::error!("could not spawn connector worker: {err}");
                    }
                    return;
                }
                Err(actual) => running = actual,
            }
        }
    }

    fn serve(&self, stream: TcpStream, peer: SocketAddr) {
        tracing::info!("Client connected: {}", peer);
        let connection = self.track(&stream);

        // `shut_down` may have walked the live sockets before this one was
        // tracked.
        if !self.should_run() {
            if let Err(err) = stream.shutdown(Shutdown::Both) {
                tracing::trace!("socket shutdown failed: {err}");
            }
        }

        match self.open_channel(stream) {
            Ok(mut channel) => {
                let served = serve_while_running(
                    channel.as_mut(),
                    &self.context.codecs,
                    self.context.handler.as_ref(),
                    &self.should_run,
                );
                match served {
                    Ok(calls) => tracing::debug!("{peer} made {calls} calls"),
                    Err(err) if self.should_run() => {
                        tracing::warn!("connection with {peer} failed: {err}")
                    }
                    Err(err) => tracing::debug!("connection with {peer} ended by shutdown: {err}"),
                }
                channel.close();
            }
            Err(err) if self.should_run() => {
                tracing::warn!("could not establish a channel with {peer}: {err}")
            }
            Err(err) => tracing::debug!("channel with {peer} abandoned by shutdown: {err}"),
        }

        if let Some(id) = connection {
            self.live_sockets().remove(&id);
        }
        tracing::info!("Client disconnected: {}", peer);
    }

    fn open_channel(
        &self,
        stream: TcpStream,
    ) -> io::Result<Box<dyn keepwire::transport::Channel>> {
        if let Some(timeout) = self.context.idle_timeout {
            stream.set_read_timeout(Some(timeout))?;
        }
        self.context.security.open(stream, self.context.buffer_size)
    }

    /// Keeps a handle to `stream` so `stop` can unblock its worker.
    fn track(&self, stream: &TcpStream) -> Option<u64> {
        match stream.try_clone() {
            Ok(handle) => {
                let id = self.next_connection.fetch_add(1, Ordering::SeqCst);
                self.live_sockets().insert(id, handle);
                Some(id)
            }
            Err(err) => {
                tracing::debug!("connection will not be interruptible: {err}");
                None
            }
        }
    }

    fn live_sockets(&self) -> MutexGuard<'_, HashMap<u64, TcpStream>> {
        self.live_sockets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn should_run(&self) -> bool {
        self.should_run.load(Ordering::SeqCst)
    }

    /// Stops accepting, interrupts live connections and waits up to
    /// `timeout` for the workers. The listener is closed before returning
    /// in any case.
    ///
    /// Returns `true` if every worker exited in time.
    pub fn shut_down(&self, timeout: Duration) -> bool {
        self.should_run.store(false, Ordering::SeqCst);

        for socket in self.live_sockets().values() {
            if let Err(err) = socket.shutdown(Shutdown::Both) {
                tracing::trace!("socket shutdown failed: {err}");
            }
        }
        self.wake_acceptor();

        let deadline = Instant::now() + timeout;
        while self.running() > 0 && Instant::now() < deadline {
            thread::sleep(STOP_POLL_INTERVAL);
        }

        let drained = self.running() == 0;
        if !drained {
            tracing::warn!(
                "{} connector workers still running after {:?}",
                self.running(),
                timeout
            );
        }

        self.close_listener();
        drained
    }

    /// Drops the listener, waking the acceptor again for as long as a
    /// worker still holds the accept lock.
    fn close_listener(&self) {
        loop {
            match self.listener.try_lock() {
                Ok(mut guard) => {
                    drop(guard.take());
                    return;
                }
                Err(TryLockError::Poisoned(poisoned)) => {
                    drop(poisoned.into_inner().take());
                    return;
                }
                Err(TryLockError::WouldBlock) => {
                    self.wake_acceptor();
                    thread::sleep(STOP_POLL_INTERVAL);
                }
            }
        }
    }

    /// Unblocks the worker sitting in `accept` with a throwaway connection.
    fn wake_acceptor(&self) {
        let mut target = self.local_addr;
        if target.ip().is_unspecified() {
            target.set_ip(match target {
                SocketAddr::V4(_) => std::net::Ipv4Addr::LOCALHOST.into(),
                SocketAddr::V6(_) => std::net::Ipv6Addr::LOCALHOST.into(),
            });
        }

        if let Err(err) = TcpStream::connect_timeout(&target, STOP_POLL_INTERVAL * 10) {
            tracing::debug!("could not wake the acceptor at {target}: {err}");
        }
    }
}
