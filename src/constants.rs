use std::time::Duration;

/// Default capacity of the plaintext windows used by socket channels.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Number of workers a connector starts with.
pub const DEFAULT_CORE_THREADS: usize = 4;

/// Ceiling for lazy worker pool growth.
pub const DEFAULT_MAX_THREADS: usize = 10;

/// How long `stop()` waits for workers before closing the listener anyway.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_millis(1000);

/// Poll interval used while waiting for workers to exit.
pub const STOP_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// TLS protocol name used by servers when none is configured.
pub const DEFAULT_SERVER_TLS_PROTOCOL: &str = "TLSv1.2";

/// TLS protocol name used by clients when none is configured.
pub const DEFAULT_CLIENT_TLS_PROTOCOL: &str = "TLS";

/// Largest plaintext fragment a single TLS record carries.
pub const TLS_MAX_PLAINTEXT_FRAGMENT: usize = 16 * 1024;

/// Room for one full TLS record: header, fragment, MAC/tag and padding.
pub const TLS_PACKET_BUFFER_SIZE: usize = TLS_MAX_PLAINTEXT_FRAGMENT + 2048 + 5;

/// Version byte written in front of every frame by the default codec.
pub const FRAME_SCHEMA_VERSION: u8 = 1;

/// Size of the frame prefix: schema version (u8) + body length (u32 LE).
pub const FRAME_PREFIX_SIZE: usize = 5;

/// Offset of the 4-byte body length inside the frame prefix.
pub const FRAME_LENGTH_OFFSET: usize = 1;

/// Upper bound accepted for a single encoded frame body.
pub const MAX_FRAME_BODY_SIZE: usize = 64 * 1024 * 1024;
