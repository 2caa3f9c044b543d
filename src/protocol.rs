//! Shared wire constants for the sentinel-framed transfer protocol

/// End-of-message marker on both channels. Payload text must never contain
/// this sequence; the protocol has no other way to find a message boundary.
pub const TERMINATOR: &str = "@@@";

/// Byte written after each command token on the control channel.
pub const SEPARATOR: u8 = b' ';

/// Literal acknowledgement the server sends when it accepts a command.
/// Matching is exact; anything else is the server's error text.
pub const ACK: &str = "GOOD";

/// Read chunk size while draining a framed message.
pub const RECV_CHUNK: usize = 1024;

/// Pending-connection queue depth for the passive data listener. Only one
/// connection is ever accepted per transaction.
pub const LISTEN_BACKLOG: i32 = 5;

/// Command selector tokens understood by the server.
pub mod command {
    pub const LIST: &str = "-l";
    pub const GET: &str = "-g";
}

// Centralized deadlines. The wire protocol itself has none; these bound the
// worst-case hang when a peer never responds.
pub mod timeouts {
    /// Control connect deadline (ms).
    pub const CONNECT_MS: u64 = 10_000;

    /// How long to wait for the server to open the data connection (ms).
    /// The server connects on its own schedule after parsing the command.
    pub const ACCEPT_MS: u64 = 30_000;

    /// Per-read deadline while draining a framed message (ms).
    pub const RECV_MS: u64 = 30_000;

    /// Poll interval for the bounded accept loop (ms).
    pub const ACCEPT_POLL_MS: u64 = 20;
}
