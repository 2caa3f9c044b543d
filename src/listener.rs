//! Passive data-channel listener
//!
//! Role inversion is the defining quirk of this protocol: the client binds
//! and listens, and the server connects back after it parses the command.
//! The listener must therefore be live before any command byte goes out,
//! or the server's connect can race into nothing.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use socket2::{Domain, Protocol, Socket, Type};

use crate::error::TransferError;
use crate::protocol::{timeouts, LISTEN_BACKLOG};

/// A bound, listening data endpoint. Accepts exactly one connection in its
/// lifetime; the type is consumed by the accept so it cannot be reused.
#[derive(Debug)]
pub struct DataListener {
    inner: TcpListener,
}

impl DataListener {
    /// Bind the wildcard address on `port` and listen with the fixed
    /// backlog. Failure here (port in use, privileged port) must surface
    /// before the command is sent, so the server never works for a
    /// connection that cannot land.
    pub fn bind(port: u16) -> Result<Self, TransferError> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))
            .map_err(|e| TransferError::connect("create data socket", e))?;
        socket
            .bind(&addr.into())
            .map_err(|e| TransferError::connect(format!("bind port {port}"), e))?;
        socket
            .listen(LISTEN_BACKLOG)
            .map_err(|e| TransferError::connect(format!("listen on port {port}"), e))?;
        Ok(DataListener {
            inner: socket.into(),
        })
    }

    /// Port actually bound. Differs from the requested port only when the
    /// caller asked for 0 (tests do).
    pub fn local_port(&self) -> io::Result<u16> {
        self.inner.local_addr().map(|a| a.port())
    }

    /// Wait for the server's single inbound connection, bounded by
    /// `deadline`. Consumes the listener: the listening socket closes as
    /// soon as the one data connection is in hand.
    pub fn accept_within(self, deadline: Duration) -> Result<TcpStream, TransferError> {
        self.inner
            .set_nonblocking(true)
            .map_err(|e| TransferError::transport("accept", e))?;
        let start = Instant::now();
        loop {
            match self.inner.accept() {
                Ok((stream, _peer)) => {
                    stream
                        .set_nonblocking(false)
                        .map_err(|e| TransferError::transport("accept", e))?;
                    let _ = stream.set_read_timeout(Some(Duration::from_millis(timeouts::RECV_MS)));
                    let _ = stream.set_nodelay(true);
                    return Ok(stream);
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if start.elapsed() >= deadline {
                        return Err(TransferError::Transport(
                            "timed out waiting for the server's data connection".into(),
                        ));
                    }
                    thread::sleep(Duration::from_millis(timeouts::ACCEPT_POLL_MS));
                }
                Err(e) => return Err(TransferError::transport("accept", e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn accepts_the_one_inbound_connection() {
        let listener = DataListener::bind(0).unwrap();
        let port = listener.local_port().unwrap();
        let peer = thread::spawn(move || {
            let mut s = TcpStream::connect(("127.0.0.1", port)).unwrap();
            s.write_all(b"hello@@@").unwrap();
        });
        let mut data = listener.accept_within(Duration::from_secs(5)).unwrap();
        peer.join().unwrap();
        assert_eq!(crate::framing::receive(&mut data).unwrap(), "hello");
    }

    #[test]
    fn accept_deadline_lapses_into_a_transport_error() {
        let listener = DataListener::bind(0).unwrap();
        let err = listener
            .accept_within(Duration::from_millis(60))
            .unwrap_err();
        assert!(matches!(err, TransferError::Transport(_)));
    }

    #[test]
    fn binding_an_occupied_port_fails() {
        let holder = DataListener::bind(0).unwrap();
        let port = holder.local_port().unwrap();
        assert!(matches!(
            DataListener::bind(port).unwrap_err(),
            TransferError::Connect { .. }
        ));
    }
}
