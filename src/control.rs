//! Control-channel session: outbound connect, command send, verdict check

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::TransferError;
use crate::framing;
use crate::protocol::{timeouts, ACK};

/// Open the control connection. Resolution happens here too; each resolved
/// address is tried once under the connect deadline. The returned stream
/// carries a read timeout so the later verdict wait is bounded.
pub fn connect(host: &str, port: u16) -> Result<TcpStream, TransferError> {
    let target = format!("{host}:{port}");
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|e| TransferError::connect(format!("resolve {target}"), e))?;

    let mut last_err: Option<io::Error> = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, Duration::from_millis(timeouts::CONNECT_MS)) {
            Ok(stream) => {
                let _ = stream.set_read_timeout(Some(Duration::from_millis(timeouts::RECV_MS)));
                let _ = stream.set_nodelay(true);
                return Ok(stream);
            }
            Err(e) => last_err = Some(e),
        }
    }
    let cause = last_err
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no addresses resolved"));
    Err(TransferError::connect(format!("connect {target}"), cause))
}

/// Serialize the command vector as one framed, space-separated message.
pub fn send_commands<W: Write>(stream: &mut W, tokens: &[String]) -> Result<(), TransferError> {
    framing::send_tokens(stream, tokens)
}

/// Receive the server's one framed verdict. An exact match of the
/// acknowledgement literal means the command was accepted; anything else is
/// a rejection carrying the server's text verbatim.
pub fn check_ack<R: Read>(stream: &mut R) -> Result<(), TransferError> {
    let reply = framing::receive(stream)?;
    if reply == ACK {
        Ok(())
    } else {
        Err(TransferError::Rejected(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_literal_is_accepted() {
        let mut wire: &[u8] = b"GOOD@@@";
        assert!(check_ack(&mut wire).is_ok());
    }

    #[test]
    fn anything_else_is_a_rejection_with_verbatim_text() {
        let mut wire: &[u8] = b"NO SUCH FILE@@@";
        match check_ack(&mut wire).unwrap_err() {
            TransferError::Rejected(msg) => assert_eq!(msg, "NO SUCH FILE"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn near_miss_of_the_ack_is_still_a_rejection() {
        // Exact textual match only; the ack with padding is not the ack.
        let mut wire: &[u8] = b"GOOD \n@@@";
        assert!(matches!(
            check_ack(&mut wire).unwrap_err(),
            TransferError::Rejected(_)
        ));
    }

    #[test]
    fn truncated_verdict_is_a_transport_error() {
        let mut wire: &[u8] = b"GOO";
        assert!(matches!(
            check_ack(&mut wire).unwrap_err(),
            TransferError::Transport(_)
        ));
    }
}
