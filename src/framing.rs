//! Sentinel-terminated message framing shared by the control and data channels
//!
//! A message is a run of text of any length followed by the 3-byte
//! terminator. Nothing here owns a socket; both primitives work on any
//! connected stream endpoint, which also makes them testable against
//! in-memory buffers.

use std::io::{Read, Write};

use crate::error::TransferError;
use crate::protocol::{RECV_CHUNK, SEPARATOR, TERMINATOR};

/// Write each token followed by a single separator byte, then the
/// terminator. One logical message; no acknowledgement is awaited here.
///
/// Tokens must not contain the separator or the terminator sequence, or the
/// receiver cannot tell tokens from boundaries. Enforced upstream at
/// request validation.
pub fn send_tokens<W: Write>(w: &mut W, tokens: &[String]) -> Result<(), TransferError> {
    for token in tokens {
        w.write_all(token.as_bytes())
            .map_err(|e| TransferError::transport("send", e))?;
        w.write_all(&[SEPARATOR])
            .map_err(|e| TransferError::transport("send", e))?;
    }
    w.write_all(TERMINATOR.as_bytes())
        .map_err(|e| TransferError::transport("send", e))?;
    w.flush().map_err(|e| TransferError::transport("send", e))?;
    Ok(())
}

/// Read fixed-size chunks until the terminator appears in the accumulated
/// bytes, strip one trailing occurrence, and decode.
///
/// The terminator may arrive split across reads, so the scan always covers
/// the tail of what was already buffered plus the new chunk. The whole
/// message is buffered before returning; bytes are consumed irreversibly
/// and one call drains exactly one message.
pub fn receive<R: Read>(r: &mut R) -> Result<String, TransferError> {
    let term = TERMINATOR.as_bytes();
    let mut buf: Vec<u8> = Vec::new();
    let mut chunk = [0u8; RECV_CHUNK];
    loop {
        // Only this region can newly contain the terminator: the last two
        // already-scanned bytes plus whatever the next read appends.
        let scan_from = buf.len().saturating_sub(term.len() - 1);
        let n = r
            .read(&mut chunk)
            .map_err(|e| TransferError::transport("receive", e))?;
        if n == 0 {
            return Err(TransferError::Transport(
                "connection closed before message terminator".into(),
            ));
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf[scan_from..].windows(term.len()).any(|w| w == term) {
            break;
        }
    }
    if buf.ends_with(term) {
        buf.truncate(buf.len() - term.len());
    }
    String::from_utf8(buf)
        .map_err(|_| TransferError::Transport("received bytes are not valid UTF-8".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Delivers one byte per read, to exercise arbitrary chunk boundaries.
    struct Trickle<'a> {
        data: &'a [u8],
        pos: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            if self.pos >= self.data.len() {
                return Ok(0);
            }
            out[0] = self.data[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    fn tokens(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn send_writes_separators_then_terminator() {
        let mut wire = Vec::new();
        send_tokens(&mut wire, &tokens(&["-g", "report.pdf", "3000"])).unwrap();
        assert_eq!(wire, b"-g report.pdf 3000 @@@");
    }

    #[test]
    fn round_trip_reconstructs_token_sequence() {
        let sent = tokens(&["-l", "4040"]);
        let mut wire = Vec::new();
        send_tokens(&mut wire, &sent).unwrap();
        let got = receive(&mut wire.as_slice()).unwrap();
        let got_tokens: Vec<&str> = got.split_whitespace().collect();
        assert_eq!(got_tokens, vec!["-l", "4040"]);
    }

    #[test]
    fn receive_strips_one_trailing_terminator() {
        let mut wire: &[u8] = b"a.txt\nb.txt\n@@@";
        assert_eq!(receive(&mut wire).unwrap(), "a.txt\nb.txt\n");
    }

    #[test]
    fn receive_of_bare_terminator_is_empty_message() {
        let mut wire: &[u8] = b"@@@";
        assert_eq!(receive(&mut wire).unwrap(), "");
    }

    #[test]
    fn terminator_split_across_reads_is_still_found() {
        let mut r = Trickle {
            data: b"PDFDATA@@@",
            pos: 0,
        };
        assert_eq!(receive(&mut r).unwrap(), "PDFDATA");
    }

    #[test]
    fn message_larger_than_one_chunk() {
        let body = "x".repeat(RECV_CHUNK * 3 + 17);
        let mut wire = Vec::from(body.as_bytes());
        wire.extend_from_slice(TERMINATOR.as_bytes());
        assert_eq!(receive(&mut wire.as_slice()).unwrap(), body);
    }

    #[test]
    fn eof_before_terminator_is_a_transport_error() {
        let mut wire: &[u8] = b"half a mess";
        let err = receive(&mut wire).unwrap_err();
        assert!(matches!(err, TransferError::Transport(_)));
    }

    #[test]
    fn invalid_utf8_is_a_transport_error() {
        let mut wire: &[u8] = b"\xff\xfe@@@";
        let err = receive(&mut wire).unwrap_err();
        assert!(matches!(err, TransferError::Transport(_)));
    }
}
