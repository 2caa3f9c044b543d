//! Single-transaction driver: the fixed dual-channel choreography
//!
//! Order matters and never varies: connect control, open the passive
//! listener, send the command vector, check the verdict, accept the
//! server's data connection, drain its one message, dispatch. A rejection
//! returns before any accept is attempted. Sockets close by drop on every
//! exit path, in reverse order of acquisition.

use std::path::PathBuf;
use std::time::Duration;

use crate::control;
use crate::error::TransferError;
use crate::framing;
use crate::listener::DataListener;
use crate::protocol::timeouts;
use crate::request::{Operation, Request};
use crate::sink;

/// What a completed transaction produced.
#[derive(Debug)]
pub enum Outcome {
    /// Directory listing text, rendered verbatim by the caller.
    Listing(String),
    /// File written under the collision-resolved path, `bytes` long.
    Saved { path: PathBuf, bytes: u64 },
}

/// Run one transaction to completion.
pub fn run(req: &Request) -> Result<Outcome, TransferError> {
    let mut control = control::connect(&req.host, req.control_port)?;

    // Listening must be live before the command goes out; the server may
    // connect back the moment it parses the data port token.
    let listener = DataListener::bind(req.data_port)?;

    control::send_commands(&mut control, &req.command_tokens())?;
    control::check_ack(&mut control)?;

    let mut data = listener.accept_within(Duration::from_millis(timeouts::ACCEPT_MS))?;

    match &req.operation {
        Operation::List => {
            eprintln!(
                "Receiving directory listing from {}:{}",
                req.host, req.data_port
            );
            let listing = framing::receive(&mut data)?;
            Ok(Outcome::Listing(listing))
        }
        Operation::Get { filename } => {
            eprintln!("Receiving {} from {}:{}", filename, req.host, req.data_port);
            let payload = framing::receive(&mut data)?;
            let path = sink::persist(&req.out_dir, filename, &payload)?;
            if path.file_name() != Some(std::ffi::OsStr::new(filename)) {
                eprintln!("Duplicated file name, writing to \"{}\"", path.display());
            }
            Ok(Outcome::Saved {
                path,
                bytes: payload.len() as u64,
            })
        }
    }
}
