//! ftget - minimal dual-channel file transfer client
//!
//! Connects to the server's control endpoint, opens a passive data port,
//! sends one command, and receives one directory listing or one file.

use clap::{Parser, Subcommand};
use std::io::stdout;
use std::path::PathBuf;

use ftget::error::TransferError;
use ftget::log::{TransferLog, TransferLogEntry, TransferStatus};
use ftget::request::{Operation, Request};
use ftget::session::{self, Outcome};
use ftget::sink;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Client for a dual-channel, sentinel-framed file transfer protocol"
)]
struct Args {
    /// Server host name or address
    host: String,

    /// Server control port
    port: u16,

    #[command(subcommand)]
    command: Command,

    /// Directory to write downloaded files into
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Write JSONL log entries to file
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Request the server's directory listing
    List {
        /// Local port to receive the data connection on
        data_port: u16,
    },
    /// Fetch one file from the server
    Get {
        /// Name of the file to fetch
        file: String,
        /// Local port to receive the data connection on
        data_port: u16,
    },
}

fn main() {
    // Set up Ctrl-C handler
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted by user. Exiting (Ctrl-C)...");
        // Exit immediately with 130 (128 + SIGINT)
        std::process::exit(130);
    })
    .expect("Error setting Ctrl-C handler");

    let args = Args::parse();

    let (operation, data_port) = match args.command {
        Command::List { data_port } => (Operation::List, data_port),
        Command::Get { file, data_port } => (Operation::Get { filename: file }, data_port),
    };

    let request = match Request::new(
        args.host,
        args.port,
        data_port,
        operation,
        args.out_dir,
    ) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("ftget: {e}");
            std::process::exit(e.exit_code());
        }
    };

    let log = args.log_file.as_deref().map(TransferLog::new);
    let server = format!("{}:{}", request.host, request.control_port);

    match session::run(&request) {
        Ok(Outcome::Listing(listing)) => {
            if let Err(e) = sink::render_listing(&mut stdout(), &listing) {
                fail(&request, &server, log.as_ref(), e);
            }
            record(
                log.as_ref(),
                &request,
                &server,
                TransferStatus::Completed,
                listing.len() as u64,
                None,
                None,
            );
        }
        Ok(Outcome::Saved { path, bytes }) => {
            println!(
                "File transfer complete. File was written to \"{}\"",
                path.display()
            );
            record(
                log.as_ref(),
                &request,
                &server,
                TransferStatus::Completed,
                bytes,
                Some(path),
                None,
            );
        }
        Err(e) => fail(&request, &server, log.as_ref(), e),
    }
}

fn fail(request: &Request, server: &str, log: Option<&TransferLog>, err: TransferError) -> ! {
    let status = match &err {
        // The server's own diagnostic, shown verbatim the way the protocol
        // intends it for the human operator.
        TransferError::Rejected(message) => {
            eprintln!("{server} says");
            eprintln!("{message}");
            TransferStatus::Rejected
        }
        other => {
            eprintln!("ftget: {other}");
            TransferStatus::Failed
        }
    };
    record(log, request, server, status, 0, None, Some(err.to_string()));
    std::process::exit(err.exit_code());
}

fn record(
    log: Option<&TransferLog>,
    request: &Request,
    server: &str,
    status: TransferStatus,
    bytes: u64,
    output: Option<PathBuf>,
    error: Option<String>,
) {
    if let Some(log) = log {
        let mut entry =
            TransferLogEntry::now(server.to_string(), request.command_tokens(), status);
        entry.bytes_received = bytes;
        entry.output = output;
        entry.error = error;
        if let Err(e) = log.add_entry(entry) {
            eprintln!("ftget: transfer log: {e}");
        }
    }
}
