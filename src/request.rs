//! Validated invocation record handed to the session core
//!
//! The front-end parses and validates once; everything past this point
//! works with a `Request` by value and never looks at `argv`.

use std::path::PathBuf;

use crate::error::TransferError;
use crate::protocol::{command, SEPARATOR, TERMINATOR};

/// Which server-side operation the invocation requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Directory listing, rendered to stdout.
    List,
    /// Fetch one file by name.
    Get { filename: String },
}

/// Everything one transaction needs.
#[derive(Debug, Clone)]
pub struct Request {
    /// Server host name or address (connect use).
    pub host: String,
    /// Server control port.
    pub control_port: u16,
    /// Local port to listen on for the server's data connection.
    pub data_port: u16,
    pub operation: Operation,
    /// Directory downloaded files are written into.
    pub out_dir: PathBuf,
}

impl Request {
    pub fn new(
        host: String,
        control_port: u16,
        data_port: u16,
        operation: Operation,
        out_dir: PathBuf,
    ) -> Result<Self, TransferError> {
        if host.is_empty() {
            return Err(TransferError::Usage("server host must not be empty".into()));
        }
        if control_port == 0 || data_port == 0 {
            return Err(TransferError::Usage("ports must be nonzero".into()));
        }
        if let Operation::Get { filename } = &operation {
            validate_filename(filename)?;
        }
        Ok(Request {
            host,
            control_port,
            data_port,
            operation,
            out_dir,
        })
    }

    /// The ordered token sequence sent to the server. The data port rides
    /// along as the final token so the server knows where to connect back.
    pub fn command_tokens(&self) -> Vec<String> {
        match &self.operation {
            Operation::List => vec![command::LIST.to_string(), self.data_port.to_string()],
            Operation::Get { filename } => vec![
                command::GET.to_string(),
                filename.clone(),
                self.data_port.to_string(),
            ],
        }
    }
}

/// Tokens travel space-separated and sentinel-terminated, so a filename
/// containing either would corrupt the framing; the original protocol
/// leaves that undefined, we refuse it up front. Path separators and NUL
/// are refused too so the download lands inside the destination directory.
fn validate_filename(name: &str) -> Result<(), TransferError> {
    if name.is_empty() {
        return Err(TransferError::Usage("filename must not be empty".into()));
    }
    let sep = SEPARATOR as char;
    if name.contains(sep) {
        return Err(TransferError::Usage(format!(
            "filename {name:?} contains the token separator {sep:?}"
        )));
    }
    if name.contains(TERMINATOR) {
        return Err(TransferError::Usage(format!(
            "filename {name:?} contains the message terminator {TERMINATOR:?}"
        )));
    }
    if name.contains('/') || name.contains('\\') || name.contains('\0') {
        return Err(TransferError::Usage(format!(
            "filename {name:?} must be a bare name"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_request(filename: &str) -> Result<Request, TransferError> {
        Request::new(
            "localhost".into(),
            3000,
            3001,
            Operation::Get {
                filename: filename.into(),
            },
            PathBuf::from("."),
        )
    }

    #[test]
    fn list_tokens_carry_selector_and_data_port() {
        let req = Request::new(
            "localhost".into(),
            3000,
            3001,
            Operation::List,
            PathBuf::from("."),
        )
        .unwrap();
        assert_eq!(req.command_tokens(), vec!["-l", "3001"]);
    }

    #[test]
    fn get_tokens_carry_filename_between_selector_and_port() {
        let req = get_request("report.pdf").unwrap();
        assert_eq!(req.command_tokens(), vec!["-g", "report.pdf", "3001"]);
    }

    #[test]
    fn filename_with_separator_is_refused() {
        assert!(matches!(
            get_request("my file.txt").unwrap_err(),
            TransferError::Usage(_)
        ));
    }

    #[test]
    fn filename_with_terminator_is_refused() {
        assert!(matches!(
            get_request("odd@@@name").unwrap_err(),
            TransferError::Usage(_)
        ));
    }

    #[test]
    fn filename_with_path_separator_is_refused() {
        assert!(get_request("../escape.txt").is_err());
        assert!(get_request("dir/inner.txt").is_err());
    }

    #[test]
    fn zero_ports_are_refused() {
        let err = Request::new(
            "localhost".into(),
            3000,
            0,
            Operation::List,
            PathBuf::from("."),
        )
        .unwrap_err();
        assert!(matches!(err, TransferError::Usage(_)));
    }
}
