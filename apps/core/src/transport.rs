use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::contract::{CoreRequest, CoreResponse};
use crate::core_service::{CoreService, ServiceError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    InvalidRequest,
    Launch,
    Config,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransportResponse {
    Ok { response: CoreResponse },
    Err { error: ErrorResponse },
}

pub fn handle_request(service: &CoreService, request: CoreRequest) -> TransportResponse {
    match service.handle_command(request) {
        Ok(response) => TransportResponse::Ok { response },
        Err(error) => TransportResponse::Err {
            error: map_service_error(error),
        },
    }
}

pub fn handle_json(service: &CoreService, payload: &str) -> Result<String, serde_json::Error> {
    let response = match serde_json::from_str::<CoreRequest>(payload) {
        Ok(request) => handle_request(service, request),
        Err(error) => invalid_json(error.to_string()),
    };

    serde_json::to_string(&response)
}

/// Answers one request per input line until the input closes. Blank lines are
/// ignored; a line that is not UTF-8 gets an `invalid_json` reply and the
/// loop moves on to the next one.
pub fn serve_lines<R: BufRead, W: Write>(
    service: &CoreService,
    mut input: R,
    mut output: W,
) -> std::io::Result<usize> {
    let mut handled = 0;
    let mut raw = Vec::new();
    loop {
        raw.clear();
        if input.read_until(b'\n', &mut raw)? == 0 {
            break;
        }

        let encoded = match std::str::from_utf8(&raw) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => handle_json(service, line.trim()),
            Err(error) => {
                warn!(%error, "request line is not utf-8");
                serde_json::to_string(&invalid_json(format!(
                    "request is not valid UTF-8: {error}"
                )))
            }
        }
        .map_err(std::io::Error::other)?;

        writeln!(output, "{encoded}")?;
        output.flush()?;
        handled += 1;
    }
    debug!(handled, "request stream closed");
    Ok(handled)
}

fn invalid_json(message: String) -> TransportResponse {
    TransportResponse::Err {
        error: ErrorResponse {
            code: ErrorCode::InvalidJson,
            message,
        },
    }
}

fn map_service_error(error: ServiceError) -> ErrorResponse {
    let message = error.to_string();
    let code = match error {
        ServiceError::InvalidRequest(_) => ErrorCode::InvalidRequest,
        ServiceError::Launch(_) => ErrorCode::Launch,
        ServiceError::Config(_) => ErrorCode::Config,
    };
    if code == ErrorCode::Launch {
        warn!(%message, "run request failed");
    }
    ErrorResponse { code, message }
}
