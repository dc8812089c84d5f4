// crates/supply-sim-providers/src/http.rs
// ============================================================================
// Module: HTTP Helpers
// Description: Shared helpers for bounded blocking HTTP calls.
// Purpose: Enforce response size limits before decoding bodies.
// Dependencies: reqwest
// ============================================================================

use std::io::Read;

use reqwest::blocking::Response;

/// Failure while reading a bounded response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LimitedReadError {
    /// The body is larger than the limit.
    TooLarge,
    /// The body ended before the advertised length.
    Truncated,
    /// The body could not be read.
    Read,
}

/// Reads the response body while enforcing a byte limit.
pub(crate) fn read_response_limited(
    response: &mut Response,
    max_bytes: usize,
) -> Result<Vec<u8>, LimitedReadError> {
    let expected_len = response.content_length();
    let max_bytes_u64 = u64::try_from(max_bytes).map_err(|_| LimitedReadError::TooLarge)?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(LimitedReadError::TooLarge);
    }
    let mut buf = Vec::new();
    let mut handle = response.take(max_bytes_u64.saturating_add(1));
    handle.read_to_end(&mut buf).map_err(|_| LimitedReadError::Read)?;
    if buf.len() > max_bytes {
        return Err(LimitedReadError::TooLarge);
    }
    if let Some(expected) = expected_len {
        let expected = usize::try_from(expected).map_err(|_| LimitedReadError::Truncated)?;
        if buf.len() < expected {
            return Err(LimitedReadError::Truncated);
        }
    }
    Ok(buf)
}
