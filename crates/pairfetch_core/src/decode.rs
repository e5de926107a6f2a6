use encoding_rs::{Encoding, UTF_8};

use crate::{FailureKind, FetchError, FetchOutcome, FetchRequest};

/// Turns a raw `(status, body)` pair into the outcome the request's consumer sees.
///
/// Order matters: the status range is checked before the body is looked at, so a
/// rejected status never reports a decoding error.
pub fn interpret_response(
    request: &FetchRequest,
    status: u16,
    body: Option<&[u8]>,
) -> FetchOutcome<String> {
    if !request.accepts(status) {
        return Err(FetchError::new(
            FailureKind::InvalidStatus(status),
            format!("status {status} rejected by {}", request.endpoint()),
        ));
    }
    decode_text(body)
}

/// Strict UTF-8 decode. A missing or empty body is a decoding failure.
pub fn decode_text(body: Option<&[u8]>) -> FetchOutcome<String> {
    let bytes = match body {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => {
            return Err(FetchError::new(
                FailureKind::Decoding,
                "response body is missing",
            ))
        }
    };

    // Only a UTF-8 BOM is honoured; anything else is not text we accept.
    let bytes = match Encoding::for_bom(bytes) {
        Some((enc, bom_len)) if enc == UTF_8 => &bytes[bom_len..],
        Some((enc, _)) => {
            return Err(FetchError::new(
                FailureKind::Decoding,
                format!("unexpected {} byte order mark", enc.name()),
            ))
        }
        None => bytes,
    };

    UTF_8
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| FetchError::new(FailureKind::Decoding, "body is not valid UTF-8"))
}
