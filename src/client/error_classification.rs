//! HTTP status classification

/// Map an HTTP status to an error class and whether retrying later can help.
///
/// - Timeouts, throttling and server errors are transient.
/// - Client errors are permanent: a 4xx such as "enable metrics first" will
///   not resolve by waiting.
/// - 404 is classified `not_found`; pollers treat it as "not visible yet".
pub(crate) fn classify_status(status: u16) -> (&'static str, bool) {
    match status {
        408 => ("timeout", true),
        425 => ("too_early", true),
        429 => ("rate_limited", true),
        500 | 502 | 504 => ("server_error", true),
        503 => ("overloaded", true),
        505..=599 => ("server_error", true),
        400 | 422 => ("invalid_request", false),
        401 => ("authentication", false),
        403 => ("permission_denied", false),
        404 => ("not_found", false),
        405 => ("method_not_allowed", false),
        409 => ("conflict", false),
        413 => ("request_too_large", false),
        400..=499 => ("client_error", false),
        _ => ("http_error", false),
    }
}
