use lambda_json_logger::{create_logger, Fields};
use serde_json::json;
use std::io::{Error, ErrorKind};

fn main() {
    // Run with APP_ENV=production for JSON lines, or unset for the
    // colorized development rendering.
    let logger = create_logger();

    logger.info("service starting");

    logger.info((
        json!({"someObject": {"withNesting": true}, "attempt": 1}),
        "processing request",
    ));

    let err = Error::new(ErrorKind::ConnectionRefused, "upstream unavailable");
    logger.error((
        Fields::new()
            .error("error", &err)
            .field("endpoint", "/api/orders"),
        "request failed",
    ));

    logger.warn((
        json!({"request": {"method": "GET", "url": "/health", "body": "dropped by projection"}}),
        "slow health check",
    ));
}
