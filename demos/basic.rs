//! Basic example: redacted events printed as JSON lines.
//!
//! Axiom output is disabled, so no token is needed. Run with
//! `RUST_LOG=debug` to see which fields were redacted.

use serde_json::json;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use workflow_logger::AxiomLogger;

#[derive(Debug, thiserror::Error)]
#[error("division by zero")]
struct ZeroDivisionError;

fn divide(n: u32, d: u32) -> Result<u32, ZeroDivisionError> {
    n.checked_div(d).ok_or(ZeroDivisionError)
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let logger = AxiomLogger::builder("example-service")
        .with_allowed_fields([
            "id",
            "name",
            "status",
            "user_id",
            "account_id",
            "data",
            "data.id",
            "data.name",
            "data.user_id",
            "data.evaluation",
            "data.evaluation.score",
        ])
        .with_allowed_patterns([r".*_id$", r"^data\.evaluation\..*_id$", r"^user_\d+$"])
        .with_body_unwrapping()
        .with_axiom_output(false)
        .with_console_output(true)
        .build()
        .expect("valid logger configuration");

    println!("=== Basic Logging Example ===\n");

    let success = logger.info(
        "Processing batch completed",
        Some(json!({
            "aws_request_id": "87654321-4321-4321-4321-210987654321",
            "function_name": "batch-processing-function",
        })),
        Some(json!({
            "id": "batch_456",
            "name": "User Data Batch",
            "record_count": 1000,
            "sensitive_field": "private_data",
            "status": "completed"
        })),
    );
    println!("Info logged successfully: {}\n", success);

    let success = logger.warning(
        "High memory usage detected",
        None,
        Some(json!({
            "id": "alert_789",
            "server_details": "sensitive_server_info",
            "status": "warning"
        })),
    );
    println!("Warning logged successfully: {}\n", success);

    let numerator = 10u32;
    let denominator = 0u32;
    logger.info(
        "Dividing by zero to trigger error logging",
        None,
        Some(json!({"n": numerator, "d": denominator})),
    );

    if let Err(err) = divide(numerator, denominator) {
        let success = logger.error(
            &err,
            Some(json!({
                "aws_request_id": "12345678-1234-1234-1234-123456789012",
                "function_name": "data-validation-function",
            })),
            Some(json!({
                "body": r#"{"data": {"id": 12345, "user_id": "user_789", "name": "John Doe", "secret_token": "abc123", "evaluation": {"score": 85, "admin_id": "admin_456", "private_notes": "confidential"}}, "account_id": "acc_999", "password": "hidden123"}"#
            })),
        );
        println!("Error logged successfully: {}", success);
    }

    println!("\n=== Example Complete ===");
    println!("Notice: every field not on the allowlist reads \"[REDACTED]\".");
}
