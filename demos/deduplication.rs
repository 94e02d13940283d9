//! Error notification deduplication.
//!
//! Every error is forwarded; repeats within the window carry
//! `_excludeFromSlackNotification: true` and skip the notifier.

use serde_json::json;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use workflow_logger::{AxiomLogger, ErrorInfo, Event, Notifier, NotifyError};

/// Prints the notifications that would be sent to a chat channel.
#[derive(Debug)]
struct PrintNotifier;

impl Notifier for PrintNotifier {
    fn notify(&self, event: &Event) -> Result<(), NotifyError> {
        println!(">>> NOTIFY {}", event.format_brief());
        Ok(())
    }
}

fn main() {
    let logger = AxiomLogger::builder("dedup-demo")
        .with_axiom_output(false)
        .with_console_output(true)
        .with_notifier(Arc::new(PrintNotifier))
        .with_dedup_window(Duration::from_secs(1))
        .build()
        .expect("valid logger configuration");

    println!("=== Deduplication Example ===\n");
    println!("Window: 1 second\n");

    println!("Three identical errors in quick succession (one notification):");
    for attempt in 1..=3 {
        logger.error(
            ErrorInfo::new("TimeoutError", "upstream timed out"),
            Some(json!({"attempt": attempt})),
            None,
        );
    }

    println!("\nA different message notifies on its own:");
    logger.error(ErrorInfo::new("TimeoutError", "database timed out"), None, None);

    println!("\nAfter the window elapses the first error notifies again:");
    thread::sleep(Duration::from_millis(1_200));
    logger.error(ErrorInfo::new("TimeoutError", "upstream timed out"), None, None);

    let snapshot = logger.metrics().snapshot();
    println!("\n=== Example Complete ===");
    println!(
        "Forwarded: {}, notified: {}, suppressed: {}",
        snapshot.events_forwarded, snapshot.notifications_allowed, snapshot.notifications_suppressed
    );
}
