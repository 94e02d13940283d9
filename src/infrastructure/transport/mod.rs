//! Transport adapters.
//!
//! Every adapter serializes an event as the same [`IngestDocument`]:
//! - `AxiomTransport`: HTTP POST to the ingest API (`axiom` feature)
//! - `ConsoleTransport`: JSON lines on stdout or any writer
//! - `FanoutTransport`: several of the above at once

#[cfg(feature = "axiom")]
pub mod axiom;
pub mod console;
pub mod document;
pub mod fanout;

#[cfg(feature = "axiom")]
pub use axiom::AxiomTransport;
pub use console::ConsoleTransport;
pub use document::IngestDocument;
pub use fanout::FanoutTransport;
