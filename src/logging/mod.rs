pub mod audit;
pub mod facts;

pub use audit::{now_iso, Decision, Stage};
pub use facts::{AuditSink, FactsEmitter, JsonlSink, LogSink};
