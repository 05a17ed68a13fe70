use log::Level;
use serde_json::Value;

/// Receives structured facts about every mutation attempt and outcome.
pub trait FactsEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value);
}

/// Receives human-readable audit lines.
pub trait AuditSink {
    fn log(&self, level: Level, msg: &str);
}

/// Discarding sink, the default for embedders that wire their own.
#[derive(Default)]
pub struct JsonlSink;

impl FactsEmitter for JsonlSink {
    fn emit(&self, _subsystem: &str, _event: &str, _decision: &str, _fields: Value) {}
}

impl AuditSink for JsonlSink {
    fn log(&self, _level: Level, _msg: &str) {}
}

/// Sink that forwards into the `log` facade: facts at debug under the
/// `gantry::facts` target, audit lines at their stated level.
#[derive(Default)]
pub struct LogSink;

impl FactsEmitter for LogSink {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        log::debug!(target: "gantry::facts", "{subsystem} {event} {decision} {fields}");
    }
}

impl AuditSink for LogSink {
    fn log(&self, level: Level, msg: &str) {
        log::log!(target: "gantry::audit", level, "{msg}");
    }
}
