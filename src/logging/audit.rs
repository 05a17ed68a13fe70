//! Audit helpers that emit one fact per mutation stage.
//!
//! Every mutation produces an `attempt` fact before its command is spawned
//! and either a `result` or a `skip` fact afterwards. A minimal envelope
//! (`schema_version`, `ts`, `op_id`, `op`, `path`) is present on every fact
//! so downstream consumers can correlate without joins.

use serde_json::{json, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::constants::FACTS_SCHEMA_VERSION;
use crate::logging::facts::FactsEmitter;

/// Wall-clock timestamp in RFC 3339, falling back to the epoch on
/// formatter failure.
#[must_use]
pub fn now_iso() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

pub(crate) struct OpCtx<'a> {
    pub facts: &'a dyn FactsEmitter,
    pub op_id: String,
    pub op: &'static str,
    pub path: String,
    pub ts: String,
}

impl<'a> OpCtx<'a> {
    pub(crate) fn new(
        facts: &'a dyn FactsEmitter,
        op_id: String,
        op: &'static str,
        path: String,
    ) -> Self {
        Self {
            facts,
            op_id,
            op,
            path,
            ts: now_iso(),
        }
    }
}

/// Stage of one mutation's lifecycle.
#[derive(Clone, Copy, Debug)]
pub enum Stage {
    Attempt,
    Result,
    Skip,
}

impl Stage {
    fn as_event(self) -> &'static str {
        match self {
            Stage::Attempt => "mutate.attempt",
            Stage::Result => "mutate.result",
            Stage::Skip => "mutate.skip",
        }
    }
}

/// Decision severity for audit events.
#[derive(Clone, Copy, Debug)]
pub enum Decision {
    Success,
    Failure,
}

impl Decision {
    fn as_str(self) -> &'static str {
        match self {
            Decision::Success => "success",
            Decision::Failure => "failure",
        }
    }
}

/// Builder facade over fact emission with a centralized envelope.
pub(crate) struct OpLogger<'a> {
    ctx: &'a OpCtx<'a>,
}

impl<'a> OpLogger<'a> {
    pub(crate) fn new(ctx: &'a OpCtx<'a>) -> Self {
        Self { ctx }
    }

    pub(crate) fn attempt(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Attempt)
    }

    pub(crate) fn result(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Result)
    }

    pub(crate) fn skip(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Skip)
    }
}

pub(crate) struct EventBuilder<'a> {
    ctx: &'a OpCtx<'a>,
    stage: Stage,
    fields: serde_json::Map<String, Value>,
}

impl<'a> EventBuilder<'a> {
    fn new(ctx: &'a OpCtx<'a>, stage: Stage) -> Self {
        let mut fields = serde_json::Map::new();
        fields.insert("stage".to_string(), json!(stage.as_event()));
        Self { ctx, stage, fields }
    }

    pub(crate) fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub(crate) fn emit(self, decision: Decision) {
        let mut fields = Value::Object(self.fields);
        if let Some(obj) = fields.as_object_mut() {
            obj.entry("schema_version")
                .or_insert(json!(FACTS_SCHEMA_VERSION));
            obj.entry("ts").or_insert(json!(self.ctx.ts));
            obj.entry("op_id").or_insert(json!(self.ctx.op_id));
            obj.entry("op").or_insert(json!(self.ctx.op));
            obj.entry("path").or_insert(json!(self.ctx.path));
            obj.entry("decision").or_insert(json!(decision.as_str()));
        }
        self.ctx
            .facts
            .emit("gantry", self.stage.as_event(), decision.as_str(), fields);
    }

    pub(crate) fn emit_success(self) {
        self.emit(Decision::Success);
    }

    pub(crate) fn emit_failure(self) {
        self.emit(Decision::Failure);
    }
}
