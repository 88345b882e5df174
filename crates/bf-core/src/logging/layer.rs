//! JSONL tracing layer.
//!
//! Each tracing event becomes one [`LogEvent`] line on the writer (stderr
//! in production). The `event` field names the record; `run_id` and `stage`
//! come from the nearest enclosing span that recorded them.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::Mutex;

use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use super::events::LogEvent;

/// Field values of one event or span, in field-name order.
#[derive(Default)]
struct FieldMap(BTreeMap<String, Value>);

impl FieldMap {
    fn take_text(&mut self, name: &str) -> Option<String> {
        match self.0.remove(name)? {
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}

impl Visit for FieldMap {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }

    // `%value` and `?value` fields arrive here.
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0
            .insert(field.name().to_string(), Value::from(format!("{:?}", value)));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // Non-finite floats have no JSON form; keep them readable.
        let v = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::from(value.to_string()));
        self.0.insert(field.name().to_string(), v);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }
}

/// Correlation ids stored in span extensions.
#[derive(Debug, Clone, Default)]
struct Correlation {
    run_id: Option<String>,
    stage: Option<String>,
}

impl Correlation {
    fn from_fields(mut fields: FieldMap) -> Self {
        Correlation {
            run_id: fields.take_text("run_id"),
            stage: fields.take_text("stage"),
        }
    }
}

/// Writes [`LogEvent`] records as JSON lines.
pub struct JsonlLayer<W = io::Stderr> {
    writer: Mutex<W>,
}

impl JsonlLayer<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> JsonlLayer<W> {
    pub fn new(writer: W) -> Self {
        JsonlLayer {
            writer: Mutex::new(writer),
        }
    }

    fn emit(&self, record: &LogEvent) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", record.to_jsonl());
        }
    }
}

impl<S, W> Layer<S> for JsonlLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: Write + Send + 'static,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut fields = FieldMap::default();
        attrs.record(&mut fields);
        if let Some(span) = ctx.span(id) {
            span.extensions_mut()
                .insert(Correlation::from_fields(fields));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut fields = FieldMap::default();
        event.record(&mut fields);

        let meta = event.metadata();
        let name = fields
            .take_text("event")
            .unwrap_or_else(|| meta.target().to_string());
        let message = fields.take_text("message").unwrap_or_default();

        let mut record = LogEvent::new((*meta.level()).into(), name, message);
        record.fields = fields.0;

        if let Some(scope) = ctx.event_scope(event) {
            for span in scope {
                let extensions = span.extensions();
                let Some(corr) = extensions.get::<Correlation>() else {
                    continue;
                };
                if record.run_id.is_none() {
                    record.run_id.clone_from(&corr.run_id);
                }
                if record.stage.is_none() {
                    record.stage.clone_from(&corr.stage);
                }
            }
        }

        self.emit(&record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{event_names, Stage};
    use std::sync::Arc;
    use tracing_subscriber::layer::SubscriberExt;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn records(f: impl FnOnce()) -> Vec<LogEvent> {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::registry().with(JsonlLayer::new(capture.clone()));
        tracing::subscriber::with_default(subscriber, f);

        let bytes = capture.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn event_field_names_the_record() {
        let out = records(|| {
            tracing::info!(event = event_names::MERGE_FINISHED, matched = 3, "merged");
        });
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].event, "merge.finished");
        assert_eq!(out[0].message, "merged");
        assert_eq!(out[0].fields["matched"], 3);
        assert!(!out[0].fields.contains_key("event"));
        assert!(!out[0].fields.contains_key("message"));
    }

    #[test]
    fn target_names_unlabelled_events() {
        let out = records(|| {
            tracing::warn!(target: "bf_core::merge", "danger");
        });
        assert_eq!(out[0].event, "bf_core::merge");
    }

    #[test]
    fn innermost_span_supplies_stage() {
        let out = records(|| {
            let run = tracing::info_span!("run", run_id = "run-abcdef012345");
            let _r = run.enter();
            let outer = tracing::info_span!("stage", stage = %Stage::Read);
            let _o = outer.enter();
            let inner = tracing::info_span!("stage", stage = %Stage::Aggregate);
            let _i = inner.enter();
            tracing::info!(event = event_names::AGGREGATE_FINISHED, groups = 2, "done");
        });
        assert_eq!(out[0].run_id.as_deref(), Some("run-abcdef012345"));
        assert_eq!(out[0].stage.as_deref(), Some("aggregate"));
    }

    #[test]
    fn events_outside_spans_have_no_correlation() {
        let out = records(|| {
            tracing::error!(event = event_names::RUN_FAILED, code = 11u64, "boom");
        });
        assert!(out[0].run_id.is_none());
        assert!(out[0].stage.is_none());
        assert_eq!(out[0].fields["code"], 11);
    }

    #[test]
    fn non_finite_floats_are_kept_as_text() {
        let out = records(|| {
            tracing::debug!(ratio = f64::NAN, "odd");
        });
        assert_eq!(out[0].fields["ratio"], "NaN");
    }
}
