//! Integration tests asserting the sweep's tracing instrumentation.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex},
};

use spillover_core::{CrossPairSampler, SweepBuilder};
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{
    layer::{Context, Layer, SubscriberExt},
    registry::LookupSpan,
};

/// Recording layer installed during tests to capture spans and events for
/// later assertions.
#[derive(Clone, Default)]
struct RecordingLayer {
    spans: Arc<Mutex<Vec<SpanRecord>>>,
    events: Arc<Mutex<Vec<EventRecord>>>,
}

impl RecordingLayer {
    fn spans(&self) -> Vec<SpanRecord> {
        self.spans.lock().expect("lock poisoned").clone()
    }

    fn events(&self) -> Vec<EventRecord> {
        self.events.lock().expect("lock poisoned").clone()
    }
}

#[derive(Debug, Clone)]
struct SpanRecord {
    name: String,
    fields: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct EventRecord {
    level: Level,
    fields: HashMap<String, String>,
}

impl<S> Layer<S> for RecordingLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        ctx: Context<'_, S>,
    ) {
        if let Some(span) = ctx.span(id) {
            let mut record = SpanRecord {
                name: attrs.metadata().name().to_owned(),
                fields: HashMap::new(),
            };
            attrs.record(&mut FieldRecorder {
                fields: &mut record.fields,
            });
            span.extensions_mut().insert(record);
        }
    }

    fn on_close(&self, id: tracing::span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        let Some(record) = span.extensions_mut().remove::<SpanRecord>() else {
            return;
        };
        self.spans.lock().expect("lock poisoned").push(record);
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        event.record(&mut FieldRecorder {
            fields: &mut fields,
        });
        self.events
            .lock()
            .expect("lock poisoned")
            .push(EventRecord {
                level: *event.metadata().level(),
                fields,
            });
    }
}

struct FieldRecorder<'a> {
    fields: &'a mut HashMap<String, String>,
}

impl Visit for FieldRecorder<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.insert(field.name().to_owned(), value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.fields
            .insert(field.name().to_owned(), format!("{value:?}"));
    }
}

#[test]
fn run_records_sweep_instrumentation() {
    let sweep = SweepBuilder::new()
        .with_cluster_size_max(20)
        .with_bridge_count_max(1)
        .with_sample_size_max(2)
        .with_iterations(3)
        .with_seed(21)
        .build()
        .expect("configuration is valid");

    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let table = tracing::subscriber::with_default(subscriber, || sweep.run(&CrossPairSampler))
        .expect("sweep must succeed");
    assert_eq!(table.records().len(), 12);

    let spans = layer.spans();
    let run_span = spans
        .iter()
        .find(|span| span.name == "sweep.run")
        .expect("sweep.run span must exist");
    assert_eq!(
        run_span.fields.get("sampler"),
        Some(&"cross-pair".to_owned())
    );
    assert_eq!(
        run_span.fields.get("cluster_count_max"),
        Some(&"2".to_owned())
    );
    assert_eq!(
        run_span.fields.get("cluster_size_max"),
        Some(&"20".to_owned())
    );
    assert_eq!(run_span.fields.get("iterations"), Some(&"3".to_owned()));

    let events = layer.events();
    assert!(events.iter().any(|event| {
        event.level == Level::DEBUG
            && event
                .fields
                .get("message")
                .is_some_and(|message| message == "population graph built")
    }));
    let completed = events
        .iter()
        .find(|event| {
            event
                .fields
                .get("message")
                .is_some_and(|message| message == "sweep completed")
        })
        .expect("completion event must be emitted");
    assert_eq!(completed.fields.get("trials"), Some(&"12".to_owned()));
}
