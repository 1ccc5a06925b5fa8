//! Integration tests for assembling events from converted stack traces

use super::common::determinism::{event_time, EventIds, EVENT_TIME};
use super::common::fixtures::{captured, live, trace, Widget};
use stackvars::event::{MESSAGE_INTERFACE, STACKTRACE_INTERFACE};
use stackvars::{
    Breadcrumb, CaptureBuffer, Config, EventBuilder, Level, MessageSection, SafeValue,
    SnapshotConverter,
};
use std::collections::HashSet;
use uuid::Uuid;

/// A full failure report: capture, convert, attach, serialize
#[test]
fn test_event_carries_converted_stack_trace() {
    let ids = EventIds::new();
    let frames = trace(&[("app.Service", "handle", 42), ("app.Main", "run", 7)]);
    let request_id = 9001;
    let buffer = CaptureBuffer::new(vec![
        captured("app.Service.handle", vec![Some(live("request_id", &request_id))], 42),
        captured("app.Main.run", vec![], 7),
    ]);
    let elements = SnapshotConverter::new().convert(&frames, Some(buffer));

    let event = EventBuilder::with_id(ids.next())
        .expect("Non-nil id")
        .with_message("request failed")
        .with_level(Level::Error)
        .with_timestamp(event_time())
        .with_logger("app")
        .with_stack_trace(elements)
        .build();

    assert_eq!(event.culprit(), Some("app.Service.handle(app.Service.src:42)"));
    let stack = event.stack_trace().expect("Stack trace section");
    assert_eq!(stack.frames().len(), 2);
    assert_eq!(
        stack.frames()[0].variables().map(|v| v["request_id"].clone()),
        Some(SafeValue::Int(9001))
    );

    let json = serde_json::to_value(&event).expect("Serialize event");
    assert_eq!(json["level"], "error");
    assert_eq!(json["timestamp"], EVENT_TIME);
    assert_eq!(
        json["sections"][STACKTRACE_INTERFACE]["frames"][0]["variables"]["request_id"],
        9001
    );
    assert_eq!(
        event.to_string(),
        "Event{level=ERROR, message='request failed', logger='app'}"
    );
}

/// Extra values are held as given and sanitized on serialization
#[test]
fn test_extra_values_sanitized_on_serialization() {
    let event = EventBuilder::new()
        .with_extra("widget", Widget { id: 3 })
        .with_extra("attempts", 2u32)
        .with_message_section(MessageSection::new("failed %s").with_parameters(["twice"]))
        .build();

    assert_eq!(event.extra().len(), 2);
    assert_eq!(
        event.extra().get("widget").map(|w| w.to_string()),
        Some("Widget#3".to_string())
    );

    let json = serde_json::to_value(&event).expect("Serialize event");
    assert_eq!(json["extra"]["widget"], "Widget#3");
    assert_eq!(json["extra"]["attempts"], 2);
    assert_eq!(json["sections"][MESSAGE_INTERFACE]["parameters"][0], "twice");
    assert_eq!(
        event.message_section().map(|m| m.message()),
        Some("failed %s")
    );
}

/// Events are identified by id alone
#[test]
fn test_event_identity() {
    let ids = EventIds::new();
    let id = ids.next();
    let a = EventBuilder::with_id(id)
        .expect("Non-nil id")
        .with_message("a")
        .build();
    let b = EventBuilder::with_id(id)
        .expect("Non-nil id")
        .with_message("b")
        .build();
    let c = EventBuilder::with_id(ids.next())
        .expect("Non-nil id")
        .with_message("a")
        .build();

    assert_eq!(a, b);
    assert_ne!(a, c);
    let unique: HashSet<_> = [a, b, c].into_iter().collect();
    assert_eq!(unique.len(), 2);

    assert!(EventBuilder::with_id(Uuid::nil()).is_err());
}

/// Config event defaults flow into every built event
#[test]
fn test_event_defaults_from_config() {
    let config = Config::from_toml_str(
        r#"
        [event]
        platform = "native"
        release = "1.2.3"
        environment = "staging"
        "#,
    )
    .expect("Valid config");

    let event = EventBuilder::from_config(&config.event)
        .with_level(Level::Warning)
        .build();

    assert_eq!(event.platform(), "native");
    assert_eq!(event.release(), Some("1.2.3"));
    assert_eq!(event.environment(), Some("staging"));
    assert!(event.server_name().is_none());
    assert!(event.culprit().is_none());
    assert!(Level::Warning < Level::Error);
}

/// Serialized events deserialize back to the same identity and sections
#[test]
fn test_event_json_reload() {
    let frames = trace(&[("A", "f", 10)]);
    let event = EventBuilder::new()
        .with_stack_trace(SnapshotConverter::new().convert(&frames, None))
        .with_extra("note", "hello")
        .build();

    let json = serde_json::to_string(&event).expect("Serialize event");
    let reloaded: stackvars::Event = serde_json::from_str(&json).expect("Deserialize event");

    assert_eq!(reloaded, event);
    assert_eq!(reloaded.sections(), event.sections());
    assert_eq!(
        reloaded.extra().sanitized().get("note"),
        Some(&SafeValue::Text("hello".to_string()))
    );
}

/// Breadcrumbs recorded before the failure travel with the event
#[test]
fn test_breadcrumbs_serialize_in_order() {
    let event = EventBuilder::new()
        .with_breadcrumb(
            Breadcrumb::new("GET /orders")
                .with_timestamp(event_time())
                .with_category("http")
                .with_data("status", "200"),
        )
        .with_breadcrumb(
            Breadcrumb::new("payment declined")
                .with_timestamp(event_time())
                .with_level(Level::Warning),
        )
        .with_level(Level::Error)
        .build();

    let json = serde_json::to_value(&event).expect("Serialize event");
    assert_eq!(json["breadcrumbs"][0]["category"], "http");
    assert_eq!(json["breadcrumbs"][0]["data"]["status"], "200");
    assert_eq!(json["breadcrumbs"][1]["level"], "warning");
    assert_eq!(json["breadcrumbs"][1]["timestamp"], EVENT_TIME);

    let reloaded: stackvars::Event = serde_json::from_value(json).expect("Deserialize event");
    assert_eq!(reloaded.breadcrumbs(), event.breadcrumbs());
}
