//! Format D: the view serialized as structured text, with optional recent events.

use serde_json::json;

use crate::resolve::Event;
use crate::view::View;

pub fn render(view: &View, events: &[Event]) -> String {
    let mut value = serde_json::to_value(view).expect("View is always serializable");
    if !events.is_empty() {
        let history = serde_json::to_value(events).expect("Event is always serializable");
        if let Some(obj) = value.as_object_mut() {
            obj.insert("recent_history".to_string(), history);
        }
    }
    serde_json::to_string_pretty(&json!(value)).expect("Value is always serializable")
}
