//! Reading and writing the host's activity payload.
//!
//! Saved values live under `arguments.execute.inArguments` as a list of
//! single-key objects. Only the first key of each object is read back.

use crate::core::field::FieldKind;
use crate::core::value::Value;
use crate::engine::behavior::FieldBehaviorEngine;
use serde_json::{Map, Value as Json};

/// `(key, value)` pairs saved in `payload`, in stored order.
pub fn in_arguments(payload: &Json) -> Vec<(String, Json)> {
    let Some(arguments) = payload
        .pointer("/arguments/execute/inArguments")
        .and_then(Json::as_array)
    else {
        return Vec::new();
    };

    arguments
        .iter()
        .filter_map(Json::as_object)
        .filter_map(|argument| argument.iter().next())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Values to persist: every visible field in configuration order. Radios
/// are only saved when something is selected.
pub fn collect_arguments(engine: &FieldBehaviorEngine) -> Vec<(String, Json)> {
    engine
        .context()
        .fields()
        .filter(|field| engine.is_visible(field.id.as_str()))
        .filter_map(|field| {
            let value = engine.value(field.id.as_str()).cloned().unwrap_or_default();
            let json = match (field.kind, value) {
                (FieldKind::Checkbox, value) => Json::Bool(value.is_truthy()),
                (FieldKind::Radio, Value::None) => return None,
                (_, value) => Json::String(value.to_text()),
            };
            Some((field.id.to_string(), json))
        })
        .collect()
}

/// Writes `arguments` into `payload` and marks it configured. Keys already
/// present elsewhere in the payload are kept.
pub fn finalize(mut payload: Json, arguments: Vec<(String, Json)>) -> Json {
    let in_arguments: Vec<Json> = arguments
        .into_iter()
        .map(|(key, value)| {
            let mut argument = Map::new();
            argument.insert(key, value);
            Json::Object(argument)
        })
        .collect();

    with_object(&mut payload, |root| {
        with_object(root.entry("arguments").or_insert(Json::Null), |arguments| {
            with_object(arguments.entry("execute").or_insert(Json::Null), |execute| {
                execute.insert("inArguments".to_string(), Json::Array(in_arguments));
            });
        });
        with_object(root.entry("metaData").or_insert(Json::Null), |meta| {
            meta.insert("isConfigured".to_string(), Json::Bool(true));
        });
    });

    payload
}

/// Runs `update` on the object at `slot`, replacing a non-object in place.
fn with_object(slot: &mut Json, update: impl FnOnce(&mut Map<String, Json>)) {
    let mut map = match std::mem::take(slot) {
        Json::Object(map) => map,
        _ => Map::new(),
    };
    update(&mut map);
    *slot = Json::Object(map);
}
