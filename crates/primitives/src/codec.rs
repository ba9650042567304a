//! JSON encoding of records stored as `Value::String`

use rapport_core::{RapportError, RapportResult, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub(crate) fn encode<T: Serialize>(record: &T) -> RapportResult<Value> {
    Ok(Value::String(serde_json::to_string(record)?))
}

pub(crate) fn decode<T: DeserializeOwned>(value: &Value) -> RapportResult<T> {
    match value {
        Value::String(json) => Ok(serde_json::from_str(json)?),
        other => Err(RapportError::serialization(format!(
            "expected a JSON string record, found {}",
            other.type_name()
        ))),
    }
}

/// Decode an optional stored value
pub(crate) fn decode_opt<T: DeserializeOwned>(value: Option<Value>) -> RapportResult<Option<T>> {
    value.as_ref().map(decode).transpose()
}
