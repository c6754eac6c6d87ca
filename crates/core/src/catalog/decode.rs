//! Decoding of list-fetch response bodies.

use serde_json::Value;

use crate::models::Game;

/// Normalized result of decoding a list-fetch body.
///
/// The upstream answers with a bare array, a `{"games": [...]}` wrapper, or
/// (when a title filter is in effect) a single record. Everything else is
/// either no results or a body we refuse to interpret.
#[derive(Debug, PartialEq)]
pub enum ListBody {
    /// The body held game records.
    Games(Vec<Game>),
    /// Valid JSON of a shape that normalizes to no results.
    Empty,
    /// The body was not JSON, or a record in it failed the schema.
    Malformed,
}

/// Decode a raw list-fetch body.
///
/// `filtered` is true when the request carried a title filter, in which case
/// a single-object body is one matching record rather than an unknown shape.
pub fn decode_game_list(raw: &[u8], filtered: bool) -> ListBody {
    let value: Value = match serde_json::from_slice(raw) {
        Ok(value) => value,
        Err(_) => return ListBody::Malformed,
    };

    if filtered && !value.is_array() {
        return match serde_json::from_value::<Game>(value) {
            Ok(game) => ListBody::Games(vec![game]),
            Err(_) => ListBody::Malformed,
        };
    }

    match value {
        Value::Array(_) => decode_records(value),
        Value::Object(mut map) => match map.remove("games") {
            Some(games @ Value::Array(_)) => decode_records(games),
            _ => ListBody::Empty,
        },
        _ => ListBody::Empty,
    }
}

fn decode_records(value: Value) -> ListBody {
    match serde_json::from_value::<Vec<Game>>(value) {
        Ok(games) => ListBody::Games(games),
        Err(_) => ListBody::Malformed,
    }
}
