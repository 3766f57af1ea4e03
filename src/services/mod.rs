//! Typed wrappers over [`ApiClient`](crate::client::ApiClient) for the backend
//! resources the admin dashboard manages.
//!
//! The backend answers either with a `{ "data": ... }` envelope or with the
//! bare payload; the helpers here accept both.

pub mod assets;
pub mod auth;
pub mod dashboard;
pub mod documents;
pub mod sectors;
pub mod settings;
pub mod users;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::{Error, ResponseBody};

/// Decode `data` when the payload is an envelope, the payload itself otherwise.
pub(crate) fn unwrap_data<T: DeserializeOwned>(payload: Value) -> Result<T, Error> {
    let inner = match payload {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    ResponseBody::Json(inner).decode()
}

/// Decode a list from a bare array or `{ "data": [...] }`; anything else is empty.
pub(crate) fn unwrap_list<T: DeserializeOwned>(payload: Value) -> Result<Vec<T>, Error> {
    match payload {
        Value::Array(_) => ResponseBody::Json(payload).decode(),
        Value::Object(mut map) => match map.remove("data") {
            Some(list @ Value::Array(_)) => ResponseBody::Json(list).decode(),
            _ => Ok(Vec::new()),
        },
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_data() {
        let wrapped: u32 = unwrap_data(json!({"success": true, "data": 7})).unwrap();
        assert_eq!(wrapped, 7);

        let bare: String = unwrap_data(json!("plain")).unwrap();
        assert_eq!(bare, "plain");
    }

    #[test]
    fn test_unwrap_list() {
        let bare: Vec<u8> = unwrap_list(json!([1, 2])).unwrap();
        assert_eq!(bare, vec![1, 2]);

        let wrapped: Vec<u8> = unwrap_list(json!({"data": [3]})).unwrap();
        assert_eq!(wrapped, vec![3]);

        let other: Vec<u8> = unwrap_list(json!({"message": "ok"})).unwrap();
        assert!(other.is_empty());

        let null: Vec<u8> = unwrap_list(Value::Null).unwrap();
        assert!(null.is_empty());
    }
}
