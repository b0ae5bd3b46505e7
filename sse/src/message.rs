use axum::response::sse::Event;
use serde::Serialize;

/// One event frame of a streamed response: a JSON-encoded value that the
/// event-stream writer terminates with the record separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    data: String,
}

impl Frame {
    pub fn encode<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            data: serde_json::to_string(value)?,
        })
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn into_event(self) -> Event {
        Event::default().data(self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encodes_value_as_compact_json() {
        let frame = Frame::encode(&json!({"id": 1, "name": "person_1"})).unwrap();
        let decoded: serde_json::Value = serde_json::from_str(frame.data()).unwrap();
        assert_eq!(decoded, json!({"id": 1, "name": "person_1"}));
        assert!(!frame.data().contains('\n'));
    }
}
