//! Subject naming (topic name strategy)

use std::fmt;

/// Bagian pesan yang di-serialize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageField {
    Key,
    Value,
}

impl fmt::Display for MessageField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageField::Key => f.write_str("key"),
            MessageField::Value => f.write_str("value"),
        }
    }
}

/// `<topic>-key` / `<topic>-value`
pub fn topic_subject(topic: &str, field: MessageField) -> String {
    format!("{topic}-{field}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_subject() {
        assert_eq!(topic_subject("input-topic", MessageField::Value), "input-topic-value");
        assert_eq!(topic_subject("input-topic", MessageField::Key), "input-topic-key");
    }
}
