use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

/// One turn in a chat transcript. The ordered sequence of turns is the
/// transcript; only the in-progress assistant turn is ever rewritten.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: Role, content: &str) -> Self {
        ChatTurn {
            role,
            content: content.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), r#""system""#);
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            r#""assistant""#
        );
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
    }

    #[test]
    fn test_role_deserialization() {
        let json = r#""assistant""#;
        assert_eq!(serde_json::from_str::<Role>(json).unwrap(), Role::Assistant);

        let json = r#""user""#;
        assert_eq!(serde_json::from_str::<Role>(json).unwrap(), Role::User);
    }

    #[test]
    fn test_chat_turn_serialization() {
        let turn = ChatTurn::new(Role::User, "Hello world");
        assert_eq!(
            serde_json::to_string(&turn).unwrap(),
            r#"{"role":"user","content":"Hello world"}"#
        );
    }

    #[test]
    fn test_chat_turn_deserialization() {
        let json = r#"{"role":"assistant","content":"I can help!"}"#;
        let turn: ChatTurn = serde_json::from_str(json).unwrap();
        assert_eq!(turn.role, Role::Assistant);
        assert_eq!(turn.content, "I can help!");
    }
}
