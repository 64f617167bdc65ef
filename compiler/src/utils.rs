use crate::error::Struct2MsgError;

pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

pub fn error(msg: &str, line: usize, column: usize) -> Struct2MsgError {
    Struct2MsgError::ParseError {
        msg: msg.to_owned(),
        line,
        column,
    }
}
