use regex::Regex;
use lazy_static::lazy_static;
use crate::utils::{quote, error};
use crate::error::Struct2MsgError;

lazy_static! {
    pub static ref TOKEN_REGEX: Regex = Regex::new(concat!(
        r"(",
        r"//[^\n]*",
        r"|/\*(?s:.*?)\*/",
        r"|#(?:\\\r?\n|[^\n])*",
        r#"|"(?:[^"\\\n]|\\.)*""#,
        r"|'(?:[^'\\\n]|\\.)*'",
        r"|\b[A-Za-z_][A-Za-z0-9_]*\b",
        r"|\.?\d[A-Za-z0-9_.']*",
        r"|::|->|\.\.\.|&&|\|\|",
        r"|[{}()\[\];:,<>=*&~!+\-/%^|?.]",
        r"|\s+",
        r")",
    )).unwrap();
    pub static ref SKIPPED_RX: Regex = Regex::new(r"^(?s:\s+|//.*|/\*.*|#.*)$").unwrap();
}

#[derive(Debug, PartialEq)]
pub struct Token {
    pub text:   String,
    pub line:   usize,
    pub column: usize,
}

/// Splits header text into tokens, dropping whitespace, comments and
/// preprocessor lines. The last token is always an empty EOF marker.
pub fn tokenize_header(text: &str) -> Result<Vec<Token>, Struct2MsgError> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut column = 1;
    let mut last_end = 0;

    for mat in TOKEN_REGEX.find_iter(text) {
        let start = mat.start();
        let end   = mat.end();
        let part  = mat.as_str();

        if start > last_end {
            let unexpected = &text[last_end..start];
            return Err(error(
                &format!("Syntax error: {}", quote(unexpected)),
                line,
                column,
            ));
        }

        if !SKIPPED_RX.is_match(part) {
            tokens.push(Token {
                text: part.to_string(),
                line,
                column,
            });
        }

        let newline_count = part.matches('\n').count();
        if newline_count > 0 {
            line += newline_count;
            if let Some(last_line_part) = part.split('\n').last() {
                column = last_line_part.len() + 1;
            }
        } else {
            column += part.len();
        }

        last_end = end;
    }

    if last_end != text.len() {
        let unexpected = &text[last_end..];
        return Err(error(
            &format!("Syntax error: {}", quote(unexpected)),
            line,
            column,
        ));
    }

    tokens.push(Token {
        text: "".to_string(),
        line,
        column,
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<String> {
        tokenize_header(input).unwrap().into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_tokenize_simple() {
        let input = "int x = 10;";
        let expected = vec![
            Token { text: "int".into(), line: 1, column: 1 },
            Token { text: "x".into(),   line: 1, column: 5 },
            Token { text: "=".into(),   line: 1, column: 7 },
            Token { text: "10".into(),  line: 1, column: 9 },
            Token { text: ";".into(),   line: 1, column: 11 },
            Token { text: "".into(),    line: 1, column: 12 },
        ];
        let got = tokenize_header(input).unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_tokenize_skips_comments_and_directives() {
        let input = "#include <stdint.h>\n/* a\n b */ struct // tail\nP;";
        let got = tokenize_header(input).unwrap();
        assert_eq!(got[0], Token { text: "struct".into(), line: 3, column: 7 });
        assert_eq!(got[1], Token { text: "P".into(), line: 4, column: 1 });
        assert_eq!(got[2].text, ";");
    }

    #[test]
    fn test_tokenize_continued_directive() {
        assert_eq!(texts("#define X \\\n  1\nint"), vec!["int", ""]);
    }

    #[test]
    fn test_tokenize_scope_and_templates() {
        assert_eq!(
            texts("std::vector<std::pair<int, int>> v;"),
            vec!["std", "::", "vector", "<", "std", "::", "pair", "<", "int", ",", "int", ">", ">", "v", ";", ""]
        );
    }

    #[test]
    fn test_tokenize_string_literal() {
        assert_eq!(texts(r#"extern "C" {"#), vec!["extern", "\"C\"", "{", ""]);
    }

    #[test]
    fn test_tokenize_unexpected_text() {
        let err = tokenize_header("int x @").unwrap_err();
        assert!(
            matches!(err, Struct2MsgError::ParseError { line: 1, column: 7, .. }),
            "expected a ParseError but got {:?}",
            err
        );
    }
}
