use log::error;
use regex::{Captures, Regex};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("{0}")]
pub struct DecodeError(pub String);

/// Escape every backslash that does not start a legal JSON escape
/// sequence.  Legitimate escapes are left untouched.  The scan is purely
/// lexical; structural problems (mismatched braces, bad tokens) are not
/// repairable here.
pub fn escape_stray_backslashes(text: &str) -> String {
    let re = Regex::new(r"\\(.?)").unwrap();
    re.replace_all(text, |caps: &Captures| {
        let next = caps.get(1).map_or("", |m| m.as_str());
        match next {
            "\"" | "\\" | "/" | "b" | "f" | "n" | "r" | "t" | "u" => format!("\\{}", next),
            _ => format!("\\\\{}", next),
        }
    })
    .into_owned()
}

/// Parse the response body.  The API is known to return near-JSON with
/// unescaped Windows paths, so if strict parsing fails, repair the stray
/// backslashes and retry once.  A second failure is fatal for the run.
pub fn parse_resilient(text: &str) -> Result<Value, DecodeError> {
    match serde_json::from_str(text) {
        Ok(v) => Ok(v),
        Err(_) => {
            let repaired = escape_stray_backslashes(text);
            match serde_json::from_str(&repaired) {
                Ok(v) => Ok(v),
                Err(e) => {
                    let preview: String = repaired.chars().take(500).collect();
                    error!("still failed to parse JSON: {}", e);
                    error!("response preview: {}", preview);
                    Err(DecodeError(format!("failed to parse JSON: {}", e)))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn valid_json_takes_strict_path() {
        let text = r#"{"name": "line\nbreak", "quote": "a \"b\"", "path": "a\\b"}"#;
        // legal escapes survive the repair untouched, so either path parses
        assert_eq!(escape_stray_backslashes(text), text);
        let v = parse_resilient(text).unwrap();
        assert_eq!(v["name"].as_str().unwrap(), "line\nbreak");
    }

    #[test]
    fn stray_backslash_is_recovered() {
        // a strict parser rejects \U; the repair pass doubles it
        let text = r#"{"path": "C:\Users\adrian"}"#;
        assert!(serde_json::from_str::<Value>(text).is_err());
        let v = parse_resilient(text).unwrap();
        assert_eq!(v["path"].as_str().unwrap(), r"C:\Users\adrian");
    }

    #[test]
    fn escape_rules() {
        assert_eq!(escape_stray_backslashes(r"a \q \n \\ \"), r"a \\q \n \\ \\");
        assert_eq!(escape_stray_backslashes(r"\u0041 \x41"), r"\u0041 \\x41");
        assert_eq!(escape_stray_backslashes("no backslashes"), "no backslashes");
    }

    #[test]
    fn structural_damage_stays_fatal() {
        let res = parse_resilient(r#"{"a": [1, 2"#);
        assert!(res.is_err());
    }
}
