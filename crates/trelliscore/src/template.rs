//! Template substitution for switch expressions and string conditions.
//!
//! The grammar is deliberately restricted: the only construct is
//! `{{variable_name}}`, replaced by the variable's literal form. Dynamic
//! evaluation of user-authored code is not supported anywhere in the
//! engine.

use crate::Value;
use std::collections::HashMap;

/// Substitute every `{{name}}` occurrence with the variable's serialized
/// literal value, then parse the whole result back to a literal. When the
/// parse fails the raw substituted string is used. Unknown variables
/// leave the placeholder untouched.
pub fn render(template: &str, variables: &HashMap<String, Value>) -> Value {
    let substituted = substitute(template, variables);
    parse_literal(&substituted)
}

fn substitute(template: &str, variables: &HashMap<String, Value>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = after[..end].trim();
                match variables.get(name) {
                    Some(value) => out.push_str(&value.display_string()),
                    None => {
                        out.push_str("{{");
                        out.push_str(&after[..end]);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                // unterminated placeholder, keep verbatim
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Parse a string back into a literal value; non-literal text stays a string.
pub fn parse_literal(text: &str) -> Value {
    match serde_json::from_str::<serde_json::Value>(text.trim()) {
        Ok(json) => Value::from(json),
        Err(_) => Value::String(text.to_string()),
    }
}

/// Truthiness used by if conditions and catch guards
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0,
        Value::String(s) => !s.is_empty() && s != "false",
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

/// Match chain used by switch cases: exact value equality, else
/// string-form equality, else numeric equality when both sides parse.
pub fn values_match(left: &Value, right: &Value) -> bool {
    if left == right {
        return true;
    }
    let ls = left.display_string();
    let rs = right.display_string();
    if ls == rs {
        return true;
    }
    match (ls.parse::<f64>(), rs.parse::<f64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn string_variable_renders_raw() {
        let v = vars(&[("userType", Value::String("vip".to_string()))]);
        assert_eq!(render("{{userType}}", &v), Value::String("vip".to_string()));
    }

    #[test]
    fn numeric_variable_parses_back_to_number() {
        let v = vars(&[("count", Value::Number(42.0))]);
        assert_eq!(render("{{count}}", &v), Value::Number(42.0));
    }

    #[test]
    fn missing_variable_keeps_placeholder() {
        let v = vars(&[]);
        assert_eq!(
            render("hello {{who}}", &v),
            Value::String("hello {{who}}".to_string())
        );
    }

    #[test]
    fn embedded_substitution_stays_string() {
        let v = vars(&[("name", Value::String("ada".to_string()))]);
        assert_eq!(
            render("user-{{name}}", &v),
            Value::String("user-ada".to_string())
        );
    }

    #[test]
    fn unterminated_placeholder_is_verbatim() {
        let v = vars(&[("a", Value::Number(1.0))]);
        assert_eq!(render("{{a", &v), Value::String("{{a".to_string()));
    }

    #[test]
    fn truthiness() {
        assert!(!truthy(&Value::Null));
        assert!(!truthy(&Value::Bool(false)));
        assert!(!truthy(&Value::Number(0.0)));
        assert!(!truthy(&Value::String(String::new())));
        assert!(!truthy(&Value::String("false".to_string())));
        assert!(truthy(&Value::String("yes".to_string())));
        assert!(truthy(&Value::Number(2.0)));
        assert!(truthy(&Value::Array(vec![Value::Null])));
    }

    #[test]
    fn match_chain_falls_through_to_numeric() {
        assert!(values_match(
            &Value::String("vip".to_string()),
            &Value::String("vip".to_string())
        ));
        assert!(values_match(&Value::Number(3.0), &Value::String("3".to_string())));
        assert!(values_match(
            &Value::String("3.0".to_string()),
            &Value::String("3".to_string())
        ));
        assert!(!values_match(
            &Value::String("vip".to_string()),
            &Value::String("guest".to_string())
        ));
    }
}
