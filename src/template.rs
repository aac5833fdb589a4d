//! Variable interpolation for config values
//!
//! Handles `${VARIABLE}` references so secrets such as the bind password
//! can live in the environment instead of the config file.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Regex for matching variables: ${NAME}
static VARIABLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}").unwrap());

/// Render a template, resolving variables from the process environment
pub fn render_env(template: &str) -> Result<String> {
    render_with(template, |name| std::env::var(name).ok())
}

/// Render a template, resolving variables with `lookup`
///
/// Every referenced variable must resolve. Text without references is
/// returned unchanged.
pub fn render_with<F>(template: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(template.len());
    let mut last = 0;

    for cap in VARIABLE_REGEX.captures_iter(template) {
        let full = cap.get(0).expect("group 0 always matches");
        let name = &cap[1];
        let value = lookup(name).ok_or_else(|| Error::undefined_var(name))?;
        result.push_str(&template[last..full.start()]);
        result.push_str(&value);
        last = full.end();
    }
    result.push_str(&template[last..]);

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_render_plain_text() {
        let result = render_with("123QWEasd", lookup(&[])).unwrap();
        assert_eq!(result, "123QWEasd");
    }

    #[test]
    fn test_render_single_variable() {
        let result = render_with("${LDAP_PASSWORD}", lookup(&[("LDAP_PASSWORD", "s3cret")])).unwrap();
        assert_eq!(result, "s3cret");
    }

    #[test]
    fn test_render_embedded_variables() {
        let vars = lookup(&[("USER", "bob"), ("DOMAIN", "its")]);
        let result = render_with("${USER}@${ DOMAIN }", vars).unwrap();
        assert_eq!(result, "bob@its");
    }

    #[test]
    fn test_render_undefined_variable() {
        let err = render_with("${MISSING}", lookup(&[])).unwrap_err();
        assert!(matches!(err, Error::UndefinedVariable { ref variable } if variable == "MISSING"));
    }

    #[test]
    fn test_dollar_without_braces_is_literal() {
        let result = render_with("pa$$word", lookup(&[])).unwrap();
        assert_eq!(result, "pa$$word");
    }
}
