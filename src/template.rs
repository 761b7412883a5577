//! Named `{placeholder}` substitution used by [`Track::format`](crate::Track::format).

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::{LastFmError, Result};

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
    })
}

/// Substitute every `{name}` in `template` with `context[name]`.
pub fn render(template: &str, context: &BTreeMap<String, String>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in placeholder_pattern().captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_literal(&mut out, &template[last..whole.start()])?;
        last = whole.end();

        match caps.get(1) {
            Some(name) => {
                let value = context.get(name.as_str()).ok_or_else(|| {
                    LastFmError::Template(format!("unknown field '{}'", name.as_str()))
                })?;
                out.push_str(value);
            }
            None if whole.as_str() == "{{" => out.push('{'),
            None => out.push('}'),
        }
    }

    push_literal(&mut out, &template[last..])?;
    Ok(out)
}

fn push_literal(out: &mut String, literal: &str) -> Result<()> {
    if let Some(pos) = literal.find(['{', '}']) {
        return Err(LastFmError::Template(format!(
            "unbalanced brace in '{}'",
            &literal[pos..]
        )));
    }
    out.push_str(literal);
    Ok(())
}
