//! Substitutes pass-1-captured variables into a `build()`/`package()` body
//! before it is handed to the shell interpreter that actually runs it.
//!
//! This is deliberately not a general shell expander: it only resolves
//! `${name}`, `${name[@]}`/`${name[*]}`, and bare `$name` references that
//! match a name known to the [`Scope`]. Anything else -- command
//! substitution, parameter expansion operators like `${name:-default}`,
//! identifiers never captured in pass 1 -- is left untouched for the real
//! shell to evaluate at run time.

use std::collections::HashMap;

use super::ast::Value;

/// The set of substitutable names available while expanding one function
/// body: the fixed PKGBUILD-scope variables plus every scalar/array
/// pass 1 captured.
#[derive(Debug, Default, Clone)]
pub struct Scope {
    vars: HashMap<String, Value>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.vars.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }
}

fn render(value: &Value, whole_array: bool) -> String {
    match value {
        Value::Scalar(s) => s.clone(),
        Value::Array(items) => {
            if whole_array {
                items.join(" ")
            } else {
                items.first().cloned().unwrap_or_default()
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_ident_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// Expand every recognized `$name`/`${name}`/`${name[@]}` reference in
/// `body` against `scope`, leaving unrecognized references literal.
pub fn expand(body: &str, scope: &Scope) -> String {
    let chars: Vec<char> = body.chars().collect();
    let mut out = String::with_capacity(body.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c != '$' || i + 1 >= chars.len() {
            out.push(c);
            i += 1;
            continue;
        }
        if chars[i + 1] == '{' {
            if let Some(close) = find_matching_brace(&chars, i + 1) {
                let inner: String = chars[i + 2..close].iter().collect();
                if let Some(rendered) = expand_braced(&inner, scope) {
                    out.push_str(&rendered);
                    i = close + 1;
                    continue;
                }
            }
            out.push(c);
            i += 1;
            continue;
        }
        if is_ident_start(chars[i + 1]) {
            let start = i + 1;
            let mut end = start;
            while end < chars.len() && is_ident_char(chars[end]) {
                end += 1;
            }
            let name: String = chars[start..end].iter().collect();
            if let Some(value) = scope.get(&name) {
                out.push_str(&render(value, false));
                i = end;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }
    out
}

fn find_matching_brace(chars: &[char], open: usize) -> Option<usize> {
    chars[open..].iter().position(|c| *c == '}').map(|p| open + p)
}

/// Expands the contents of a `${...}` reference. Returns `None` when the
/// name isn't a plain identifier (so parameter-expansion operators like
/// `:-`/`:+` pass through untouched) or isn't known to `scope`.
fn expand_braced(inner: &str, scope: &Scope) -> Option<String> {
    let (name, whole_array) = if let Some(stripped) = inner.strip_suffix("[@]") {
        (stripped, true)
    } else if let Some(stripped) = inner.strip_suffix("[*]") {
        (stripped, true)
    } else {
        (inner, false)
    };
    if name.is_empty() || !name.chars().all(is_ident_char) || !is_ident_start(name.chars().next()?)
    {
        return None;
    }
    scope.get(name).map(|value| render(value, whole_array))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_scope() -> Scope {
        let mut scope = Scope::new();
        scope.set("pkgdir", Value::Scalar("/tmp/pkg".into()));
        scope.set("pkgname", Value::Scalar("foo".into()));
        scope.set("depends", Value::Array(vec!["a".into(), "b".into()]));
        scope
    }

    #[test]
    fn expands_braced_and_bare_scalars() {
        let scope = scalar_scope();
        assert_eq!(expand("install -d \"${pkgdir}/usr\"", &scope), "install -d \"/tmp/pkg/usr\"");
        assert_eq!(expand("echo $pkgname", &scope), "echo foo");
    }

    #[test]
    fn expands_whole_array_and_first_element() {
        let scope = scalar_scope();
        assert_eq!(expand("echo ${depends[@]}", &scope), "echo a b");
        assert_eq!(expand("echo ${depends}", &scope), "echo a");
    }

    #[test]
    fn leaves_unknown_and_parameter_expansions_literal() {
        let scope = scalar_scope();
        assert_eq!(expand("echo ${unset_var}", &scope), "echo ${unset_var}");
        assert_eq!(expand("echo ${pkgname:-default}", &scope), "echo ${pkgname:-default}");
        assert_eq!(expand("for f in *.c; do echo $f; done", &scope), "for f in *.c; do echo $f; done");
    }
}
