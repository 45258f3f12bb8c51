use base64::Engine;

use super::error::{Error, Result};

/// A single `name = value` or `name = (a b c)` shell assignment, or a
/// function body, captured by the dumper after it sources a recipe file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Scalar(String),
    Array(Vec<String>),
}

impl Value {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::Array(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&[String]> {
        match self {
            Value::Array(a) => Some(a),
            Value::Scalar(_) => None,
        }
    }
}

/// Everything the dumper observed after sourcing one recipe file: every
/// variable it did not already have in its environment, in declaration
/// order, plus every function it gained, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PkgbuildDump {
    /// Declaration order is preserved since later directive-suffixed
    /// assignments must be able to win ties over earlier ones.
    pub vars: Vec<(String, Value)>,
    /// Also declaration-ordered, for the same tie-breaking reason.
    pub functions: Vec<(String, String)>,
}

impl PkgbuildDump {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.iter().rev().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter_named(&self, name: &str) -> impl Iterator<Item = &Value> {
        self.vars.iter().filter(move |(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_function(&self, name: &str) -> Option<&str> {
        self.functions.iter().rev().find(|(n, _)| n == name).map(|(_, b)| b.as_str())
    }
}

fn decode_b64(line: &str, context: &str) -> Result<String> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(line.trim_end())
        .map_err(|_| Error::BadFunctionEncoding(context.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Parses the line-oriented protocol emitted by `script/dump.bash` into one
/// [`PkgbuildDump`] per `[PKGBUILD]` ... `[/PKGBUILD]` record, in the order
/// the records were emitted.
pub fn parse_dump(output: &[u8]) -> Result<Vec<PkgbuildDump>> {
    let text = String::from_utf8_lossy(output);
    let mut records = Vec::new();
    let mut lines = text.lines().peekable();

    while let Some(line) = lines.next() {
        if line != "[PKGBUILD]" {
            continue;
        }
        let mut dump = PkgbuildDump::default();
        loop {
            let line = lines.next().ok_or_else(|| {
                Error::MalformedDump("unterminated PKGBUILD record".into())
            })?;
            if line == "[/PKGBUILD]" {
                break;
            }
            if let Some(name) = line.strip_prefix("S:") {
                let payload = lines.next().ok_or_else(|| {
                    Error::MalformedDump(format!("scalar '{name}' missing value line"))
                })?;
                let value = decode_b64(payload, name)?;
                dump.vars.push((name.to_string(), Value::Scalar(value)));
            } else if let Some(name) = line.strip_prefix("A:") {
                let mut items = Vec::new();
                loop {
                    let payload = lines.next().ok_or_else(|| {
                        Error::MalformedDump(format!("array '{name}' missing terminator"))
                    })?;
                    if payload == "E" {
                        break;
                    }
                    items.push(decode_b64(payload, name)?);
                }
                dump.vars.push((name.to_string(), Value::Array(items)));
            } else if let Some(name) = line.strip_prefix("F:") {
                let payload = lines.next().ok_or_else(|| {
                    Error::MalformedDump(format!("function '{name}' missing body line"))
                })?;
                let body = decode_b64(payload, name)?;
                dump.functions.push((name.to_string(), body));
            } else {
                return Err(Error::MalformedDump(format!("unrecognized line: '{line}'")));
            }
        }
        records.push(dump);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b64(s: &str) -> String {
        base64::engine::general_purpose::STANDARD.encode(s)
    }

    #[test]
    fn parses_scalar_and_array_and_function() {
        let mut raw = String::new();
        raw.push_str("[PKGBUILD]\n");
        raw.push_str("S:pkgver\n");
        raw.push_str(&format!("{}\n", b64("1.2.3")));
        raw.push_str("A:depends\n");
        raw.push_str(&format!("{}\n", b64("glibc")));
        raw.push_str(&format!("{}\n", b64("zlib")));
        raw.push_str("E\n");
        raw.push_str("F:build\n");
        raw.push_str(&format!("{}\n", b64("build () \n{\n    make\n}\n")));
        raw.push_str("[/PKGBUILD]\n");

        let dumps = parse_dump(raw.as_bytes()).unwrap();
        assert_eq!(dumps.len(), 1);
        let dump = &dumps[0];
        assert_eq!(dump.get("pkgver"), Some(&Value::Scalar("1.2.3".into())));
        assert_eq!(
            dump.get("depends"),
            Some(&Value::Array(vec!["glibc".into(), "zlib".into()]))
        );
        assert!(dump.get_function("build").unwrap().contains("make"));
    }

    #[test]
    fn parses_multiple_records_in_order() {
        let raw = "[PKGBUILD]\n[/PKGBUILD]\n[PKGBUILD]\nS:x\n\n[/PKGBUILD]\n";
        let dumps = parse_dump(raw.as_bytes()).unwrap();
        assert_eq!(dumps.len(), 2);
        assert_eq!(dumps[1].get("x"), Some(&Value::Scalar(String::new())));
    }

    #[test]
    fn rejects_unterminated_record() {
        let raw = "[PKGBUILD]\nS:x\n";
        assert!(parse_dump(raw.as_bytes()).is_err());
    }
}
