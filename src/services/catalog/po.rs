//! Gettext PO text for catalog documents.
//!
//! Only what catalogs need: a header entry, then one `msgid`/`msgstr` pair per
//! translation. Contexts, plural forms and comments are accepted on read and
//! ignored (plural entries keep `msgstr[0]`).

use std::fmt::Write as _;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PoError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
}

pub fn generate(locale: &str, domain: &str, entries: &[(String, String)]) -> String {
    let mut out = String::new();

    out.push_str("msgid \"\"\nmsgstr \"\"\n");
    out.push_str("\"Content-Type: text/plain; charset=UTF-8\\n\"\n");
    let _ = writeln!(out, "\"Language: {}\\n\"", escape(locale));
    let _ = writeln!(out, "\"X-Domain: {}\\n\"", escape(domain));

    for (source, target) in entries {
        if target.is_empty() {
            continue;
        }
        out.push('\n');
        write_field(&mut out, "msgid", source);
        write_field(&mut out, "msgstr", target);
    }

    out
}

fn write_field(out: &mut String, keyword: &str, value: &str) {
    if !value.contains('\n') {
        let _ = writeln!(out, "{keyword} \"{}\"", escape(value));
        return;
    }

    let _ = writeln!(out, "{keyword} \"\"");
    for line in value.split_inclusive('\n') {
        let _ = writeln!(out, "\"{}\"", escape(line));
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Str,
    Ignored,
}

#[derive(Default)]
struct Pending {
    id: Option<String>,
    value: Option<String>,
}

impl Pending {
    fn flush(&mut self, out: &mut Vec<(String, String)>) {
        let id = self.id.take();
        let value = self.value.take();

        if let (Some(id), Some(value)) = (id, value) {
            // Header entry and untranslated records carry nothing.
            if id.is_empty() || value.is_empty() {
                return;
            }
            if !out.iter().any(|(s, _)| *s == id) {
                out.push((id, value));
            }
        }
    }
}

/// Parses PO text into `(source, target)` pairs, dropping untranslated ones.
pub fn parse(text: &str) -> Result<Vec<(String, String)>, PoError> {
    let mut out = Vec::new();
    let mut pending = Pending::default();
    let mut field: Option<Field> = None;

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim();

        if line.is_empty() {
            pending.flush(&mut out);
            field = None;
            continue;
        }

        if line.starts_with('#') {
            continue;
        }

        if line.starts_with('"') {
            let s = unquote(line, line_no)?;
            match field {
                Some(Field::Id) => append(&mut pending.id, &s),
                Some(Field::Str) => append(&mut pending.value, &s),
                Some(Field::Ignored) => {}
                None => {
                    return Err(PoError::Syntax {
                        line: line_no,
                        message: "string without a keyword".to_string(),
                    })
                }
            }
            continue;
        }

        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((k, r)) => (k, r.trim_start()),
            None => {
                return Err(PoError::Syntax {
                    line: line_no,
                    message: format!("unexpected `{line}`"),
                })
            }
        };
        let s = unquote(rest, line_no)?;

        match keyword {
            "msgctxt" => {
                pending.flush(&mut out);
                field = Some(Field::Ignored);
            }
            "msgid" => {
                if pending.value.is_some() {
                    pending.flush(&mut out);
                }
                pending.id = Some(s);
                field = Some(Field::Id);
            }
            "msgstr" | "msgstr[0]" => {
                pending.value = Some(s);
                field = Some(Field::Str);
            }
            k if k == "msgid_plural" || k.starts_with("msgstr[") => {
                field = Some(Field::Ignored);
            }
            other => {
                return Err(PoError::Syntax {
                    line: line_no,
                    message: format!("unknown keyword `{other}`"),
                })
            }
        }
    }

    pending.flush(&mut out);
    Ok(out)
}

fn append(slot: &mut Option<String>, s: &str) {
    slot.get_or_insert_with(String::new).push_str(s);
}

fn unquote(s: &str, line: usize) -> Result<String, PoError> {
    let inner = s
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .filter(|_| s.len() >= 2)
        .ok_or_else(|| PoError::Syntax {
            line,
            message: "expected a quoted string".to_string(),
        })?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => {
                return Err(PoError::Syntax {
                    line,
                    message: "dangling escape".to_string(),
                })
            }
        }
    }

    Ok(out)
}
