use std::fmt::Write as _;

use super::dict::Dict;
use super::name::Name;

/// The nine PDF value kinds, as a sealed sum type.
///
/// `String` and `Stream` carry only byte offsets into their owning
/// document's buffer rather than borrowed slices or owned copies — this
/// decouples an `Object` tree's lifetime from any particular `&[u8]`, at
/// the cost of needing the buffer passed explicitly into [`eq_in`] and
/// [`diff`] wherever string/stream content actually has to be compared.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Nil,
    Bool(bool),
    Numeric(f64),
    /// `[begin, end)`, including the surrounding `(...)` or `<...>`.
    String(usize, usize),
    Name(Name),
    Array(Vec<Object>),
    Dictionary(Dict),
    /// `(begin, size)`. Not produced by the materializer pipeline, which
    /// records stream spans on the owning `XrefEntry` instead; kept here
    /// for the tagged variant's exhaustiveness and exercised directly in
    /// unit tests.
    Stream { begin: usize, size: usize },
    /// Object number of an `n 0 R` reference; generation is always 0
    /// (anything else is rejected during parsing).
    Indirect(u32),
}

const ARRAY_DISPLAY_LIMIT: usize = 32;

impl Object {
    pub fn new_string(begin: usize, end: usize) -> Object {
        Object::String(begin, end)
    }

    /// Equality per the per-variant table above; `buf_a`/`buf_b` are
    /// the buffers `self`/`other` respectively borrow string and stream
    /// ranges from (they may be the same buffer, or two different
    /// documents' buffers when comparing across documents).
    pub fn eq_in(&self, other: &Object, buf_a: &[u8], buf_b: &[u8]) -> bool {
        match (self, other) {
            (Object::Nil, Object::Nil) => true,
            (Object::Bool(a), Object::Bool(b)) => a == b,
            (Object::Numeric(a), Object::Numeric(b)) => a == b,
            (Object::String(a0, a1), Object::String(b0, b1)) => {
                buf_a.get(*a0..*a1) == buf_b.get(*b0..*b1)
            }
            (Object::Name(a), Object::Name(b)) => a == b,
            (Object::Array(a), Object::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_in(y, buf_a, buf_b))
            }
            (Object::Dictionary(a), Object::Dictionary(b)) => a.eq_in(b, buf_a, buf_b),
            (Object::Stream { begin: a0, size: a1 }, Object::Stream { begin: b0, size: b1 }) => {
                a1 == b1 && buf_a.get(*a0..*a0 + *a1) == buf_b.get(*b0..*b0 + *b1)
            }
            (Object::Indirect(a), Object::Indirect(b)) => a == b,
            _ => false,
        }
    }

    /// Compact rendering for logging and CLI display. Arrays truncate to
    /// `..<length>..` once the rendered form would exceed 32 characters.
    pub fn render(&self, buf: &[u8]) -> String {
        match self {
            Object::Nil => "null".to_string(),
            Object::Bool(true) => "true".to_string(),
            Object::Bool(false) => "false".to_string(),
            Object::Numeric(n) => render_numeric(*n),
            Object::String(begin, end) => {
                String::from_utf8_lossy(buf.get(*begin..*end).unwrap_or(b"")).into_owned()
            }
            Object::Name(name) => name.to_string(),
            Object::Array(items) => {
                let mut inner = String::new();
                for item in items {
                    let _ = write!(inner, "{} ", item.render(buf));
                }
                if inner.len() > ARRAY_DISPLAY_LIMIT {
                    inner = format!("..{}..", inner.len());
                }
                format!("[{inner}]")
            }
            Object::Dictionary(dict) => dict.render(buf),
            Object::Stream { size, .. } => format!("stream[{size}]"),
            Object::Indirect(num) => format!("{num} 0 R"),
        }
    }

    /// Writes discrepancies under `self`/`other`, indented `depth * 4`
    /// spaces, recursing into composites and descending depth only when
    /// descending into named sub-elements. No-op if the two are already equal.
    pub fn diff(&self, other: &Object, buf_a: &[u8], buf_b: &[u8], depth: usize, out: &mut String) {
        if self.eq_in(other, buf_a, buf_b) {
            return;
        }
        match (self, other) {
            (Object::Dictionary(a), Object::Dictionary(b)) => a.diff(b, buf_a, buf_b, depth, out),
            (Object::Array(a), Object::Array(b)) => diff_array(a, b, buf_a, buf_b, depth, out),
            (Object::Stream { begin: a0, size: a1 }, Object::Stream { begin: b0, size: b1 }) => {
                diff_stream(buf_a, *a0, *a1, buf_b, *b0, *b1, depth, out)
            }
            _ => {
                let indent = "    ".repeat(depth);
                let _ = writeln!(out, "{indent}{} / {}", self.render(buf_a), other.render(buf_b));
            }
        }
    }
}

fn render_numeric(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn diff_array(a: &[Object], b: &[Object], buf_a: &[u8], buf_b: &[u8], depth: usize, out: &mut String) {
    let indent = "    ".repeat(depth);
    if a.len() != b.len() {
        let _ = writeln!(out, "{indent}Length: ");
        let _ = writeln!(out, "{}{} / {}", "    ".repeat(depth + 1), a.len(), b.len());
    }
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        if x.eq_in(y, buf_a, buf_b) {
            continue;
        }
        let _ = writeln!(out, "{indent}[{i}]: ");
        x.diff(y, buf_a, buf_b, depth + 1, out);
    }
}

/// Same-length streams report only the first
/// differing byte index, never `Size`; differing lengths report `Size`
/// and nothing else.
fn diff_stream(
    buf_a: &[u8],
    begin_a: usize,
    size_a: usize,
    buf_b: &[u8],
    begin_b: usize,
    size_b: usize,
    depth: usize,
    out: &mut String,
) {
    let indent = "    ".repeat(depth);
    if size_a != size_b {
        let _ = writeln!(out, "{indent}Size: ");
        let _ = writeln!(out, "{}{size_a} / {size_b}", "    ".repeat(depth + 1));
        return;
    }
    let a = &buf_a[begin_a..begin_a + size_a];
    let b = &buf_b[begin_b..begin_b + size_b];
    if let Some(i) = (0..size_a).find(|&i| a[i] != b[i]) {
        let _ = writeln!(out, "{indent}Offset[{i}]: ");
        let _ = writeln!(out, "{}{} / {}", "    ".repeat(depth + 1), a[i], b[i]);
    }
}
