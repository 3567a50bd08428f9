use std::fmt::Write as _;

use super::object::Object;

/// One row of the aggregated cross-reference table.
#[derive(Debug, Clone)]
pub struct XrefEntry {
    pub offset: usize,
    pub revision: u16,
    pub used: bool,
    pub object: Object,
    pub stream: Option<(usize, usize)>,
}

impl Default for XrefEntry {
    fn default() -> Self {
        XrefEntry {
            offset: 0,
            revision: 0,
            used: false,
            object: Object::Nil,
            stream: None,
        }
    }
}

impl XrefEntry {
    /// Per the xref diff policy: compares `revision`, `used`,
    /// `object`, `stream`. `offset` is deliberately excluded — two files
    /// can place the same object at different byte positions and still
    /// be structurally equivalent.
    pub fn eq_in(&self, other: &XrefEntry, buf_a: &[u8], buf_b: &[u8]) -> bool {
        self.revision == other.revision
            && self.used == other.used
            && self.object.eq_in(&other.object, buf_a, buf_b)
            && streams_eq(self.stream, other.stream, buf_a, buf_b)
    }

    pub fn diff(&self, other: &XrefEntry, buf_a: &[u8], buf_b: &[u8], depth: usize, out: &mut String) {
        let indent = "    ".repeat(depth);
        if self.revision != other.revision {
            let _ = writeln!(out, "{indent}Revision: ");
            let _ = writeln!(out, "{}{} / {}", "    ".repeat(depth + 1), self.revision, other.revision);
        }
        if self.used != other.used {
            let _ = writeln!(out, "{indent}Used: ");
            let _ = writeln!(out, "{}{} / {}", "    ".repeat(depth + 1), self.used, other.used);
        }
        self.object.diff(&other.object, buf_a, buf_b, depth, out);
        diff_stream_field(self.stream, buf_a, other.stream, buf_b, depth, out);
    }
}

fn streams_eq(a: Option<(usize, usize)>, b: Option<(usize, usize)>, buf_a: &[u8], buf_b: &[u8]) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some((ba, sa)), Some((bb, sb))) => sa == sb && buf_a.get(ba..ba + sa) == buf_b.get(bb..bb + sb),
        _ => false,
    }
}

fn diff_stream_field(
    a: Option<(usize, usize)>,
    buf_a: &[u8],
    b: Option<(usize, usize)>,
    buf_b: &[u8],
    depth: usize,
    out: &mut String,
) {
    let indent = "    ".repeat(depth);
    match (a, b) {
        (None, None) => {}
        (Some((_, sa)), None) => {
            let _ = writeln!(out, "{indent}Stream: ");
            let _ = writeln!(out, "{}stream[{sa}] / <none>", "    ".repeat(depth + 1));
        }
        (None, Some((_, sb))) => {
            let _ = writeln!(out, "{indent}Stream: ");
            let _ = writeln!(out, "{}<none> / stream[{sb}]", "    ".repeat(depth + 1));
        }
        (Some((ba, sa)), Some((bb, sb))) => {
            if sa != sb {
                let _ = writeln!(out, "{indent}Size: ");
                let _ = writeln!(out, "{}{sa} / {sb}", "    ".repeat(depth + 1));
                return;
            }
            let a_bytes = &buf_a[ba..ba + sa];
            let b_bytes = &buf_b[bb..bb + sb];
            if let Some(i) = (0..sa).find(|&i| a_bytes[i] != b_bytes[i]) {
                let _ = writeln!(out, "{indent}Offset[{i}]: ");
                let _ = writeln!(out, "{}{} / {}", "    ".repeat(depth + 1), a_bytes[i], b_bytes[i]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_excluded_from_equality() {
        let a = XrefEntry {
            offset: 10,
            revision: 0,
            used: true,
            object: Object::Nil,
            stream: None,
        };
        let b = XrefEntry { offset: 9999, ..a.clone() };
        assert!(a.eq_in(&b, b"", b""));
    }

    #[test]
    fn test_stream_diff_reports_offset_only() {
        let a_buf = b"ABCD";
        let b_buf = b"ABXD";
        let a = XrefEntry {
            stream: Some((0, 4)),
            ..Default::default()
        };
        let b = XrefEntry {
            stream: Some((0, 4)),
            ..Default::default()
        };
        let mut out = String::new();
        a.diff(&b, a_buf, b_buf, 0, &mut out);
        assert!(out.contains("Offset[2]"));
        assert!(!out.contains("Size"));
    }
}
