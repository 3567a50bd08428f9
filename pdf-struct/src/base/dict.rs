use std::fmt::Write as _;

use super::name::Name;
use super::object::Object;

/// A PDF dictionary: `Name -> Object`, insertion order preserved but not
/// significant to equality. Keys are unique; the parser overwrites rather
/// than duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dict(pub Vec<(Name, Object)>);

impl Dict {
    pub fn new() -> Self {
        Dict(Vec::new())
    }

    pub fn get(&self, key: &[u8]) -> Option<&Object> {
        self.0.iter().find(|(n, _)| n == &key).map(|(_, v)| v)
    }

    /// Inserts `obj` under `name`, overwriting any existing value for
    /// that key rather than appending a duplicate.
    pub fn insert(&mut self, name: Name, obj: Object) {
        if let Some(entry) = self.0.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = obj;
        } else {
            self.0.push((name, obj));
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Same key set, equal values per key, comparing `String`/`Stream`
    /// payloads against their respective owning buffers.
    pub fn eq_in(&self, other: &Dict, buf_a: &[u8], buf_b: &[u8]) -> bool {
        self.0.len() == other.0.len()
            && self.0.iter().all(|(k, v)| {
                other
                    .get(&k.0)
                    .is_some_and(|ov| v.eq_in(ov, buf_a, buf_b))
            })
    }

    pub fn render(&self, buf: &[u8]) -> String {
        let mut s = String::from("<< ");
        for (key, val) in &self.0 {
            let _ = write!(s, "{key} {} ", val.render(buf));
        }
        s.push_str(">>");
        s
    }

    /// Emits one `Key: ` line per differing or one-sided key, recursing
    /// into the value's own diff for keys present on both sides.
    pub fn diff(&self, other: &Dict, buf_a: &[u8], buf_b: &[u8], depth: usize, out: &mut String) {
        let indent = "    ".repeat(depth);
        for (key, val) in &self.0 {
            match other.get(&key.0) {
                Some(oval) if val.eq_in(oval, buf_a, buf_b) => {}
                Some(oval) => {
                    let _ = writeln!(out, "{indent}{key}: ");
                    val.diff(oval, buf_a, buf_b, depth + 1, out);
                }
                None => {
                    let _ = writeln!(out, "{indent}{key}: ");
                    let _ = writeln!(out, "{}{} / <missing>", "    ".repeat(depth + 1), val.render(buf_a));
                }
            }
        }
        for (key, oval) in &other.0 {
            if self.get(&key.0).is_none() {
                let _ = writeln!(out, "{indent}{key}: ");
                let _ = writeln!(out, "{}<missing> / {}", "    ".repeat(depth + 1), oval.render(buf_b));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::object::Object;

    #[test]
    fn test_insert_overwrites() {
        let mut d = Dict::new();
        d.insert(Name::from(b"Type".as_slice()), Object::Numeric(1.0));
        d.insert(Name::from(b"Type".as_slice()), Object::Numeric(2.0));
        assert_eq!(d.len(), 1);
        assert_eq!(d.get(b"Type"), Some(&Object::Numeric(2.0)));
    }

    #[test]
    fn test_eq_in_ignores_order() {
        let mut a = Dict::new();
        a.insert(Name::from(b"A".as_slice()), Object::Numeric(1.0));
        a.insert(Name::from(b"B".as_slice()), Object::Numeric(2.0));
        let mut b = Dict::new();
        b.insert(Name::from(b"B".as_slice()), Object::Numeric(2.0));
        b.insert(Name::from(b"A".as_slice()), Object::Numeric(1.0));
        assert!(a.eq_in(&b, b"", b""));
    }
}
