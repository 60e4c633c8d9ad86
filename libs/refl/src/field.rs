/// Descriptor of a struct field, reported by traversal for direct struct
/// members only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Declared field name.
    pub name: &'static str,
    /// Position among the reflected fields (skipped fields do not count).
    pub index: usize,
    /// Declared field type, as written in the source.
    pub type_name: &'static str,
    pub tag: Tag,
}

impl Field {
    pub const fn new(name: &'static str, index: usize, type_name: &'static str, tag: Tag) -> Self {
        Self {
            name,
            index,
            type_name,
            tag,
        }
    }
}

/// Struct tag in the conventional `key:"value" other:"value"` form, declared
/// with `#[reflect(tag = "...")]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tag(&'static str);

impl Tag {
    pub const EMPTY: Tag = Tag("");

    pub const fn new(raw: &'static str) -> Self {
        Tag(raw)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value for `key`, or `""` when absent.
    pub fn get(&self, key: &str) -> &'static str {
        self.lookup(key).unwrap_or("")
    }

    /// Value for `key`; distinguishes an absent key from an empty value.
    ///
    /// Parsing stops at the first malformed pair. Values are returned without
    /// their quotes; backslash escapes are left as written.
    pub fn lookup(&self, key: &str) -> Option<&'static str> {
        let mut rest = self.0;
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                return None;
            }

            let name_end = rest
                .find(|c: char| c <= ' ' || c == ':' || c == '"' || c == '\u{7f}')
                .unwrap_or(rest.len());
            if name_end == 0 || !rest[name_end..].starts_with(":\"") {
                return None;
            }
            let name = &rest[..name_end];
            rest = &rest[name_end + 2..];

            let value_end = closing_quote(rest)?;
            let value = &rest[..value_end];
            rest = &rest[value_end + 1..];

            if name == key {
                return Some(value);
            }
        }
    }
}

fn closing_quote(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}
