use buildscope_types::{NORMALIZED_STRINGS_FORMAT_VERSION, Tree};
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

/// Deduplicating string interner shared by one build tree.
///
/// Interning happens in bulk once the event stream is exhausted
/// (`intern_tree`), not per field while events stream in.
#[derive(Debug, Default)]
pub struct StringTable {
    strings: HashSet<Arc<str>>,
    normalize_line_endings: bool,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Older producers neither deduplicate strings nor normalize line endings.
    pub fn for_format_version(version: u32) -> Self {
        let mut table = Self::new();
        table.set_format_version(version);
        table
    }

    pub fn set_format_version(&mut self, version: u32) {
        self.normalize_line_endings = version < NORMALIZED_STRINGS_FORMAT_VERSION;
    }

    pub fn normalizes_line_endings(&self) -> bool {
        self.normalize_line_endings
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn contains(&self, s: &str) -> bool {
        self.strings.contains(s)
    }

    fn normalized<'a>(&self, s: &'a str) -> Cow<'a, str> {
        if self.normalize_line_endings && s.contains('\r') {
            Cow::Owned(normalize_line_endings(s))
        } else {
            Cow::Borrowed(s)
        }
    }

    /// Shared instance equal to `s` (after line ending normalization)
    pub fn intern(&mut self, s: &str) -> Arc<str> {
        let s = self.normalized(s);
        if let Some(existing) = self.strings.get(s.as_ref()) {
            return Arc::clone(existing);
        }
        let shared: Arc<str> = Arc::from(s.as_ref());
        self.strings.insert(Arc::clone(&shared));
        shared
    }

    /// Like `intern`, but reuses the given allocation when the string is new
    pub fn intern_arc(&mut self, s: &Arc<str>) -> Arc<str> {
        if let Some(existing) = self.strings.get(s.as_ref()) {
            return Arc::clone(existing);
        }
        match self.normalized(s) {
            Cow::Borrowed(_) => {
                self.strings.insert(Arc::clone(s));
                Arc::clone(s)
            }
            Cow::Owned(normalized) => self.intern(&normalized),
        }
    }

    /// Seed the table with a complete string dictionary
    pub fn intern_all<I, S>(&mut self, strings: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for s in strings {
            self.intern(s.as_ref());
        }
    }

    /// Replace every string held by the tree with its shared instance.
    ///
    /// Returns how many fields now point at a different allocation.
    pub fn intern_tree(&mut self, tree: &mut Tree) -> usize {
        let mut replaced = 0;
        tree.for_each_kind_mut(|_, kind| {
            kind.for_each_string_mut(&mut |field| {
                let shared = self.intern_arc(field);
                if !Arc::ptr_eq(&shared, field) {
                    *field = shared;
                    replaced += 1;
                }
            });
        });
        replaced
    }
}

/// `\r\n` and lone `\r` become `\n`
pub fn normalize_line_endings(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildscope_types::{BuildNode, DiagnosticNode, NodeKind, TimedNode};

    #[test]
    fn test_intern_is_idempotent() {
        let mut table = StringTable::new();
        let a = table.intern("CoreCompile");
        let b = table.intern("CoreCompile");

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(table.len(), 1);
        assert!(table.contains("CoreCompile"));
    }

    #[test]
    fn test_line_endings_follow_format_version() {
        let mut old = StringTable::for_format_version(9);
        assert!(old.normalizes_line_endings());
        assert_eq!(old.intern("a\r\nb\rc").as_ref(), "a\nb\nc");

        let mut new = StringTable::for_format_version(NORMALIZED_STRINGS_FORMAT_VERSION);
        assert!(!new.normalizes_line_endings());
        assert_eq!(new.intern("a\r\nb").as_ref(), "a\r\nb");
    }

    #[test]
    fn test_intern_arc_reuses_allocation() {
        let mut table = StringTable::new();
        let original: Arc<str> = Arc::from("Csc");
        let shared = table.intern_arc(&original);
        assert!(Arc::ptr_eq(&original, &shared));

        let other: Arc<str> = Arc::from("Csc");
        assert!(Arc::ptr_eq(&table.intern_arc(&other), &original));
    }

    #[test]
    fn test_intern_tree_deduplicates_fields() {
        let mut tree = Tree::new(NodeKind::Build(BuildNode {
            timed: TimedNode::new(0, "Build"),
            succeeded: None,
        }));
        let root = tree.root();
        tree.add_child(root, NodeKind::Message(DiagnosticNode::new("same")))
            .unwrap();
        tree.add_child(root, NodeKind::Message(DiagnosticNode::new("same")))
            .unwrap();

        let mut table = StringTable::new();
        table.intern_all(["Build"]);
        let replaced = table.intern_tree(&mut tree);

        // "Build" already existed, and the second "same" joins the first one
        assert_eq!(replaced, 2);
        assert_eq!(table.len(), 2);

        let texts: Vec<Arc<str>> = tree
            .children(root)
            .iter()
            .filter_map(|&id| tree[id].kind().diagnostic().map(|d| d.text.clone()))
            .collect();
        assert!(Arc::ptr_eq(&texts[0], &texts[1]));
    }
}
