//! Directory tree built from a flat path list, and its text rendering

use crate::document::Diagnostics;
use std::collections::BTreeMap;

/// A tree entry: a file leaf or a nested directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    File,
    Dir(Tree),
}

impl Node {
    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Dir(_))
    }
}

/// Children of one directory, keyed by path segment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    pub children: BTreeMap<String, Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    /// Insert one slash-separated path.
    ///
    /// An intermediate segment that is already a file becomes a directory;
    /// a final segment that is already a directory is dropped. Both are
    /// reported through `diagnostics`.
    pub fn insert(&mut self, path: &str, diagnostics: &mut Diagnostics) {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.insert_segments(&segments, path, diagnostics);
    }

    fn insert_segments(&mut self, segments: &[&str], path: &str, diagnostics: &mut Diagnostics) {
        match segments {
            [] => {}
            [file_name] => match self.children.get(*file_name) {
                Some(Node::Dir(_)) => diagnostics.warn(format!(
                    "File '{}' conflicts with an existing directory structure entry. Skipping file entry in tree.",
                    path
                )),
                _ => {
                    self.children.insert(file_name.to_string(), Node::File);
                }
            },
            [dir, rest @ ..] => {
                let node = self
                    .children
                    .entry(dir.to_string())
                    .or_insert_with(|| Node::Dir(Tree::new()));
                if let Node::File = node {
                    diagnostics.warn(format!(
                        "Directory component '{}' in '{}' conflicts with an existing file entry. Overwriting file entry with directory in tree.",
                        dir, path
                    ));
                    *node = Node::Dir(Tree::new());
                }
                if let Node::Dir(subtree) = node {
                    subtree.insert_segments(rest, path, diagnostics);
                }
            }
        }
    }

    /// Render as connector lines: files before directories, each group
    /// sorted by name, directories suffixed with `/`
    pub fn render(&self, prefix: &str) -> Vec<String> {
        let mut lines = Vec::new();
        self.render_into(prefix, &mut lines);
        lines
    }

    fn render_into(&self, prefix: &str, lines: &mut Vec<String>) {
        let mut entries: Vec<(&String, &Node)> = self.children.iter().collect();
        entries.sort_by(|a, b| (a.1.is_dir(), a.0).cmp(&(b.1.is_dir(), b.0)));

        let count = entries.len();
        for (i, (name, node)) in entries.into_iter().enumerate() {
            let is_last = i + 1 == count;
            let connector = if is_last { "└── " } else { "├── " };
            match node {
                Node::File => lines.push(format!("{}{}{}", prefix, connector, name)),
                Node::Dir(subtree) => {
                    lines.push(format!("{}{}{}/", prefix, connector, name));
                    let extension = if is_last { "    " } else { "│   " };
                    subtree.render_into(&format!("{}{}", prefix, extension), lines);
                }
            }
        }
    }
}

/// Builds a [`Tree`] from an ordered path list
pub struct TreeBuilder {}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {}
    }

    pub fn build<I, S>(&self, paths: I, diagnostics: &mut Diagnostics) -> Tree
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Tree::new();
        for path in paths {
            tree.insert(path.as_ref(), diagnostics);
        }
        tree
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(paths: &[&str]) -> (Tree, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let tree = TreeBuilder::new().build(paths.iter().copied(), &mut diagnostics);
        (tree, diagnostics)
    }

    #[test]
    fn test_build_nested() {
        let (tree, diagnostics) = build(&["a.txt", "b/c.bin", "b/d/e.rs"]);

        assert!(diagnostics.is_empty());
        assert_eq!(tree.get("a.txt"), Some(&Node::File));
        let Some(Node::Dir(b)) = tree.get("b") else {
            panic!("b should be a directory");
        };
        assert_eq!(b.get("c.bin"), Some(&Node::File));
        assert!(matches!(b.get("d"), Some(Node::Dir(_))));
    }

    #[test]
    fn test_render_files_before_directories() {
        let (tree, _) = build(&["src/main.rs", "src/lib/mod.rs", "zeta.txt", "Cargo.toml", "src/a.rs"]);

        assert_eq!(
            tree.render(""),
            vec![
                "├── Cargo.toml",
                "├── zeta.txt",
                "└── src/",
                "    ├── a.rs",
                "    ├── main.rs",
                "    └── lib/",
                "        └── mod.rs",
            ]
        );
    }

    #[test]
    fn test_render_continuation_bar_and_prefix() {
        let (tree, _) = build(&["a/x.txt", "b/y.txt"]);

        assert_eq!(
            tree.render("    "),
            vec![
                "    ├── a/",
                "    │   └── x.txt",
                "    └── b/",
                "        └── y.txt",
            ]
        );
    }

    #[test]
    fn test_file_then_directory_conflict_overwrites_file() {
        let (tree, diagnostics) = build(&["x", "x/y"]);

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.mentions("Overwriting file entry with directory"));
        let Some(Node::Dir(x)) = tree.get("x") else {
            panic!("x should have become a directory");
        };
        assert_eq!(x.get("y"), Some(&Node::File));
    }

    #[test]
    fn test_nested_conflict_keeps_deeper_entries() {
        let (tree, diagnostics) = build(&["a/b", "a/b/c/d", "a/e"]);

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.mentions("'b' in 'a/b/c/d'"));
        let Some(Node::Dir(a)) = tree.get("a") else {
            panic!("a should be a directory");
        };
        assert_eq!(a.get("e"), Some(&Node::File));
        let Some(Node::Dir(b)) = a.get("b") else {
            panic!("b should have become a directory");
        };
        assert!(matches!(b.get("c"), Some(Node::Dir(_))));
    }

    #[test]
    fn test_directory_then_file_conflict_drops_file() {
        let (tree, diagnostics) = build(&["x/y", "x"]);

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.mentions("Skipping file entry"));
        assert!(matches!(tree.get("x"), Some(Node::Dir(_))));
    }

    #[test]
    fn test_empty_tree_renders_nothing() {
        let (tree, _) = build(&[]);
        assert!(tree.is_empty());
        assert!(tree.render("    ").is_empty());
    }
}
