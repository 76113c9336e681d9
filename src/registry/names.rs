//! Ordered set of discovered command names.

use crate::command::descriptor::dashed;

/// Command names in discovery order.
///
/// Names are stored in dashed form and membership tests treat `_` and `-`
/// as the same character, so `make_bash` finds `make-bash`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandNames {
    names: Vec<String>,
}

impl CommandNames {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a name, ignoring duplicates.
    pub fn push(&mut self, name: &str) {
        let name = dashed(name);
        if !self.names.contains(&name) {
            self.names.push(name);
        }
    }

    /// Membership test. Never loads anything.
    pub fn contains(&self, name: &str) -> bool {
        let wanted = dashed(name);
        self.names.iter().any(|n| *n == wanted)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Sort alphabetically, as filesystem discovery does.
    pub fn sort(&mut self) {
        self.names.sort();
    }
}

impl<S: AsRef<str>> FromIterator<S> for CommandNames {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut names = Self::new();
        for name in iter {
            names.push(name.as_ref());
        }
        names
    }
}
