//! Usage statistics over a corpus of scripts.

use std::collections::BTreeMap;

use crate::ast::Script;

/// What a frequency table counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Component names in `components:` lists.
    Components,
    /// Event names of handlers.
    Events,
    /// Called function names.
    Calls,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 3] = [Category::Components, Category::Events, Category::Calls];

    /// Heading used in tables and JSON keys.
    pub fn title(self) -> &'static str {
        match self {
            Category::Components => "components",
            Category::Events => "events",
            Category::Calls => "calls",
        }
    }
}

/// Counts gathered from one or more scripts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptStats {
    /// Number of scripts merged in.
    pub scripts: usize,
    /// Entity declarations.
    pub entities: usize,
    /// Event handlers.
    pub handlers: usize,
    /// Builtin call statements.
    pub statements: usize,
    components: BTreeMap<String, usize>,
    events: BTreeMap<String, usize>,
    calls: BTreeMap<String, usize>,
}

impl ScriptStats {
    /// Count everything declared in `script`.
    pub fn collect(script: &Script) -> Self {
        let mut stats = Self {
            scripts: 1,
            ..Self::default()
        };
        for decl in &script.entities {
            let decl = &decl.node;
            stats.entities += 1;
            for c in &decl.components {
                *stats.components.entry(c.node.clone()).or_default() += 1;
            }
            for handler in &decl.handlers {
                let handler = &handler.node;
                stats.handlers += 1;
                *stats.events.entry(handler.event.node.clone()).or_default() += 1;
                for stmt in &handler.body {
                    stats.statements += 1;
                    *stats.calls.entry(stmt.node.name.node.clone()).or_default() += 1;
                }
            }
        }
        stats
    }

    /// Add `other`'s counts to these.
    pub fn merge(&mut self, other: &ScriptStats) {
        self.scripts += other.scripts;
        self.entities += other.entities;
        self.handlers += other.handlers;
        self.statements += other.statements;
        for (mine, theirs) in [
            (&mut self.components, &other.components),
            (&mut self.events, &other.events),
            (&mut self.calls, &other.calls),
        ] {
            for (name, count) in theirs {
                *mine.entry(name.clone()).or_default() += count;
            }
        }
    }

    /// Count for a single name.
    pub fn count(&self, category: Category, name: &str) -> usize {
        self.table(category).get(name).copied().unwrap_or(0)
    }

    /// The `n` most frequent names, highest count first. Ties sort by name.
    pub fn top(&self, category: Category, n: usize) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self
            .table(category)
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(n);
        entries
    }

    fn table(&self, category: Category) -> &BTreeMap<String, usize> {
        match category {
            Category::Components => &self.components,
            Category::Events => &self.events,
            Category::Calls => &self.calls,
        }
    }
}
