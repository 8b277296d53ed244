//! Default content for sections inserted by the reconciler.
//!
//! Content is chosen by an ordered table of `(predicate, generator)` rules,
//! evaluated top to bottom. The first matching rule wins; a fallback
//! generator covers titles no rule recognises. Keyword rules match
//! case-insensitively and carry both English and French vocabulary.

use std::sync::Arc;

/// What a rule can look at when choosing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderContext<'a> {
    pub title: &'a str,
    pub layout: &'a str,
}

pub type Predicate = Arc<dyn Fn(&PlaceholderContext<'_>) -> bool + Send + Sync>;
pub type Generator = Arc<dyn Fn(&PlaceholderContext<'_>) -> String + Send + Sync>;

#[derive(Clone)]
pub struct PlaceholderRule {
    pub name: String,
    predicate: Predicate,
    generator: Generator,
}

impl PlaceholderRule {
    pub fn new<P, G>(name: impl Into<String>, predicate: P, generator: G) -> Self
    where
        P: Fn(&PlaceholderContext<'_>) -> bool + Send + Sync + 'static,
        G: Fn(&PlaceholderContext<'_>) -> String + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
            generator: Arc::new(generator),
        }
    }

    /// Rule matching titles that contain any of `keywords`, yielding fixed text.
    pub fn keywords(name: impl Into<String>, keywords: &[&str], content: &str) -> Self {
        let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
        let content = content.to_string();
        Self::new(
            name,
            move |ctx| contains_any(&ctx.title.to_lowercase(), &keywords),
            move |_| content.clone(),
        )
    }

    pub fn matches(&self, ctx: &PlaceholderContext<'_>) -> bool {
        (self.predicate)(ctx)
    }
}

impl std::fmt::Debug for PlaceholderRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceholderRule")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct PlaceholderTable {
    rules: Vec<PlaceholderRule>,
    fallback: Generator,
}

impl std::fmt::Debug for PlaceholderTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceholderTable")
            .field("rules", &self.rule_names())
            .finish_non_exhaustive()
    }
}

impl Default for PlaceholderTable {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

pub const GENERIC_PLACEHOLDER: &str = "- [ ] Item 1\n- [ ] Item 2";

const TODO_KEYWORDS: &[&str] = &[
    "to do", "to-do", "todo", "backlog", "task", "à faire", "a faire", "tâche", "tache",
];
const IN_PROGRESS_KEYWORDS: &[&str] = &["in progress", "doing", "ongoing", "wip", "en cours"];
const DONE_KEYWORDS: &[&str] = &["done", "completed", "finished", "terminé", "termine", "fait"];

const EISENHOWER_LAYOUT_KEYWORDS: &[&str] = &["eisenhower"];
const URGENT_NEGATIONS: &[&str] = &["not urgent", "non urgent", "non-urgent", "pas urgent"];
const IMPORTANT_NEGATIONS: &[&str] = &[
    "not important",
    "non important",
    "non-important",
    "pas important",
    "peu important",
];

impl PlaceholderTable {
    /// Table with no rules; every title gets `fallback`.
    pub fn with_fallback<G>(fallback: G) -> Self
    where
        G: Fn(&PlaceholderContext<'_>) -> String + Send + Sync + 'static,
    {
        Self {
            rules: Vec::new(),
            fallback: Arc::new(fallback),
        }
    }

    /// Common categories first, four-quadrant layouts second, generic checklist last.
    pub fn with_default_rules() -> Self {
        let mut table = Self::with_fallback(|_| GENERIC_PLACEHOLDER.to_string());
        table.push(PlaceholderRule::keywords(
            "todo",
            TODO_KEYWORDS,
            "- [ ] First task\n- [ ] Second task\n- [ ] Third task",
        ));
        table.push(PlaceholderRule::keywords(
            "in-progress",
            IN_PROGRESS_KEYWORDS,
            "- [ ] Task in progress\n\n> Move items here once work has started.",
        ));
        table.push(PlaceholderRule::keywords(
            "done",
            DONE_KEYWORDS,
            "- [x] Completed task",
        ));
        table.push(quadrant(
            "eisenhower-do",
            true,
            true,
            "- [ ] Do it now\n\n> Urgent and important: handle immediately.",
        ));
        table.push(quadrant(
            "eisenhower-schedule",
            false,
            true,
            "- [ ] Schedule it\n\n> Important, not urgent: plan a time for it.",
        ));
        table.push(quadrant(
            "eisenhower-delegate",
            true,
            false,
            "- [ ] Delegate it\n\n> Urgent, not important: hand it off.",
        ));
        table.push(quadrant(
            "eisenhower-eliminate",
            false,
            false,
            "- [ ] Drop it\n\n> Neither urgent nor important: consider removing it.",
        ));
        table
    }

    pub fn push(&mut self, rule: PlaceholderRule) {
        self.rules.push(rule);
    }

    /// Insert `rule` ahead of the rule called `before`, or at the end.
    pub fn insert_before(&mut self, before: &str, rule: PlaceholderRule) {
        match self.rules.iter().position(|r| r.name == before) {
            Some(idx) => self.rules.insert(idx, rule),
            None => self.rules.push(rule),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<PlaceholderRule> {
        let idx = self.rules.iter().position(|r| r.name == name)?;
        Some(self.rules.remove(idx))
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }

    /// Name of the first matching rule, `None` when the fallback applies.
    pub fn matching_rule(&self, ctx: &PlaceholderContext<'_>) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(ctx))
            .map(|rule| rule.name.as_str())
    }

    pub fn content_for(&self, ctx: &PlaceholderContext<'_>) -> String {
        match self.rules.iter().find(|rule| rule.matches(ctx)) {
            Some(rule) => (rule.generator)(ctx),
            None => (self.fallback)(ctx),
        }
    }
}

fn contains_any(haystack: &str, needles: &[impl AsRef<str>]) -> bool {
    needles.iter().any(|n| haystack.contains(n.as_ref()))
}

/// Presence of `word` in `title`, ignoring occurrences that are negated.
fn asserts(title: &str, word: &str, negations: &[&str]) -> bool {
    let mut stripped = title.to_string();
    for negation in negations {
        stripped = stripped.replace(negation, "");
    }
    stripped.contains(word)
}

fn quadrant(name: &str, urgent: bool, important: bool, content: &'static str) -> PlaceholderRule {
    PlaceholderRule::new(
        name,
        move |ctx| {
            let title = ctx.title.to_lowercase();
            let layout = ctx.layout.to_lowercase();
            let family = contains_any(&layout, EISENHOWER_LAYOUT_KEYWORDS)
                || contains_any(&title, &["urgent", "important"]);
            family
                && asserts(&title, "urgent", URGENT_NEGATIONS) == urgent
                && asserts(&title, "important", IMPORTANT_NEGATIONS) == important
        },
        move |_| content.to_string(),
    )
}
