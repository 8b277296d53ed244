use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::{GridnoteError, Result};
use crate::logging::{LogLevel, Logger, TARGET_RECONCILE, json_kv, json_str};
use crate::registry::{LayoutDefinition, LayoutRegistry};
use crate::sections::{ParsedDocument, ParsedSection};

use super::options::{InsertPosition, ReconcileOptions};
use super::placeholder::{PlaceholderContext, PlaceholderTable};

/// Section diff between a document and a layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    pub layout_name: String,
    pub existing_sections: Vec<ParsedSection>,
    /// Required titles absent from the document, in layout order.
    pub missing_sections: Vec<String>,
    /// Document titles the layout does not require, in document order.
    pub extra_sections: Vec<String>,
    /// Order `layout-order` rewriting produces: required titles then extras.
    pub correct_order: Vec<String>,
    /// Titles that head more than one section.
    pub duplicate_sections: Vec<String>,
}

impl ReconciliationResult {
    pub fn is_complete(&self) -> bool {
        self.missing_sections.is_empty()
    }
}

/// Diffs documents against layouts and rewrites them to fill in missing
/// sections without losing existing content.
#[derive(Debug, Clone)]
pub struct SectionReconciler {
    placeholders: PlaceholderTable,
    logger: Logger,
}

impl Default for SectionReconciler {
    fn default() -> Self {
        Self::with_placeholders(PlaceholderTable::default())
    }
}

impl SectionReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placeholders(placeholders: PlaceholderTable) -> Self {
        Self {
            placeholders,
            logger: Logger::null(),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn placeholders(&self) -> &PlaceholderTable {
        &self.placeholders
    }

    pub fn placeholders_mut(&mut self) -> &mut PlaceholderTable {
        &mut self.placeholders
    }

    pub fn reconcile(
        &self,
        registry: &LayoutRegistry,
        text: &str,
        layout_name: &str,
    ) -> Result<ReconciliationResult> {
        let layout = resolve(registry, layout_name)?;
        Ok(diff(layout, &ParsedDocument::parse(text).sections))
    }

    /// Compute the rewritten document. Pure: persisting it is the caller's job.
    pub fn apply_missing_sections(
        &self,
        registry: &LayoutRegistry,
        text: &str,
        layout_name: &str,
        options: &ReconcileOptions,
    ) -> Result<String> {
        let layout = resolve(registry, layout_name)?;
        self.rewrite(layout, &ParsedDocument::parse(text), text, options)
    }

    /// Like [`apply_missing_sections`](Self::apply_missing_sections) for an
    /// already parsed document and resolved layout.
    ///
    /// `end` and `after-frontmatter` keep `original` byte for byte and only
    /// splice in the new sections, written with the document's line ending.
    pub fn rewrite(
        &self,
        layout: &LayoutDefinition,
        document: &ParsedDocument,
        original: &str,
        options: &ReconcileOptions,
    ) -> Result<String> {
        let result = diff(layout, &document.sections);
        let eol = line_ending(original);

        let rewritten = match options.insert_position {
            InsertPosition::LayoutOrder => {
                let required = layout.section_names();
                let tracked: Vec<String> = result
                    .duplicate_sections
                    .iter()
                    .filter(|name| required.contains(&name.as_str()))
                    .cloned()
                    .collect();
                if !tracked.is_empty() {
                    self.logger.emit(
                        LogLevel::Warn,
                        TARGET_RECONCILE,
                        "duplicate_sections_refused",
                        [
                            json_str("layout", layout.name.clone()),
                            json_kv("names", tracked.clone()),
                        ],
                    );
                    return Err(GridnoteError::DuplicateSections {
                        layout: layout.name.clone(),
                        names: tracked,
                    });
                }
                self.layout_order(layout, document, options, eol)
            }
            _ if result.missing_sections.is_empty() => return Ok(original.to_string()),
            InsertPosition::End => {
                let mut added = Vec::new();
                self.push_missing(&mut added, layout, &result.missing_sections, options);
                trim_trailing_blank(&mut added);

                let mut out = original.to_string();
                end_line(&mut out, eol);
                if out.lines().last().is_some_and(|l| !l.trim().is_empty()) {
                    out.push_str(eol);
                }
                out.push_str(&join_lines(&added, eol));
                out
            }
            InsertPosition::AfterFrontmatter => {
                let offset = line_offset(original, document.frontmatter_end);
                let (head, tail) = original.split_at(offset);

                let mut added = Vec::new();
                self.push_missing(&mut added, layout, &result.missing_sections, options);
                if tail.is_empty() {
                    trim_trailing_blank(&mut added);
                }

                let mut out = head.to_string();
                end_line(&mut out, eol);
                out.push_str(&join_lines(&added, eol));
                out.push_str(tail);
                out
            }
        };

        if !result.missing_sections.is_empty() {
            self.logger.emit(
                LogLevel::Debug,
                TARGET_RECONCILE,
                "sections_inserted",
                [
                    json_str("layout", layout.name.clone()),
                    json_str("position", options.insert_position.as_str()),
                    json_kv("inserted", result.missing_sections.clone()),
                ],
            );
        }
        Ok(rewritten)
    }

    /// Fresh document text holding every section of `layout`.
    pub fn render_new_document(
        &self,
        layout: &LayoutDefinition,
        preamble: &[String],
        options: &ReconcileOptions,
    ) -> String {
        let mut out = preamble.to_vec();
        trim_trailing_blank(&mut out);
        if !out.is_empty() {
            out.push(String::new());
        }
        let titles: Vec<String> = layout
            .section_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        self.push_missing(&mut out, layout, &titles, options);
        finish(out, "\n")
    }

    fn layout_order(
        &self,
        layout: &LayoutDefinition,
        document: &ParsedDocument,
        options: &ReconcileOptions,
        eol: &str,
    ) -> String {
        let by_name: HashMap<&str, &ParsedSection> = document
            .sections
            .iter()
            .map(|s| (s.name.as_str(), s))
            .collect();
        let required = layout.section_names();

        let mut out = document.preamble().to_vec();
        trim_trailing_blank(&mut out);
        if !out.is_empty() {
            out.push(String::new());
        }

        for title in &required {
            match by_name.get(title) {
                Some(section) => push_section(&mut out, &section.name, &section.content_lines),
                None => self.push_placeholder(&mut out, layout, title, options),
            }
        }

        for section in document
            .sections
            .iter()
            .filter(|s| !required.contains(&s.name.as_str()))
        {
            push_section(&mut out, &section.name, &section.content_lines);
        }

        finish(out, eol)
    }

    fn push_missing(
        &self,
        out: &mut Vec<String>,
        layout: &LayoutDefinition,
        titles: &[String],
        options: &ReconcileOptions,
    ) {
        for title in titles {
            self.push_placeholder(out, layout, title, options);
        }
    }

    fn push_placeholder(
        &self,
        out: &mut Vec<String>,
        layout: &LayoutDefinition,
        title: &str,
        options: &ReconcileOptions,
    ) {
        let content: Vec<String> = if options.add_default_content {
            self.placeholders
                .content_for(&PlaceholderContext {
                    title,
                    layout: &layout.name,
                })
                .lines()
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };
        push_section(out, title, &content);
    }
}

/// Diff parsed sections against the titles `layout` requires.
pub fn diff(layout: &LayoutDefinition, sections: &[ParsedSection]) -> ReconciliationResult {
    let required = layout.section_names();
    let existing: HashSet<&str> = sections.iter().map(|s| s.name.as_str()).collect();
    let required_set: HashSet<&str> = required.iter().copied().collect();

    let missing_sections: Vec<String> = required
        .iter()
        .filter(|name| !existing.contains(*name))
        .map(|name| name.to_string())
        .collect();

    let mut extra_sections: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut duplicate_sections: Vec<String> = Vec::new();
    for section in sections {
        let name = section.name.as_str();
        if !seen.insert(name) {
            if !duplicate_sections.iter().any(|d| d == name) {
                duplicate_sections.push(name.to_string());
            }
            continue;
        }
        if !required_set.contains(name) {
            extra_sections.push(name.to_string());
        }
    }

    let correct_order = required
        .iter()
        .map(|name| name.to_string())
        .chain(extra_sections.iter().cloned())
        .collect();

    ReconciliationResult {
        layout_name: layout.name.clone(),
        existing_sections: sections.to_vec(),
        missing_sections,
        extra_sections,
        correct_order,
        duplicate_sections,
    }
}

fn resolve<'r>(registry: &'r LayoutRegistry, name: &str) -> Result<&'r LayoutDefinition> {
    registry
        .get(name)
        .ok_or_else(|| GridnoteError::LayoutNotFound(name.to_string()))
}

fn push_section(out: &mut Vec<String>, title: &str, content: &[String]) {
    out.push(format!("## {title}"));
    out.extend(content.iter().cloned());
    out.push(String::new());
}

fn trim_trailing_blank(lines: &mut Vec<String>) {
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
}

fn finish(mut lines: Vec<String>, eol: &str) -> String {
    trim_trailing_blank(&mut lines);
    join_lines(&lines, eol)
}

fn join_lines(lines: &[String], eol: &str) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut text = lines.join(eol);
    text.push_str(eol);
    text
}

/// `\r\n` when the document already uses it, `\n` otherwise.
fn line_ending(text: &str) -> &'static str {
    if text.contains("\r\n") { "\r\n" } else { "\n" }
}

/// Terminate a non-empty, unterminated last line.
fn end_line(text: &mut String, eol: &str) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push_str(eol);
    }
}

/// Byte offset where line `line` starts, or `text.len()` past the end.
fn line_offset(text: &str, line: usize) -> usize {
    text.split_inclusive('\n').take(line).map(str::len).sum()
}
