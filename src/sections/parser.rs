use serde::Serialize;
use serde_yaml::Mapping;

const SECTION_MARKER: &str = "## ";

/// One `## <title>` section of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedSection {
    pub name: String,
    /// Zero-based line of the heading.
    pub start_line: usize,
    /// Zero-based last line before the next heading (or end of input).
    pub end_line: usize,
    /// Lines after the heading, trailing blank lines removed.
    pub content_lines: Vec<String>,
}

impl ParsedSection {
    pub fn content(&self) -> String {
        self.content_lines.join("\n")
    }
}

/// Lines of a document plus its section structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    pub lines: Vec<String>,
    pub sections: Vec<ParsedSection>,
    /// Number of leading lines that belong to front matter (or the title).
    pub frontmatter_end: usize,
    /// Index of the first section heading, or `lines.len()` when there is none.
    pub body_start: usize,
}

impl ParsedDocument {
    pub fn parse(text: &str) -> Self {
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        let sections = collect_sections(&lines);
        let body_start = sections
            .first()
            .map(|s| s.start_line)
            .unwrap_or(lines.len());
        let frontmatter_end = frontmatter_boundary(&lines[..body_start])
            .map(|idx| idx + 1)
            .unwrap_or(0);

        Self {
            lines,
            sections,
            frontmatter_end,
            body_start,
        }
    }

    /// Lines before the first section, front matter included.
    pub fn preamble(&self) -> &[String] {
        &self.lines[..self.body_start]
    }

    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Split `text` into its `##` sections. Total: any input yields a list.
pub fn parse(text: &str) -> Vec<ParsedSection> {
    let lines: Vec<&str> = text.lines().collect();
    collect_sections(&lines)
}

/// Title of a second-level heading line, if it is one.
pub fn section_heading(line: &str) -> Option<&str> {
    let title = line.strip_prefix(SECTION_MARKER)?.trim();
    if title.is_empty() { None } else { Some(title) }
}

fn collect_sections<S: AsRef<str>>(lines: &[S]) -> Vec<ParsedSection> {
    let mut sections = Vec::new();
    let mut open: Option<(String, usize)> = None;

    for (idx, line) in lines.iter().enumerate() {
        if let Some(title) = section_heading(line.as_ref()) {
            if let Some((name, start)) = open.take() {
                sections.push(close_section(lines, name, start, idx - 1));
            }
            open = Some((title.to_string(), idx));
        }
    }

    if let Some((name, start)) = open {
        sections.push(close_section(lines, name, start, lines.len() - 1));
    }

    sections
}

fn close_section<S: AsRef<str>>(
    lines: &[S],
    name: String,
    start_line: usize,
    end_line: usize,
) -> ParsedSection {
    let mut content_lines: Vec<String> = lines[start_line + 1..=end_line]
        .iter()
        .map(|l| l.as_ref().to_string())
        .collect();
    while content_lines.last().is_some_and(|l| l.trim().is_empty()) {
        content_lines.pop();
    }

    ParsedSection {
        name,
        start_line,
        end_line,
        content_lines,
    }
}

/// Index of the line that closes the preamble.
///
/// That is the second `---` delimiter, or a `# ` title met before two
/// delimiters were seen. `None` when neither occurs.
pub fn frontmatter_boundary<S: AsRef<str>>(lines: &[S]) -> Option<usize> {
    let mut delimiters = 0;
    for (idx, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if line == "---" {
            delimiters += 1;
            if delimiters == 2 {
                return Some(idx);
            }
        } else if line.starts_with("# ") {
            return Some(idx);
        }
    }
    None
}

/// Value of the top-level `key` in a leading `---` front-matter block.
///
/// The block is read as a YAML mapping; non-string values and blocks that
/// are not valid YAML yield `None`.
pub fn frontmatter_value(text: &str, key: &str) -> Option<String> {
    let block = frontmatter_block(text)?;
    if block.trim().is_empty() {
        return None;
    }
    let mapping: Mapping = serde_yaml::from_str(&block).ok()?;
    let value = mapping.get(key)?.as_str()?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Lines between the opening `---` and the next `---`, joined with `\n`.
fn frontmatter_block(text: &str) -> Option<String> {
    let mut lines = text.lines();
    if lines.next()? != "---" {
        return None;
    }
    let mut block = Vec::new();
    for line in lines {
        if line == "---" {
            return Some(block.join("\n"));
        }
        block.push(line);
    }
    None
}
