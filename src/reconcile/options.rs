use serde::{Deserialize, Serialize};

/// Where missing sections are placed when a document is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsertPosition {
    /// Emit every required section in layout order, then the extra sections.
    #[default]
    LayoutOrder,
    /// Keep the document as is and append missing sections.
    End,
    /// Insert missing sections right after the front-matter boundary.
    ///
    /// The boundary is the closing `---`, so a `# Title` written below the
    /// front matter (as `LayoutService::create_document` does) ends up after
    /// the inserted sections. Parsed again, that title belongs to the last
    /// inserted section, and a later `layout-order` rewrite carries it along
    /// as that section's content.
    AfterFrontmatter,
}

impl InsertPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            InsertPosition::LayoutOrder => "layout-order",
            InsertPosition::End => "end",
            InsertPosition::AfterFrontmatter => "after-frontmatter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReconcileOptions {
    pub insert_position: InsertPosition,
    pub add_default_content: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            insert_position: InsertPosition::LayoutOrder,
            add_default_content: true,
        }
    }
}

impl ReconcileOptions {
    pub fn with_position(mut self, position: InsertPosition) -> Self {
        self.insert_position = position;
        self
    }

    pub fn without_default_content(mut self) -> Self {
        self.add_default_content = false;
        self
    }
}
