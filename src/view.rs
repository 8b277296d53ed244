//! Host display-mode switching.
//!
//! The host application implements [`ViewSwitcher`]; the service calls it
//! after a document has been brought in line with its layout.

use std::path::Path;

/// Display modes a host can show a document in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Source,
    Preview,
    Layout,
}

pub trait ViewSwitcher: Send + Sync {
    fn switch_to(&self, path: &Path, mode: ViewMode);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullViewSwitcher;

impl ViewSwitcher for NullViewSwitcher {
    fn switch_to(&self, _path: &Path, _mode: ViewMode) {}
}
