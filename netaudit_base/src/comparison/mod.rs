//! Line-level unified diff of the running configuration against the template
//!
//! Presentation only: the diff is printed and counted, never applied.

use crate::config::compile_time::comparison::{DEFAULT_CONTEXT_LINES, MAX_COMPARED_LINES};
use crate::log_success;
use crate::logging::codes;
use similar::{ChangeTag, TextDiff};

pub const FROM_LABEL: &str = "Running Config";
pub const TO_LABEL: &str = "Hardening Advice";

#[derive(Debug, thiserror::Error)]
pub enum ComparisonError {
    #[error("{label} has {lines} lines, more than the {limit} line comparison limit")]
    InputTooLarge {
        label: &'static str,
        lines: usize,
        limit: usize,
    },
}

/// One rendered line of a unified diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    FromHeader(String),
    ToHeader(String),
    Hunk(String),
    Context(String),
    Added(String),
    Removed(String),
}

impl DiffLine {
    pub fn render(&self) -> String {
        match self {
            DiffLine::FromHeader(label) => format!("--- {}", label),
            DiffLine::ToHeader(label) => format!("+++ {}", label),
            DiffLine::Hunk(header) => header.clone(),
            DiffLine::Context(text) => format!(" {}", text),
            DiffLine::Added(text) => format!("+{}", text),
            DiffLine::Removed(text) => format!("-{}", text),
        }
    }
}

/// Unified diff between two configuration texts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDiff {
    lines: Vec<DiffLine>,
}

impl ConfigDiff {
    /// No differences; renders to nothing
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[DiffLine] {
        &self.lines
    }

    pub fn additions(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, DiffLine::Added(_)))
            .count()
    }

    pub fn removals(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, DiffLine::Removed(_)))
            .count()
    }

    pub fn render_lines(&self) -> Vec<String> {
        self.lines.iter().map(DiffLine::render).collect()
    }
}

/// Options for `compare_configurations`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareOptions {
    pub context_lines: usize,
    pub max_lines: usize,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            context_lines: DEFAULT_CONTEXT_LINES,
            max_lines: MAX_COMPARED_LINES,
        }
    }
}

impl CompareOptions {
    pub fn with_context_lines(mut self, lines: usize) -> Self {
        self.context_lines = lines;
        self
    }
}

/// Diff `actual` (running configuration) against `template`
pub fn compare_configurations(
    actual: &str,
    template: &str,
    options: CompareOptions,
) -> Result<ConfigDiff, ComparisonError> {
    let old: Vec<&str> = actual.lines().collect();
    let new: Vec<&str> = template.lines().collect();
    check_size(FROM_LABEL, old.len(), options.max_lines)?;
    check_size(TO_LABEL, new.len(), options.max_lines)?;

    let text_diff = TextDiff::from_slices(&old, &new);
    let mut lines = Vec::new();

    for hunk in text_diff
        .unified_diff()
        .context_radius(options.context_lines)
        .iter_hunks()
    {
        if lines.is_empty() {
            lines.push(DiffLine::FromHeader(FROM_LABEL.to_string()));
            lines.push(DiffLine::ToHeader(TO_LABEL.to_string()));
        }
        lines.push(DiffLine::Hunk(hunk.header().to_string()));

        for change in hunk.iter_changes() {
            let text = change.value().to_string();
            lines.push(match change.tag() {
                ChangeTag::Equal => DiffLine::Context(text),
                ChangeTag::Insert => DiffLine::Added(text),
                ChangeTag::Delete => DiffLine::Removed(text),
            });
        }
    }

    let diff = ConfigDiff { lines };
    log_success!(codes::success::COMPARISON_COMPLETE, "Configuration comparison complete",
        "added" => diff.additions(),
        "removed" => diff.removals()
    );
    Ok(diff)
}

fn check_size(label: &'static str, lines: usize, limit: usize) -> Result<(), ComparisonError> {
    if lines > limit {
        return Err(ComparisonError::InputTooLarge {
            label,
            lines,
            limit,
        });
    }
    Ok(())
}
