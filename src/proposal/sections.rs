//! Heading-based section classification for proposal drafts.
//!
//! The draft is free text. Lines that look like a markdown heading
//! (`#`, `##` or `**` prefix) naming one of the three proposal sections
//! move the cursor; every other line is appended to whichever section
//! the cursor points at, using an ordered rule table.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Fallback body for a section the draft never filled in.
pub const SECTION_FALLBACK: &str = "Details in full draft.";

/// The three proposal sections, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    ExecutiveSummary,
    Solution,
    Investment,
}

impl Section {
    pub const ALL: [Section; 3] = [
        Section::ExecutiveSummary,
        Section::Solution,
        Section::Investment,
    ];

    fn index(self) -> usize {
        match self {
            Section::ExecutiveSummary => 0,
            Section::Solution => 1,
            Section::Investment => 2,
        }
    }

    /// Canonical heading used when a draft is assembled from sections.
    pub fn heading(self) -> &'static str {
        match self {
            Section::ExecutiveSummary => "## Executive Summary",
            Section::Solution => "## Solution",
            Section::Investment => "## Investment",
        }
    }
}

// Evaluated top-to-bottom; first match wins.
const SECTION_RULES: [(&str, Section); 3] = [
    (
        r"(?i)^(#|##|\*\*)\s*(Executive Summary|Understanding)",
        Section::ExecutiveSummary,
    ),
    (r"(?i)^(#|##|\*\*)\s*(Solution|The Nexus)", Section::Solution),
    (r"(?i)^(#|##|\*\*)\s*(Investment|Pricing)", Section::Investment),
];

fn compiled_rules() -> &'static [(Regex, Section)] {
    static RULES: OnceLock<Vec<(Regex, Section)>> = OnceLock::new();
    RULES.get_or_init(|| {
        SECTION_RULES
            .iter()
            .map(|(pattern, section)| (Regex::new(pattern).unwrap(), *section))
            .collect()
    })
}

/// Which section a line opens, if it is a section heading.
pub fn match_heading(line: &str) -> Option<Section> {
    compiled_rules()
        .iter()
        .find(|(re, _)| re.is_match(line))
        .map(|(_, section)| *section)
}

/// Accumulated body text per section.
///
/// A section is `None` when no heading opened it and no line landed in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionMap {
    bodies: [Option<String>; 3],
}

impl SectionMap {
    pub fn get(&self, section: Section) -> Option<&str> {
        self.bodies[section.index()].as_deref()
    }

    /// Section body, or `fallback` when the section is absent or blank.
    pub fn body_or<'a>(&'a self, section: Section, fallback: &'a str) -> &'a str {
        match self.get(section) {
            Some(body) if !body.trim().is_empty() => body,
            _ => fallback,
        }
    }

    fn reset(&mut self, section: Section) {
        self.bodies[section.index()] = Some(String::new());
    }

    fn append_line(&mut self, section: Section, line: &str) {
        let body = self.bodies[section.index()].get_or_insert_with(String::new);
        body.push_str(line);
        body.push('\n');
    }
}

/// Split a draft into its three sections in a single pass.
///
/// The cursor starts at the executive summary, so text before the first
/// heading belongs there. A repeated heading discards what its section
/// had accumulated so far.
pub fn classify_draft(draft: &str) -> SectionMap {
    let mut sections = SectionMap::default();
    let mut current = Section::ExecutiveSummary;

    for line in draft.lines() {
        if let Some(section) = match_heading(line) {
            current = section;
            sections.reset(section);
        } else {
            sections.append_line(current, line);
        }
    }

    sections
}
