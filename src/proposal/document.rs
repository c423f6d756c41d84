//! Fixed-shape proposal deck: one title slide plus one slide per section.

use serde::Serialize;

use crate::util::truncate_chars;

use super::sections::{classify_draft, Section, SECTION_FALLBACK};
use super::theme::{Rgb, Theme};

pub const VENDOR_NAME: &str = "NexusCRM";
pub const TITLE_SUBTITLE: &str = "Strategic Proposal for Digital Transformation";

/// Characters of body text shown in a slide preview.
const PREVIEW_CHARS: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideKind {
    Title,
    Needs,
    Solution,
    Investment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlideContent {
    pub title: String,
    /// Subtitle on the title slide, section text elsewhere.
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub kind: SlideKind,
    pub content: SlideContent,
    pub background: Rgb,
    pub title_color: Rgb,
}

/// A rendered-on-demand proposal deck. Always exactly four slides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub company_name: String,
    pub theme: Theme,
    pub slides: Vec<Slide>,
}

/// What the preview pane shows for one slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlidePreview {
    pub title: String,
    pub excerpt: String,
    pub background_css: String,
    pub title_css: String,
}

fn content_slide_title(section: Section) -> &'static str {
    match section {
        Section::ExecutiveSummary => "Understanding Your Needs",
        Section::Solution => "The NexusCRM Solution",
        Section::Investment => "Investment/Pricing",
    }
}

fn slide_kind(section: Section) -> SlideKind {
    match section {
        Section::ExecutiveSummary => SlideKind::Needs,
        Section::Solution => SlideKind::Solution,
        Section::Investment => SlideKind::Investment,
    }
}

/// Build the deck from the edited draft. Never fails; an empty company
/// name just leaves the title suffix empty.
pub fn build_document(company_name: &str, draft: &str, theme: &Theme) -> Document {
    let sections = classify_draft(draft);
    let slide = |kind, title: String, body: String| Slide {
        kind,
        content: SlideContent { title, body },
        background: theme.bg_color,
        title_color: theme.title_color,
    };

    let mut slides = Vec::with_capacity(4);
    slides.push(slide(
        SlideKind::Title,
        format!("{} → {}", VENDOR_NAME, company_name),
        TITLE_SUBTITLE.to_string(),
    ));
    for section in Section::ALL {
        slides.push(slide(
            slide_kind(section),
            content_slide_title(section).to_string(),
            sections.body_or(section, SECTION_FALLBACK).to_string(),
        ));
    }

    Document {
        company_name: company_name.to_string(),
        theme: *theme,
        slides,
    }
}

impl Document {
    pub fn titles(&self) -> Vec<&str> {
        self.slides.iter().map(|s| s.content.title.as_str()).collect()
    }

    pub fn previews(&self) -> Vec<SlidePreview> {
        self.slides
            .iter()
            .map(|s| SlidePreview {
                title: s.content.title.clone(),
                excerpt: format!("{}...", truncate_chars(&s.content.body, PREVIEW_CHARS)),
                background_css: s.background.to_css(),
                title_css: s.title_color.to_css(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACME_DRAFT: &str = "## Executive Summary\nWe help with silos.\n\n## Solution\nAI CRM.\n\n## Investment\n$50k/yr, Q1.";

    #[test]
    fn test_acme_scenario() {
        let doc = build_document("Acme", ACME_DRAFT, &Theme::default());
        assert_eq!(doc.slides.len(), 4);
        assert!(doc.slides[1].content.body.contains("We help with silos."));
        assert!(doc.slides[2].content.body.contains("AI CRM."));
        assert!(doc.slides[3].content.body.contains("$50k/yr, Q1."));
        assert_eq!(doc.slides[0].content.body, TITLE_SUBTITLE);
    }

    #[test]
    fn test_fixed_titles_regardless_of_content() {
        for draft in ["", "random text", "**Pricing**\n$1", ACME_DRAFT] {
            let doc = build_document("Tesla", draft, &Theme::default());
            assert_eq!(
                doc.titles(),
                vec![
                    "NexusCRM → Tesla",
                    "Understanding Your Needs",
                    "The NexusCRM Solution",
                    "Investment/Pricing"
                ]
            );
        }
    }

    #[test]
    fn test_empty_company_name() {
        let doc = build_document("", ACME_DRAFT, &Theme::default());
        assert_eq!(doc.slides[0].content.title, "NexusCRM → ");
    }

    #[test]
    fn test_missing_sections_use_fallback() {
        let doc = build_document("Acme", "## Investment\n$10k", &Theme::default());
        assert_eq!(doc.slides[1].content.body, SECTION_FALLBACK);
        assert_eq!(doc.slides[2].content.body, SECTION_FALLBACK);
        assert_eq!(doc.slides[3].content.body, "$10k\n");
    }

    #[test]
    fn test_all_slides_share_theme_colors() {
        let theme = Theme {
            bg_color: Rgb(10, 20, 30),
            title_color: Rgb(200, 100, 0),
            ..Theme::default()
        };
        let doc = build_document("Acme", ACME_DRAFT, &theme);
        assert!(doc.slides.iter().all(|s| s.background == Rgb(10, 20, 30)));
        assert!(doc.slides.iter().all(|s| s.title_color == Rgb(200, 100, 0)));
        assert_eq!(doc.theme, theme);
    }

    #[test]
    fn test_previews_truncate_body() {
        let long_body = "x".repeat(400);
        let draft = format!("## Solution\n{}", long_body);
        let previews = build_document("Acme", &draft, &Theme::default()).previews();
        assert_eq!(previews.len(), 4);
        assert_eq!(previews[2].excerpt.len(), PREVIEW_CHARS + 3);
        assert!(previews[2].excerpt.ends_with("..."));
        assert_eq!(previews[0].background_css, "#f3f2f1");
        assert_eq!(previews[0].title_css, "#0078d4");
    }
}
