//! Draft → sections → themed document → .pptx.

pub mod document;
pub mod pptx;
pub mod prompts;
pub mod sections;
pub mod theme;

pub use document::{build_document, Document, Slide, SlideKind, SlidePreview};
pub use pptx::{extract_slides, render_pptx, Artifact, ExtractedSlide};
pub use prompts::DraftSections;
pub use sections::{classify_draft, Section, SectionMap};
pub use theme::{resolve_theme, Rgb, Theme};
