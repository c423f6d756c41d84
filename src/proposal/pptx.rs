//! PowerPoint (.pptx) packaging for proposal decks.
//!
//! PPTX = ZIP archive of XML parts. We write the smallest package
//! PowerPoint and LibreOffice accept: one master, two layouts (title,
//! title + content), one theme, and one part per slide. Positions match
//! the stock 4:3 template so no placeholder inheritance is needed.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use quick_xml::escape::escape;
use quick_xml::events::Event;
use zip::write::SimpleFileOptions;

use crate::error::CopilotError;
use crate::util::sanitize_file_component;

use super::document::{Document, Slide, SlideKind};
use super::theme::{Rgb, Theme};

pub const PPTX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

const NS_DECL: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_TYPE_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Shape geometry in EMU: (x, y, cx, cy).
type Frame = (u32, u32, u32, u32);

const CTR_TITLE_FRAME: Frame = (685_800, 2_130_425, 7_772_400, 1_470_025);
const SUBTITLE_FRAME: Frame = (1_371_600, 3_886_200, 6_400_800, 1_752_600);
const TITLE_FRAME: Frame = (457_200, 274_638, 8_229_600, 1_143_000);
const BODY_FRAME: Frame = (457_200, 1_600_200, 8_229_600, 4_525_963);

/// A downloadable rendered deck.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn from_document(document: &Document) -> Result<Self, CopilotError> {
        Ok(Self {
            file_name: artifact_file_name(&document.company_name),
            mime_type: PPTX_MIME,
            bytes: render_pptx(document)?,
        })
    }

    /// Write into `dir` under the artifact's file name.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf, CopilotError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }

    /// Persist to a fresh temp file that outlives the process.
    pub fn persist_temp(&self) -> Result<PathBuf, CopilotError> {
        let mut file = tempfile::Builder::new()
            .prefix("NexusCRM_Proposal_")
            .suffix(".pptx")
            .tempfile()?;
        file.write_all(&self.bytes)?;
        let (_, path) = file.keep().map_err(|e| CopilotError::Io(e.error))?;
        Ok(path)
    }
}

/// `NexusCRM_Proposal_{company}.pptx`, with path separators neutralized.
pub fn artifact_file_name(company_name: &str) -> String {
    format!(
        "NexusCRM_Proposal_{}.pptx",
        sanitize_file_component(company_name)
    )
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Serialize a document into .pptx bytes.
pub fn render_pptx(document: &Document) -> Result<Vec<u8>, CopilotError> {
    let slide_count = document.slides.len();
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut put = |name: &str, body: String| -> Result<(), CopilotError> {
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())?;
        Ok(())
    };

    put("[Content_Types].xml", content_types_xml(slide_count))?;
    put("_rels/.rels", root_rels_xml())?;
    put("docProps/app.xml", app_xml(slide_count))?;
    put("docProps/core.xml", core_xml(&document.company_name))?;
    put("ppt/presentation.xml", presentation_xml(slide_count))?;
    put(
        "ppt/_rels/presentation.xml.rels",
        presentation_rels_xml(slide_count),
    )?;
    put("ppt/slideMasters/slideMaster1.xml", slide_master_xml())?;
    put(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        rels_xml(&[
            ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
            ("rId2", "slideLayout", "../slideLayouts/slideLayout2.xml"),
            ("rId3", "theme", "../theme/theme1.xml"),
        ]),
    )?;
    for (idx, (layout_type, name)) in [("title", "Title Slide"), ("obj", "Title and Content")]
        .iter()
        .enumerate()
    {
        put(
            &format!("ppt/slideLayouts/slideLayout{}.xml", idx + 1),
            slide_layout_xml(layout_type, name),
        )?;
        put(
            &format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", idx + 1),
            rels_xml(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
        )?;
    }
    put("ppt/theme/theme1.xml", theme_xml())?;

    for (idx, slide) in document.slides.iter().enumerate() {
        let layout = if slide.kind == SlideKind::Title {
            "../slideLayouts/slideLayout1.xml"
        } else {
            "../slideLayouts/slideLayout2.xml"
        };
        put(
            &format!("ppt/slides/slide{}.xml", idx + 1),
            slide_xml(slide, &document.theme),
        )?;
        put(
            &format!("ppt/slides/_rels/slide{}.xml.rels", idx + 1),
            rels_xml(&[("rId1", "slideLayout", layout)]),
        )?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

fn content_types_xml(slide_count: usize) -> String {
    let pml = "application/vnd.openxmlformats-officedocument.presentationml";
    let mut xml = format!(
        r#"{XML_HEADER}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="{pml}.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="{pml}.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="{pml}.slideLayout+xml"/><Override PartName="/ppt/slideLayouts/slideLayout2.xml" ContentType="{pml}.slideLayout+xml"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#
    );
    for n in 1..=slide_count {
        xml.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{n}.xml" ContentType="{pml}.slide+xml"/>"#
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn root_rels_xml() -> String {
    format!(
        r#"{XML_HEADER}<Relationships xmlns="{REL_NS}"><Relationship Id="rId1" Type="{REL_TYPE_BASE}/officeDocument" Target="ppt/presentation.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="{REL_TYPE_BASE}/extended-properties" Target="docProps/app.xml"/></Relationships>"#
    )
}

/// Relationship part; `kind` is the suffix of the officeDocument relationship type.
fn rels_xml(entries: &[(&str, &str, &str)]) -> String {
    let mut xml = format!(r#"{XML_HEADER}<Relationships xmlns="{REL_NS}">"#);
    for (id, kind, target) in entries {
        xml.push_str(&format!(
            r#"<Relationship Id="{id}" Type="{REL_TYPE_BASE}/{kind}" Target="{target}"/>"#
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn app_xml(slide_count: usize) -> String {
    format!(
        r#"{XML_HEADER}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>NexusCRM Proposal Copilot</Application><Slides>{slide_count}</Slides></Properties>"#
    )
}

fn core_xml(company_name: &str) -> String {
    let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    let title = xml_text(company_name);
    format!(
        r#"{XML_HEADER}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>NexusCRM Proposal for {title}</dc:title><dc:creator>NexusCRM</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">{now}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{now}</dcterms:modified></cp:coreProperties>"#
    )
}

fn presentation_xml(slide_count: usize) -> String {
    let mut slide_ids = String::new();
    for n in 0..slide_count {
        // rId1 = master, rId2 = theme, slides follow
        slide_ids.push_str(&format!(
            r#"<p:sldId id="{}" r:id="rId{}"/>"#,
            256 + n,
            n + 3
        ));
    }
    format!(
        r#"{XML_HEADER}<p:presentation {NS_DECL} saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{slide_ids}</p:sldIdLst><p:sldSz cx="9144000" cy="6858000" type="screen4x3"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#
    )
}

fn presentation_rels_xml(slide_count: usize) -> String {
    let mut entries = vec![
        ("rId1".to_string(), "slideMaster", "slideMasters/slideMaster1.xml".to_string()),
        ("rId2".to_string(), "theme", "theme/theme1.xml".to_string()),
    ];
    for n in 1..=slide_count {
        entries.push((format!("rId{}", n + 2), "slide", format!("slides/slide{}.xml", n)));
    }
    let borrowed: Vec<(&str, &str, &str)> = entries
        .iter()
        .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
        .collect();
    rels_xml(&borrowed)
}

const EMPTY_SP_TREE: &str = r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree>"#;

fn slide_master_xml() -> String {
    format!(
        r#"{XML_HEADER}<p:sldMaster {NS_DECL}><p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>{EMPTY_SP_TREE}</p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/><p:sldLayoutId id="2147483650" r:id="rId2"/></p:sldLayoutIdLst></p:sldMaster>"#
    )
}

fn slide_layout_xml(layout_type: &str, name: &str) -> String {
    format!(
        r#"{XML_HEADER}<p:sldLayout {NS_DECL} type="{layout_type}" preserve="1"><p:cSld name="{name}">{EMPTY_SP_TREE}</p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#
    )
}

fn theme_xml() -> String {
    let solid = |clr: &str| format!(r#"<a:solidFill><a:schemeClr val="{clr}"/></a:solidFill>"#);
    let fills = [solid("phClr"), solid("phClr"), solid("phClr")].concat();
    let line = r#"<a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#;
    let lines = [line, line, line].concat();
    let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";
    let effects = [effect, effect, effect].concat();
    format!(
        r#"{XML_HEADER}<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="NexusCRM"><a:themeElements><a:clrScheme name="NexusCRM"><a:dk1><a:srgbClr val="000000"/></a:dk1><a:lt1><a:srgbClr val="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="323130"/></a:dk2><a:lt2><a:srgbClr val="F3F2F1"/></a:lt2><a:accent1><a:srgbClr val="0078D4"/></a:accent1><a:accent2><a:srgbClr val="2B88D8"/></a:accent2><a:accent3><a:srgbClr val="107C10"/></a:accent3><a:accent4><a:srgbClr val="FFB900"/></a:accent4><a:accent5><a:srgbClr val="D83B01"/></a:accent5><a:accent6><a:srgbClr val="5C2D91"/></a:accent6><a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme><a:fontScheme name="NexusCRM"><a:majorFont><a:latin typeface="Segoe UI"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Segoe UI"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="NexusCRM"><a:fillStyleLst>{fills}</a:fillStyleLst><a:lnStyleLst>{lines}</a:lnStyleLst><a:effectStyleLst>{effects}</a:effectStyleLst><a:bgFillStyleLst>{fills}</a:bgFillStyleLst></a:fmtScheme></a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>"#
    )
}

/// Whether XML 1.0 allows `c` in character data.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Escape markup and drop characters XML 1.0 cannot carry at all.
fn xml_text(text: &str) -> String {
    if text.chars().all(is_xml_char) {
        return escape(text).into_owned();
    }
    let cleaned: String = text.chars().filter(|c| is_xml_char(*c)).collect();
    escape(cleaned.as_str()).into_owned()
}

/// One `<a:p>` per line; a blank line becomes an empty paragraph.
fn paragraphs_xml(text: &str, color: Rgb, bold: bool) -> String {
    let bold_attr = if bold { r#" b="1""# } else { "" };
    let mut xml = String::new();
    let mut lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        lines.push("");
    }
    for line in lines {
        if line.is_empty() {
            xml.push_str(r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
        } else {
            xml.push_str(&format!(
                r#"<a:p><a:r><a:rPr lang="en-US"{bold_attr} dirty="0"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:rPr><a:t>{}</a:t></a:r></a:p>"#,
                color.to_hex(),
                xml_text(line)
            ));
        }
    }
    xml
}

fn shape_xml(id: u32, name: &str, placeholder: &str, frame: Frame, paragraphs: &str) -> String {
    let (x, y, cx, cy) = frame;
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{placeholder}</p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#
    )
}

fn slide_xml(slide: &Slide, theme: &Theme) -> String {
    let shapes: [String; 2] = if slide.kind == SlideKind::Title {
        [
            shape_xml(
                2,
                "Title 1",
                r#"<p:ph type="ctrTitle"/>"#,
                CTR_TITLE_FRAME,
                &paragraphs_xml(&slide.content.title, slide.title_color, false),
            ),
            shape_xml(
                3,
                "Subtitle 2",
                r#"<p:ph type="subTitle" idx="1"/>"#,
                SUBTITLE_FRAME,
                &paragraphs_xml(&slide.content.body, theme.accent_color, false),
            ),
        ]
    } else {
        [
            shape_xml(
                2,
                "Title 1",
                r#"<p:ph type="title"/>"#,
                TITLE_FRAME,
                &paragraphs_xml(&slide.content.title, slide.title_color, true),
            ),
            shape_xml(
                3,
                "Content Placeholder 2",
                r#"<p:ph idx="1"/>"#,
                BODY_FRAME,
                &paragraphs_xml(&slide.content.body, theme.body_color, false),
            ),
        ]
    };
    let shapes = shapes.concat();

    format!(
        r#"{XML_HEADER}<p:sld {NS_DECL}><p:cSld><p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        slide.background.to_hex()
    )
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Text recovered from one slide: the first shape is the title, the
/// second the body (subtitle on the title slide).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedSlide {
    pub title: String,
    pub paragraphs: Vec<String>,
}

impl ExtractedSlide {
    /// Body paragraphs rejoined with a newline after each.
    pub fn body_text(&self) -> String {
        self.paragraphs.iter().map(|p| format!("{}\n", p)).collect()
    }
}

/// Read slide text back out of .pptx bytes, in slide order.
pub fn extract_slides(bytes: &[u8]) -> Result<Vec<ExtractedSlide>, CopilotError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    let mut slide_names: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let n = name
                .strip_prefix("ppt/slides/slide")?
                .strip_suffix(".xml")?
                .parse::<u32>()
                .ok()?;
            Some((n, name.to_string()))
        })
        .collect();
    slide_names.sort();

    let mut slides = Vec::with_capacity(slide_names.len());
    for (_, name) in slide_names {
        let slide = archive.by_name(&name)?;
        let shapes = read_shape_paragraphs(std::io::BufReader::new(slide))
            .map_err(|e| CopilotError::Xml(format!("{}: {}", name, e)))?;
        let mut shapes = shapes.into_iter();
        let title = shapes.next().unwrap_or_default().join("\n");
        let paragraphs = shapes.next().unwrap_or_default();
        slides.push(ExtractedSlide { title, paragraphs });
    }
    Ok(slides)
}

/// Walk `<p:sp>` → `<a:p>` → `<a:t>`; returns paragraphs per shape.
fn read_shape_paragraphs<R: std::io::BufRead>(
    source: R,
) -> Result<Vec<Vec<String>>, quick_xml::Error> {
    let mut reader = quick_xml::Reader::from_reader(source);
    let mut buf = Vec::new();
    let mut shapes: Vec<Vec<String>> = Vec::new();
    let mut paragraph: Option<String> = None;
    let mut in_text_tag = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"sp" => shapes.push(Vec::new()),
                b"p" => paragraph = Some(String::new()),
                b"t" => in_text_tag = true,
                _ => {}
            },
            Event::Empty(ref e) => {
                if e.local_name().as_ref() == b"p" {
                    if let Some(shape) = shapes.last_mut() {
                        shape.push(String::new());
                    }
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"p" => {
                    if let (Some(text), Some(shape)) = (paragraph.take(), shapes.last_mut()) {
                        shape.push(text);
                    }
                }
                b"t" => in_text_tag = false,
                _ => {}
            },
            Event::Text(ref e) => {
                if in_text_tag {
                    if let Some(text) = paragraph.as_mut() {
                        text.push_str(&e.unescape()?);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(shapes)
}
