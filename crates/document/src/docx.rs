//! Paragraph extraction from `.docx` packages.
//!
//! Only top-level body paragraphs are returned (table cells, text boxes and
//! headers are skipped), so paragraph indices line up with what a word
//! processor reports as the document's paragraph list.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::{Error, Paragraph, Result, Run};

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";
const FONT_ATTRIBUTES: [&[u8]; 4] = [b"w:ascii", b"w:hAnsi", b"w:cs", b"w:eastAsia"];

pub fn load_docx(path: &Path) -> Result<Vec<Paragraph>> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    let document = read_part(&mut archive, DOCUMENT_PART)?.ok_or(Error::MissingPart(DOCUMENT_PART))?;
    let styles = match read_part(&mut archive, STYLES_PART)? {
        Some(xml) => parse_styles_xml(&xml)?,
        None => StyleTable::default(),
    };

    let paragraphs = parse_with_styles(&document, &styles)?;
    tracing::debug!(path = %path.display(), paragraphs = paragraphs.len(), "docx_loaded");
    Ok(paragraphs)
}

/// Parses a bare `word/document.xml` without a style table; style ids are
/// reported as style names.
pub fn parse_document_xml(xml: &[u8]) -> Result<Vec<Paragraph>> {
    parse_with_styles(xml, &StyleTable::default())
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<Vec<u8>>> {
    match archive.by_name(name) {
        Ok(mut part) => {
            let mut bytes = Vec::new();
            part.read_to_end(&mut bytes)?;
            Ok(Some(bytes))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Default)]
struct StyleTable {
    names: HashMap<String, String>,
    default_paragraph: Option<String>,
}

impl StyleTable {
    fn resolve(&self, style_id: Option<String>) -> Option<String> {
        match style_id {
            Some(id) => Some(self.names.get(&id).cloned().unwrap_or(id)),
            None => self.default_paragraph.clone(),
        }
    }
}

fn parse_styles_xml(xml: &[u8]) -> Result<StyleTable> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(false);
    let mut buf = Vec::new();

    let mut table = StyleTable::default();
    let mut current: Option<(String, bool)> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"w:style" => {
                let is_default_paragraph = attr(&e, b"w:type").as_deref() == Some("paragraph")
                    && attr(&e, b"w:default").is_some_and(|v| is_on(&v));
                current = attr(&e, b"w:styleId").map(|id| (id, is_default_paragraph));
            }
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"w:name" => {
                if let Some((id, is_default_paragraph)) = &current
                    && let Some(name) = attr(&e, b"w:val")
                {
                    if *is_default_paragraph {
                        table.default_paragraph = Some(name.clone());
                    }
                    table.names.insert(id.clone(), name);
                }
            }
            Event::End(e) if e.name().as_ref() == b"w:style" => current = None,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(table)
}

fn parse_with_styles(xml: &[u8], styles: &StyleTable) -> Result<Vec<Paragraph>> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(false);
    let mut buf = Vec::new();
    let mut parser = BodyParser::new(styles);

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let depth = parser.stack.len() + 1;
                parser.open(&e, depth, true);
                parser.stack.push(e.name().as_ref().to_vec());
            }
            Event::Empty(e) => {
                let depth = parser.stack.len() + 1;
                parser.open(&e, depth, false);
            }
            Event::End(e) => {
                let depth = parser.stack.len();
                parser.close(e.name().as_ref(), depth);
                parser.stack.pop();
            }
            Event::Text(e) => {
                if parser.in_text {
                    parser.push_text(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if parser.in_text {
                    parser.push_text(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(parser.paragraphs)
}

struct OpenParagraph {
    depth: usize,
    style_id: Option<String>,
    runs: Vec<Run>,
}

struct OpenRun {
    depth: usize,
    run: Run,
}

struct BodyParser<'s> {
    styles: &'s StyleTable,
    stack: Vec<Vec<u8>>,
    paragraphs: Vec<Paragraph>,
    paragraph: Option<OpenParagraph>,
    run: Option<OpenRun>,
    in_text: bool,
}

impl<'s> BodyParser<'s> {
    fn new(styles: &'s StyleTable) -> Self {
        Self {
            styles,
            stack: Vec::new(),
            paragraphs: Vec::new(),
            paragraph: None,
            run: None,
            in_text: false,
        }
    }

    fn parent(&self) -> Option<&[u8]> {
        self.stack.last().map(Vec::as_slice)
    }

    fn open(&mut self, e: &BytesStart<'_>, depth: usize, has_content: bool) {
        let name = e.name();
        let name = name.as_ref();

        if name == b"w:p" {
            if self.paragraph.is_none() && self.parent() == Some(b"w:body".as_slice()) {
                self.paragraph = Some(OpenParagraph {
                    depth,
                    style_id: None,
                    runs: Vec::new(),
                });
                if !has_content {
                    self.close(b"w:p", depth);
                }
            }
            return;
        }

        let parent = self.parent().map(<[u8]>::to_vec);
        let Some(paragraph) = self.paragraph.as_mut() else {
            return;
        };

        if name == b"w:pStyle" && depth == paragraph.depth + 2 {
            paragraph.style_id = attr(e, b"w:val");
            return;
        }

        if name == b"w:r" && self.run.is_none() {
            let direct = depth == paragraph.depth + 1;
            let in_hyperlink =
                depth == paragraph.depth + 2 && parent.as_deref() == Some(b"w:hyperlink".as_slice());
            if (direct || in_hyperlink) && has_content {
                self.run = Some(OpenRun {
                    depth,
                    run: Run::default(),
                });
            }
            return;
        }

        let Some(open_run) = self.run.as_mut() else {
            return;
        };

        if depth == open_run.depth + 1 {
            match name {
                b"w:t" => self.in_text = has_content,
                b"w:tab" => open_run.run.text.push('\t'),
                b"w:br" | b"w:cr" => open_run.run.text.push('\n'),
                _ => {}
            }
        } else if depth == open_run.depth + 2 && parent.as_deref() == Some(b"w:rPr".as_slice()) {
            apply_run_property(&mut open_run.run, name, e);
        }
    }

    fn close(&mut self, name: &[u8], depth: usize) {
        match name {
            b"w:t" => self.in_text = false,
            b"w:r" => {
                if let Some(open_run) = self.run.take_if(|open| open.depth == depth)
                    && let Some(paragraph) = self.paragraph.as_mut()
                {
                    paragraph.runs.push(open_run.run);
                }
            }
            b"w:p" => {
                if let Some(paragraph) = self.paragraph.take_if(|open| open.depth == depth) {
                    let index = self.paragraphs.len();
                    let style_name = self.styles.resolve(paragraph.style_id);
                    self.paragraphs
                        .push(Paragraph::from_runs(index, style_name, paragraph.runs));
                }
            }
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(open_run) = self.run.as_mut() {
            open_run.run.text.push_str(text);
        }
    }
}

fn apply_run_property(run: &mut Run, name: &[u8], e: &BytesStart<'_>) {
    match name {
        b"w:rFonts" => {
            run.font_name = FONT_ATTRIBUTES
                .into_iter()
                .find_map(|key| attr(e, key).filter(|value| !value.trim().is_empty()));
        }
        b"w:sz" => {
            run.font_size_pt = attr(e, b"w:val")
                .and_then(|half_points| half_points.parse::<f32>().ok())
                .map(|half_points| half_points / 2.0);
        }
        b"w:b" => run.bold = attr(e, b"w:val").is_none_or(|v| is_on(&v)),
        b"w:i" => run.italic = attr(e, b"w:val").is_none_or(|v| is_on(&v)),
        b"w:color" => run.color = attr(e, b"w:val").and_then(|v| v.parse().ok()),
        _ => {}
    }
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok())
        .map(|value| value.into_owned())
}

fn is_on(value: &str) -> bool {
    !matches!(value, "0" | "false" | "off")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p>
      <w:pPr><w:pStyle w:val="Heading1"/><w:rPr><w:b/></w:rPr></w:pPr>
      <w:r><w:t>Сура Аль-Фатиха</w:t></w:r>
    </w:p>
    <w:p>
      <w:r>
        <w:rPr><w:rFonts w:ascii="Traditional Arabic" w:cs="Traditional Arabic"/><w:b w:val="0"/><w:color w:val="C00000"/><w:sz w:val="36"/></w:rPr>
        <w:t>بِسْمِ اللَّهِ</w:t>
      </w:r>
    </w:p>
    <w:p/>
    <w:tbl><w:tr><w:tc><w:p><w:r><w:t>ячейка</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
    <w:p>
      <w:r><w:rPr><w:i/></w:rPr><w:t xml:space="preserve">Хвала </w:t></w:r>
      <w:hyperlink><w:r><w:t>Аллаху</w:t></w:r></w:hyperlink>
      <w:r><w:tab/><w:t>&amp; миров</w:t></w:r>
    </w:p>
    <w:sectPr/>
  </w:body>
</w:document>"#;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/></w:style>
</w:styles>"#;

    #[test]
    fn extracts_body_paragraphs_in_order() {
        let paragraphs = parse_document_xml(DOCUMENT.as_bytes()).unwrap();

        let texts: Vec<_> = paragraphs.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Сура Аль-Фатиха", "بِسْمِ اللَّهِ", "", "Хвала Аллаху\t& миров"]
        );
        let indices: Vec<_> = paragraphs.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn reads_run_formatting() {
        let paragraphs = parse_document_xml(DOCUMENT.as_bytes()).unwrap();

        let heading_run = &paragraphs[0].runs[0];
        assert!(!heading_run.bold, "paragraph mark properties must not leak into runs");

        let verse = &paragraphs[1].runs[0];
        assert_eq!(verse.font_name.as_deref(), Some("Traditional Arabic"));
        assert_eq!(verse.font_size_pt, Some(18.0));
        assert!(!verse.bold);
        assert_eq!(verse.color, Some(crate::Rgb::new(0xC0, 0, 0)));

        assert!(paragraphs[3].runs[0].italic);
        assert_eq!(paragraphs[3].runs.len(), 3);
    }

    #[test]
    fn resolves_style_names() {
        let styles = parse_styles_xml(STYLES.as_bytes()).unwrap();
        let paragraphs = parse_with_styles(DOCUMENT.as_bytes(), &styles).unwrap();

        assert_eq!(paragraphs[0].style_name.as_deref(), Some("heading 1"));
        assert_eq!(paragraphs[1].style_name.as_deref(), Some("Normal"));

        let bare = parse_document_xml(DOCUMENT.as_bytes()).unwrap();
        assert_eq!(bare[0].style_name.as_deref(), Some("Heading1"));
        assert_eq!(bare[1].style_name, None);
    }
}
