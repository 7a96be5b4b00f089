//! Local text extraction for plain text, markdown and DOCX files.

use std::fs;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{IngestError, Result};

const DOCX_BODY: &str = "word/document.xml";

/// Read a UTF-8 text file; invalid sequences are replaced rather than rejected.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Paragraph text of a DOCX file, each paragraph followed by `\n`.
pub fn read_docx(path: &Path) -> Result<String> {
    let file = fs::File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)?
        .read_to_string(&mut xml)
        .map_err(|source| IngestError::Io { path: path.to_path_buf(), source })?;
    docx_paragraphs(&xml)
}

/// Walk body-level `w:p` elements, collecting the text of their `w:t` runs.
/// Paragraphs inside tables (`w:tbl`) and text boxes (`w:txbxContent`) are skipped.
/// Tabs and breaks only count inside a run; `w:tab` under `w:tabs` is a tab stop.
pub fn docx_paragraphs(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut paragraph = String::new();
    let mut nested = 0usize;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" | b"w:txbxContent" => nested += 1,
                _ if nested > 0 => {}
                b"w:p" => paragraph.clear(),
                b"w:r" => in_run = true,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) if nested == 0 => match e.name().as_ref() {
                b"w:p" => out.push('\n'),
                b"w:tab" if in_run => paragraph.push('\t'),
                b"w:br" | b"w:cr" if in_run => paragraph.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text && nested == 0 => {
                let text = t.unescape().map_err(|e| IngestError::Docx(e.to_string()))?;
                paragraph.push_str(&text);
            }
            Event::CData(t) if in_text && nested == 0 => {
                paragraph.push_str(&String::from_utf8_lossy(&t))
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:tbl" | b"w:txbxContent" => nested = nested.saturating_sub(1),
                _ if nested > 0 => {}
                b"w:t" => in_text = false,
                b"w:r" => in_run = false,
                b"w:p" => {
                    out.push_str(&paragraph);
                    out.push('\n');
                    paragraph.clear();
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}
