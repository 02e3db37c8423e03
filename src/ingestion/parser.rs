//! Multi-format text extraction

use calamine::Reader as CalamineReader;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

/// Extract plain text from a file, dispatching on its extension.
///
/// Supported: `.pdf`, `.docx`, `.pptx`, `.csv`, `.xlsx`, `.txt`. Any
/// other extension is an `UnsupportedFileType` error. The returned text
/// is opaque input for the chunker; no structure is preserved beyond
/// newlines.
pub fn extract_text(path: &Path) -> Result<String> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();

    let data = std::fs::read(path)?;

    match extension.as_str() {
        "pdf" => parse_pdf(&filename, &data),
        "docx" => parse_docx(&filename, &data),
        "pptx" => parse_pptx(&filename, &data),
        "csv" => parse_csv(&filename, &data),
        "xlsx" => parse_xlsx(&filename, &data),
        "txt" => Ok(String::from_utf8_lossy(&data).into_owned()),
        _ => Err(Error::UnsupportedFileType(filename)),
    }
}

fn parse_pdf(filename: &str, data: &[u8]) -> Result<String> {
    let text = pdf_extract::extract_text_from_mem(data)
        .map_err(|e| Error::file_parse(filename, e))?;
    // Strip null bytes and blank lines left behind by some font encodings
    Ok(text
        .replace('\0', "")
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}

fn parse_docx(filename: &str, data: &[u8]) -> Result<String> {
    let doc = docx_rs::read_docx(data).map_err(|e| Error::file_parse(filename, e))?;

    let mut text = String::new();
    for child in doc.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            let mut line = String::new();
            for child in paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = child {
                    for child in run.children {
                        if let docx_rs::RunChild::Text(t) = child {
                            line.push_str(&t.text);
                        }
                    }
                }
            }
            if !line.trim().is_empty() {
                text.push_str(&line);
                text.push('\n');
            }
        }
    }
    Ok(text)
}

fn parse_pptx(filename: &str, data: &[u8]) -> Result<String> {
    let cursor = std::io::Cursor::new(data);
    let mut archive = zip::ZipArchive::new(cursor).map_err(|e| Error::file_parse(filename, e))?;

    // Slides live at ppt/slides/slideN.xml; keep presentation order
    let mut slide_names: Vec<String> = archive
        .file_names()
        .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
        .map(|s| s.to_string())
        .collect();
    slide_names.sort_by_key(|name| {
        name.trim_start_matches("ppt/slides/slide")
            .trim_end_matches(".xml")
            .parse::<u32>()
            .unwrap_or(0)
    });

    let mut texts = Vec::new();
    for slide_name in slide_names {
        let mut xml = String::new();
        if let Ok(mut file) = archive.by_name(&slide_name) {
            if file.read_to_string(&mut xml).is_ok() {
                let slide_text = slide_text_runs(&xml);
                if !slide_text.is_empty() {
                    texts.push(slide_text);
                }
            }
        }
    }
    Ok(texts.join("\n"))
}

/// Collect the `<a:t>` text runs from one slide's XML
fn slide_text_runs(xml: &str) -> String {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_str(xml);
    let mut runs = Vec::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"a:t" => in_text_run = true,
            Ok(Event::End(e)) if e.name().as_ref() == b"a:t" => in_text_run = false,
            Ok(Event::Text(t)) if in_text_run => {
                if let Ok(text) = t.unescape() {
                    runs.push(text.into_owned());
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }
    runs.join("\n")
}

fn parse_csv(filename: &str, data: &[u8]) -> Result<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut lines = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::file_parse(filename, e))?;
        lines.push(record.iter().collect::<Vec<_>>().join(","));
    }
    Ok(lines.join("\n"))
}

fn parse_xlsx(filename: &str, data: &[u8]) -> Result<String> {
    let cursor = std::io::Cursor::new(data.to_vec());
    let mut workbook: calamine::Xlsx<_> =
        calamine::open_workbook_from_rs(cursor).map_err(|e| Error::file_parse(filename, e))?;

    let mut lines = Vec::new();
    let sheet_names = workbook.sheet_names().to_vec();
    for sheet_name in sheet_names {
        if let Ok(range) = workbook.worksheet_range(&sheet_name) {
            for row in range.rows() {
                let line = row
                    .iter()
                    .map(|cell| cell.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                lines.push(line);
            }
        }
    }
    Ok(lines.join("\n"))
}
