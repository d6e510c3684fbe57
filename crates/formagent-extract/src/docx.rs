//! DOCX content extraction using docx-rs.
//!
//! Reads the word-processing container and emits paragraph text in document
//! order. Tables are rendered row by row with ` | ` between cells, or
//! flattened to one line per cell when table layout is disabled.

use std::path::Path;

use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent, TableChild,
    TableRowChild,
};

use crate::error::{ExtractError, ExtractResult};
use crate::Extractor;

/// DOCX content extractor.
#[derive(Debug, Clone)]
pub struct DocxExtractor {
    /// Whether to keep table rows together as `a | b | c`.
    preserve_tables: bool,
}

impl DocxExtractor {
    /// Create new DOCX extractor with default settings.
    pub fn new() -> Self {
        Self {
            preserve_tables: true,
        }
    }

    /// Configure whether to preserve table structure.
    pub fn with_tables(mut self, preserve: bool) -> Self {
        self.preserve_tables = preserve;
        self
    }

    /// Extract text from DOCX bytes already in memory.
    pub fn extract_bytes(&self, content: &[u8]) -> ExtractResult<String> {
        let docx = docx_rs::read_docx(content)
            .map_err(|e| ExtractError::Docx(format!("Failed to parse DOCX: {}", e)))?;

        let mut parts: Vec<String> = Vec::new();

        for child in &docx.document.children {
            match child {
                DocumentChild::Paragraph(p) => {
                    let text = paragraph_text(p);
                    if !text.trim().is_empty() {
                        parts.push(text);
                    }
                }
                DocumentChild::Table(t) if self.preserve_tables => {
                    let text = table_text(t);
                    if !text.trim().is_empty() {
                        parts.push(text);
                    }
                }
                DocumentChild::Table(t) => {
                    parts.extend(table_cells(t).into_iter().filter(|c| !c.is_empty()));
                }
                // Bookmarks, section properties and the like carry no text.
                _ => {}
            }
        }

        Ok(parts.join("\n"))
    }
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for DocxExtractor {
    fn extract(&self, path: &Path) -> ExtractResult<String> {
        let content = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExtractError::NotFound(path.to_path_buf())
            } else {
                ExtractError::Io(e)
            }
        })?;
        self.extract_bytes(&content)
    }

    fn name(&self) -> &str {
        "docx-rs"
    }
}

fn paragraph_text(p: &Paragraph) -> String {
    let mut text = String::new();
    append_inline(&p.children, &mut text);
    text
}

/// Hyperlinks nest further paragraph children; their runs read like any other.
fn append_inline(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for piece in &run.children {
                    match piece {
                        RunChild::Text(t) => out.push_str(&t.text),
                        RunChild::Tab(_) => out.push('\t'),
                        RunChild::Break(_) => out.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => append_inline(&link.children, out),
            _ => {}
        }
    }
}

/// Cell texts row by row; paragraphs within a cell are joined by a space.
fn table_rows(t: &Table) -> Vec<Vec<String>> {
    t.rows
        .iter()
        .map(|TableChild::TableRow(row)| {
            row.cells
                .iter()
                .map(|TableRowChild::TableCell(cell)| {
                    cell.children
                        .iter()
                        .filter_map(|content| match content {
                            TableCellContent::Paragraph(p) => Some(paragraph_text(p)),
                            _ => None,
                        })
                        .map(|para| para.trim().to_string())
                        .filter(|para| !para.is_empty())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect()
        })
        .collect()
}

fn table_text(t: &Table) -> String {
    table_rows(t)
        .iter()
        .map(|row| row.join(" | "))
        .collect::<Vec<_>>()
        .join("\n")
}

fn table_cells(t: &Table) -> Vec<String> {
    table_rows(t).into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Run, TableCell, TableRow};

    fn write_docx(docx: Docx) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        docx.build().pack(file.reopen().unwrap()).unwrap();
        file
    }

    #[test]
    fn test_paragraphs_in_order() {
        let file = write_docx(
            Docx::new()
                .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Applicant: Jane")))
                .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Signed"))),
        );

        let text = DocxExtractor::new().extract(file.path()).unwrap();
        assert_eq!(text, "Applicant: Jane\nSigned");
    }

    #[test]
    fn test_hyperlink_runs_are_inline() {
        use docx_rs::{Hyperlink, HyperlinkType};

        let paragraph = Paragraph::new()
            .add_run(Run::new().add_text("Apply at").add_tab())
            .add_hyperlink(
                Hyperlink::new("https://example.com/apply", HyperlinkType::External)
                    .add_run(Run::new().add_text("the portal")),
            );

        assert_eq!(paragraph_text(&paragraph), "Apply at\tthe portal");
    }

    #[test]
    fn test_table_layout() {
        let table = Table::new(vec![TableRow::new(vec![
            TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("Name"))),
            TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("Age"))),
        ])]);
        let file = write_docx(Docx::new().add_table(table));

        let kept = DocxExtractor::new().extract(file.path()).unwrap();
        assert_eq!(kept, "Name | Age");

        let flat = DocxExtractor::new().with_tables(false).extract(file.path()).unwrap();
        assert_eq!(flat, "Name\nAge");
    }

    #[test]
    fn test_not_a_docx() {
        let result = DocxExtractor::new().extract_bytes(b"plain bytes, not a zip");
        assert!(matches!(result, Err(ExtractError::Docx(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = DocxExtractor::new().extract(Path::new("/no/such/form.docx"));
        assert!(matches!(result, Err(ExtractError::NotFound(_))));
    }
}
