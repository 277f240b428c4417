use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::controller::Report;
use crate::format;
use crate::models::{FragmentItem, PageFragment};
use crate::sanitize::escape_html;

const REPORT_BASENAME: &str = "wrapped_report";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Json,
    Html,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
            ExportFormat::Html => "html",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ExportFormat::Text => "Text",
            ExportFormat::Json => "JSON",
            ExportFormat::Html => "HTML",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ExportFormat::Text => ExportFormat::Json,
            ExportFormat::Json => ExportFormat::Html,
            ExportFormat::Html => ExportFormat::Text,
        }
    }
}

pub fn report_path(dir: &Path, format: ExportFormat) -> PathBuf {
    dir.join(format!("{}.{}", REPORT_BASENAME, format.extension()))
}

/// Write `report` into `dir` in the given format and return the file path.
pub fn save_report(dir: &Path, report: &Report, format: ExportFormat) -> io::Result<PathBuf> {
    let path = report_path(dir, format);
    let mut file = std::fs::File::create(&path)?;
    match format {
        ExportFormat::Text => file.write_all(format::format_report(&report.fragments).as_bytes())?,
        ExportFormat::Json => file.write_all(format::format_json(&report.payload).as_bytes())?,
        ExportFormat::Html => write_html(&mut file, &report.fragments)?,
    }
    Ok(path)
}

/// Write the report as a standalone HTML page. All text is escaped.
pub fn write_html<W: Write>(writer: &mut W, fragments: &[PageFragment]) -> io::Result<()> {
    write!(
        writer,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Your Listening Statistics</title>
    <style>
        body {{ font-family: sans-serif; background: #1e1e2e; color: #e6edf3; margin: 2em; }}
        .section {{ margin-bottom: 2em; }}
        .rank {{ color: #58a6ff; margin-right: 0.5em; }}
        .stat-number {{ font-weight: bold; }}
    </style>
</head>
<body>
"#
    )?;

    for fragment in fragments {
        writeln!(writer, "<div class=\"section\">")?;
        writeln!(writer, "  <h2>{}</h2>", escape_html(&fragment.heading))?;
        if let Some(ref subtitle) = fragment.subtitle {
            writeln!(writer, "  <p>{}</p>", escape_html(subtitle))?;
        }
        writeln!(writer, "  <ul>")?;
        for item in &fragment.items {
            match item {
                FragmentItem::Stat { label, value } => writeln!(
                    writer,
                    "    <li>{}: <span class=\"stat-number\">{}</span></li>",
                    escape_html(label),
                    escape_html(value)
                )?,
                FragmentItem::Row { rank, text } => writeln!(
                    writer,
                    "    <li><span class=\"rank\">{})</span>{}</li>",
                    escape_html(rank),
                    escape_html(text)
                )?,
            }
        }
        writeln!(writer, "  </ul>")?;
        writeln!(writer, "</div>")?;
    }

    writeln!(writer, "</body>\n</html>")
}
