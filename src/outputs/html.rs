//! Static HTML report assembly.
//!
//! A report is a fixed page template with one block per [`ReportSection`].
//! Section markup and scripts are pasted in verbatim, with no escaping.
//!
//! The page links `leaflet.css` and `leaflet.js` by relative path so map
//! sections can use Leaflet. Those files are not written here; they must sit
//! next to the report for maps to render.

use crate::error::{Error, Result};
use crate::models::ReportSection;
use crate::utils::ensure_dir;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

const PAGE_STYLE: &str = r#"    <style>
        body {
            font-family: Arial, sans-serif;
            line-height: 1.6;
            margin: 2em;
            color: #333;
            background-color: #f5f5f5;
        }
        h1 {
            text-align: center;
            color: #444;
        }
        .section {
            margin-bottom: 20px;
            padding: 15px;
            border: 1px solid #ccc;
            border-radius: 10px;
            background-color: #fff;
            box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1);
        }
        .section h2 {
            color: #555;
            border-bottom: 2px solid #007BFF;
            margin-bottom: 15px;
            padding-bottom: 5px;
        }
        .text-content {
            padding: 10px;
            background-color: #fcfcfc;
            border: 1px solid #eee;
            border-radius: 5px;
        }
        pre {
            background-color: #f4f4f4;
            padding: 10px;
            border-radius: 5px;
            overflow-x: auto;
        }
        footer {
            text-align: center;
            margin-top: 20px;
            font-size: 0.9em;
            color: #888;
        }
    </style>
"#;

const PAGE_FOOTER: &str = "    <footer>\n        Generated by HTMLReportGenerator\n    </footer>\n";

/// Render one section block.
fn render_section(out: &mut String, section: &ReportSection) {
    // Writing into a String cannot fail.
    let _ = write!(
        out,
        r#"    <div class="section">
        <h2>{heading}</h2>
        <div class="text-content">
            {text}
        </div>
        <script>
            {script}
        </script>
    </div>
"#,
        heading = section.heading,
        text = section.text,
        script = section.script,
    );
}

/// Render the complete report page.
pub fn render_report(title: &str, sections: &[ReportSection]) -> String {
    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    page.push_str("    <meta charset=\"UTF-8\">\n");
    page.push_str("    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    let _ = writeln!(page, "    <title>{title}</title>");
    page.push_str("    <link rel=\"stylesheet\" href=\"leaflet.css\" />\n");
    page.push_str("    <script src=\"leaflet.js\"></script>\n");
    page.push_str(PAGE_STYLE);
    page.push_str("</head>\n<body>\n");
    let _ = writeln!(page, "    <h1>{title}</h1>");
    for section in sections {
        render_section(&mut page, section);
    }
    page.push_str(PAGE_FOOTER);
    page.push_str("</body>\n</html>\n");
    page
}

/// Render a report and write it to `output_dir/filename`.
///
/// Creates `output_dir` if needed and replaces any existing file at the
/// target path.
///
/// # Returns
///
/// The path that was written.
///
/// # Errors
///
/// [`Error::Io`] if the directory cannot be created or the file cannot be
/// written.
#[instrument(
    level = "info",
    skip_all,
    fields(
        output_dir = %output_dir.as_ref().display(),
        %filename,
        sections = sections.len()
    )
)]
pub async fn assemble(
    title: &str,
    sections: &[ReportSection],
    output_dir: impl AsRef<Path>,
    filename: &str,
) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    ensure_dir(output_dir).await?;

    let report_path = output_dir.join(filename);
    let html = render_report(title, sections);
    fs::write(&report_path, html)
        .await
        .map_err(|e| Error::io(&report_path, e))?;

    info!(path = %report_path.display(), "Report generated");
    Ok(report_path)
}
