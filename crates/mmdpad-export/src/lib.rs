//! Text export for diagrams.
//!
//! Images are produced by the diagram renderer itself; this crate writes the
//! source in forms other tools can pick up:
//! - `.mmd` raw source
//! - Markdown with a fenced `mermaid` block
//! - a standalone HTML page that renders the diagram in a browser

use std::fmt::{self, Write};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::info;

use mmdpad_core::Diagram;

/// Renderer script loaded by exported HTML pages
const RENDERER_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.min.js";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Mermaid,
    Markdown,
    Html,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Mermaid, ExportFormat::Markdown, ExportFormat::Html];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Mermaid => "mmd",
            ExportFormat::Markdown => "md",
            ExportFormat::Html => "html",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Mermaid => "Mermaid source",
            ExportFormat::Markdown => "Markdown",
            ExportFormat::Html => "HTML page",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mmd" | "mermaid" => Ok(ExportFormat::Mermaid),
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            "html" | "htm" => Ok(ExportFormat::Html),
            other => bail!("Unknown export format {other:?} (expected mmd, md or html)"),
        }
    }
}

/// `<title with non-alphanumerics as _, lowercased>_<ms>.<ext>`
pub fn export_file_name(title: &str, format: ExportFormat, timestamp_ms: i64) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("{}_{}.{}", stem, timestamp_ms, format.extension())
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render a diagram in the given format
pub fn render(diagram: &Diagram, format: ExportFormat) -> String {
    let mut output = String::new();
    let content = diagram.content.trim_end();

    // Writing to a String cannot fail
    match format {
        ExportFormat::Mermaid => {
            let _ = writeln!(output, "{content}");
        }
        ExportFormat::Markdown => {
            let _ = writeln!(output, "# {}\n", diagram.title);
            let _ = writeln!(output, "```mermaid\n{content}\n```");
        }
        ExportFormat::Html => {
            let title = escape_html(&diagram.title);
            let _ = writeln!(
                output,
                r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <script src="{RENDERER_SCRIPT}"></script>
</head>
<body>
  <h1>{title}</h1>
  <pre class="mermaid">
{}
  </pre>
  <script>mermaid.initialize({{ startOnLoad: true }});</script>
</body>
</html>"#,
                escape_html(content)
            );
        }
    }
    output
}

/// Write an export into `dir`, returning the created file's path
pub fn export_to_dir(diagram: &Diagram, format: ExportFormat, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    let name = export_file_name(&diagram.title, format, chrono::Utc::now().timestamp_millis());
    let path = dir.join(name);
    fs::write(&path, render(diagram, format))
        .with_context(|| format!("Failed to export to {:?}", path))?;
    info!(path = %path.display(), %format, "diagram exported");
    Ok(path)
}
