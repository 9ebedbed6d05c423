//! # HTML Report
//!
//! $$
//! \text{report}=\text{index}\ \Vert\ \text{section}_1\ \Vert\ \cdots\ \Vert\ \text{section}_k
//! $$
//!
//! Self-contained HTML document: a linked index, one section per group with
//! click-to-sort tables, embedded plotly charts and a "Back to Index" button.

use std::fmt::Write as _;
use std::path::Path;

use plotly::Plot;

use crate::Result;

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

/// Header click sorts numerically descending (a trailing `%` is ignored),
/// falling back to alphabetical order for text cells.
const SORT_SCRIPT: &str = r#"<script>
document.addEventListener('DOMContentLoaded', function () {
  document.querySelectorAll('table.sortable').forEach(function (table) {
    table.querySelectorAll('th').forEach(function (header, index) {
      header.addEventListener('click', function () { sortTable(table, index); });
    });
  });

  function sortTable(table, colIndex) {
    const rows = Array.from(table.rows).slice(1);
    rows.sort(function (rowA, rowB) {
      const cellA = rowA.cells[colIndex].innerText.trim();
      const cellB = rowB.cells[colIndex].innerText.trim();
      const valueA = parseValue(cellA);
      const valueB = parseValue(cellB);
      if (!isNaN(valueA) && !isNaN(valueB)) {
        return valueB - valueA;
      }
      return cellA.localeCompare(cellB);
    });
    rows.forEach(function (row) { table.appendChild(row); });
  }

  function parseValue(value) {
    return parseFloat(value.replace('%', '').trim());
  }
});
</script>"#;

const STYLE: &str = "<style>\
#index a {color: blue; text-decoration: none;} \
#index a:hover {text-decoration: underline;} \
table.sortable th {cursor: pointer;} \
td {text-align: right;}\
</style>";

/// Escape `&`, `<`, `>`, `"` and `'`.
pub fn escape(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(c),
    }
  }
  out
}

/// Anchor id for a section title: anything but ASCII alphanumerics and `-`
/// becomes `_`.
pub fn anchor(title: &str) -> String {
  title
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
    .collect()
}

/// `12.345%` with two decimals.
pub fn percent(fraction: f64) -> String {
  format!("{:.2}%", fraction * 100.0)
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
  headers: Vec<String>,
  rows: Vec<Vec<String>>,
}

impl Table {
  pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
    Self {
      headers: headers.into_iter().map(Into::into).collect(),
      rows: Vec::new(),
    }
  }

  /// Short rows are padded with empty cells, long rows truncated.
  pub fn push_row<S: Into<String>>(&mut self, cells: impl IntoIterator<Item = S>) {
    let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
    row.resize(self.headers.len(), String::new());
    self.rows.push(row);
  }

  pub fn headers(&self) -> &[String] {
    &self.headers
  }

  pub fn rows(&self) -> &[Vec<String>] {
    &self.rows
  }

  fn render(&self, out: &mut String) {
    out.push_str("<table class=\"sortable\" border=\"1\"><tr>");
    for h in &self.headers {
      let _ = write!(out, "<th>{}</th>", escape(h));
    }
    out.push_str("</tr>");
    for row in &self.rows {
      out.push_str("<tr>");
      for cell in row {
        let _ = write!(out, "<td>{}</td>", escape(cell));
      }
      out.push_str("</tr>");
    }
    out.push_str("</table>");
  }
}

#[derive(Clone, Debug)]
enum Block {
  Paragraph(String),
  Table(Table),
  /// Pre-rendered plotly markup, inserted verbatim.
  Chart(String),
}

#[derive(Clone, Debug)]
pub struct Section {
  title: String,
  id: String,
  blocks: Vec<Block>,
}

impl Section {
  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn paragraph(&mut self, text: impl Into<String>) -> &mut Self {
    self.blocks.push(Block::Paragraph(text.into()));
    self
  }

  pub fn table(&mut self, table: Table) -> &mut Self {
    self.blocks.push(Block::Table(table));
    self
  }

  pub fn chart(&mut self, plot: &Plot) -> &mut Self {
    let div_id = format!("{}-chart-{}", self.id, self.blocks.len());
    self.blocks.push(Block::Chart(plot.to_inline_html(Some(div_id.as_str()))));
    self
  }

  fn render(&self, out: &mut String) {
    let _ = write!(out, "<h2 id=\"{}\">{}</h2>", self.id, escape(&self.title));
    for block in &self.blocks {
      match block {
        Block::Paragraph(text) => {
          let _ = write!(out, "<p>{}</p>", escape(text));
        }
        Block::Table(table) => table.render(out),
        Block::Chart(html) => out.push_str(html),
      }
    }
    out.push_str("<br><button onclick=\"window.location.href='#'\">Back to Index</button>");
  }
}

#[derive(Clone, Debug)]
pub struct HtmlReport {
  title: String,
  sections: Vec<Section>,
}

impl HtmlReport {
  pub fn new(title: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      sections: Vec::new(),
    }
  }

  /// Appends a section. An anchor already in use gets a numeric suffix.
  pub fn section(&mut self, title: impl Into<String>) -> &mut Section {
    let title = title.into();
    let base = anchor(&title);
    let mut id = base.clone();
    let mut k = 2;
    while self.sections.iter().any(|s| s.id == id) {
      id = format!("{base}_{k}");
      k += 1;
    }
    self.sections.push(Section {
      title,
      id,
      blocks: Vec::new(),
    });
    let last = self.sections.len() - 1;
    &mut self.sections[last]
  }

  pub fn sections(&self) -> &[Section] {
    &self.sections
  }

  pub fn render(&self) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\">");
    let _ = write!(out, "<title>{}</title>", escape(&self.title));
    out.push_str(STYLE);
    let _ = write!(out, "<script src=\"{PLOTLY_CDN}\"></script>");
    out.push_str(SORT_SCRIPT);
    out.push_str("</head><body>");

    let _ = write!(out, "<h1>{} - Index</h1><ul id=\"index\">", escape(&self.title));
    for s in &self.sections {
      let _ = write!(out, "<li><a href=\"#{}\">{}</a></li>", s.id, escape(&s.title));
    }
    out.push_str("</ul>");

    for s in &self.sections {
      s.render(&mut out);
    }
    out.push_str("</body></html>");
    out
  }

  pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
    std::fs::write(path, self.render())?;
    Ok(())
  }
}
