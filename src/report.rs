//! Results table: aggregation, persistence and the optional plot.

use crate::errors::BenchError;
use crate::harness::BenchmarkResult;
use crate::sampler::round2;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tempfile::NamedTempFile;

pub const RESULTS_HEADER: [&str; 3] = ["rows", "partitions", "runtime_sec"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub rows: usize,
    pub partitions: usize,
    pub runtime_sec: f64,
}

/// One row per executed configuration, in the order they ran.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsTable {
    pub rows: Vec<ResultRow>,
}

impl ResultsTable {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct dataset sizes in first-seen order.
    #[must_use]
    pub fn sizes(&self) -> Vec<usize> {
        let mut out: Vec<usize> = Vec::new();
        for r in &self.rows {
            if !out.contains(&r.rows) {
                out.push(r.rows);
            }
        }
        out
    }

    /// Rows belonging to one dataset size, in run order.
    pub fn series(&self, size: usize) -> impl Iterator<Item = &ResultRow> {
        self.rows.iter().filter(move |r| r.rows == size)
    }
}

/// Build the report table. Runtimes are rounded to two decimals; order is kept.
#[must_use]
pub fn aggregate(results: &[BenchmarkResult]) -> ResultsTable {
    ResultsTable {
        rows: results
            .iter()
            .map(|r| ResultRow {
                rows: r.rows,
                partitions: r.partitions,
                runtime_sec: round2(r.runtime_sec),
            })
            .collect(),
    }
}

/// Write the table as csv with a header row.
///
/// # Errors
/// Returns `BenchError::Csv` if a row cannot be written.
pub fn write_table<W: Write>(table: &ResultsTable, writer: W) -> Result<(), BenchError> {
    let mut w = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    w.write_record(RESULTS_HEADER)?;
    for row in &table.rows {
        w.serialize(row)?;
    }
    w.flush().map_err(|e| BenchError::io("results", e))?;
    Ok(())
}

/// Persist the table at `path` atomically via a temp file in the same directory.
///
/// # Errors
/// Returns an error if the directory cannot be created or the write/rename fails.
pub fn persist(table: &ResultsTable, path: impl AsRef<Path>) -> Result<(), BenchError> {
    let dest = path.as_ref();
    log::info!("results: {} rows -> {}", table.len(), dest.display());
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| BenchError::io(parent.display(), e))?;
    let mut tmp =
        NamedTempFile::new_in(parent).map_err(|e| BenchError::io(parent.display(), e))?;
    write_table(table, io::BufWriter::new(tmp.as_file_mut()))?;
    tmp.persist(dest).map_err(|e| BenchError::io(dest.display(), e.error))?;
    Ok(())
}

/// Renders a results table to an image file.
pub trait Visualizer {
    /// # Errors
    /// Any rendering or output failure, as `BenchError::Visualization`.
    fn render(&self, table: &ResultsTable, path: &Path) -> Result<(), BenchError>;
}

/// Best-effort plot. Never fails: a missing visualizer is skipped and any
/// render error or panic is logged and dropped. Returns whether an image was
/// written.
pub fn visualize(
    table: &ResultsTable,
    path: impl AsRef<Path>,
    visualizer: Option<&dyn Visualizer>,
) -> bool {
    let Some(v) = visualizer else {
        log::debug!("no visualizer configured; skipping plot");
        return false;
    };
    let path = path.as_ref();
    match panic::catch_unwind(AssertUnwindSafe(|| v.render(table, path))) {
        Ok(Ok(())) => {
            log::info!("plot saved to {}", path.display());
            true
        }
        Ok(Err(e)) => {
            log::warn!("plot skipped: {e}");
            false
        }
        Err(payload) => {
            log::warn!("plot skipped: renderer panicked: {}", panic_message(&*payload));
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Escape text content for embedding in SVG markup.
fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Line chart of runtime against partitions, one series per dataset size.
#[derive(Debug, Clone)]
pub struct SvgPlot {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for SvgPlot {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
            title: "Scalability Demo".to_string(),
        }
    }
}

const PALETTE: [&str; 6] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b",
];
const MARGIN: f64 = 50.0;

impl SvgPlot {
    /// Render the chart to an SVG string.
    ///
    /// # Errors
    /// Returns `BenchError::Visualization` for an empty table.
    pub fn to_svg(&self, table: &ResultsTable) -> Result<String, BenchError> {
        if table.is_empty() {
            return Err(BenchError::Visualization("no results to plot".into()));
        }
        let (w, h) = (f64::from(self.width), f64::from(self.height));
        let x_max = table.rows.iter().map(|r| r.partitions).max().unwrap_or(1).max(1) as f64;
        let y_max = table.rows.iter().map(|r| r.runtime_sec).fold(0.0_f64, f64::max);
        let y_max = if y_max > 0.0 { y_max } else { 1.0 };
        let px = |x: f64| MARGIN + x / x_max * (w - 2.0 * MARGIN);
        let py = |y: f64| h - MARGIN - y / y_max * (h - 2.0 * MARGIN);

        let mut svg = String::new();
        let fmt = |e: std::fmt::Error| BenchError::Visualization(e.to_string());
        writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
            self.width, self.height
        )
        .map_err(fmt)?;
        writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#).map_err(fmt)?;
        writeln!(
            svg,
            r#"<text x="{}" y="20" text-anchor="middle">{}</text>"#,
            w / 2.0,
            escape_xml(&self.title)
        )
        .map_err(fmt)?;
        writeln!(
            svg,
            r#"<line x1="{m}" y1="{b}" x2="{r}" y2="{b}" stroke="black"/>"#,
            m = MARGIN,
            b = h - MARGIN,
            r = w - MARGIN
        )
        .map_err(fmt)?;
        writeln!(
            svg,
            r#"<line x1="{m}" y1="{m}" x2="{m}" y2="{b}" stroke="black"/>"#,
            m = MARGIN,
            b = h - MARGIN
        )
        .map_err(fmt)?;
        writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="middle">Partitions</text>"#,
            w / 2.0,
            h - 10.0
        )
        .map_err(fmt)?;
        writeln!(
            svg,
            r#"<text x="15" y="{y}" transform="rotate(-90 15 {y})" text-anchor="middle">Runtime (seconds)</text>"#,
            y = h / 2.0
        )
        .map_err(fmt)?;

        for (i, size) in table.sizes().into_iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            let points: Vec<String> = table
                .series(size)
                .map(|r| format!("{:.1},{:.1}", px(r.partitions as f64), py(r.runtime_sec)))
                .collect();
            writeln!(
                svg,
                r#"<polyline fill="none" stroke="{color}" points="{}"/>"#,
                points.join(" ")
            )
            .map_err(fmt)?;
            for r in table.series(size) {
                writeln!(
                    svg,
                    r#"<circle cx="{:.1}" cy="{:.1}" r="3" fill="{color}"/>"#,
                    px(r.partitions as f64),
                    py(r.runtime_sec)
                )
                .map_err(fmt)?;
            }
            writeln!(
                svg,
                r#"<text x="{}" y="{}" fill="{color}">{size} rows</text>"#,
                w - MARGIN - 90.0,
                MARGIN + 15.0 * i as f64
            )
            .map_err(fmt)?;
        }
        svg.push_str("</svg>\n");
        Ok(svg)
    }
}

impl Visualizer for SvgPlot {
    fn render(&self, table: &ResultsTable, path: &Path) -> Result<(), BenchError> {
        let svg = self.to_svg(table)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| BenchError::Visualization(e.to_string()))?;
        }
        fs::write(path, svg)
            .map_err(|e| BenchError::Visualization(format!("{}: {e}", path.display())))
    }
}
