use orderbench::errors::BenchError;
use orderbench::harness::BenchmarkResult;
use orderbench::report::{
    ResultRow, ResultsTable, SvgPlot, Visualizer, aggregate, persist, visualize,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn sample_results() -> Vec<BenchmarkResult> {
    vec![
        BenchmarkResult { rows: 200, partitions: 10, runtime_sec: 1.23456 },
        BenchmarkResult { rows: 200, partitions: 50, runtime_sec: 0.004 },
        BenchmarkResult { rows: 100, partitions: 10, runtime_sec: 2.5 },
    ]
}

struct Broken;
impl Visualizer for Broken {
    fn render(&self, _table: &ResultsTable, _path: &Path) -> Result<(), BenchError> {
        Err(BenchError::Visualization("no backend".into()))
    }
}

struct Exploding;
impl Visualizer for Exploding {
    fn render(&self, _table: &ResultsTable, _path: &Path) -> Result<(), BenchError> {
        panic!("renderer blew up");
    }
}

#[test]
fn test_aggregate_rounds_and_keeps_order() {
    let table = aggregate(&sample_results());
    assert_eq!(
        table.rows,
        vec![
            ResultRow { rows: 200, partitions: 10, runtime_sec: 1.23 },
            ResultRow { rows: 200, partitions: 50, runtime_sec: 0.0 },
            ResultRow { rows: 100, partitions: 10, runtime_sec: 2.5 },
        ]
    );
    assert_eq!(table.sizes(), vec![200, 100]);
    assert_eq!(table.series(200).count(), 2);
}

#[test]
fn test_persist_writes_header_and_rows() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("output").join("scalability_results.csv");
    persist(&aggregate(&sample_results()), &out).unwrap();
    let s = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = s.lines().collect();
    assert_eq!(
        lines,
        vec!["rows,partitions,runtime_sec", "200,10,1.23", "200,50,0.0", "100,10,2.5"]
    );
}

#[test]
fn test_persist_replaces_existing_file() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("results.csv");
    fs::write(&out, "old\nold\nold\nold\nold\n").unwrap();
    persist(&aggregate(&sample_results()[..1]), &out).unwrap();
    assert_eq!(fs::read_to_string(&out).unwrap().lines().count(), 2);
    // no temp files left next to it
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_persist_empty_table_has_header_only() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("results.csv");
    persist(&ResultsTable::default(), &out).unwrap();
    assert_eq!(fs::read_to_string(&out).unwrap(), "rows,partitions,runtime_sec\n");
}

#[test]
fn test_visualize_without_visualizer_is_noop() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("plot.svg");
    assert!(!visualize(&aggregate(&sample_results()), &out, None));
    assert!(!out.exists());
}

#[test]
fn test_visualize_swallows_render_errors() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("plot.svg");
    let table = aggregate(&sample_results());
    assert!(!visualize(&table, &out, Some(&Broken as &dyn Visualizer)));
    let svg = SvgPlot::default();
    assert!(!visualize(&ResultsTable::default(), &out, Some(&svg as &dyn Visualizer)));
    assert!(!out.exists());
}

#[test]
fn test_visualize_swallows_render_panics() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("plot.svg");
    let table = aggregate(&sample_results());
    assert!(!visualize(&table, &out, Some(&Exploding as &dyn Visualizer)));
    assert!(!out.exists());
    // a later render still works
    let svg = SvgPlot::default();
    assert!(visualize(&table, &out, Some(&svg as &dyn Visualizer)));
}

#[test]
fn test_svg_title_is_escaped() {
    let plot = SvgPlot {
        title: "p<10 & p>1".to_string(),
        ..SvgPlot::default()
    };
    let svg = plot.to_svg(&aggregate(&sample_results())).unwrap();
    assert!(svg.contains("p&lt;10 &amp; p&gt;1"));
    assert!(!svg.contains("p<10"));
}

#[test]
fn test_svg_plot_has_one_series_per_size() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("plots").join("plot.svg");
    let svg = SvgPlot::default();
    assert!(visualize(&aggregate(&sample_results()), &out, Some(&svg as &dyn Visualizer)));
    let svg = fs::read_to_string(&out).unwrap();
    assert!(svg.starts_with("<svg"));
    assert_eq!(svg.matches("<polyline").count(), 2);
    assert_eq!(svg.matches("<circle").count(), 3);
    assert!(svg.contains("200 rows") && svg.contains("100 rows"));
}
