//! Report writers.

use super::{OutputFormat, Report};
use crate::core::Point;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// Flat CSV row for a single point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvRecord {
    pub timestamp: String,
    pub value: f64,
    pub has_anomaly: bool,
    pub expected_value: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub score: f64,
    pub is_anomaly: bool,
}

impl From<&Point> for CsvRecord {
    fn from(point: &Point) -> Self {
        Self {
            timestamp: point.timestamp.to_rfc3339(),
            value: point.value,
            has_anomaly: point.has_anomaly,
            expected_value: point.result.expected_value,
            lower_bound: point.result.lower_bound(),
            upper_bound: point.result.upper_bound(),
            score: point.result.score,
            is_anomaly: point.result.is_anomaly,
        }
    }
}

/// Write one CSV row per point, with a header.
pub fn write_csv<W: Write>(points: &[Point], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for point in points {
        writer.serialize(CsvRecord::from(point))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the full report as pretty-printed JSON.
pub fn write_json<W: Write>(report: &Report, mut out: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, report)?;
    writeln!(out)?;
    Ok(())
}

/// Write a human-readable summary of the run.
pub fn write_summary<W: Write>(report: &Report, mut out: W) -> Result<()> {
    writeln!(out, "Detector:   {}", report.detector)?;
    writeln!(out, "Stream:     {} + {}", report.generator, report.injector)?;
    writeln!(
        out,
        "Samples:    {} ({:.1} hours simulated)",
        report.steps, report.elapsed_hours
    )?;

    let Some(m) = &report.metrics else {
        writeln!(out, "No points were generated.")?;
        return Ok(());
    };

    writeln!(out)?;
    writeln!(out, "Injected samples: {:>8}", m.injected())?;
    writeln!(out, "Flagged samples:  {:>8}", m.flagged())?;
    writeln!(
        out,
        "TP / FP / FN / TN: {} / {} / {} / {}",
        m.true_positives, m.false_positives, m.false_negatives, m.true_negatives
    )?;
    writeln!(out, "Precision:  {:.3}", m.precision())?;
    writeln!(out, "Recall:     {:.3}", m.recall())?;
    writeln!(out, "F1:         {:.3}", m.f1())?;
    writeln!(out, "Accuracy:   {:.3}", m.accuracy())?;
    writeln!(
        out,
        "Events:     {} of {} detected ({:.1}%)",
        m.events_detected,
        m.events,
        100.0 * m.event_recall()
    )?;
    writeln!(out, "Prediction MAE: {:.4}  RMSE: {:.4}", m.mae, m.rmse)?;
    Ok(())
}

/// Write `report` in the requested format.
pub fn write_report<W: Write>(format: OutputFormat, report: &Report, out: W) -> Result<()> {
    match format {
        OutputFormat::Csv => write_csv(&report.points, out),
        OutputFormat::Json => write_json(report, out),
        OutputFormat::Summary => write_summary(report, out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DetectionResult;
    use crate::utils::DetectionMetrics;
    use chrono::{Duration, TimeZone, Utc};

    fn sample_report() -> Report {
        let base = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        let points = vec![
            Point::new(base, 2.0, false, DetectionResult::new(2.0, 0.3, 0.0, false)),
            Point::new(
                base + Duration::hours(2),
                4.5,
                true,
                DetectionResult::new(2.1, 0.3, 8.0, true),
            ),
        ];
        Report {
            detector: "PEWMA".to_string(),
            generator: "Sinusoidal".to_string(),
            injector: "RandomizedSpike".to_string(),
            steps: 2,
            elapsed_hours: 4.0,
            metrics: DetectionMetrics::from_points(&points).ok(),
            points,
        }
    }

    fn render(format: OutputFormat, report: &Report) -> String {
        let mut buf = Vec::new();
        write_report(format, report, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn csv_has_header_and_rows() {
        let text = render(OutputFormat::Csv, &sample_report());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "timestamp,value,has_anomaly,expected_value,lower_bound,upper_bound,score,is_anomaly"
        );
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("2001-01-01T02:00:00+00:00,4.5,true,"));
        assert!(lines[2].ends_with(",8.0,true"));
    }

    #[test]
    fn json_contains_metrics_and_points() {
        let text = render(OutputFormat::Json, &sample_report());
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["detector"], "PEWMA");
        assert_eq!(value["points"].as_array().unwrap().len(), 2);
        assert_eq!(value["metrics"]["true_positives"], 1);
        assert_eq!(value["points"][1]["result"]["is_anomaly"], true);
    }

    #[test]
    fn summary_lists_metrics() {
        let text = render(OutputFormat::Summary, &sample_report());
        assert!(text.contains("Detector:   PEWMA"));
        assert!(text.contains("Precision:  1.000"));
        assert!(text.contains("Events:     1 of 1 detected (100.0%)"));
    }

    #[test]
    fn summary_of_empty_run() {
        let mut report = sample_report();
        report.points.clear();
        report.metrics = None;
        let text = render(OutputFormat::Summary, &report);
        assert!(text.contains("No points were generated."));
    }
}
