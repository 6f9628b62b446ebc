use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_humanize::HumanTime;
use passtally::Report;

fn format_relative_time(time: DateTime<Utc>) -> String {
    HumanTime::from(time).to_string()
}

fn write_url_section<W: Write>(heading: &str, urls: &[String], writer: &mut W) -> Result<()> {
    writeln!(writer, "{} ({})", heading, urls.len())?;
    if urls.is_empty() {
        writeln!(writer, "  (none)")?;
    } else {
        for url in urls {
            writeln!(writer, "  {url}")?;
        }
    }
    Ok(())
}

fn display_report_full<W: Write>(report: &Report, writer: &mut W) -> Result<()> {
    for section in &report.per_reviewer {
        writeln!(writer, "Approved by {} ({})", section.reviewer, section.count)?;
        if section.issues.is_empty() {
            writeln!(writer, "  (none)")?;
        } else {
            for issue in &section.issues {
                writeln!(
                    writer,
                    "  {}  updated {} ({})",
                    issue.url,
                    issue.updated_at.format("%Y-%m-%d"),
                    format_relative_time(issue.updated_at)
                )?;
            }
        }
        writeln!(writer)?;
    }

    write_url_section("Approved by none", &report.approved_by_none, writer)?;
    writeln!(writer)?;
    write_url_section("Approved by all", &report.approved_by_all, writer)?;

    Ok(())
}

fn display_report_quiet<W: Write>(report: &Report, writer: &mut W) -> Result<()> {
    for section in &report.per_reviewer {
        writeln!(writer, "{}: {}", section.reviewer, section.count)?;
    }
    writeln!(writer, "none: {}", report.approved_by_none.len())?;
    writeln!(writer, "all: {}", report.approved_by_all.len())?;
    Ok(())
}

/// Renders the report, full listings or counts only.
pub fn display_report<W: Write>(report: &Report, quiet: bool, writer: &mut W) -> Result<()> {
    if quiet {
        display_report_quiet(report, writer)
    } else {
        display_report_full(report, writer)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use passtally::{IssueLink, ReviewerReport};

    use super::*;

    fn sample_report() -> Report {
        let updated = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        Report {
            per_reviewer: vec![
                ReviewerReport {
                    reviewer: "alexis".to_string(),
                    count: 2,
                    issues: vec![
                        IssueLink {
                            url: "https://github.com/o/r/issues/1".to_string(),
                            updated_at: updated,
                        },
                        IssueLink {
                            url: "https://github.com/o/r/issues/2".to_string(),
                            updated_at: updated,
                        },
                    ],
                },
                ReviewerReport {
                    reviewer: "artem".to_string(),
                    count: 0,
                    issues: vec![],
                },
            ],
            approved_by_none: vec!["https://github.com/o/r/issues/4".to_string()],
            approved_by_all: vec![],
        }
    }

    #[test]
    fn full_output_lists_sections_in_order() {
        let mut output = Vec::new();
        display_report(&sample_report(), false, &mut output).unwrap();
        let result = String::from_utf8(output).unwrap();

        assert!(result.contains("Approved by alexis (2)"));
        assert!(result.contains("  https://github.com/o/r/issues/1  updated 2024-03-20"));
        assert!(result.contains("Approved by artem (0)"));
        assert!(result.contains("  (none)"));
        assert!(result.contains("Approved by none (1)"));
        assert!(result.contains("Approved by all (0)"));

        let alexis = result.find("Approved by alexis").unwrap();
        let artem = result.find("Approved by artem").unwrap();
        let none = result.find("Approved by none").unwrap();
        let all = result.find("Approved by all (").unwrap();
        assert!(alexis < artem && artem < none && none < all);
    }

    #[test]
    fn quiet_output_is_counts_only() {
        let mut output = Vec::new();
        display_report(&sample_report(), true, &mut output).unwrap();
        let result = String::from_utf8(output).unwrap();

        assert_eq!(result, "alexis: 2\nartem: 0\nnone: 1\nall: 0\n");
    }
}
