use grimoire_census::{CensusReport, CensusStatus};
use std::fmt::Write;

pub fn render_report(report: &CensusReport) -> String {
    let mut out = String::new();
    let width = report
        .category_counts
        .keys()
        .map(String::len)
        .chain(std::iter::once("Category".len()))
        .max()
        .unwrap_or(0);

    let _ = writeln!(out, "{:<width$}  {:>6}", "Category", "Count");
    for (category, count) in &report.category_counts {
        let _ = writeln!(out, "{category:<width$}  {count:>6}");
    }
    let _ = writeln!(
        out,
        "\nIndex version {} written to {} ({} of {} shards)",
        report.format_version,
        report.output_path.display(),
        report.record_count,
        report.files_scanned
    );

    let failed: Vec<_> = report.blocking_faults().collect();
    if !failed.is_empty() {
        let _ = writeln!(out, "\nFailed shards ({}):", failed.len());
        for fault in failed {
            let _ = writeln!(out, "  - {fault}");
        }
    }

    let incomplete: Vec<_> = report.faults.iter().filter(|f| !f.blocks_record()).collect();
    if !incomplete.is_empty() {
        let _ = writeln!(out, "\nIncomplete shards ({}):", incomplete.len());
        for fault in incomplete {
            let _ = writeln!(out, "  - {fault}");
        }
    }
    out
}

pub const fn exit_code(status: CensusStatus) -> i32 {
    match status {
        CensusStatus::Clean | CensusStatus::Partial => 0,
        CensusStatus::AllFaulted => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grimoire_census::ShardFault;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    #[test]
    fn lists_categories_and_faults() {
        let report = CensusReport {
            output_path: PathBuf::from("index.json"),
            format_version: "2.0.0".to_string(),
            files_scanned: 3,
            record_count: 2,
            category_counts: BTreeMap::from([
                ("Backend".to_string(), 1),
                ("Unclassified".to_string(), 1),
            ]),
            faults: vec![
                ShardFault::incomplete("a.scaffold"),
                ShardFault::processing("x.scaffold", "boom"),
            ],
            duration_ms: 4,
        };
        let text = render_report(&report);
        assert!(text.starts_with("Category       Count\n"), "{text}");
        assert!(text.contains("Backend            1\n"), "{text}");
        assert!(text.contains("(2 of 3 shards)"));
        assert!(text.contains("\nFailed shards (1):\n  - x.scaffold: processing failed: boom\n"));
        assert!(text.contains("\nIncomplete shards (1):\n  - a.scaffold: description is missing\n"));
        assert!(text.find("Failed shards").unwrap() < text.find("Incomplete shards").unwrap());
        assert_eq!(exit_code(report.status()), 0);
    }
}
