//! Output formatting

use sqladvisor_core::{Advice, Report, Status};

use crate::args::OutputFormat;

/// Output formatter for review reports
pub struct OutputFormatter {
    format: OutputFormat,
    file_name: String,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, file_name: String) -> Self {
        Self { format, file_name }
    }

    /// Print a report in the configured format
    pub fn print_report(&self, report: &Report, source: &str) {
        match self.format {
            OutputFormat::Human => self.print_human(report, source),
            OutputFormat::Json => self.print_json(report),
            OutputFormat::Sarif => self.print_sarif(&report.advice),
        }
    }

    fn print_human(&self, report: &Report, source: &str) {
        for advice in report.advice.iter().filter(|a| !a.is_ok()) {
            let status_str = match advice.status {
                Status::Error => "\x1b[31merror\x1b[0m",
                Status::Warning => "\x1b[33mwarning\x1b[0m",
                Status::Success => "\x1b[32mok\x1b[0m",
            };

            eprintln!(
                "{}[{}]: {}",
                status_str,
                advice.code.value(),
                if advice.content.is_empty() {
                    &advice.title
                } else {
                    &advice.content
                }
            );

            if advice.line > 0 {
                eprintln!("  --> {}:{}", self.file_name, advice.line);
                if let Some(source_line) = get_source_line(source, advice.line) {
                    eprintln!("   |");
                    eprintln!("{:>3} | {}", advice.line, source_line);
                }
            } else {
                eprintln!("  --> {}", self.file_name);
            }

            eprintln!("   = rule: {}", advice.title);
            eprintln!();
        }

        for rule in &report.unsupported {
            eprintln!(
                "\x1b[34mnote\x1b[0m: rule '{}' is not available for {}, skipped",
                rule.rule_type, rule.engine
            );
        }
    }

    fn print_json(&self, report: &Report) {
        let output = serde_json::json!({
            "file": self.file_name,
            "advice": report.advice,
            "unsupported": report.unsupported,
        });
        println!("{:#}", output);
    }

    fn print_sarif(&self, advice: &[Advice]) {
        let results: Vec<serde_json::Value> = advice
            .iter()
            .filter(|a| !a.is_ok())
            .map(|a| {
                let mut location = serde_json::json!({
                    "artifactLocation": {
                        "uri": self.file_name
                    }
                });
                if a.line > 0 {
                    location["region"] = serde_json::json!({ "startLine": a.line });
                }
                serde_json::json!({
                    "ruleId": a.code.value().to_string(),
                    "level": match a.status {
                        Status::Error => "error",
                        Status::Warning => "warning",
                        Status::Success => "none",
                    },
                    "message": {
                        "text": a.content
                    },
                    "properties": {
                        "title": a.title
                    },
                    "locations": [{
                        "physicalLocation": location
                    }]
                })
            })
            .collect();

        let sarif = serde_json::json!({
            "$schema": "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json",
            "version": "2.1.0",
            "runs": [{
                "tool": {
                    "driver": {
                        "name": "sqladvisor",
                        "version": env!("CARGO_PKG_VERSION")
                    }
                },
                "results": results
            }]
        });

        println!("{:#}", sarif);
    }
}

/// Get a specific line from source (1-indexed)
fn get_source_line(source: &str, line: usize) -> Option<&str> {
    source.lines().nth(line.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_source_line() {
        let source = "SELECT 1;\nCREATE TABLE t (id INT);\n";
        assert_eq!(get_source_line(source, 2), Some("CREATE TABLE t (id INT);"));
        assert_eq!(get_source_line(source, 5), None);
    }
}
