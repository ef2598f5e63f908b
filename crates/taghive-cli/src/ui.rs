use console::{measure_text_width, pad_str, style, Alignment, Emoji, Term};
use taghive_core::{BatchReport, Taxonomy};
use taghive_schema::HistoryEntry;

pub static CHECKMARK: Emoji<'_, '_> = Emoji("✅ ", "√ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "x ");
pub static WARNING: Emoji<'_, '_> = Emoji("❗ ", "! ");
pub static PIN: Emoji<'_, '_> = Emoji("📌 ", "");
pub static SCROLL: Emoji<'_, '_> = Emoji("📜 ", "");

const HEADERS: [&str; 4] = ["Message", "Category", "Intent", "Sentiment"];

fn cells(entry: &HistoryEntry) -> [String; 4] {
    [
        entry.message.replace('\n', " "),
        entry.category.clone(),
        entry.intent.to_string(),
        entry.sentiment.to_string(),
    ]
}

/// Render rows as a plain-text table with padded columns.
pub fn render_table(rows: &[HistoryEntry]) -> String {
    let body: Vec<[String; 4]> = rows.iter().map(cells).collect();

    let mut widths = HEADERS.map(measure_text_width);
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(measure_text_width(cell));
        }
    }

    let line = |values: [&str; 4]| -> String {
        values
            .iter()
            .zip(widths)
            .map(|(value, width)| pad_str(value, width, Alignment::Left, None).into_owned())
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(body.len() + 2);
    out.push(line(HEADERS));
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &body {
        out.push(line([
            row[0].as_str(),
            row[1].as_str(),
            row[2].as_str(),
            row[3].as_str(),
        ]));
    }
    out.join("\n")
}

pub fn print_report(term: &Term, report: &BatchReport) {
    for failure in &report.failures {
        let _ = term.write_line(&format!(
            "{}{}",
            CROSS,
            style(format!(
                "line {} ({}): {}",
                failure.line,
                failure_kind_label(failure),
                failure.error
            ))
            .red()
        ));
    }
    if !report.rows.is_empty() {
        let _ = term.write_line(&format!("{}", style("Results").bold().cyan()));
        let _ = term.write_line(&render_table(&report.rows));
    }
    let _ = term.write_line(&format!(
        "{}{}",
        CHECKMARK,
        style(format!(
            "{} classified, {} failed, {} calls",
            report.rows.len(),
            report.failures.len(),
            report.calls
        ))
        .green()
    ));
}

fn failure_kind_label(failure: &taghive_core::LineFailure) -> &'static str {
    match failure.kind {
        taghive_core::FailureKind::InputEmpty => "empty input",
        taghive_core::FailureKind::Schema => "invalid reply",
        taghive_core::FailureKind::Service => "service error",
    }
}

pub fn print_warning(term: &Term, msg: &str) {
    let _ = term.write_line(&format!("{}{}", WARNING, style(msg).yellow()));
}

pub fn print_history(term: &Term, rows: &[HistoryEntry]) {
    let _ = term.write_line(&format!("{}{}", SCROLL, style("History").bold().cyan()));
    if rows.is_empty() {
        let _ = term.write_line("   nothing analyzed yet");
    } else {
        let _ = term.write_line(&render_table(rows));
    }
}

pub fn print_taxonomy(term: &Term, preset: &str, taxonomy: &Taxonomy) {
    let _ = term.write_line(&format!(
        "{}{} {}",
        PIN,
        style("Categories").bold().cyan(),
        style(format!("({preset})")).dim()
    ));
    for entry in taxonomy.iter() {
        let _ = term.write_line(&format!(
            "   - {}: {}",
            style(&entry.label).bold(),
            entry.description
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taghive_schema::{ClassificationResult, Intent, Sentiment};

    fn entry(message: &str, category: &str) -> HistoryEntry {
        HistoryEntry::new(
            message.to_string(),
            ClassificationResult {
                category: category.to_string(),
                intent: Intent::Inquiry,
                sentiment: Sentiment::Neutral,
            },
        )
    }

    #[test]
    fn table_has_header_rule_and_rows() {
        let table = render_table(&[entry("hello", "Other"), entry("a longer message", "Fares")]);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Message"));
        assert!(lines[1].chars().all(|c| c == '-' || c == '+'));
        assert!(lines[2].starts_with("hello "));
        assert!(lines[3].contains("Fares"));
        assert!(lines[3].ends_with("Neutral"));
    }

    #[test]
    fn columns_line_up() {
        let table = render_table(&[entry("a", "Other"), entry("abcdefghijklmnop", "Other")]);
        let lines: Vec<_> = table.lines().collect();
        let first_bar = |line: &str| line.find('|').unwrap();
        assert_eq!(first_bar(lines[0]), first_bar(lines[2]));
        assert_eq!(first_bar(lines[2]), first_bar(lines[3]));
    }

    #[test]
    fn multiline_message_is_flattened() {
        let table = render_table(&[entry("one\ntwo", "Other")]);
        assert_eq!(table.lines().count(), 3);
        assert!(table.contains("one two"));
    }

    #[test]
    fn empty_table_is_just_the_header() {
        assert_eq!(render_table(&[]).lines().count(), 2);
    }
}
