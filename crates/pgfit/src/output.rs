use clap::ValueEnum;
use colored::Colorize;
use pgfit_core::health::{Flag, IndexHealth};
use serde_json::json;
use tabled::{Table, Tabled, settings::Style};

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Markdown,
}

#[derive(Tabled)]
pub struct IndexRow {
    #[tabled(rename = "Schema")]
    pub schema: String,
    #[tabled(rename = "Table")]
    pub table: String,
    #[tabled(rename = "Index")]
    pub index: String,
    #[tabled(rename = "Scans")]
    pub scans: String,
    #[tabled(rename = "Tup. Read")]
    pub tuples_read: String,
    #[tabled(rename = "Size (MiB)")]
    pub size_mib: String,
    #[tabled(rename = "Flags")]
    pub flags: String,
}

impl From<&IndexHealth> for IndexRow {
    fn from(health: &IndexHealth) -> Self {
        let flags = if health.flags.is_empty() {
            "-".to_string()
        } else {
            health
                .flags
                .iter()
                .map(|f| f.token())
                .collect::<Vec<_>>()
                .join(" ")
        };

        Self {
            schema: health.descriptor.schema.clone(),
            table: health.descriptor.table.clone(),
            index: health.descriptor.index.clone(),
            scans: health.descriptor.scans.to_string(),
            tuples_read: health.descriptor.tuples_read.to_string(),
            size_mib: format!("{:.1}", health.descriptor.size_mib()),
            flags,
        }
    }
}

pub fn print_report(prefix: &str, report: &[IndexHealth], format: &OutputFormat) {
    match format {
        OutputFormat::Table => print_report_table(prefix, report),
        OutputFormat::Json => print_report_json(prefix, report),
        OutputFormat::Markdown => print_report_markdown(prefix, report),
    }
}

fn unused_count(report: &[IndexHealth]) -> usize {
    report.iter().filter(|h| h.has(Flag::Unused)).count()
}

fn covered_count(report: &[IndexHealth]) -> usize {
    report
        .iter()
        .filter(|h| h.has(Flag::DuplicateOrCovered))
        .count()
}

fn print_report_json(prefix: &str, report: &[IndexHealth]) {
    let output = json!({
        "prefix": prefix,
        "indexes": report,
        "summary": {
            "total": report.len(),
            "unused": unused_count(report),
            "duplicate_or_covered": covered_count(report),
        }
    });
    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}

fn print_report_markdown(prefix: &str, report: &[IndexHealth]) {
    println!("# Index Report (prefix `{}`)\n", prefix);

    if report.is_empty() {
        println!("**No indexes found for this prefix.**\n");
        return;
    }

    println!("| Schema | Table | Index | Scans | Tup. Read | Size (MiB) | Flags |");
    println!("|--------|-------|-------|-------|-----------|------------|-------|");
    for health in report {
        let row = IndexRow::from(health);
        println!(
            "| {} | {} | {} | {} | {} | {} | {} |",
            row.schema, row.table, row.index, row.scans, row.tuples_read, row.size_mib, row.flags
        );
    }

    println!(
        "\nFound {} index(es): {} unused, {} duplicate/covered\n",
        report.len(),
        unused_count(report),
        covered_count(report)
    );
}

fn print_report_table(prefix: &str, report: &[IndexHealth]) {
    if report.is_empty() {
        println!("{}", "No indexes found for this prefix.".yellow());
        println!("Run `pgfit seed` to create the demo schema first.\n");
        return;
    }

    let rows: Vec<IndexRow> = report.iter().map(|h| h.into()).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());

    println!(
        "\n{} {}\n",
        "Index usage for prefix".bold().green(),
        prefix.bold()
    );
    println!("{}", table);

    let unused = unused_count(report);
    let covered = covered_count(report);

    println!("\n{}", "Summary:".bold());
    println!("  Total indexes: {}", report.len());
    if unused > 0 {
        println!("  Unused: {}", unused.to_string().red());
    }
    if covered > 0 {
        println!("  Duplicate/covered: {}", covered.to_string().yellow());
    }
    if unused == 0 && covered == 0 {
        println!("  {}", "Nothing flagged.".green().bold());
    }

    println!(
        "\n{} Scan counts accumulate since the last statistics reset. Run `pgfit reset-stats`,",
        "Tip:".bold()
    );
    println!("generate a fresh load, then report again before dropping anything.\n");
}
