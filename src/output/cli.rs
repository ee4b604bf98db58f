use crate::model::{AnalyzeResult, RemotesResult};
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct MismatchRow {
    #[tabled(rename = "Lock File")]
    lock_file: String,
    #[tabled(rename = "Remote")]
    remote: String,
    #[tabled(rename = "Dependency")]
    dependency: String,
}

#[derive(Tabled)]
struct RemoteRow {
    #[tabled(rename = "Remote")]
    url: String,
}

pub fn print_analyze_table(result: &AnalyzeResult) -> Result<()> {
    println!();
    println!(
        "Scan completed at: {}",
        result.scan_time.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("Registry: {}", result.registry);
    println!();

    if !result.has_mismatches() {
        println!("No dependency mismatches found.");
    } else {
        println!(
            "Found {} dependency mismatches in {} lock files:",
            result.mismatch_count(),
            result.files.len()
        );
        println!();

        let rows: Vec<MismatchRow> = result
            .files
            .iter()
            .flat_map(|file| {
                let lock_file = truncate(&file.lock_file.display().to_string(), 50);
                file.mismatches.iter().flat_map(move |(remote, names)| {
                    let lock_file = lock_file.clone();
                    names.iter().map(move |name| MismatchRow {
                        lock_file: lock_file.clone(),
                        remote: truncate(remote, 60),
                        dependency: name.clone(),
                    })
                })
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{}", table);

        println!();
        for file in &result.files {
            if let Some(path) = &file.report_path {
                println!("Report written to: {}", path.display());
            }
        }
    }

    println!();
    print_summary(result.files_scanned, result.files_skipped);

    Ok(())
}

pub fn print_remotes_table(result: &RemotesResult) -> Result<()> {
    println!();
    println!(
        "Scan completed at: {}",
        result.scan_time.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    if result.remotes.is_empty() {
        println!("No remotes found.");
    } else {
        println!("Found {} remotes:", result.remotes.len());
        println!();

        let rows: Vec<RemoteRow> = result
            .remotes
            .iter()
            .map(|url| RemoteRow { url: url.clone() })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{}", table);
    }

    if let Some(path) = &result.report_path {
        println!();
        println!("Report written to: {}", path.display());
    }

    println!();
    print_summary(result.files_scanned, result.files_skipped);

    Ok(())
}

fn print_summary(scanned: usize, skipped: usize) {
    println!("Summary:");
    if skipped > 0 {
        println!("  Lock files: {} ({} skipped)", scanned + skipped, skipped);
    } else {
        println!("  Lock files: {}", scanned);
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}
