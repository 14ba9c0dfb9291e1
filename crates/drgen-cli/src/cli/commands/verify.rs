use crate::cli::args::{VerifyArgs, VerifyFormat};
use crate::exit_codes::{INTEGRITY_FAILED, SUCCESS};
use anyhow::{Context, Result};
use drgen_core::{verify_dir, FileStatus, VerifyReport};

fn print_text(report: &VerifyReport) {
    for r in &report.results {
        match r.status {
            FileStatus::Ok => println!("OK        {}", r.filename),
            FileStatus::Mismatch => println!(
                "MISMATCH  {} (expected {} / {} bytes, got {} / {} bytes)",
                r.filename,
                r.expected_sha256,
                r.expected_size_bytes,
                r.actual_sha256.as_deref().unwrap_or("-"),
                r.actual_size_bytes.map_or_else(|| "-".to_string(), |n| n.to_string()),
            ),
            FileStatus::Error => println!(
                "ERROR     {}: {}",
                r.filename,
                r.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
    if report.ok {
        println!("Verified: {} file(s) OK", report.results.len());
    } else {
        println!(
            "Verification FAILED: {} of {} file(s) did not match {}",
            report.failed().count(),
            report.results.len(),
            report.manifest_path.display()
        );
    }
}

pub fn run(args: VerifyArgs) -> Result<i32> {
    let report = verify_dir(&args.dir)
        .with_context(|| format!("cannot verify {}", args.dir.display()))?;

    match args.format {
        VerifyFormat::Text => print_text(&report),
        VerifyFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(if report.ok { SUCCESS } else { INTEGRITY_FAILED })
}
