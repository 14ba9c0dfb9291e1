use crate::cli::args::GenerateArgs;
use crate::exit_codes::SUCCESS;
use anyhow::{Context, Result};
use drgen_core::{
    decision_folder_name, find_available_dir, generate_decision_record_files, DecisionRecord,
};
use std::path::Path;

fn warn_missing_core_fields(record: &DecisionRecord, input: &Path) {
    let missing = record.missing_core_fields();
    if missing.is_empty() {
        return;
    }
    eprintln!("Warning: {} is missing: {}.", input.display(), missing.join(", "));
    eprintln!(
        "Tip: Decision records are much more useful when you write the reason (why) and the rule (rule)."
    );
    eprintln!("Open the file and add, for example:");
    if missing.contains(&"why") {
        eprintln!("  why: \"<reason / goal>\"");
    }
    if missing.contains(&"rule") {
        eprintln!("  rule: \"<rule everyone should follow>\"");
    }
}

pub fn run(args: GenerateArgs) -> Result<i32> {
    if !args.input.exists() {
        super::template::write_template(&args.input)?;
        println!("Created template: {}", args.input.display());
        println!("Next steps:");
        println!("1) Open the file and fill in at least the title");
        println!("2) Run: drgen generate {}", args.input.display());
        return Ok(SUCCESS);
    }

    if args.signature {
        eprintln!("Warning: --signature is not implemented yet (ignored).");
    }

    let record = DecisionRecord::from_yaml_file(&args.input)
        .with_context(|| format!("invalid decision file {}", args.input.display()))?;
    warn_missing_core_fields(&record, &args.input);
    if record.rule_restates_title() {
        eprintln!("Warning: the rule only restates the title; describe what everyone should do.");
    }

    let out_dir = find_available_dir(&args.out_dir, &decision_folder_name(&record))?;
    let report = generate_decision_record_files(&record, &out_dir)
        .with_context(|| format!("failed to generate {}", out_dir.display()))?;
    for leftover in &report.leftover_artifacts {
        eprintln!("Warning: could not remove {}", leftover.display());
    }

    println!("Generated: {}", out_dir.display());
    Ok(SUCCESS)
}
