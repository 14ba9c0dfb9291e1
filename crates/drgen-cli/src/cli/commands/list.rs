use crate::cli::args::ListArgs;
use crate::exit_codes::SUCCESS;
use anyhow::{Context, Result};
use drgen_core::{list_decisions, render_list_report, ListOptions, ReportOptions};

pub fn run(args: ListArgs) -> Result<i32> {
    let items = list_decisions(&ListOptions {
        out_dir: args.out_dir.clone(),
        from: args.from.clone(),
        to: args.to.clone(),
        verify: args.verify,
    })
    .with_context(|| format!("cannot list {}", args.out_dir.display()))?;

    let mut opts = ReportOptions::new(args.out_dir.display().to_string(), chrono::Utc::now());
    opts.from = args.from;
    opts.to = args.to;
    opts.max_decision_len = args.max_decision_len;
    print!("{}", render_list_report(&items, &opts));
    Ok(SUCCESS)
}
