use crate::cli::args::TemplateArgs;
use crate::exit_codes::SUCCESS;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// Write the starter `decision.yaml`, creating parent directories.
pub(crate) fn write_template(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    fs::write(path, drgen_core::record::template())
        .with_context(|| format!("failed to write template {}", path.display()))
}

pub fn run(args: TemplateArgs) -> Result<i32> {
    if args.path.exists() && !args.force {
        bail!(
            "file already exists: {} (use --force to overwrite)",
            args.path.display()
        );
    }
    write_template(&args.path)?;
    println!("Created template: {}", args.path.display());
    Ok(SUCCESS)
}
