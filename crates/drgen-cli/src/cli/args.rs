use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "drgen",
    version,
    about = "Generate tamper-evident decision records from decision.yaml"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate decision record outputs from a decision.yaml file
    Generate(GenerateArgs),
    /// Write a starter decision.yaml
    Template(TemplateArgs),
    /// Check generated files against their manifest.json
    Verify(VerifyArgs),
    /// List generated decisions as a markdown report
    List(ListArgs),
}

#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    /// Path to decision.yaml (a template is written there if it does not exist)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Base output directory (created if missing)
    #[arg(short = 'o', long, env = "DRGEN_OUT_DIR", default_value = "out")]
    pub out_dir: PathBuf,

    /// Reserved for cryptographic signatures (no effect)
    #[arg(long)]
    pub signature: bool,
}

#[derive(Debug, Args, Clone)]
pub struct TemplateArgs {
    /// Where to write the template
    #[arg(value_name = "PATH", default_value = "decision.yaml")]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args, Clone)]
pub struct VerifyArgs {
    /// Generated decision directory
    #[arg(value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    #[arg(long, value_enum, default_value_t = VerifyFormat::Text)]
    pub format: VerifyFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VerifyFormat {
    /// One line per file
    Text,
    /// Full report as JSON
    Json,
}

#[derive(Debug, Args, Clone)]
pub struct ListArgs {
    /// Base output directory holding decision folders
    #[arg(short = 'o', long, env = "DRGEN_OUT_DIR", default_value = "out")]
    pub out_dir: PathBuf,

    /// Only decisions dated on or after this day (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Only decisions dated on or before this day (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Clip the decision excerpt to this many characters
    #[arg(long, default_value_t = drgen_core::list::DEFAULT_MAX_DECISION_LEN)]
    pub max_decision_len: usize,

    /// Verify each folder and include its integrity status
    #[arg(long)]
    pub verify: bool,
}
