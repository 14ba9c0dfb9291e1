use super::args::*;

pub mod generate;
pub mod list;
pub mod template;
pub mod verify;

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Generate(args) => generate::run(args),
        Command::Template(args) => template::run(args),
        Command::Verify(args) => verify::run(args),
        Command::List(args) => list::run(args),
    }
}
