//! Portal content store CLI.

mod cli;

fn main() -> eyre::Result<()> {
    cli::run()
}
