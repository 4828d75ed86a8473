//! Renders `diskcopy.1` and one page per subcommand (`diskcopy-copy.1`)
//! into `OUT_DIR` from the clap definitions.

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_mangen::Man;

#[path = "src/cli/mod.rs"]
mod cli;

use cli::Cli;

fn render(command: clap::Command, out_dir: &Path, file_name: &str) -> std::io::Result<()> {
    let mut page = Vec::new();
    Man::new(command).render(&mut page)?;
    fs::write(out_dir.join(file_name), page)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = std::io::stdout();
    writeln!(stdout, "cargo:rerun-if-changed=build.rs")?;
    writeln!(stdout, "cargo:rerun-if-changed=src/cli/mod.rs")?;

    let out_dir = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or("OUT_DIR was not set")?;

    let root = Cli::command();
    for sub in root.get_subcommands() {
        let page_name = format!("{}-{}", root.get_name(), sub.get_name());
        render(
            sub.clone().name(page_name.clone()),
            &out_dir,
            &format!("{page_name}.1"),
        )?;
    }
    render(root, &out_dir, "diskcopy.1")?;

    Ok(())
}
