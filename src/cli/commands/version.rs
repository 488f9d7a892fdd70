//! Version command implementation

use crate::cli::Output;
use anyhow::Result;

/// Execute the version command
pub fn execute(output: &Output) -> Result<()> {
    let version = crate::VERSION;
    let name = crate::PKG_NAME;
    let description = env!("CARGO_PKG_DESCRIPTION");

    // Printed even with --quiet
    println!("{} {}", name, version);

    output.header("Build Information");
    output.table_row("Description", description);
    output.table_row("Target", std::env::consts::ARCH);
    output.table_row(
        "Profile",
        if cfg!(debug_assertions) { "debug" } else { "release" },
    );

    Ok(())
}
