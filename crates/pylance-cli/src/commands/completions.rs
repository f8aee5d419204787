//! Shell completion generation command.

use clap::Command;
use clap_complete::{Shell, generate};
use std::io;

/// Prints the completion script for `shell` to stdout.
pub fn run(shell: Shell, cmd: &mut Command) {
    tracing::info!("generating {shell} completions");
    generate(shell, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_without_panic_for_common_shells() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
            let mut cmd = Command::new("pylance-cli");
            run(shell, &mut cmd);
        }
    }
}
