//! Shell completion generation shared by all binaries.

use clap::{CommandFactory, ValueEnum};
use clap_complete::Shell;
use std::io;

/// Shells we can generate completions for.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ShellType {
    /// Bourne Again Shell
    Bash,
    /// Elvish
    Elvish,
    /// Friendly Interactive Shell
    Fish,
    /// PowerShell
    Powershell,
    /// Z Shell
    Zsh,
}

impl From<ShellType> for Shell {
    fn from(shell: ShellType) -> Self {
        match shell {
            ShellType::Bash => Self::Bash,
            ShellType::Elvish => Self::Elvish,
            ShellType::Fish => Self::Fish,
            ShellType::Powershell => Self::PowerShell,
            ShellType::Zsh => Self::Zsh,
        }
    }
}

/// Write a completion script for the given command to stdout.
pub fn generate_completions<C: CommandFactory>(shell: ShellType, bin_name: &str) {
    let mut command = C::command();
    clap_complete::generate(
        Shell::from(shell),
        &mut command,
        bin_name,
        &mut io::stdout(),
    );
}
