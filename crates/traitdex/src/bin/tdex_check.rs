//! tdex-check - Validate implementor listings.
//!
//! Checks the listings under a documentation root and reports diagnostics.

fn main() -> std::process::ExitCode {
    traitdex::cmd::check::main()
}
