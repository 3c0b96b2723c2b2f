//! tdex-merge - Merge the listing sets of several documentation roots.

fn main() -> std::process::ExitCode {
    traitdex::cmd::merge::main()
}
