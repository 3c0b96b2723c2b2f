//! tdex-format - Re-emit implementor listings in canonical form.

fn main() -> std::process::ExitCode {
    traitdex::cmd::format::main()
}
