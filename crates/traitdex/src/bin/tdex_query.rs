//! tdex-query - Cross-reference queries over implementor listings.

fn main() -> std::process::ExitCode {
    traitdex::cmd::query_cmd::main()
}
