use std::process::ExitCode;

fn main() -> ExitCode {
    ozunlu_cli::run()
}
