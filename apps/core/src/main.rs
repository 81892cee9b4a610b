fn main() {
    let options = match sshrunner_core::runtime::parse_cli_args(std::env::args_os()) {
        Ok(options) => options,
        Err(error) => error.exit(),
    };

    if let Err(error) = sshrunner_core::runtime::run_with_options(options) {
        eprintln!("[sshrunner-core] runtime failed: {error}");
        std::process::exit(1);
    }
}
