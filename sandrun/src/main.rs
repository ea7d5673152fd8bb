fn main() {
    if let Err(e) = sandrun::run_cli() {
        eprintln!("{e:?}");
        std::process::exit(1);
    }
}
