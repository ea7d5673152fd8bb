//! `ai-scripts [COUNT]`: generate and sandbox-run COUNT JavaScript programs.

fn main() {
    if let Err(e) = sandrun::run_ai_scripts() {
        eprintln!("{e:?}");
        std::process::exit(1);
    }
}
