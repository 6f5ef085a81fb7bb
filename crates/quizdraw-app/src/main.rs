//! Main application entry point (native).

#[cfg(feature = "native")]
fn main() {
    use clap::Parser;

    env_logger::init();
    let cli = quizdraw_app::cli::Cli::parse();
    log::info!("Starting QuizDraw");

    if let Err(e) = quizdraw_app::cli::run(cli) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
