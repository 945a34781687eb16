use orbview::ViewerConfig;

fn main() {
    env_logger::init();

    // No CLI arguments are consumed; model and shader paths are fixed.
    if let Err(err) = orbview::run(ViewerConfig::new()) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
