//! Binary entrypoint for fontcache-cli (made by FontLab https://www.fontlab.com/)

fn main() {
    if let Err(err) = fontcache_cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
