// src/bin/cli.rs
fn main() -> color_eyre::Result<()> {
    rink_scrape::cli::run()
}
