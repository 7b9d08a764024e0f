mod actions;
mod cli;
mod config;
mod error;
mod gestures;
mod input;
mod logging;
mod path;
mod pipeline;
mod stroke;
mod tracker;

fn main() -> anyhow::Result<()> {
    logging::init();
    cli::run()
}
