use color_eyre::Result;
use log::info;

use grid_snake::config::{self, Config};
use grid_snake::presenter::Presenter;

fn main() -> Result<()> {
    color_eyre::install()?;
    pretty_env_logger::init();

    let path = std::env::args().nth(1).unwrap_or_else(|| config::DEFAULT_PATH.to_owned());
    let config = Config::load(&path)?;

    #[cfg(debug_assertions)]
    info!("running in debug mode");

    let mut presenter = Presenter::new(config)?;
    presenter.run()
}
