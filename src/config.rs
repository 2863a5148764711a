use std::path::Path;
use std::time::Duration;

use color_eyre::eyre::{eyre, Result, WrapErr};
use ini::{Ini, Properties};
use log::info;

use crate::state::{MAX_BOARD_SIZE, MIN_BOARD_SIZE};

pub const DEFAULT_PATH: &str = "config.conf";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub board_size: i32,
    /// Ticks per second.
    pub speed: u32,
    pub food_seed: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UiConfig {
    pub title: String,
    /// Requested terminal size as (columns, rows).
    pub size: (u16, u16),
    pub resizable: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub game: GameConfig,
    pub ui: UiConfig,
}

/// Period between ticks for `speed` ticks per second, never shorter than 1 ms.
pub fn tick_interval(speed: u32) -> Duration {
    let millis = 1000 / speed.max(1);
    Duration::from_millis(millis.max(1) as u64)
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let ini = Ini::load_from_file(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;

        let config = Self::from_ini(&ini)?;
        info!("loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let ini = Ini::load_from_str(text).wrap_err("failed to parse config")?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self> {
        let game = section(ini, "Game")?;
        let ui = section(ini, "UI")?;

        let config = Config {
            game: GameConfig {
                board_size: get_int(game, "Game", "BoardSize")?,
                speed: get_int(game, "Game", "Speed")?,
                food_seed: get_int(game, "Game", "FoodGenerateSeed")?,
            },
            ui: UiConfig {
                title: get(ui, "UI", "Title")?.to_owned(),
                size: parse_size(get(ui, "UI", "Size")?)?,
                resizable: get_bool(ui, "UI", "Resizable")?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.game.board_size < MIN_BOARD_SIZE {
            return Err(eyre!("Game.BoardSize must be at least {}, got {}", MIN_BOARD_SIZE, self.game.board_size));
        }
        if self.game.board_size > MAX_BOARD_SIZE {
            return Err(eyre!("Game.BoardSize must be at most {}, got {}", MAX_BOARD_SIZE, self.game.board_size));
        }
        if self.game.speed < 1 {
            return Err(eyre!("Game.Speed must be at least 1"));
        }
        Ok(())
    }
}

fn section<'a>(ini: &'a Ini, name: &str) -> Result<&'a Properties> {
    ini.section(Some(name))
        .ok_or_else(|| eyre!("missing config section [{}]", name))
}

// Values may be quoted, as in `Title = 'Snake'`
fn get<'a>(props: &'a Properties, section: &str, key: &str) -> Result<&'a str> {
    props
        .get(key)
        .map(|v| v.trim().trim_matches('\'').trim_matches('"'))
        .ok_or_else(|| eyre!("missing config key {}.{}", section, key))
}

fn get_int<T>(props: &Properties, section: &str, key: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = get(props, section, key)?;
    raw.parse::<T>()
        .wrap_err_with(|| format!("{}.{} is not a valid integer: {:?}", section, key, raw))
}

fn get_bool(props: &Properties, section: &str, key: &str) -> Result<bool> {
    let raw = get(props, section, key)?;
    match raw.to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Ok(true),
        "0" | "no" | "false" | "off" => Ok(false),
        _ => Err(eyre!("{}.{} is not a boolean: {:?}", section, key, raw)),
    }
}

fn parse_size(raw: &str) -> Result<(u16, u16)> {
    let (w, h) = raw
        .split_once(|c: char| c == 'x' || c == 'X')
        .ok_or_else(|| eyre!("UI.Size must look like <columns>x<rows>, got {:?}", raw))?;

    let w = w.trim().parse().wrap_err_with(|| format!("bad width in UI.Size {:?}", raw))?;
    let h = h.trim().parse().wrap_err_with(|| format!("bad height in UI.Size {:?}", raw))?;
    Ok((w, h))
}
