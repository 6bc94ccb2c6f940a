//! Frontend-only configuration: a [`gigatron_core::config::Config`] plus
//! the window scale and ROM/GT1 paths, merged in precedence order
//! `defaults -> TOML file -> CLI flags`, matching how this codebase's
//! frontends resolve settings from disk.

use gigatron_core::config::Config as CoreConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct FileConfig {
    rom: Option<String>,
    gt1: Option<String>,
    scale: Option<u32>,
    hz: Option<u32>,
    rom_address_width: Option<u32>,
    ram_address_width: Option<u32>,
}

pub(crate) struct Settings {
    pub core: CoreConfig,
    pub rom_path: Option<String>,
    pub gt1_path: Option<String>,
    pub scale: u32,
}

impl Settings {
    pub fn resolve(
        file: FileConfig,
        cli_rom: Option<String>,
        cli_gt1: Option<String>,
        cli_scale: Option<u32>,
    ) -> Self {
        let mut core = CoreConfig::default();
        if let Some(hz) = file.hz {
            core.hz = hz;
        }
        if let Some(width) = file.rom_address_width {
            core.rom_address_width = width;
        }
        if let Some(width) = file.ram_address_width {
            core.ram_address_width = width;
        }

        Settings {
            core,
            rom_path: cli_rom.or(file.rom),
            gt1_path: cli_gt1.or(file.gt1),
            scale: cli_scale.or(file.scale).unwrap_or(3),
        }
    }
}

pub(crate) fn load_file_config(explicit_path: Option<&str>) -> FileConfig {
    let path = explicit_path.map(PathBuf::from).or_else(default_config_path);
    let Some(path) = path else {
        return FileConfig::default();
    };

    match std::fs::read_to_string(&path) {
        Ok(text) => toml::from_str(&text).unwrap_or_else(|e| {
            log::warn!("ignoring malformed config at {}: {e}", path.display());
            FileConfig::default()
        }),
        Err(_) => FileConfig::default(),
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gigatron").join("config.toml"))
}
