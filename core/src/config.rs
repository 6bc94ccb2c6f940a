//! Machine configuration consumed by [`crate::system::GigatronSystem`].
//!
//! This struct is plain data; the core performs no file I/O on it. A
//! frontend is free to load it from TOML or any other format and hand
//! the result to [`GigatronSystem::new`](crate::system::GigatronSystem::new).

use crate::loader::LoaderPolicy;

pub const DEFAULT_HZ: u32 = 6_250_000;
pub const DEFAULT_ROM_ADDRESS_WIDTH: u32 = 16;
pub const DEFAULT_RAM_ADDRESS_WIDTH: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    pub hz: u32,
    pub rom_address_width: u32,
    pub ram_address_width: u32,
    pub loader_policy: LoaderPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hz: DEFAULT_HZ,
            rom_address_width: DEFAULT_ROM_ADDRESS_WIDTH,
            ram_address_width: DEFAULT_RAM_ADDRESS_WIDTH,
            loader_policy: LoaderPolicy::BitBang,
        }
    }
}

impl Config {
    pub fn rom_size(&self) -> u32 {
        1 << self.rom_address_width
    }

    pub fn ram_size(&self) -> u32 {
        1 << self.ram_address_width
    }

    /// 128K+ configurations redirect ST/RAM writes to CTRL instead of memory.
    pub fn is_banked(&self) -> bool {
        self.ram_size() > (1 << 16)
    }
}
