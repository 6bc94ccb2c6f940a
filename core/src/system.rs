//! The single-machine facade that sequences CPU, VGA, audio, and loader
//! per tick exactly as the driver contract requires: CPU first, then the
//! three observers in a fixed order, then the loader (which may in turn
//! write `IN` for the next tick).

use crate::audio::Audio;
use crate::config::Config;
use crate::cpu::Cpu;
use crate::error::{Gt1ParseError, RomLoadError};
use crate::loader::{Gt1File, Loader, LoaderPolicy};
use crate::video::Vga;
use log::info;

/// One of the Gigatron's 8 active-low controller buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputButton {
    pub bit: u8,
    pub name: &'static str,
}

pub const INPUT_MAP: &[InputButton] = &[
    InputButton { bit: crate::cpu::BTN_A, name: "A" },
    InputButton { bit: crate::cpu::BTN_B, name: "B" },
    InputButton { bit: crate::cpu::BTN_SELECT, name: "Select" },
    InputButton { bit: crate::cpu::BTN_START, name: "Start" },
    InputButton { bit: crate::cpu::BTN_UP, name: "Up" },
    InputButton { bit: crate::cpu::BTN_DOWN, name: "Down" },
    InputButton { bit: crate::cpu::BTN_LEFT, name: "Left" },
    InputButton { bit: crate::cpu::BTN_RIGHT, name: "Right" },
];

pub struct GigatronSystem {
    cpu: Cpu,
    vga: Vga,
    audio: Audio,
    loader: Loader,
    buttons_held: u8,
}

impl GigatronSystem {
    pub fn new(config: &Config, sample_rate: u32) -> Self {
        GigatronSystem {
            cpu: Cpu::new(config),
            vga: Vga::new(),
            audio: Audio::new(config.hz, sample_rate),
            loader: Loader::new(config.loader_policy),
            buttons_held: 0xFF,
        }
    }

    pub fn load_rom(&mut self, data: &[u8]) -> Result<usize, RomLoadError> {
        let words = self.cpu.load_rom(data)?;
        info!(target: "gigatron_core::system", "loaded {words} ROM words");
        Ok(words)
    }

    pub fn reset(&mut self) {
        self.cpu.reset();
        self.vga.reset();
    }

    pub fn load_gt1(&mut self, bytes: &[u8]) -> Result<(), Gt1ParseError> {
        let gt1 = Gt1File::parse(bytes)?;
        self.loader.start(&mut self.cpu, gt1);
        Ok(())
    }

    /// Sets or clears one controller button. Ignored while the loader is
    /// actively driving `IN`.
    pub fn set_input(&mut self, bit: u8, pressed: bool) {
        if pressed {
            self.buttons_held &= !bit;
        } else {
            self.buttons_held |= bit;
        }
        if !self.loader.is_active() {
            self.cpu.set_input(self.buttons_held);
        }
    }

    pub fn input_map(&self) -> &'static [InputButton] {
        INPUT_MAP
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.audio.set_volume(volume);
    }

    pub fn set_mute(&mut self, mute: bool) {
        self.audio.set_mute(mute);
    }

    /// Advances one clock: CPU, then VGA/audio observers, then the loader.
    pub fn tick(&mut self) {
        if !self.loader.is_active() {
            self.cpu.set_input(self.buttons_held);
        }
        self.cpu.tick();
        self.vga.tick(&self.cpu);
        self.audio.tick(&self.cpu);
        self.loader.tick(&mut self.cpu);
    }

    /// Runs ticks until a VGA frame completes or `max_ticks` is exhausted.
    pub fn run_frame(&mut self, max_ticks: u32) {
        for _ in 0..max_ticks {
            self.tick();
            if self.vga.frame_ready() {
                break;
            }
        }
    }

    pub fn display_size(&self) -> (u32, u32) {
        self.vga.display_size()
    }

    pub fn render_frame(&self, buffer: &mut [u8]) {
        buffer.copy_from_slice(self.vga.framebuffer());
    }

    pub fn read_audio_samples(&mut self, out: &mut [f32]) -> usize {
        self.audio.read_samples(out)
    }

    pub fn loader_progress(&self) -> f32 {
        self.loader.progress()
    }

    pub fn loader_is_active(&self) -> bool {
        self.loader.is_active()
    }

    pub fn loader_is_complete(&self) -> bool {
        self.loader.is_complete()
    }

    pub fn loader_has_error(&self) -> bool {
        self.loader.has_error()
    }

    pub fn loader_state(&self) -> crate::loader::LoaderState {
        self.loader.state()
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }
}
