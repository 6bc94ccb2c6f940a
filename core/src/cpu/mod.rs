//! Fetch/decode/execute for the Gigatron's one-tick-per-instruction core,
//! plus the bank-switched memory controller it shares its register file with.

mod addr;
mod alu;
mod branch;
mod decode;
mod state;
mod store;

pub use decode::{Bus, Condition, Instruction, Mode, Opcode};
pub use state::CpuState;

use crate::config::Config;
use crate::error::RomLoadError;
use crate::memory;
use rand::Rng;

pub const OUT_HSYNC: u8 = 0x40;
pub const OUT_VSYNC: u8 = 0x80;

pub const BTN_RIGHT: u8 = 0x01;
pub const BTN_LEFT: u8 = 0x02;
pub const BTN_DOWN: u8 = 0x04;
pub const BTN_UP: u8 = 0x08;
pub const BTN_START: u8 = 0x10;
pub const BTN_SELECT: u8 = 0x20;
pub const BTN_B: u8 = 0x40;
pub const BTN_A: u8 = 0x80;

/// The CPU core: registers, ROM, RAM, and the CTRL/BANK bank-switching
/// sideband. Owns its own memory; VGA/audio/loader hold a `&Cpu` (or, for
/// the loader, a `&mut Cpu` limited to writing `in_reg`).
pub struct Cpu {
    rom: Vec<u16>,
    rom_mask: u32,
    ram: Vec<u8>,
    ram_mask: u32,
    banked: bool,

    pub(crate) pc: u16,
    pub(crate) next_pc: u16,
    pub(crate) ac: u8,
    pub(crate) x: u8,
    pub(crate) y: u8,
    pub(crate) out: u8,
    pub(crate) outx: u8,
    pub(crate) in_reg: u8,

    pub(crate) ctrl: u16,
    pub(crate) bank: u32,
    pub(crate) prev_ctrl: i16,
    pub(crate) miso: u8,

    cycles: u64,
}

impl Cpu {
    pub fn new(config: &Config) -> Self {
        let rom_size = config.rom_size() as usize;
        let ram_size = config.ram_size() as usize;
        let mut rng = rand::thread_rng();
        let ram = (0..ram_size).map(|_| rng.r#gen::<u8>()).collect();

        let mut cpu = Cpu {
            rom: vec![0u16; rom_size],
            rom_mask: config.rom_size() - 1,
            ram,
            ram_mask: config.ram_size() - 1,
            banked: config.is_banked(),
            pc: 0,
            next_pc: 1,
            ac: 0,
            x: 0,
            y: 0,
            out: 0,
            outx: 0,
            in_reg: 0xFF,
            ctrl: 0x7C,
            bank: 0,
            prev_ctrl: -1,
            miso: 0,
            cycles: 0,
        };
        cpu.reset();
        cpu
    }

    /// Power-on/soft reset. RAM contents are preserved, matching the real
    /// hardware's DRAM retaining whatever was there before.
    pub fn reset(&mut self) {
        self.pc = 0;
        self.next_pc = 1;
        self.ac = 0;
        self.x = 0;
        self.y = 0;
        self.out = 0;
        self.outx = 0;
        self.in_reg = 0xFF;
        self.ctrl = 0x7C;
        self.bank = 0;
        self.prev_ctrl = -1;
        self.miso = 0;
    }

    /// Load big-endian 16-bit words into ROM starting at address 0.
    /// Excess bytes are ignored; a shortfall leaves the remainder untouched.
    pub fn load_rom(&mut self, data: &[u8]) -> Result<usize, RomLoadError> {
        if data.is_empty() {
            return Err(RomLoadError::Empty);
        }
        let word_count = (data.len() / 2).min(self.rom.len());
        for i in 0..word_count {
            let hi = data[i * 2] as u16;
            let lo = data[i * 2 + 1] as u16;
            self.rom[i] = (hi << 8) | lo;
        }
        Ok(word_count)
    }

    pub fn tick(&mut self) {
        self.prev_ctrl = -1;

        let word = self.rom[(self.pc as u32 & self.rom_mask) as usize];
        let ins = Instruction::decode(word);

        self.pc = self.next_pc;
        self.next_pc = ((self.next_pc as u32 + 1) & self.rom_mask) as u16;

        match ins.opcode {
            Opcode::St => store::execute(self, &ins),
            Opcode::Bcc => branch::execute(self, &ins),
            _ => alu::execute(self, &ins),
        }

        self.cycles += 1;
    }

    pub fn run(&mut self, cycles: u32) {
        for _ in 0..cycles {
            self.tick();
        }
    }

    pub fn read_ram(&self, addr: u16) -> u8 {
        if self.ctrl & 0x01 != 0 {
            return self.miso;
        }
        self.ram[memory::physical_index(addr, self.bank, self.ram_mask)]
    }

    pub(crate) fn write_ram(&mut self, addr: u16, value: u8) {
        let idx = memory::physical_index(addr, self.bank, self.ram_mask);
        self.ram[idx] = value;
    }

    /// The CTRL-write sideband a ST/RAM-bus store redirects to in the
    /// banked configuration; outside it, the store is undefined hardware
    /// behavior and the real chip drives zero onto the decoded address.
    pub(crate) fn store_via_ctrl_sideband(&mut self, addr: u16) {
        if self.banked {
            self.prev_ctrl = self.ctrl as i16;
            self.ctrl = memory::ctrl_from_addr(addr);
            self.bank = memory::bank_from_ctrl(self.ctrl);
        } else {
            self.write_ram(addr, 0);
        }
    }

    pub fn set_input(&mut self, value: u8) {
        self.in_reg = value;
    }

    /// Sets PC/NEXT_PC directly, bypassing the normal fetch pipeline. Used
    /// by [`crate::loader::LoaderPolicy::Direct`] to jump straight to a
    /// GT1 file's start address.
    pub fn jump(&mut self, addr: u16) {
        self.pc = addr;
        self.next_pc = ((addr as u32 + 1) & self.rom_mask) as u16;
    }

    #[cfg(test)]
    pub(crate) fn set_out_for_test(&mut self, value: u8) {
        self.out = value;
    }

    pub fn output(&self) -> u8 {
        self.out
    }

    pub fn outx(&self) -> u8 {
        self.outx
    }

    pub fn hsync_active(&self) -> bool {
        self.out & OUT_HSYNC == 0
    }

    pub fn vsync_active(&self) -> bool {
        self.out & OUT_VSYNC == 0
    }

    pub fn color(&self) -> u8 {
        self.out & 0x3F
    }

    pub fn set_miso(&mut self, value: u8) {
        self.miso = value;
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn ram_slice(&self) -> &[u8] {
        &self.ram
    }

    pub fn ram_mut(&mut self) -> &mut [u8] {
        &mut self.ram
    }

    pub fn ram_mask(&self) -> u32 {
        self.ram_mask
    }

    pub fn bank(&self) -> u32 {
        self.bank
    }

    pub fn snapshot(&self) -> CpuState {
        CpuState {
            pc: self.pc,
            next_pc: self.next_pc,
            ac: self.ac,
            x: self.x,
            y: self.y,
            out: self.out,
            outx: self.outx,
            in_reg: self.in_reg,
            ctrl: self.ctrl,
            bank: self.bank,
            prev_ctrl: self.prev_ctrl,
            miso: self.miso,
            cycles: self.cycles,
        }
    }
}
