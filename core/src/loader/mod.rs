//! Drives the simulated controller port (the CPU's `IN` register) to
//! deliver a [`Gt1File`] using the same serial bootloader protocol the
//! real machine's built-in ROM understands: navigate its on-screen menu,
//! then bit-bang framed, checksummed data synchronized to HSYNC/VSYNC.
//!
//! [`Loader::tick`] must be called once per CPU cycle, after
//! [`Cpu::tick`](crate::cpu::Cpu::tick), so it observes the register
//! state the CPU just produced.

mod gt1;

pub use gt1::{Gt1File, Gt1Segment};

use crate::cpu::{Cpu, BTN_A, BTN_DOWN, OUT_HSYNC, OUT_VSYNC};
use log::debug;

pub const MAX_PAYLOAD_SIZE: usize = 60;
const START_OF_FRAME: u8 = 0x4C; // 'L'
const SYNC_CHECKSUM: u8 = 0x67; // 'g'
const RESET_WAIT_VSYNCS: u32 = 100;
const MENU_DOWN_PRESSES: u32 = 10;
const MENU_POST_A_WAIT: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoaderPolicy {
    /// The full HSYNC/VSYNC-synchronized bit-banging protocol. Matches
    /// what the stock ROM's menu and bootloader actually do.
    BitBang,
    /// Writes GT1 segments straight into RAM and jumps to the start
    /// address, bypassing the serial protocol. Useful for test fixtures
    /// where the menu-navigation/bit-banging latency isn't wanted.
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Idle,
    ResetWait,
    MenuNav,
    SyncFrame,
    Sending,
    StartCmd,
    Complete,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameState {
    WaitVsyncNeg,
    WaitHsync1,
    WaitHsync2,
    SendFirstByte,
    SendLength,
    SendAddrLow,
    SendAddrHigh,
    SendPayload,
    SendChecksum,
    Done,
}

#[derive(Debug, Clone)]
struct Frame {
    first: u8,
    length: u8,
    addr: u16,
    payload: [u8; MAX_PAYLOAD_SIZE],
}

impl Frame {
    fn sync() -> Self {
        Frame {
            first: START_OF_FRAME,
            length: 0,
            addr: 0,
            payload: [0; MAX_PAYLOAD_SIZE],
        }
    }

    fn data(addr: u16, bytes: &[u8]) -> Self {
        let mut payload = [0u8; MAX_PAYLOAD_SIZE];
        payload[..bytes.len()].copy_from_slice(bytes);
        Frame {
            first: START_OF_FRAME,
            length: bytes.len() as u8,
            addr,
            payload,
        }
    }

    fn start_cmd(addr: u16) -> Self {
        Frame {
            first: START_OF_FRAME,
            length: 0,
            addr,
            payload: [0; MAX_PAYLOAD_SIZE],
        }
    }
}

pub struct Loader {
    policy: LoaderPolicy,
    state: LoaderState,
    gt1: Option<Gt1File>,
    current_segment: usize,
    segment_offset: usize,

    frame_state: FrameState,
    frame: Frame,
    checksum: u8,
    payload_index: usize,

    shift_value: u8,
    shift_width: u8,
    shift_sent: u8,
    in_shadow: u8,

    prev_out: u8,
    vsync_count: u32,
    pending_start: bool,
}

impl Loader {
    pub fn new(policy: LoaderPolicy) -> Self {
        Loader {
            policy,
            state: LoaderState::Idle,
            gt1: None,
            current_segment: 0,
            segment_offset: 0,
            frame_state: FrameState::Done,
            frame: Frame::sync(),
            checksum: 0,
            payload_index: 0,
            shift_value: 0,
            shift_width: 0,
            shift_sent: 0,
            in_shadow: 0xFF,
            prev_out: 0,
            vsync_count: 0,
            pending_start: false,
        }
    }

    pub fn start(&mut self, cpu: &mut Cpu, gt1: Gt1File) {
        cpu.reset();
        self.pending_start = gt1.start_address.is_some();
        self.gt1 = Some(gt1);
        self.current_segment = 0;
        self.segment_offset = 0;
        self.checksum = 0;
        self.vsync_count = 0;
        self.prev_out = cpu.output();
        self.in_shadow = 0xFF;

        match self.policy {
            LoaderPolicy::BitBang => {
                self.state = LoaderState::ResetWait;
                debug!(target: "gigatron_core::loader", "loader started, entering ResetWait");
            }
            LoaderPolicy::Direct => {
                self.run_direct(cpu);
            }
        }
    }

    fn run_direct(&mut self, cpu: &mut Cpu) {
        let gt1 = self.gt1.take().expect("start() always sets gt1");
        for segment in &gt1.segments {
            for (i, byte) in segment.data.iter().enumerate() {
                let addr = segment.address.wrapping_add(i as u16);
                cpu.ram_mut()[(addr as usize) & (cpu.ram_mask() as usize)] = *byte;
            }
        }
        if let Some(start) = gt1.start_address {
            cpu.jump(start);
        }
        self.gt1 = Some(gt1);
        self.state = LoaderState::Complete;
    }

    pub fn is_active(&self) -> bool {
        !matches!(
            self.state,
            LoaderState::Idle | LoaderState::Complete | LoaderState::Error
        )
    }

    pub fn is_complete(&self) -> bool {
        self.state == LoaderState::Complete
    }

    pub fn has_error(&self) -> bool {
        self.state == LoaderState::Error
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    pub fn progress(&self) -> f32 {
        let Some(gt1) = &self.gt1 else { return 0.0 };
        if self.state == LoaderState::Complete {
            return 1.0;
        }
        let total: usize = gt1.segments.iter().map(|s| s.data.len()).sum();
        if total == 0 {
            return 1.0;
        }
        let sent: usize = gt1.segments[..self.current_segment.min(gt1.segments.len())]
            .iter()
            .map(|s| s.data.len())
            .sum::<usize>()
            + self.segment_offset;
        (sent as f32 / total as f32).clamp(0.0, 1.0)
    }

    pub fn tick(&mut self, cpu: &mut Cpu) {
        if matches!(self.policy, LoaderPolicy::Direct) {
            return;
        }
        if !self.is_active() {
            return;
        }

        let out = cpu.output();
        let posedge = |mask: u8| (!self.prev_out & out) & mask != 0;
        let negedge = |mask: u8| (self.prev_out & !out) & mask != 0;
        let vsync_pos = posedge(OUT_VSYNC);
        let vsync_neg = negedge(OUT_VSYNC);
        let hsync_pos = posedge(OUT_HSYNC);
        self.prev_out = out;

        match self.state {
            LoaderState::ResetWait => {
                if vsync_pos {
                    self.vsync_count += 1;
                    if self.vsync_count >= RESET_WAIT_VSYNCS {
                        self.vsync_count = 0;
                        self.state = LoaderState::MenuNav;
                        debug!(target: "gigatron_core::loader", "ResetWait complete, entering MenuNav");
                    }
                }
            }
            LoaderState::MenuNav => {
                if vsync_pos {
                    self.vsync_count += 1;
                    self.drive_menu_nav(cpu);
                }
            }
            LoaderState::SyncFrame | LoaderState::Sending | LoaderState::StartCmd => {
                self.step_frame(cpu, vsync_neg, hsync_pos);
            }
            LoaderState::Idle | LoaderState::Complete | LoaderState::Error => {}
        }
    }

    fn drive_menu_nav(&mut self, cpu: &mut Cpu) {
        let n = self.vsync_count;
        if n <= MENU_DOWN_PRESSES {
            if n % 2 == 1 {
                cpu.set_input(!BTN_DOWN);
            } else {
                cpu.set_input(0xFF);
            }
        } else if n == MENU_DOWN_PRESSES + 1 {
            cpu.set_input(!BTN_A);
        } else if n == MENU_DOWN_PRESSES + 2 {
            cpu.set_input(0xFF);
        } else if n >= MENU_DOWN_PRESSES + 2 + MENU_POST_A_WAIT {
            self.checksum = 0;
            self.enter_frame(Frame::sync(), FrameState::WaitVsyncNeg, cpu);
            self.state = LoaderState::SyncFrame;
            debug!(target: "gigatron_core::loader", "MenuNav complete, entering SyncFrame");
        }
    }

    fn enter_frame(&mut self, frame: Frame, start: FrameState, _cpu: &mut Cpu) {
        self.frame = frame;
        self.frame_state = start;
        self.payload_index = 0;
    }

    fn enter_send(&mut self, cpu: &mut Cpu, value: u8, width: u8) {
        self.shift_value = value;
        self.shift_width = width;
        self.shift_sent = 0;
        self.present_next_bit(cpu);
    }

    fn present_next_bit(&mut self, cpu: &mut Cpu) {
        let bit_index = self.shift_width - 1 - self.shift_sent;
        let bit = (self.shift_value >> bit_index) & 1;
        self.in_shadow = ((self.in_shadow << 1) & 0xFF) | bit;
        cpu.set_input(self.in_shadow);
        self.shift_sent += 1;
    }

    fn step_frame(&mut self, cpu: &mut Cpu, vsync_neg: bool, hsync_pos: bool) {
        match self.frame_state {
            FrameState::WaitVsyncNeg => {
                if vsync_neg {
                    self.frame_state = FrameState::WaitHsync1;
                }
            }
            FrameState::WaitHsync1 => {
                if hsync_pos {
                    self.frame_state = FrameState::WaitHsync2;
                }
            }
            FrameState::WaitHsync2 => {
                if hsync_pos {
                    self.checksum = self.checksum.wrapping_add(self.frame.first);
                    self.frame_state = FrameState::SendFirstByte;
                    self.enter_send(cpu, self.frame.first, 8);
                }
            }
            FrameState::SendFirstByte => {
                if !hsync_pos {
                    return;
                }
                if self.shift_sent < self.shift_width {
                    self.present_next_bit(cpu);
                } else {
                    // Protocol quirk: the first byte's value also folds into
                    // the checksum shifted by 6, covering the length field's
                    // shared phase in the on-target receiver.
                    self.checksum = self
                        .checksum
                        .wrapping_add(self.frame.first.wrapping_shl(6));
                    self.checksum = self.checksum.wrapping_add(self.frame.length);
                    self.frame_state = FrameState::SendLength;
                    self.enter_send(cpu, self.frame.length, 6);
                }
            }
            FrameState::SendLength => {
                self.advance_fixed_field(cpu, hsync_pos, FrameState::SendAddrLow, |l| {
                    (l.checksum, (l.frame.addr & 0xFF) as u8, 8)
                });
            }
            FrameState::SendAddrLow => {
                self.advance_fixed_field(cpu, hsync_pos, FrameState::SendAddrHigh, |l| {
                    (
                        l.checksum.wrapping_add((l.frame.addr & 0xFF) as u8),
                        (l.frame.addr >> 8) as u8,
                        8,
                    )
                });
            }
            FrameState::SendAddrHigh => {
                if !hsync_pos {
                    return;
                }
                if self.shift_sent < self.shift_width {
                    self.present_next_bit(cpu);
                } else {
                    self.checksum = self.checksum.wrapping_add((self.frame.addr >> 8) as u8);
                    self.payload_index = 0;
                    self.frame_state = FrameState::SendPayload;
                    let byte = self.frame.payload[0];
                    self.enter_send(cpu, byte, 8);
                }
            }
            FrameState::SendPayload => {
                if !hsync_pos {
                    return;
                }
                if self.shift_sent < self.shift_width {
                    self.present_next_bit(cpu);
                } else {
                    self.checksum = self
                        .checksum
                        .wrapping_add(self.frame.payload[self.payload_index]);
                    self.payload_index += 1;
                    if self.payload_index < MAX_PAYLOAD_SIZE {
                        let byte = self.frame.payload[self.payload_index];
                        self.enter_send(cpu, byte, 8);
                    } else {
                        let checksum_byte = (!self.checksum).wrapping_add(1);
                        self.frame_state = FrameState::SendChecksum;
                        self.enter_send(cpu, checksum_byte, 8);
                    }
                }
            }
            FrameState::SendChecksum => {
                if !hsync_pos {
                    return;
                }
                if self.shift_sent < self.shift_width {
                    self.present_next_bit(cpu);
                } else {
                    self.frame_state = FrameState::Done;
                    self.on_frame_done(cpu);
                }
            }
            FrameState::Done => {}
        }
    }

    /// Shared body for the two-statement fixed-width fields (length's
    /// successor fields all look the same: present remaining bits of the
    /// current field, then on completion fold checksum and start the next).
    fn advance_fixed_field(
        &mut self,
        cpu: &mut Cpu,
        hsync_pos: bool,
        next: FrameState,
        compute_next: impl FnOnce(&Self) -> (u8, u8, u8),
    ) {
        if !hsync_pos {
            return;
        }
        if self.shift_sent < self.shift_width {
            self.present_next_bit(cpu);
        } else {
            let (checksum, value, width) = compute_next(self);
            self.checksum = checksum;
            self.frame_state = next;
            self.enter_send(cpu, value, width);
        }
    }

    fn on_frame_done(&mut self, cpu: &mut Cpu) {
        match self.state {
            LoaderState::SyncFrame => {
                self.checksum = SYNC_CHECKSUM;
                self.advance_to_next_data_frame(cpu);
            }
            LoaderState::Sending => {
                self.advance_to_next_data_frame(cpu);
            }
            LoaderState::StartCmd => {
                self.state = LoaderState::Complete;
                cpu.set_input(0xFF);
                debug!(target: "gigatron_core::loader", "loader COMPLETE");
            }
            _ => {}
        }
    }

    fn advance_to_next_data_frame(&mut self, cpu: &mut Cpu) {
        let gt1 = self.gt1.as_ref().expect("active loader always has a gt1");

        while self.current_segment < gt1.segments.len()
            && self.segment_offset >= gt1.segments[self.current_segment].data.len()
        {
            self.current_segment += 1;
            self.segment_offset = 0;
        }

        if self.current_segment >= gt1.segments.len() {
            if self.pending_start {
                let start = gt1.start_address.unwrap_or(0);
                self.pending_start = false;
                self.state = LoaderState::StartCmd;
                self.enter_frame(Frame::start_cmd(start), FrameState::WaitVsyncNeg, cpu);
            } else {
                self.state = LoaderState::Complete;
                cpu.set_input(0xFF);
                debug!(target: "gigatron_core::loader", "loader COMPLETE");
            }
            return;
        }

        let segment = &gt1.segments[self.current_segment];
        let remaining = segment.data.len() - self.segment_offset;
        let chunk_len = remaining.min(MAX_PAYLOAD_SIZE);
        let addr = segment.address.wrapping_add(self.segment_offset as u16);
        let bytes = segment.data[self.segment_offset..self.segment_offset + chunk_len].to_vec();
        self.segment_offset += chunk_len;

        self.state = LoaderState::Sending;
        self.enter_frame(Frame::data(addr, &bytes), FrameState::WaitVsyncNeg, cpu);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::cpu::Cpu;

    fn segment_bytes(addr: u16, data: &[u8]) -> Vec<u8> {
        let mut v = vec![(addr >> 8) as u8, (addr & 0xFF) as u8];
        v.push(if data.len() == 256 { 0 } else { data.len() as u8 });
        v.extend_from_slice(data);
        v
    }

    fn toggle(cpu: &mut Cpu, mask: u8, level: bool) {
        if level {
            cpu.set_out_for_test(cpu.output() | mask);
        } else {
            cpu.set_out_for_test(cpu.output() & !mask);
        }
    }

    fn run_vsync_pulses(cpu: &mut Cpu, loader: &mut Loader, count: u32) {
        for _ in 0..count {
            toggle(cpu, OUT_VSYNC, true);
            loader.tick(cpu);
            toggle(cpu, OUT_VSYNC, false);
            loader.tick(cpu);
        }
    }

    #[test]
    fn reset_wait_advances_to_menu_nav_after_100_vsyncs() {
        let mut cpu = Cpu::new(&Config::default());
        let mut loader = Loader::new(LoaderPolicy::BitBang);
        let gt1 = Gt1File::parse(&{
            let mut b = segment_bytes(0x0200, &[1, 2, 3]);
            b.extend_from_slice(&[0, 0, 0]);
            b
        })
        .unwrap();
        loader.start(&mut cpu, gt1);
        assert_eq!(loader.state(), LoaderState::ResetWait);
        run_vsync_pulses(&mut cpu, &mut loader, 100);
        assert_eq!(loader.state(), LoaderState::MenuNav);
    }

    #[test]
    fn direct_policy_completes_immediately_and_writes_ram() {
        let mut cpu = Cpu::new(&Config::default());
        let mut loader = Loader::new(LoaderPolicy::Direct);
        let gt1 = Gt1File::parse(&{
            let mut b = segment_bytes(0x0300, &[0xAA, 0xBB]);
            b.extend_from_slice(&[0, 0, 0]);
            b
        })
        .unwrap();
        loader.start(&mut cpu, gt1);
        assert!(loader.is_complete());
        assert_eq!(cpu.ram_slice()[0x0300], 0xAA);
        assert_eq!(cpu.ram_slice()[0x0301], 0xBB);
    }

    #[test]
    fn progress_reaches_1_0_once_complete() {
        let mut cpu = Cpu::new(&Config::default());
        let mut loader = Loader::new(LoaderPolicy::Direct);
        let gt1 = Gt1File::parse(&{
            let mut b = segment_bytes(0x0000, &[9]);
            b.extend_from_slice(&[0, 0, 0]);
            b
        })
        .unwrap();
        loader.start(&mut cpu, gt1);
        assert_eq!(loader.progress(), 1.0);
    }
}
