//! Rate-converts the CPU's OUTX shadow register into an audio sample
//! stream: a cycle accumulator controls when a sample is due, a DC-bias
//! running average removes the PWM carrier's offset, and a lock-free
//! ring buffer hands samples to a consumer (typically a host audio
//! callback running on another thread).

use crate::cpu::Cpu;
use log::warn;
use std::sync::atomic::{AtomicUsize, Ordering};

const DC_ALPHA: f32 = 0.99;
const RING_FRAMES: usize = 4;

pub struct Audio {
    cpu_hz: u32,
    sample_rate: u32,
    cycle_accum: u64,
    bias: f32,
    volume: f32,
    mute: bool,
    ring: RingBuffer,
}

impl Audio {
    pub fn new(cpu_hz: u32, sample_rate: u32) -> Self {
        let capacity = ((sample_rate as usize / 10).max(256)) * RING_FRAMES;
        Audio {
            cpu_hz,
            sample_rate,
            cycle_accum: 0,
            bias: 0.0,
            volume: 1.0,
            mute: false,
            ring: RingBuffer::new(capacity),
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_mute(&mut self, mute: bool) {
        self.mute = mute;
    }

    pub fn tick(&mut self, cpu: &Cpu) {
        if self.sample_rate == 0 {
            return;
        }
        self.cycle_accum += self.sample_rate as u64;
        while self.cycle_accum >= self.cpu_hz as u64 {
            self.cycle_accum -= self.cpu_hz as u64;
            self.emit_sample(cpu.outx());
        }
    }

    fn emit_sample(&mut self, outx: u8) {
        let raw = (outx >> 4) as f32 / 8.0;
        self.bias = DC_ALPHA * self.bias + (1.0 - DC_ALPHA) * raw;
        let mut sample = (raw - self.bias) * self.volume;
        sample = sample.clamp(-1.0, 1.0);
        if self.mute {
            sample = 0.0;
        }
        if !self.ring.push(sample) {
            warn!(target: "gigatron_core::audio", "audio ring buffer full, dropping sample");
        }
    }

    pub fn available_samples(&self) -> usize {
        self.ring.available()
    }

    pub fn read_samples(&mut self, out: &mut [f32]) -> usize {
        self.ring.read(out)
    }
}

/// Single-producer/single-consumer ring buffer. The producer is whichever
/// thread calls [`Audio::tick`]; the consumer is typically a host audio
/// callback running elsewhere, so the cursors use acquire/release atomics
/// even though this core drives everything from a single thread itself.
struct RingBuffer {
    buf: Box<[f32]>,
    read: AtomicUsize,
    write: AtomicUsize,
}

impl RingBuffer {
    fn new(capacity: usize) -> Self {
        RingBuffer {
            buf: vec![0.0; capacity + 1].into_boxed_slice(),
            read: AtomicUsize::new(0),
            write: AtomicUsize::new(0),
        }
    }

    fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns false (and drops the sample) if the buffer is full.
    fn push(&mut self, sample: f32) -> bool {
        let write = self.write.load(Ordering::Relaxed);
        let read = self.read.load(Ordering::Acquire);
        let next_write = (write + 1) % self.len();
        if next_write == read {
            return false;
        }
        self.buf[write] = sample;
        self.write.store(next_write, Ordering::Release);
        true
    }

    fn available(&self) -> usize {
        let write = self.write.load(Ordering::Acquire);
        let read = self.read.load(Ordering::Acquire);
        (write + self.len() - read) % self.len()
    }

    fn read(&mut self, out: &mut [f32]) -> usize {
        let available = self.available();
        let n = out.len().min(available);
        let mut read = self.read.load(Ordering::Relaxed);
        for slot in out.iter_mut().take(n) {
            *slot = self.buf[read];
            read = (read + 1) % self.len();
        }
        self.read.store(read, Ordering::Release);
        n
    }
}
