use gigatron_core::config::Config;
use gigatron_core::cpu::Cpu;
use gigatron_core::video::Vga;

/// Drives OUT to an exact value through the public ALU path (LD #out -> AC ;
/// LD AC -> OUT), bypassing the need for a full VGA timing program.
fn set_out(cpu: &mut Cpu, out: u8) {
    let words = [
        (0u16 << 13) | (0 << 10) | (0 << 8) | out as u16,
        (0u16 << 13) | (6 << 10) | (2 << 8),
    ];
    let mut bytes = Vec::with_capacity(4);
    for w in words {
        bytes.push((w >> 8) as u8);
        bytes.push((w & 0xFF) as u8);
    }
    cpu.load_rom(&bytes).unwrap();
    cpu.reset();
    cpu.run(2);
}

#[test]
fn frame_ready_fires_exactly_once_per_vsync_falling_edge() {
    let mut cpu = Cpu::new(&Config::default());
    let mut vga = Vga::new();

    set_out(&mut cpu, 0xC0); // both syncs inactive (high)
    vga.tick(&cpu);
    assert!(!vga.frame_ready());

    for expected_frame in 1..=3u64 {
        set_out(&mut cpu, 0x40); // VSYNC falls, HSYNC stays high
        vga.tick(&cpu);
        assert!(vga.frame_ready(), "frame {expected_frame} should be ready");
        assert!(!vga.frame_ready(), "latch must clear after being read");
        assert_eq!(vga.frame_count(), expected_frame);

        set_out(&mut cpu, 0xC0); // VSYNC rises again between frames
        vga.tick(&cpu);
        assert!(!vga.frame_ready());
    }
}

#[test]
fn display_size_is_640_by_480() {
    let vga = Vga::new();
    assert_eq!(vga.display_size(), (640, 480));
}

#[test]
fn color_bits_map_red_to_the_high_pair_and_blue_to_the_low_pair() {
    let mut cpu = Cpu::new(&Config::default());
    let mut vga = Vga::new();

    // Prime prev_out so the first HSYNC falling edge below is actually
    // detected as a transition, not a no-op against the power-on zero state.
    set_out(&mut cpu, 0xC0);
    vga.tick(&cpu);

    // Step through 34 scanlines (HSYNC falls, then rises) to reach the
    // visible vertical window; VSYNC stays inactive (high) throughout. On
    // the final rising edge, drive color = 0b110000 (RR=11, GG=00, BB=00)
    // so the resulting pixel should be full red, no green or blue.
    for row in 0..34u32 {
        set_out(&mut cpu, 0x80); // HSYNC falls, new row begins
        vga.tick(&cpu);
        let out = if row == 33 { 0xC0 | 0b0011_0000 } else { 0xC0 };
        set_out(&mut cpu, out);
        vga.tick(&cpu);
    }

    let fb = vga.framebuffer();
    assert_eq!(&fb[0..4], &[255, 0, 0, 255]);
}
