mod common;

use common::{cpu_with_program, encode};

#[test]
fn yx_inc_store_writes_ac_then_post_increments_x() {
    // LD #0x10 -> X ; LD #0x5A -> AC ; ST AC -> [Y,X++]
    let words = [
        encode(0, 4, 0, 0x10), // LD D,#0x10 -> X (mode=DX)
        encode(0, 0, 0, 0x5A), // LD D,#0x5A -> AC
        encode(6, 7, 2, 0x00), // ST, mode=YxInc, bus=Ac
    ];
    let mut cpu = cpu_with_program(&words);
    cpu.run(3);
    assert_eq!(cpu.ram_slice()[0x0010], 0x5A);
    assert_eq!(cpu.snapshot().x, 0x11);
}

#[test]
fn outx_latches_ac_on_out_bit6_rising_edge_only() {
    // LD #0 -> AC ; LD AC -> OUT (OUT=0) ; LD #0xA5 -> AC ; LD AC -> OUT (0 -> 0xA5, bit6 rises)
    let words = [
        encode(0, 0, 0, 0x00),
        encode(0, 6, 2, 0x00),
        encode(0, 0, 0, 0xA5),
        encode(0, 6, 2, 0x00),
    ];
    let mut cpu = cpu_with_program(&words);
    cpu.run(4);
    assert_eq!(cpu.snapshot().out, 0xA5);
    assert_eq!(cpu.snapshot().outx, 0xA5);
}

#[test]
fn outx_unchanged_when_bit6_stays_set() {
    // LD #0x40 -> AC ; LD AC -> OUT (rises, latches 0x40) ; LD #0x41 -> AC ; LD AC -> OUT (no rise)
    let words = [
        encode(0, 0, 0, 0x40),
        encode(0, 6, 2, 0x00),
        encode(0, 0, 0, 0x41),
        encode(0, 6, 2, 0x00),
    ];
    let mut cpu = cpu_with_program(&words);
    cpu.run(2);
    assert_eq!(cpu.snapshot().outx, 0x40);
    cpu.run(2);
    assert_eq!(cpu.snapshot().outx, 0x40, "bit 6 stayed set, OUTX must not relatch");
}

#[test]
fn d_x_and_d_y_store_modes_copy_ac_into_the_index_register() {
    // ST to D_X copies AC into X; a following ST to D_Y (fresh AC) copies AC into Y.
    let words = [
        encode(0, 0, 0, 0x07), // LD #7 -> AC
        encode(6, 4, 0, 0x00), // ST D,#0 -> [0] via D_X mode: also copies AC into X
        encode(0, 0, 0, 0x09), // LD #9 -> AC
        encode(6, 5, 0, 0x01), // ST D,#1 -> [1] via D_Y mode: also copies AC into Y
    ];
    let mut cpu = cpu_with_program(&words);
    cpu.run(4);
    assert_eq!(cpu.snapshot().x, 7);
    assert_eq!(cpu.snapshot().y, 9);
}
