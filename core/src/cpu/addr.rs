use super::decode::Mode;

/// Zero-page/indexed RAM address selected by an ALU/store instruction's mode.
/// Does not apply `YxInc`'s post-increment; callers do that themselves once
/// per instruction.
pub(super) fn resolve(mode: Mode, d: u8, x: u8, y: u8) -> u16 {
    match mode {
        Mode::D | Mode::DX | Mode::DY | Mode::DOut => d as u16,
        Mode::X => x as u16,
        Mode::Yd => ((y as u16) << 8) | d as u16,
        Mode::Yx | Mode::YxInc => ((y as u16) << 8) | x as u16,
    }
}
