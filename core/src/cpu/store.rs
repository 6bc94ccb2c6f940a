use super::addr;
use super::decode::{Bus, Instruction, Mode};
use super::Cpu;

pub(super) fn execute(cpu: &mut Cpu, ins: &Instruction) {
    let address = addr::resolve(ins.mode(), ins.d, cpu.x, cpu.y);

    if matches!(ins.mode(), Mode::YxInc) {
        cpu.x = cpu.x.wrapping_add(1);
    }

    match ins.bus {
        Bus::Ram => {
            cpu.store_via_ctrl_sideband(address);
        }
        _ => {
            let value = match ins.bus {
                Bus::D => ins.d,
                Bus::Ac => cpu.ac,
                Bus::In => cpu.in_reg,
                Bus::Ram => unreachable!(),
            };
            cpu.write_ram(address, value);
        }
    }

    match ins.mode() {
        Mode::DX => cpu.x = cpu.ac,
        Mode::DY => cpu.y = cpu.ac,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::config::Config;

    fn cpu_with_rom(words: &[u16]) -> Cpu {
        let mut cpu = Cpu::new(&Config::default());
        let mut bytes = Vec::with_capacity(words.len() * 2);
        for w in words {
            bytes.push((w >> 8) as u8);
            bytes.push((w & 0xFF) as u8);
        }
        cpu.load_rom(&bytes).unwrap();
        cpu
    }

    fn encode(op: u8, mode: u8, bus: u8, d: u8) -> u16 {
        ((op as u16) << 13) | ((mode as u16) << 10) | ((bus as u16) << 8) | d as u16
    }

    #[test]
    fn yx_inc_store_writes_then_increments_x() {
        // Y is 0 at power-on. LD #0x5A -> AC ; ST AC, [Y,X++]
        let words = [
            encode(0, 0, 0, 0x5A), // LD #0x5A -> AC
            encode(6, 7, 2, 0x00), // ST AC -> [Y,X++] (mode=YxInc, bus=Ac)
        ];
        let mut cpu = cpu_with_rom(&words);
        cpu.x = 0x10;
        cpu.run(2);
        assert_eq!(cpu.ram_slice()[0x0010], 0x5A);
        assert_eq!(cpu.x, 0x11);
    }

    #[test]
    fn d_x_mode_copies_ac_into_x_register() {
        let words = [
            encode(0, 0, 0, 0x07), // LD #7 -> AC
            encode(6, 4, 0, 0x00), // ST D -> [d] (mode=DX, bus=D, d=0) also X <- AC
        ];
        let mut cpu = cpu_with_rom(&words);
        cpu.run(2);
        assert_eq!(cpu.x, 7);
    }
}
