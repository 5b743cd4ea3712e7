use crate::cpu::{AddressingMode, CPU};
use crate::mem::Mem;
use crate::opcodes;

/// Render one disassembly/state line for the instruction PC points at.
/// All reads go through the side-effect-free memory, so tracing never
/// perturbs execution.
pub fn trace(cpu: &CPU) -> String {
    let pc = cpu.program_counter;
    let code = cpu.mem_read(pc);

    let Some(opcode) = opcodes::OPCODES_MAP.get(&code) else {
        // The next step fails with a diagnostic; keep this line readable.
        return format!("{:04X}  {:02X}       ???", pc, code);
    };

    let mut result = String::new();

    // Program counter and raw instruction bytes.
    result.push_str(&format!("{:04X}  ", pc));
    result.push_str(&format!("{:02X} ", opcode.code));
    match opcode.len {
        1 => result.push_str("      "),
        2 => result.push_str(&format!("{:02X}    ", cpu.mem_read(pc.wrapping_add(1)))),
        _ => result.push_str(&format!(
            "{:02X} {:02X} ",
            cpu.mem_read(pc.wrapping_add(1)),
            cpu.mem_read(pc.wrapping_add(2))
        )),
    }

    result.push_str(&format!("{} ", opcode.mnemonic));

    // Operand, resolved the same way the dispatcher resolves it.
    let operand_ptr = pc.wrapping_add(1);
    let operand = match opcode.mode {
        AddressingMode::Immediate => {
            format!("#${:02X}", cpu.mem_read(operand_ptr))
        }
        AddressingMode::ZeroPage => {
            let (addr, _) = cpu.resolve_operand(&opcode.mode, operand_ptr);
            format!("${:02X} = {:02X}", addr, cpu.mem_read(addr))
        }
        AddressingMode::ZeroPage_X => {
            let base = cpu.mem_read(operand_ptr);
            let (addr, _) = cpu.resolve_operand(&opcode.mode, operand_ptr);
            format!(
                "${:02X},X @ {:02X} = {:02X}",
                base,
                addr as u8,
                cpu.mem_read(addr)
            )
        }
        AddressingMode::ZeroPage_Y => {
            let base = cpu.mem_read(operand_ptr);
            let (addr, _) = cpu.resolve_operand(&opcode.mode, operand_ptr);
            format!(
                "${:02X},Y @ {:02X} = {:02X}",
                base,
                addr as u8,
                cpu.mem_read(addr)
            )
        }
        AddressingMode::Absolute => {
            let (addr, _) = cpu.resolve_operand(&opcode.mode, operand_ptr);
            match opcode.code {
                // Jump targets are shown bare.
                0x4c | 0x20 => format!("${:04X}", addr),
                _ => format!("${:04X} = {:02X}", addr, cpu.mem_read(addr)),
            }
        }
        AddressingMode::Absolute_X => {
            let base = cpu.mem_read_u16(operand_ptr);
            let (addr, _) = cpu.resolve_operand(&opcode.mode, operand_ptr);
            format!("${:04X},X @ {:04X} = {:02X}", base, addr, cpu.mem_read(addr))
        }
        AddressingMode::Absolute_Y => {
            let base = cpu.mem_read_u16(operand_ptr);
            let (addr, _) = cpu.resolve_operand(&opcode.mode, operand_ptr);
            format!("${:04X},Y @ {:04X} = {:02X}", base, addr, cpu.mem_read(addr))
        }
        AddressingMode::Indirect => {
            let pointer = cpu.mem_read_u16(operand_ptr);
            let (addr, _) = cpu.resolve_operand(&opcode.mode, operand_ptr);
            format!("(${:04X}) = {:04X}", pointer, addr)
        }
        AddressingMode::Indirect_X => {
            let base = cpu.mem_read(operand_ptr);
            let (addr, _) = cpu.resolve_operand(&opcode.mode, operand_ptr);
            format!(
                "(${:02X},X) @ {:02X} = {:04X} = {:02X}",
                base,
                base.wrapping_add(cpu.register_x),
                addr,
                cpu.mem_read(addr)
            )
        }
        AddressingMode::Indirect_Y => {
            let base = cpu.mem_read(operand_ptr);
            let (addr, _) = cpu.resolve_operand(&opcode.mode, operand_ptr);
            format!(
                "(${:02X}),Y = {:04X} @ {:04X} = {:02X}",
                base,
                addr.wrapping_sub(cpu.register_y as u16),
                addr,
                cpu.mem_read(addr)
            )
        }
        AddressingMode::NoneAddressing => match opcode.code {
            // Branches carry a relative offset; show the resolved target.
            0x10 | 0x30 | 0x50 | 0x70 | 0x90 | 0xb0 | 0xd0 | 0xf0 => {
                let offset = cpu.mem_read(operand_ptr) as i8;
                let target = pc.wrapping_add(2).wrapping_add(offset as u16);
                format!("${:04X}", target)
            }
            // Accumulator forms.
            0x0a | 0x4a | 0x2a | 0x6a => "A".to_string(),
            _ => String::new(),
        },
    };
    result.push_str(&format!("{:28}", operand));

    // Register file after the previous instruction, cycles included.
    result.push_str(&format!(
        "A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} ",
        cpu.register_a,
        cpu.register_x,
        cpu.register_y,
        cpu.status.bits(),
        cpu.stack_pointer
    ));
    result.push_str(&format!("CYC:{}", cpu.cycles));

    result
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cpu::CPU;

    #[test]
    fn test_format_trace() {
        let mut cpu = CPU::new();
        cpu.load_at(&[0xa2, 0x01, 0xca, 0x88, 0x00], 0x4000);
        cpu.register_a = 1;
        cpu.register_x = 2;
        cpu.register_y = 3;

        let mut result: Vec<String> = vec![];
        cpu.run_with_callback(|cpu| {
            result.push(trace(cpu));
        })
        .unwrap();

        assert_eq!(
            "4000  A2 01    LDX #$01                        A:01 X:02 Y:03 P:04 SP:FF CYC:0",
            result[0]
        );
        assert_eq!(
            "4002  CA       DEX                             A:01 X:01 Y:03 P:04 SP:FF CYC:2",
            result[1]
        );
        assert_eq!(
            "4003  88       DEY                             A:01 X:00 Y:03 P:06 SP:FF CYC:4",
            result[2]
        );
        assert_eq!(
            "4004  00       BRK                             A:01 X:00 Y:02 P:04 SP:FF CYC:6",
            result[3]
        );
    }

    #[test]
    fn test_format_zero_page_x_access() {
        let mut cpu = CPU::new();
        cpu.load_at(&[0xb5, 0x33, 0x00], 0x4000);
        cpu.register_x = 1;
        cpu.mem_write(0x34, 0xaa);

        let mut result: Vec<String> = vec![];
        cpu.run_with_callback(|cpu| {
            result.push(trace(cpu));
        })
        .unwrap();

        assert_eq!(
            "4000  B5 33    LDA $33,X @ 34 = AA             A:00 X:01 Y:00 P:04 SP:FF CYC:0",
            result[0]
        );
    }

    #[test]
    fn test_format_indirect_indexed_access() {
        let mut cpu = CPU::new();
        cpu.load_at(&[0x11, 0x33, 0x00], 0x4000);
        cpu.mem_write(0x33, 0x00);
        cpu.mem_write(0x34, 0x04);
        cpu.mem_write(0x0400, 0xaa);

        let mut result: Vec<String> = vec![];
        cpu.run_with_callback(|cpu| {
            result.push(trace(cpu));
        })
        .unwrap();

        assert_eq!(
            "4000  11 33    ORA ($33),Y = 0400 @ 0400 = AA  A:00 X:00 Y:00 P:04 SP:FF CYC:0",
            result[0]
        );
    }
}
