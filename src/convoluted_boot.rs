use crate::shared;
use anyhow::Result;
use rayon::prelude::*;
use serde::Deserialize;
use std::path::Path;
use z3::ast::{Ast, BV};
use z3::{Config, Context, SatResult, Solver};

// Reversed from the bootloader's key check: each of the 7 key words is pushed
// through
//   temp   = val * factor + 0x14800841
//   result = 0xa0f27f57 + temp * 0x45f90000 * temp + temp * 0xfd20dcb3
// and compared against a per-round constant. factor/constant start from a
// seed and are XOR chained with the key lists below for every later round.

const TEMP_OFFSET: u64 = 0x1480_0841;
const RESULT_OFFSET: u64 = 0xa0f2_7f57;
const SQUARE_COEFF: u64 = 0x45f9_0000;
const LINEAR_COEFF: u64 = 0xfd20_dcb3;

// Width of the key words, in bits
const WORD_BITS: u32 = 32;

pub const ROUNDS: usize = 7;

// Optional override for the embedded table
const PARAMS_RESOURCE: &str = "convoluted_boot.json";

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct BootParams {
    pub factor: u32,
    pub constant: u32,
    pub factor_keys: [u32; ROUNDS - 1],
    pub const_keys: [u32; ROUNDS - 1],
}

impl BootParams {
    pub const EMBEDDED: BootParams = BootParams {
        factor: 0xe296_df0b,
        constant: 0x544a_a692,
        factor_keys: [
            0xb079_6ab2,
            0xccdd_f7bc,
            0x16d7_ead8,
            0x0728_9e68,
            0xf680_4ff8,
            0x6ea0_855c,
        ],
        const_keys: [
            0x03b3_211d,
            0x7d26_91d5,
            0x98ad_6bfb,
            0x4a0a_9a7a,
            0x617e_30ed,
            0xc28d_160b,
        ],
    };

    /// Reads `resources/convoluted_boot.json` when present, otherwise the embedded table.
    pub fn load() -> Result<Self> {
        let path = Path::new(shared::RESOURCES).join(PARAMS_RESOURCE);
        Ok(shared::load_resource(&path)?.unwrap_or(Self::EMBEDDED))
    }
}

#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("round {round} has no solution (factor {factor:#010x}, constant {constant:#010x})")]
    Unsatisfiable {
        round: usize,
        factor: u32,
        constant: u32,
    },

    #[error("solver returned {result} without a usable model for round {round}")]
    NoModel { round: usize, result: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rounds {
    pub factors: Vec<u32>,
    pub consts: Vec<u32>,
}

impl Rounds {
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.factors.iter().copied().zip(self.consts.iter().copied())
    }
}

pub fn generate_params(params: &BootParams) -> Rounds {
    Rounds {
        factors: shared::xor_chain(params.factor, &params.factor_keys),
        consts: shared::xor_chain(params.constant, &params.const_keys),
    }
}

fn word<'ctx>(ctx: &'ctx Context, value: u64) -> BV<'ctx> {
    BV::from_u64(ctx, value, WORD_BITS)
}

/// Builds the round equation over `val`, in the shape the bootloader computes it.
pub fn round_equation<'ctx>(ctx: &'ctx Context, val: &BV<'ctx>, factor: u32) -> BV<'ctx> {
    let temp = val
        .bvmul(&word(ctx, factor.into()))
        .bvadd(&word(ctx, TEMP_OFFSET));
    word(ctx, RESULT_OFFSET)
        .bvadd(&temp.bvmul(&word(ctx, SQUARE_COEFF)).bvmul(&temp))
        .bvadd(&temp.bvmul(&word(ctx, LINEAR_COEFF)))
}

/// Asks z3 for a `val` that makes the round equation hit `constant`. The
/// solver lives only for this call.
pub fn solve_round(round: usize, factor: u32, constant: u32) -> Result<u32, Error> {
    let cfg = Config::new();
    let ctx = Context::new(&cfg);
    let solver = Solver::new(&ctx);

    let val = BV::new_const(&ctx, "val", WORD_BITS);
    let result = round_equation(&ctx, &val, factor);
    solver.assert(&result._eq(&word(&ctx, constant.into())));

    match solver.check() {
        SatResult::Sat => solver
            .get_model()
            .and_then(|model| model.eval(&val, true))
            .and_then(|value| value.as_u64())
            .and_then(|value| u32::try_from(value).ok())
            .ok_or_else(|| Error::NoModel {
                round,
                result: "sat".to_string(),
            }),
        SatResult::Unsat => Err(Error::Unsatisfiable {
            round,
            factor,
            constant,
        }),
        SatResult::Unknown => Err(Error::NoModel {
            round,
            result: solver
                .get_reason_unknown()
                .unwrap_or_else(|| "unknown".to_string()),
        }),
    }
}

/// Solves every round and packs the values as little-endian words in round order.
pub fn assemble(rounds: &Rounds) -> Result<Vec<u8>, Error> {
    let inputs: Vec<(u32, u32)> = rounds.iter().collect();
    // collect() on a parallel iterator keeps the input order
    let words = inputs
        .into_par_iter()
        .enumerate()
        .map(|(round, (factor, constant))| solve_round(round, factor, constant))
        .collect::<Vec<_>>()
        .into_iter()
        .collect::<Result<Vec<u32>, Error>>()?;

    Ok(shared::pack_le_words(&words))
}

pub fn recover_boot_key() -> Result<()> {
    let params = BootParams::load()?;
    let key = assemble(&generate_params(&params))?;
    println!("{} (hex: {})", shared::escape_bytes(&key), hex::encode(&key));

    Ok(())
}
