//! Named group parameter sets.

use core::fmt;
use core::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::error::ParameterError;
use crate::GroupParameters;

/// RFC 5114 MODP group (2048-bit modulus, 256-bit order).
pub mod rfc5114;

/// 256-bit prime modulus with a 109-bit subgroup. Fast enough for demos, too
/// small for production use.
const DEMO256_P: &str =
    "115792089237316195423570985008687907852837564279074904382605163141518161494337";
const DEMO256_Q: &str = "341948486974166000522343609283189";
const DEMO256_G: &str =
    "3382179820063921351711459720945002840687054300606715993250688069077934439078";
const DEMO256_H: &str =
    "15734512044772852579809405672400984809989858200185405873803418684108726948575";

/// Parameter sets both processes can select by name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupPreset {
    /// p = 23, q = 11, g = 4, h = 9. Only useful for walkthroughs and tests.
    #[default]
    Toy,
    /// 256-bit modulus, 109-bit subgroup.
    Demo256,
    /// RFC 5114 2048-bit group with a 256-bit subgroup.
    Rfc5114,
}

impl GroupPreset {
    /// Returns the preset's canonical name.
    pub fn name(&self) -> &'static str {
        match self {
            GroupPreset::Toy => "toy",
            GroupPreset::Demo256 => "demo256",
            GroupPreset::Rfc5114 => "rfc5114",
        }
    }

    /// Builds the parameters for this preset.
    ///
    /// Presets are known-good constants and are not re-validated here; callers
    /// that accept them from configuration still run [`crate::protocol::params::validate`]
    /// through [`GroupParameters::new`].
    pub fn parameters(&self) -> GroupParameters {
        match self {
            GroupPreset::Toy => GroupParameters::new_unchecked(
                BigUint::from(23u32),
                BigUint::from(11u32),
                BigUint::from(4u32),
                BigUint::from(9u32),
            ),
            GroupPreset::Demo256 => GroupParameters::new_unchecked(
                decimal(DEMO256_P),
                decimal(DEMO256_Q),
                decimal(DEMO256_G),
                decimal(DEMO256_H),
            ),
            GroupPreset::Rfc5114 => rfc5114::parameters(),
        }
    }
}

impl fmt::Display for GroupPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GroupPreset {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "toy" => Ok(GroupPreset::Toy),
            "demo256" => Ok(GroupPreset::Demo256),
            "rfc5114" => Ok(GroupPreset::Rfc5114),
            _ => Err(ParameterError::UnknownPreset(s.to_string())),
        }
    }
}

fn decimal(text: &str) -> BigUint {
    BigUint::parse_bytes(text.as_bytes(), 10)
        .unwrap_or_else(|| unreachable!("preset constants are valid decimals"))
}
