//! Group configuration shared by the prover and verifier processes.
//!
//! Both sides must be configured with the same group; nothing is negotiated
//! over the wire.

use serde::{Deserialize, Serialize};

use crate::error::ParameterError;
use crate::groups::GroupPreset;
use crate::GroupParameters;

/// Selects the group either by preset name or by four explicit decimal values.
///
/// Explicit values take precedence over the preset, and must be given all
/// together. Each may be written as a decimal string or, when it fits, as a
/// bare integer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupSettings {
    pub preset: GroupPreset,
    #[serde(deserialize_with = "decimal::deserialize")]
    pub p: Option<String>,
    #[serde(deserialize_with = "decimal::deserialize")]
    pub q: Option<String>,
    #[serde(deserialize_with = "decimal::deserialize")]
    pub g: Option<String>,
    #[serde(deserialize_with = "decimal::deserialize")]
    pub h: Option<String>,
}

/// Accepts a group value as a string or as an integer.
///
/// TOML and environment providers hand small numbers over as integers, while
/// anything wider than 128 bits stays a string. Both end up as the same
/// decimal text and are checked by [`GroupSettings::build`].
mod decimal {
    use std::fmt;

    use serde::de::{self, Deserializer, Visitor};

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DecimalVisitor)
    }

    struct DecimalVisitor;

    impl<'de> Visitor<'de> for DecimalVisitor {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a decimal string or an unsigned integer")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        // Negative values are kept as text so `build` reports them as malformed.
        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_i128<E: de::Error>(self, v: i128) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: de::Deserializer<'de>,
        {
            deserializer.deserialize_any(self)
        }
    }
}

impl GroupSettings {
    pub fn from_preset(preset: GroupPreset) -> Self {
        Self {
            preset,
            ..Self::default()
        }
    }

    /// Resolves and validates the configured parameters.
    ///
    /// # Errors
    ///
    /// [`ParameterError::Incomplete`] when only some of p, q, g, h are set,
    /// [`ParameterError::Malformed`] for non-decimal values, or the first
    /// failed validation check.
    pub fn build(&self) -> Result<GroupParameters, ParameterError> {
        let explicit = [
            ("p", self.p.as_deref()),
            ("q", self.q.as_deref()),
            ("g", self.g.as_deref()),
            ("h", self.h.as_deref()),
        ];

        match explicit {
            [(_, Some(p)), (_, Some(q)), (_, Some(g)), (_, Some(h))] => {
                GroupParameters::from_decimal(p, q, g, h)
            }
            [(_, None), (_, None), (_, None), (_, None)] => {
                let preset = self.preset.parameters();
                GroupParameters::new(
                    preset.p().clone(),
                    preset.q().clone(),
                    preset.g().clone(),
                    preset.h().clone(),
                )
            }
            _ => {
                let missing = explicit
                    .iter()
                    .find(|(_, value)| value.is_none())
                    .map(|(name, _)| *name)
                    .unwrap_or("p");
                Err(ParameterError::Incomplete(missing))
            }
        }
    }

    /// Short human-readable description for logs.
    pub fn describe(&self) -> String {
        if self.p.is_some() {
            "explicit parameters".to_string()
        } else {
            format!("preset '{}'", self.preset)
        }
    }
}
