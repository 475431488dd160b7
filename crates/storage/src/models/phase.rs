use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Season segment. Week numbers are scoped within a phase.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[serde(alias = "PRE", alias = "Pre")]
    Pre,
    #[serde(alias = "REG", alias = "Reg")]
    Reg,
    #[serde(alias = "POST", alias = "Post")]
    Post,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pre => "pre",
            Self::Reg => "reg",
            Self::Post => "post",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pre" => Ok(Self::Pre),
            "reg" => Ok(Self::Reg),
            "post" => Ok(Self::Post),
            other => Err(format!("unknown phase '{}'", other)),
        }
    }
}

/// A (phase, week) position in the season. Orders PRE < REG < POST, then by
/// week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot {
    pub phase: Phase,
    pub week: i32,
}

impl Slot {
    pub fn new(phase: Phase, week: i32) -> Self {
        Self { phase, week }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_parses_any_case() {
        assert_eq!("REG".parse::<Phase>().unwrap(), Phase::Reg);
        assert_eq!(" post ".parse::<Phase>().unwrap(), Phase::Post);
        assert!("playoffs".parse::<Phase>().is_err());
    }

    #[test]
    fn slots_order_by_phase_then_week() {
        let mut slots = vec![
            Slot::new(Phase::Post, 1),
            Slot::new(Phase::Reg, 2),
            Slot::new(Phase::Pre, 3),
            Slot::new(Phase::Reg, 1),
        ];
        slots.sort();
        assert_eq!(
            slots,
            vec![
                Slot::new(Phase::Pre, 3),
                Slot::new(Phase::Reg, 1),
                Slot::new(Phase::Reg, 2),
                Slot::new(Phase::Post, 1),
            ]
        );
    }

    #[test]
    fn phase_deserializes_uppercase_alias() {
        let parsed: Phase = serde::Deserialize::deserialize(
            serde::de::value::StrDeserializer::<serde::de::value::Error>::new("POST"),
        )
        .unwrap();
        assert_eq!(parsed, Phase::Post);
        assert_eq!(Phase::Post.to_string(), "post");
    }
}
