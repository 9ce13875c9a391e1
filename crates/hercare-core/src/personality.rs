//! Personality mode types.
//!
//! A personality mode is a named tone preset applied to outbound chat
//! requests. At this layer it is purely a request parameter and a
//! display label attached to assistant replies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HerCareError;

/// The tone the assistant answers in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalityMode {
    /// Clinical, professional tone.
    #[default]
    Doctor,
    /// Casual, supportive friend tone.
    Bestie,
    /// Warm, older-sister tone.
    Sister,
}

impl PersonalityMode {
    /// The wire representation sent as `personality_mode`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonalityMode::Doctor => "doctor",
            PersonalityMode::Bestie => "bestie",
            PersonalityMode::Sister => "sister",
        }
    }

    /// All selectable modes, in display order.
    pub fn all() -> [PersonalityMode; 3] {
        [
            PersonalityMode::Doctor,
            PersonalityMode::Bestie,
            PersonalityMode::Sister,
        ]
    }
}

impl fmt::Display for PersonalityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PersonalityMode {
    type Err = HerCareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "doctor" => Ok(PersonalityMode::Doctor),
            "bestie" => Ok(PersonalityMode::Bestie),
            "sister" => Ok(PersonalityMode::Sister),
            other => Err(HerCareError::invalid_input(format!(
                "unknown personality mode: '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_doctor() {
        assert_eq!(PersonalityMode::default(), PersonalityMode::Doctor);
    }

    #[test]
    fn test_wire_representation() {
        let json = serde_json::to_string(&PersonalityMode::Bestie).unwrap();
        assert_eq!(json, "\"bestie\"");

        let parsed: PersonalityMode = serde_json::from_str("\"sister\"").unwrap();
        assert_eq!(parsed, PersonalityMode::Sister);
    }

    #[test]
    fn test_from_str_round_trip() {
        for mode in PersonalityMode::all() {
            assert_eq!(mode.as_str().parse::<PersonalityMode>().unwrap(), mode);
        }
        assert!("therapist".parse::<PersonalityMode>().is_err());
    }
}
