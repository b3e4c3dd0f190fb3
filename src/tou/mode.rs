use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use comfy_table::Color;
use serde_with::{DeserializeFromStr, SerializeDisplay};

/// Battery mode of a device schedule segment.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub enum BatteryMode {
    /// Serve the household first, the battery only covers the deficit.
    #[default]
    LoadFirst,

    /// Charge the battery first.
    BatteryFirst,

    /// Export to the grid first.
    GridFirst,
}

impl BatteryMode {
    pub const fn color(self) -> Color {
        match self {
            Self::LoadFirst => Color::DarkYellow,
            Self::BatteryFirst => Color::Green,
            Self::GridFirst => Color::Blue,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LoadFirst => "load_first",
            Self::BatteryFirst => "battery_first",
            Self::GridFirst => "grid_first",
        }
    }
}

impl Display for BatteryMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown battery mode: `{0}`")]
pub struct UnknownBatteryMode(pub String);

impl FromStr for BatteryMode {
    type Err = UnknownBatteryMode;

    /// Parse any of the spellings seen in the wild: `load_first`, `load-first`, `LoadFirst`,
    /// `load first`, or the inverter's numeric code.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let folded: String = value
            .chars()
            .filter(|char| !matches!(char, '_' | '-' | ' '))
            .map(|char| char.to_ascii_lowercase())
            .collect();
        match folded.as_str() {
            "loadfirst" | "load" | "0" => Ok(Self::LoadFirst),
            "batteryfirst" | "battery" | "1" => Ok(Self::BatteryFirst),
            "gridfirst" | "grid" | "2" => Ok(Self::GridFirst),
            _ => Err(UnknownBatteryMode(value.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spellings() -> Result<(), UnknownBatteryMode> {
        for value in ["load_first", "load-first", "LoadFirst", "load first", "LOAD_FIRST", "0"] {
            assert_eq!(value.parse::<BatteryMode>()?, BatteryMode::LoadFirst, "{value}");
        }
        for value in ["battery_first", "BatteryFirst", "1"] {
            assert_eq!(value.parse::<BatteryMode>()?, BatteryMode::BatteryFirst, "{value}");
        }
        for value in ["grid-first", "Grid First", "2"] {
            assert_eq!(value.parse::<BatteryMode>()?, BatteryMode::GridFirst, "{value}");
        }
        Ok(())
    }

    #[test]
    fn test_parse_unknown() {
        assert!("3".parse::<BatteryMode>().is_err());
        assert!("self_use".parse::<BatteryMode>().is_err());
    }

    #[test]
    fn test_serde() -> serde_json::Result<()> {
        assert_eq!(serde_json::to_string(&BatteryMode::GridFirst)?, r#""grid_first""#);
        let mode: BatteryMode = serde_json::from_str(r#""Battery First""#)?;
        assert_eq!(mode, BatteryMode::BatteryFirst);
        Ok(())
    }
}
