//! Grid size enumeration.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Supported board shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GridSize {
    #[default]
    #[serde(rename = "3x3")]
    ThreeByThree,
    #[serde(rename = "3x4")]
    ThreeByFour,
    #[serde(rename = "4x4")]
    FourByFour,
}

impl GridSize {
    pub const ALL: [GridSize; 3] = [Self::ThreeByThree, Self::ThreeByFour, Self::FourByFour];

    pub fn rows(self) -> usize {
        match self {
            Self::ThreeByThree | Self::ThreeByFour => 3,
            Self::FourByFour => 4,
        }
    }

    pub fn cols(self) -> usize {
        match self {
            Self::ThreeByThree => 3,
            Self::ThreeByFour | Self::FourByFour => 4,
        }
    }

    pub fn cell_count(self) -> usize {
        self.rows() * self.cols()
    }

    /// Minimum number of goals the submission form must supply.
    pub fn min_goals(self) -> usize {
        self.cell_count()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThreeByThree => "3x3",
            Self::ThreeByFour => "3x4",
            Self::FourByFour => "4x4",
        }
    }
}

impl Display for GridSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a grid size string is not one of the supported shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseGridSizeError(pub String);

impl Display for ParseGridSizeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let expected: Vec<&str> = GridSize::ALL.iter().map(|grid| grid.as_str()).collect();
        write!(
            f,
            "unsupported grid size `{}`; expected {}",
            self.0,
            expected.join("|")
        )
    }
}

impl Error for ParseGridSizeError {}

impl FromStr for GridSize {
    type Err = ParseGridSizeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('×', "x");
        let compact = normalized.replace(' ', "");
        Self::ALL
            .into_iter()
            .find(|grid| grid.as_str() == compact)
            .ok_or_else(|| ParseGridSizeError(value.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::GridSize;

    #[test]
    fn cell_counts_match_minimum_goal_counts() {
        assert_eq!(GridSize::ThreeByThree.min_goals(), 9);
        assert_eq!(GridSize::ThreeByFour.min_goals(), 12);
        assert_eq!(GridSize::FourByFour.min_goals(), 16);
    }

    #[test]
    fn parses_common_spellings() {
        assert_eq!("3x3".parse::<GridSize>(), Ok(GridSize::ThreeByThree));
        assert_eq!(" 3X4 ".parse::<GridSize>(), Ok(GridSize::ThreeByFour));
        assert_eq!("4 × 4".parse::<GridSize>(), Ok(GridSize::FourByFour));
        let err = "5x5".parse::<GridSize>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported grid size `5x5`; expected 3x3|3x4|4x4"
        );
    }

    #[test]
    fn serde_uses_display_form() {
        let json = serde_json::to_string(&GridSize::ThreeByFour).unwrap();
        assert_eq!(json, "\"3x4\"");
        let parsed: GridSize = serde_json::from_str("\"4x4\"").unwrap();
        assert_eq!(parsed, GridSize::FourByFour);
    }
}
