//! Level files.
//!
//! A level is a small line-oriented text file. Lines starting with `//` are
//! comments; blank lines are ignored.
//!
//! ```text
//! // width,height,moves,minGold,minSilver,maxTimeSeconds,swaps
//! 3,3,5,3,1,-1,5
//! r,r,r,x,x,x,x,r,x
//! ```
//!
//! Layout tokens, one per cell in row-major order:
//!
//! | Token | Meaning |
//! |-------|---------|
//! | `x`, `^` | empty |
//! | `r`, `b`, `g`, `y` | fixed Red, Blue, Green, Yellow |
//! | `?` | random color, drawn when the level is loaded |
//!
//! The numeric level id comes from the file name: the digits before the
//! first `.` (`12.lvl` is level 12).

use std::path::Path;
use std::str::FromStr;

use crate::error::LevelError;
use crate::types::{Color, DEFAULT_CLASSIC_HEIGHT, DEFAULT_CLASSIC_WIDTH};

const HEADER_FIELDS: usize = 7;

/// Initial content of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutToken {
    Empty,
    Fixed(Color),
    Random,
}

impl LayoutToken {
    /// Parse a single layout token
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "x" | "^" => Some(LayoutToken::Empty),
            "r" => Some(LayoutToken::Fixed(Color::Red)),
            "b" => Some(LayoutToken::Fixed(Color::Blue)),
            "g" => Some(LayoutToken::Fixed(Color::Green)),
            "y" => Some(LayoutToken::Fixed(Color::Yellow)),
            "?" => Some(LayoutToken::Random),
            _ => None,
        }
    }

    /// True for tokens that place a tile
    pub fn is_tile(&self) -> bool {
        !matches!(self, LayoutToken::Empty)
    }
}

/// Parsed, immutable description of a level
#[derive(Debug, Clone, PartialEq)]
pub struct LevelData {
    pub id: u32,
    pub width: u16,
    pub height: u16,
    pub moves_left: u32,
    pub min_gold: u32,
    pub min_silver: u32,
    /// Seconds; negative means unlimited
    pub max_time: f32,
    pub swaps_left: u32,
    pub layout: Vec<LayoutToken>,
    /// Colors dropped from the tail of [`Color::PALETTE`] when drawing random tiles
    pub excluded_colors: u8,
}

impl LevelData {
    /// Empty level of the given size with unlimited time and no budgets.
    ///
    /// Used by classic mode, which starts from a blank board.
    pub fn blank(width: u16, height: u16) -> Self {
        let cells = width as usize * height as usize;
        Self {
            id: 0,
            width,
            height,
            moves_left: 0,
            min_gold: 0,
            min_silver: 0,
            max_time: -1.0,
            swaps_left: 0,
            layout: vec![LayoutToken::Empty; cells],
            excluded_colors: default_excluded_colors(width, height),
        }
    }

    /// Parse level text. The id is left at 0.
    pub fn parse(text: &str) -> Result<Self, LevelError> {
        let mut lines = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with("//"));

        let header = lines.next().ok_or(LevelError::MissingHeader)?;
        let fields: Vec<&str> = header.split(',').map(str::trim).collect();
        if fields.len() != HEADER_FIELDS {
            return Err(LevelError::HeaderFieldCount {
                found: fields.len(),
            });
        }

        let width: u16 = number("width", fields[0])?;
        let height: u16 = number("height", fields[1])?;
        let moves_left: u32 = number("movesLeft", fields[2])?;
        let min_gold: u32 = number("minGoldMoves", fields[3])?;
        let min_silver: u32 = number("minSilverMoves", fields[4])?;
        let max_time: f32 = number("maxTimeSeconds", fields[5])?;
        let swaps_left: u32 = number("swapsLeft", fields[6])?;

        if width == 0 || height == 0 {
            return Err(LevelError::ZeroDimension { width, height });
        }

        let layout_line = lines.next().ok_or(LevelError::MissingLayout)?;
        let tokens: Vec<&str> = layout_line.split(',').map(str::trim).collect();
        let expected = width as usize * height as usize;
        if tokens.len() != expected {
            return Err(LevelError::TokenCount {
                expected,
                found: tokens.len(),
            });
        }

        let layout = tokens
            .iter()
            .enumerate()
            .map(|(position, token)| {
                LayoutToken::from_str(token).ok_or_else(|| LevelError::UnknownToken {
                    token: token.to_string(),
                    position,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(extra) = lines.next() {
            return Err(LevelError::TrailingContent {
                line: extra.to_string(),
            });
        }

        Ok(Self {
            id: 0,
            width,
            height,
            moves_left,
            min_gold,
            min_silver,
            max_time,
            swaps_left,
            layout,
            excluded_colors: default_excluded_colors(width, height),
        })
    }

    /// Read and parse a level file, deriving the id from its name
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let id = level_id_from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text)?.with_id(id))
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }

    /// Override how many palette colors random tiles may not use (max 3)
    pub fn with_excluded_colors(mut self, excluded: u8) -> Self {
        self.excluded_colors = excluded.min(Color::PALETTE.len() as u8 - 1);
        self
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of cells that start with a tile
    pub fn tile_count(&self) -> usize {
        self.layout.iter().filter(|t| t.is_tile()).count()
    }

    /// True when the level has a finite time budget
    pub fn is_timed(&self) -> bool {
        self.max_time >= 0.0
    }
}

impl FromStr for LevelData {
    type Err = LevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The 4x4 board draws from three colors only; every other size uses all four.
pub fn default_excluded_colors(width: u16, height: u16) -> u8 {
    if width == DEFAULT_CLASSIC_WIDTH && height == DEFAULT_CLASSIC_HEIGHT {
        1
    } else {
        0
    }
}

/// Level id from a file name: digits before the first `.`.
pub fn level_id_from_path(path: &Path) -> Result<u32, LevelError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .and_then(|stem| stem.parse::<u32>().ok())
        .ok_or_else(|| LevelError::LevelId(path.to_path_buf()))
}

fn number<T: FromStr>(field: &'static str, value: &str) -> Result<T, LevelError> {
    value.parse().map_err(|_| LevelError::NonNumericField {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_minimal_level() {
        let level = LevelData::parse("2,1,4,3,1,30.5,2\nr,?\n").unwrap();
        assert_eq!(level.width, 2);
        assert_eq!(level.height, 1);
        assert_eq!(level.moves_left, 4);
        assert_eq!(level.max_time, 30.5);
        assert_eq!(level.swaps_left, 2);
        assert_eq!(
            level.layout,
            vec![LayoutToken::Fixed(Color::Red), LayoutToken::Random]
        );
        assert_eq!(level.excluded_colors, 0);
    }

    #[test]
    fn test_comments_and_crlf_are_skipped() {
        let text = "// header\r\n1,1,0,0,0,-1,0\r\n// layout\r\n^\r\n";
        let level = LevelData::parse(text).unwrap();
        assert_eq!(level.layout, vec![LayoutToken::Empty]);
        assert!(!level.is_timed());
    }

    #[test]
    fn test_four_by_four_excludes_one_color() {
        let layout = vec!["x"; 16].join(",");
        let level = LevelData::parse(&format!("4,4,1,1,1,-1,1\n{}", layout)).unwrap();
        assert_eq!(level.excluded_colors, 1);
        assert_eq!(level.with_excluded_colors(9).excluded_colors, 3);
    }

    #[test]
    fn test_header_errors() {
        assert!(matches!(
            LevelData::parse("// only comments\n"),
            Err(LevelError::MissingHeader)
        ));
        assert!(matches!(
            LevelData::parse("3,3,5\nx"),
            Err(LevelError::HeaderFieldCount { found: 3 })
        ));
        assert!(matches!(
            LevelData::parse("3,three,5,3,1,-1,5\nx"),
            Err(LevelError::NonNumericField { field: "height", .. })
        ));
        assert!(matches!(
            LevelData::parse("0,3,5,3,1,-1,5\n"),
            Err(LevelError::ZeroDimension { .. })
        ));
    }

    #[test]
    fn test_layout_errors() {
        assert!(matches!(
            LevelData::parse("2,1,5,3,1,-1,5"),
            Err(LevelError::MissingLayout)
        ));
        assert!(matches!(
            LevelData::parse("2,1,5,3,1,-1,5\nr"),
            Err(LevelError::TokenCount {
                expected: 2,
                found: 1
            })
        ));
        assert!(matches!(
            LevelData::parse("2,1,5,3,1,-1,5\nr,q"),
            Err(LevelError::UnknownToken { position: 1, .. })
        ));
        assert!(matches!(
            LevelData::parse("1,1,5,3,1,-1,5\nr\nr"),
            Err(LevelError::TrailingContent { .. })
        ));
    }

    #[test]
    fn test_level_id_from_file_name() {
        assert_eq!(level_id_from_path(Path::new("levels/12.lvl")).unwrap(), 12);
        assert_eq!(level_id_from_path(Path::new("7.level.txt")).unwrap(), 7);
        assert!(level_id_from_path(&PathBuf::from("intro.lvl")).is_err());
    }
}
