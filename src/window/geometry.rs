//! Floating window geometry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Size of the host editor in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorSize {
    /// Total rows (lines).
    pub rows: u16,
    /// Total columns.
    pub cols: u16,
}

impl EditorSize {
    /// Create a new EditorSize with the given dimensions.
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }
}

impl Default for EditorSize {
    fn default() -> Self {
        Self { rows: 24, cols: 80 }
    }
}

/// Border style drawn around a floating window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    None,
    Single,
    Double,
    #[default]
    Rounded,
    Solid,
    Shadow,
}

impl BorderStyle {
    /// Cells consumed on each side by the border.
    pub fn thickness(&self) -> u16 {
        match self {
            BorderStyle::None | BorderStyle::Shadow => 0,
            _ => 1,
        }
    }
}

impl fmt::Display for BorderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BorderStyle::None => "none",
            BorderStyle::Single => "single",
            BorderStyle::Double => "double",
            BorderStyle::Rounded => "rounded",
            BorderStyle::Solid => "solid",
            BorderStyle::Shadow => "shadow",
        };
        f.write_str(name)
    }
}

impl FromStr for BorderStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(BorderStyle::None),
            "single" => Ok(BorderStyle::Single),
            "double" => Ok(BorderStyle::Double),
            "rounded" => Ok(BorderStyle::Rounded),
            "solid" => Ok(BorderStyle::Solid),
            "shadow" => Ok(BorderStyle::Shadow),
            other => Err(format!("unknown border style: {}", other)),
        }
    }
}

/// What the window position is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Relative {
    #[default]
    Editor,
}

/// Window styling taken from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatStyle {
    /// Width as a fraction of editor columns, in (0, 1].
    pub width: f64,
    /// Height as a fraction of editor rows, in (0, 1].
    pub height: f64,
    pub border: BorderStyle,
    /// Transparency level, 0 to 100.
    pub winblend: u8,
}

impl Default for FloatStyle {
    fn default() -> Self {
        Self {
            width: 0.8,
            height: 0.8,
            border: BorderStyle::Rounded,
            winblend: 0,
        }
    }
}

/// Placement descriptor handed to the windowing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatGeometry {
    pub relative: Relative,
    pub width: u16,
    pub height: u16,
    pub row: u16,
    pub col: u16,
    pub border: BorderStyle,
    pub winblend: u8,
    pub title: Option<String>,
}

impl FloatGeometry {
    /// Compute a centered geometry for the given editor size.
    pub fn centered(size: EditorSize, style: &FloatStyle) -> Self {
        let width = scale(size.cols, style.width);
        let height = scale(size.rows, style.height);

        Self {
            relative: Relative::Editor,
            width,
            height,
            row: (size.rows.saturating_sub(height)) / 2,
            col: (size.cols.saturating_sub(width)) / 2,
            border: style.border,
            winblend: style.winblend,
            title: None,
        }
    }

    /// Attach a title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Usable content area (rows, cols) inside the border.
    pub fn inner_size(&self) -> (u16, u16) {
        let edge = self.border.thickness() * 2;
        (
            self.height.saturating_sub(edge).max(1),
            self.width.saturating_sub(edge).max(1),
        )
    }
}

fn scale(total: u16, fraction: f64) -> u16 {
    let scaled = (f64::from(total) * fraction).floor() as u16;
    scaled.clamp(1, total.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style() {
        let style = FloatStyle::default();
        assert_eq!(style.width, 0.8);
        assert_eq!(style.height, 0.8);
        assert_eq!(style.border, BorderStyle::Rounded);
        assert_eq!(style.winblend, 0);
    }

    #[test]
    fn test_centered_geometry() {
        let geometry = FloatGeometry::centered(EditorSize::new(50, 200), &FloatStyle::default());
        assert_eq!(geometry.width, 160);
        assert_eq!(geometry.height, 40);
        assert_eq!(geometry.row, 5);
        assert_eq!(geometry.col, 20);
        assert_eq!(geometry.relative, Relative::Editor);
    }

    #[test]
    fn test_full_size() {
        let style = FloatStyle {
            width: 1.0,
            height: 1.0,
            ..FloatStyle::default()
        };
        let geometry = FloatGeometry::centered(EditorSize::new(24, 80), &style);
        assert_eq!((geometry.width, geometry.height), (80, 24));
        assert_eq!((geometry.row, geometry.col), (0, 0));
    }

    #[test]
    fn test_tiny_editor_never_zero() {
        let geometry = FloatGeometry::centered(EditorSize::new(1, 1), &FloatStyle::default());
        assert_eq!(geometry.width, 1);
        assert_eq!(geometry.height, 1);
    }

    #[test]
    fn test_inner_size() {
        let geometry = FloatGeometry::centered(EditorSize::new(50, 200), &FloatStyle::default());
        assert_eq!(geometry.inner_size(), (38, 158));

        let borderless = FloatStyle {
            border: BorderStyle::None,
            ..FloatStyle::default()
        };
        let geometry = FloatGeometry::centered(EditorSize::new(50, 200), &borderless);
        assert_eq!(geometry.inner_size(), (40, 160));
    }

    #[test]
    fn test_border_parse() {
        assert_eq!("rounded".parse::<BorderStyle>(), Ok(BorderStyle::Rounded));
        assert_eq!("DOUBLE".parse::<BorderStyle>(), Ok(BorderStyle::Double));
        assert!("zigzag".parse::<BorderStyle>().is_err());
        assert_eq!(BorderStyle::Shadow.to_string(), "shadow");
    }

    #[test]
    fn test_title() {
        let geometry =
            FloatGeometry::centered(EditorSize::default(), &FloatStyle::default()).with_title("1/2");
        assert_eq!(geometry.title.as_deref(), Some("1/2"));
    }
}
