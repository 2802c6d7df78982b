use crate::spreadsheet::range::Range;
use glob::Pattern;

/// Criteria for choosing the sheet and the region of it that becomes the grid.
#[derive(Clone, Debug, Default)]
pub struct Criteria {
    /// Sheet name patterns; the first sheet matching any of them is read.
    /// None selects the first sheet.
    pub sheet_name_patterns: Option<Vec<Pattern>>,

    /// Data range within the sheet; its top-left cell becomes grid position (0, 0).
    pub range: Option<Range>,
}

impl Criteria {
    /// Checks if a sheet name matches the criteria patterns.
    /// Returns true if no patterns are specified or if name matches any pattern.
    pub fn accept(&self, sheet_name: &str) -> bool {
        if let Some(patterns) = &self.sheet_name_patterns {
            patterns.iter().any(|pattern| pattern.matches(sheet_name))
        } else {
            true
        }
    }
}
