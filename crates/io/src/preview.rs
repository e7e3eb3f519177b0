// Share-link preview text
//
// Link unfurlers show a title and a one-line description. A shared chart
// is titled by its main goal; anything else gets the generic text.

use serde::Serialize;

use mandala_engine::grid::Grid;

use crate::share;

pub const DEFAULT_TITLE: &str = "Mandala Chart";
pub const DEFAULT_DESCRIPTION: &str = "Turn one goal into nine, and nine into action.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub title: String,
    pub description: String,
}

impl Default for Preview {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
        }
    }
}

/// Preview for a chart.
pub fn for_grid(grid: &Grid) -> Preview {
    let goal = grid.main_goal().trim();
    if goal.is_empty() {
        return Preview::default();
    }
    Preview {
        title: goal.to_string(),
        description: format!("A Mandala Chart for {}", goal.replace('\n', " ")),
    }
}

/// Preview for a share code; missing or invalid codes get the default.
pub fn for_code(code: Option<&str>) -> Preview {
    match code.map(share::decode) {
        Some(Ok(grid)) => for_grid(&grid),
        _ => Preview::default(),
    }
}
