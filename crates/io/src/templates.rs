// Built-in example charts
//
// Each template lists its regions in cell order. Theme cells always equal
// the center of the region they head, so loading a template needs no sync.

use mandala_engine::coords::{Cell, Region};
use mandala_engine::grid::Grid;

pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    regions: [(Region, [&'static str; 9]); 9],
}

impl Template {
    /// A fresh chart holding the template's data.
    pub fn grid(&self) -> Grid {
        Grid::from_fn(|region, cell| {
            self.regions
                .iter()
                .find(|(r, _)| *r == region)
                .and_then(|(_, values)| {
                    Cell::ALL.iter().position(|c| *c == cell).map(|i| values[i])
                })
                .unwrap_or_default()
                .to_string()
        })
    }

    pub fn main_goal(&self) -> &'static str {
        self.regions
            .iter()
            .find(|(r, _)| r.is_center())
            .map(|(_, values)| values[4])
            .unwrap_or_default()
    }
}

// Shohei Ohtani's high-school chart
pub const OHTANI: Template = Template {
    id: "ohtani",
    name: "Shohei Ohtani",
    description: "The chart for becoming the first-round pick of eight teams, written in high school",
    regions: [
        (Region::TopLeft, [
            "Fitness", "Mobility", "RSQ 130kg",
            "Stamina", "Build the body", "Diet & nutrition",
            "Flexibility", "FSQ 90kg", "Body condition",
        ]),
        (Region::Top, [
            "Instep", "Core strength", "Stable axis",
            "Release point", "Control", "Mental",
            "Raise the elbow", "Lower-body lead", "Keep the form",
        ]),
        (Region::TopRight, [
            "Lower-body strength", "Angle on the ball", "Attack with straights",
            "Follow-through", "Pitch quality", "Elbow forward",
            "Breaking balls", "Momentum", "Steady breathing",
        ]),
        (Region::Left, [
            "Read the hitter", "Adapt to situations", "Pitch with power",
            "Handle slumps", "Mental", "Will to win",
            "Guts", "Confidence", "Stay composed",
        ]),
        (Region::Center, [
            "Build the body", "Control", "Pitch quality",
            "Mental", "Drafted first by 8 teams", "160 km/h fastball",
            "Character", "Luck", "Breaking balls",
        ]),
        (Region::Right, [
            "Mobility", "Shoulder strength", "Core power",
            "Pitching form", "160 km/h fastball", "Lower-body strength",
            "Release line", "Gain weight", "Wrist strength",
        ]),
        (Region::BottomLeft, [
            "Gratitude", "Thoughtfulness", "Keep growing",
            "Courtesy", "Character", "Be trusted",
            "Consideration", "Be well liked", "Planning",
        ]),
        (Region::Bottom, [
            "Greetings", "Pick up trash", "Respect umpires",
            "Care for things", "Luck", "Positive thinking",
            "Be cheered for", "Read books", "Care for gear",
        ]),
        (Region::BottomRight, [
            "Curveball", "Slider", "Forkball",
            "Speed", "Breaking balls", "Changeup",
            "More pitch types", "Put away two-strike hitters", "Fastball arm swing",
        ]),
    ],
};

// The chart used to plan this tool
pub const PROJECT: Template = Template {
    id: "mandala-project",
    name: "Mandala Chart project",
    description: "What went into building this chart editor",
    regions: [
        (Region::TopLeft, [
            "Color palette", "Region contrast", "Direct editing",
            "Visual feedback", "UI/UX design", "Responsive layout",
            "Typeface", "Spacing & alignment", "Consistent style",
        ]),
        (Region::Top, [
            "81-cell array", "Region-cell mapping", "Index math",
            "Enum types", "Data model", "Two-way sync",
            "Type safety", "State management", "Immutable snapshots",
        ]),
        (Region::TopRight, [
            "URL encoding", "Compression", "lz-string",
            "Copy link", "Sharing", "Restore from link",
            "Short links", "Clipboard", "Share preview",
        ]),
        (Region::Left, [
            "Tab navigation", "One region view", "Touch targets",
            "Screen detection", "Mobile support", "Button sizing",
            "Scrolling", "Progressive reveal", "Gestures",
        ]),
        (Region::Center, [
            "UI/UX design", "Data model", "Sharing",
            "Mobile support", "Ship the chart editor", "Export",
            "SEO", "User experience", "Tech stack",
        ]),
        (Region::Right, [
            "Image export", "Render all regions", "Copy to clipboard",
            "Output quality", "Export", "CSV and JSON",
            "File download", "Async work", "Error handling",
        ]),
        (Region::BottomLeft, [
            "Meta tags", "Preview image", "Dynamic title",
            "Keywords", "SEO", "Structured data",
            "Social cards", "Sitemap", "Accessibility",
        ]),
        (Region::Bottom, [
            "Instant response", "Loading state", "Error messages",
            "Keyboard support", "User experience", "Saved charts",
            "Templates", "Guidance text", "Intuitive flow",
        ]),
        (Region::BottomRight, [
            "Rust", "serde", "lz-str",
            "clap", "Tech stack", "log",
            "proptest", "tempfile", "url",
        ]),
    ],
};

static TEMPLATES: [&Template; 2] = [&OHTANI, &PROJECT];

pub fn all() -> impl Iterator<Item = &'static Template> {
    TEMPLATES.iter().copied()
}

pub fn by_id(id: &str) -> Option<&'static Template> {
    all().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mandala_engine::activation::active_regions;
    use mandala_engine::store::link_violations;

    #[test]
    fn test_lookup_by_id() {
        assert_eq!(by_id("ohtani").map(|t| t.name), Some("Shohei Ohtani"));
        assert!(by_id("mandala-project").is_some());
        assert!(by_id("missing").is_none());
        assert_eq!(all().count(), 2);
    }

    #[test]
    fn test_templates_are_consistent() {
        for template in all() {
            let grid = template.grid();
            assert!(
                link_violations(&grid).is_empty(),
                "template {} breaks linkage: {:?}",
                template.id,
                link_violations(&grid)
            );
            assert_eq!(active_regions(&grid).len(), 9);
            assert_eq!(grid.filled_count(), 81);
        }
    }

    #[test]
    fn test_template_layout() {
        let grid = OHTANI.grid();
        assert_eq!(grid.main_goal(), "Drafted first by 8 teams");
        assert_eq!(OHTANI.main_goal(), grid.main_goal());
        assert_eq!(grid.at(Region::TopLeft, Cell::TopLeft), "Fitness");
        assert_eq!(grid.at(Region::BottomRight, Cell::BottomRight), "Fastball arm swing");
    }

    #[test]
    fn test_each_grid_is_a_fresh_copy() {
        let a = PROJECT.grid();
        let b = PROJECT.grid();
        assert_eq!(a, b);
        assert!(!a.same_snapshot(&b));
    }

    #[test]
    fn test_regions_listed_once() {
        for template in all() {
            for region in Region::ALL {
                let n = template.regions.iter().filter(|(r, _)| *r == region).count();
                assert_eq!(n, 1, "{} lists {} {} times", template.id, region, n);
            }
        }
    }
}
