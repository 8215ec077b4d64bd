//! Classification of field, road, and facility status into indicators.

use std::fmt;

pub const DEFAULT_ICON_BASE: &str = "https://tukino.org/assets/snow-report";

const CODE_OPEN: &str = "2";
const CODE_ON_HOLD: &str = "1";

const ROAD_CLOSED: [&str; 2] = ["Closed", "Shuttle Bus only"];
const ROAD_OPEN_PREFIX: &str = "Open";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Tick,
    Pause,
    Cross,
}

impl Indicator {
    fn name(self) -> &'static str {
        match self {
            Indicator::Tick => "tick",
            Indicator::Pause => "pause",
            Indicator::Cross => "cross",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Markup written after a status label for each indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct Icons {
    tick: String,
    pause: String,
    cross: String,
}

impl Icons {
    /// `<img>` tags pointing at `<base>/tick.png` and friends.
    pub fn html(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        let img = |name: &str| {
            format!("<img src='{base}/{name}.png' height='15' width='15'></img>")
        };
        Self {
            tick: img("tick"),
            pause: img("pause"),
            cross: img("cross"),
        }
    }

    /// Plain glyphs for terminal output.
    pub fn glyphs() -> Self {
        Self {
            tick: "✔".to_string(),
            pause: "⏸".to_string(),
            cross: "✘".to_string(),
        }
    }

    pub fn markup(&self, indicator: Indicator) -> &str {
        match indicator {
            Indicator::Tick => &self.tick,
            Indicator::Pause => &self.pause,
            Indicator::Cross => &self.cross,
        }
    }
}

impl Default for Icons {
    fn default() -> Self {
        Self::html(DEFAULT_ICON_BASE)
    }
}

/// Field and facility status codes: `2` open, `1` on hold, anything else is
/// treated as closed.
pub fn code_indicator(code: &str) -> Indicator {
    match code {
        CODE_OPEN => Indicator::Tick,
        CODE_ON_HOLD => Indicator::Pause,
        _ => Indicator::Cross,
    }
}

/// Road briefs default to the cautionary pause, unlike status codes.
pub fn road_indicator(brief: &str) -> Indicator {
    if ROAD_CLOSED.contains(&brief) {
        Indicator::Cross
    } else if brief.starts_with(ROAD_OPEN_PREFIX) {
        Indicator::Tick
    } else {
        Indicator::Pause
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_codes() {
        assert_eq!(code_indicator("2"), Indicator::Tick);
        assert_eq!(code_indicator("1"), Indicator::Pause);
        assert_eq!(code_indicator("3"), Indicator::Cross);
        assert_eq!(code_indicator(""), Indicator::Cross);
        assert_eq!(code_indicator("open"), Indicator::Cross);
    }

    #[test]
    fn road_briefs() {
        assert_eq!(road_indicator("Closed"), Indicator::Cross);
        assert_eq!(road_indicator("Shuttle Bus only"), Indicator::Cross);
        assert_eq!(road_indicator("Open (4WD)"), Indicator::Tick);
        assert_eq!(road_indicator("Open"), Indicator::Tick);
        assert_eq!(road_indicator("4WD with chains"), Indicator::Pause);
        assert_eq!(road_indicator("on hold"), Indicator::Pause);
        assert_eq!(road_indicator("Closed for grading"), Indicator::Pause);
        assert_eq!(road_indicator(""), Indicator::Pause);
    }

    #[test]
    fn html_icons() {
        let icons = Icons::html("https://example.org/icons/");
        assert_eq!(
            icons.markup(Indicator::Pause),
            "<img src='https://example.org/icons/pause.png' height='15' width='15'></img>"
        );
        assert!(Icons::default()
            .markup(Indicator::Tick)
            .contains("tukino.org/assets/snow-report/tick.png"));
    }
}
