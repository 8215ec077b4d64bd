//! Renders a parsed snow report into the page's output slots.

use tracing::{debug, info, warn};

use crate::dates::{self, DateError};
use crate::sink::{OutputSink, SinkError};
use crate::status::{self, Icons};
use crate::xml::{bare, extract, XmlNode};

/// Named insertion points on the snow report page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    LastUpdated,
    FieldStatus,
    FieldInformation,
    RoadStatus,
    RoadInfo,
    LowerBase,
    UpperBase,
    SnowInformation,
    LatestFall,
    LatestFallDate,
    WeatherBrief,
    WeatherWind,
    WeatherTemp,
    WeatherVisibility,
    WeatherDetail,
    Facilities,
}

impl Slot {
    pub const ALL: [Slot; 16] = [
        Slot::LastUpdated,
        Slot::FieldStatus,
        Slot::FieldInformation,
        Slot::RoadStatus,
        Slot::RoadInfo,
        Slot::LowerBase,
        Slot::UpperBase,
        Slot::SnowInformation,
        Slot::LatestFall,
        Slot::LatestFallDate,
        Slot::WeatherBrief,
        Slot::WeatherWind,
        Slot::WeatherTemp,
        Slot::WeatherVisibility,
        Slot::WeatherDetail,
        Slot::Facilities,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Slot::LastUpdated => "lastUpdated",
            Slot::FieldStatus => "skiFieldStatus",
            Slot::FieldInformation => "skiFieldInformation",
            Slot::RoadStatus => "roadStatus",
            Slot::RoadInfo => "roadInfo",
            Slot::LowerBase => "lowerBase",
            Slot::UpperBase => "upperBase",
            Slot::SnowInformation => "snowInformation",
            Slot::LatestFall => "latestFall",
            Slot::LatestFallDate => "latestFallDate",
            Slot::WeatherBrief => "weatherBrief",
            Slot::WeatherWind => "weatherWind",
            Slot::WeatherTemp => "weatherTemp",
            Slot::WeatherVisibility => "weatherVisibility",
            Slot::WeatherDetail => "weatherDetail",
            Slot::Facilities => "fac",
        }
    }

    /// Heading used when the slots are shown outside the page.
    pub fn title(self) -> &'static str {
        match self {
            Slot::LastUpdated => "Last updated",
            Slot::FieldStatus => "Ski field",
            Slot::FieldInformation => "Information",
            Slot::RoadStatus => "Road",
            Slot::RoadInfo => "Road detail",
            Slot::LowerBase => "Lower base",
            Slot::UpperBase => "Upper base",
            Slot::SnowInformation => "Snow",
            Slot::LatestFall => "Latest fall",
            Slot::LatestFallDate => "Latest fall date",
            Slot::WeatherBrief => "Weather",
            Slot::WeatherWind => "Wind",
            Slot::WeatherTemp => "Temperature",
            Slot::WeatherVisibility => "Visibility",
            Slot::WeatherDetail => "Weather detail",
            Slot::Facilities => "Facilities",
        }
    }
}

pub const UNAVAILABLE: &str = "Snow report currently unavailable";

/// Outcome of one render pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenderSummary {
    pub written: usize,
    pub failed: usize,
}

impl RenderSummary {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

struct Renderer<'a, S: OutputSink> {
    sink: &'a mut S,
    icons: &'a Icons,
    summary: RenderSummary,
}

impl<S: OutputSink> Renderer<'_, S> {
    /// A slot the sink cannot take is counted and skipped.
    fn write(&mut self, slot: Slot, markup: &str) {
        debug!(slot = slot.id(), len = markup.len(), "writing slot");
        match self.sink.set_field(slot.id(), markup) {
            Ok(()) => self.summary.written += 1,
            Err(err) => {
                warn!(slot = slot.id(), "skipped: {err}");
                self.summary.failed += 1;
            }
        }
    }

    fn section(&mut self, name: &str, f: impl FnOnce(&mut Self) -> Result<(), DateError>) {
        if let Err(err) = f(self) {
            warn!(section = name, "skipped: {err}");
            self.summary.failed += 1;
        }
    }
}

/// Render every section of `document` into `sink`.
///
/// Sections are independent: a slot the sink rejects or a malformed date
/// loses only that value. Blocks missing from the report leave their slots
/// untouched; blocks that are present overwrite them, empty values included.
pub fn render<S: OutputSink>(document: &XmlNode, sink: &mut S, icons: &Icons) -> RenderSummary {
    let report = document.self_and_elements_by_tag("report");
    let Some(skiarea) = report.first().and_then(|r| r.first_by_tag("skiarea")) else {
        warn!("report has no skiarea record");
        return RenderSummary {
            written: 0,
            failed: 1,
        };
    };
    let skiarea = [skiarea];
    let field = skiarea[0].elements_by_tag("status");
    let weather = skiarea[0].elements_by_tag("weather");
    let snow = skiarea[0].elements_by_tag("snow");
    let road = skiarea[0].elements_by_tag("road");
    let facilities = skiarea[0].elements_by_tag("facilities");

    let mut r = Renderer {
        sink,
        icons,
        summary: RenderSummary::default(),
    };

    r.section("last updated", |r| {
        let updated = dates::parse_update_time(&extract(&report, &["date", "time"]))?;
        r.write(Slot::LastUpdated, &dates::time_and_date(&updated));
        Ok(())
    });

    if !field.is_empty() {
        r.write(Slot::FieldStatus, &field_status(&field, icons));
    }
    if skiarea[0].first_by_tag("information").is_some() {
        r.write(Slot::FieldInformation, &extract(&skiarea, &["information"]));
    }

    if !road.is_empty() {
        let brief = extract(&road, &["brief"]);
        let indicator = status::road_indicator(bare(&brief));
        debug!(%indicator, "road status");
        r.write(Slot::RoadStatus, &format!("{brief}{}", icons.markup(indicator)));
        r.write(Slot::RoadInfo, &extract(&road, &["detail"]));
    }

    if !snow.is_empty() {
        r.write(Slot::LowerBase, &extract(&snow, &["base"]));
        r.write(Slot::UpperBase, &extract(&snow, &["upperbase"]));
        r.write(Slot::SnowInformation, &extract(&snow, &["detail"]));
        r.write(Slot::LatestFall, &extract(&snow, &["latestfall"]));
        r.section("latest fall date", |r| {
            let day = dates::parse_day(&extract(&snow, &["latestfalldate"]))?;
            r.write(Slot::LatestFallDate, &dates::long_date(&day));
            Ok(())
        });
    }

    if !weather.is_empty() {
        r.write(Slot::WeatherBrief, &extract(&weather, &["brief"]));
        r.write(Slot::WeatherWind, &extract(&weather, &["wind"]));
        let temperature = extract(&weather, &["temperature"]);
        r.write(Slot::WeatherTemp, strip_unit(bare(&temperature)));
        r.write(Slot::WeatherVisibility, &extract(&weather, &["visibility"]));
        r.write(Slot::WeatherDetail, &extract(&weather, &["detail"]));
    }

    if let Some(block) = facilities.first() {
        r.write(Slot::Facilities, &render_facilities(block, icons));
    }

    info!(
        written = r.summary.written,
        failed = r.summary.failed,
        "rendered snow report"
    );
    r.summary
}

/// Status label, the opening date when one is announced, and the indicator.
fn field_status(block: &[&XmlNode], icons: &Icons) -> String {
    let mut label = extract(block, &["label"]);
    let opening = extract(block, &["openingdate"]);
    if !opening.is_empty() {
        match dates::parse_day(&opening) {
            Ok(day) => label.push_str(&dates::long_date(&day)),
            Err(err) => warn!("ignoring opening date: {err}"),
        }
    }
    label.push(' ');

    let indicator = status::code_indicator(bare(&extract(block, &["code"])));
    debug!(%indicator, "field status");
    label.push_str(icons.markup(indicator));
    label
}

/// One heading per facility, in document order, each followed by its
/// classified status.
pub fn render_facilities(facilities: &XmlNode, icons: &Icons) -> String {
    let mut out = String::new();
    for group in facilities.elements_by_tag("facilitytype") {
        for facility in group.elements_by_tag("facility") {
            let facility_status = facility.elements_by_tag("status");
            let label = extract(&facility_status, &["label"]);
            let code = extract(&facility_status, &["code"]);
            let indicator = status::code_indicator(bare(&code));
            let name = facility
                .first_by_tag("name")
                .and_then(XmlNode::text)
                .unwrap_or_default();
            out.push_str(&format!(
                "<h3>{name}:</h3>{label}{}</br>",
                icons.markup(indicator)
            ));
        }
    }
    out
}

/// Temperatures arrive with a trailing unit character.
fn strip_unit(raw: &str) -> &str {
    match raw.char_indices().next_back() {
        Some((last, _)) => &raw[..last],
        None => raw,
    }
}

/// Flag the page as stale after a failed load. Only the last-updated slot is
/// touched; everything else keeps its previous content.
pub fn render_unavailable<S: OutputSink>(sink: &mut S) -> Result<(), SinkError> {
    sink.set_field(Slot::LastUpdated.id(), UNAVAILABLE)
}
