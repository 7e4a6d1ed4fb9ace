//! SVG rendering for the raw chart geometry

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use thiserror::Error;

use super::mapper::ChartGeometry;
use crate::config::ChartConfig;

pub const TEMPERATURE_STROKE: &str = "#cc2936";
pub const HUMIDITY_STROKE: &str = "#1f77b4";
pub const CHART_LABEL: &str = "Temperature and humidity history chart";
pub const NO_DATA_TEXT: &str = "No history data yet.";

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to render chart: {0}")]
    Render(String),
}

impl From<quick_xml::Error> for ChartError {
    fn from(e: quick_xml::Error) -> Self {
        ChartError::Render(e.to_string())
    }
}

/// Render `geometry` as a standalone SVG document
pub fn render_svg(geometry: &ChartGeometry, frame: &ChartConfig) -> Result<String, ChartError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    let width = frame.width.to_string();
    let height = frame.height.to_string();
    let view_box = format!("0 0 {} {}", frame.width, frame.height);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("svg").with_attributes([
        ("xmlns", "http://www.w3.org/2000/svg"),
        ("width", width.as_str()),
        ("height", height.as_str()),
        ("viewBox", view_box.as_str()),
        ("role", "img"),
        ("aria-label", CHART_LABEL),
    ])))?;

    if geometry.is_empty() {
        let x = (frame.width / 2.0).to_string();
        let y = (frame.height / 2.0).to_string();

        writer.write_event(Event::Start(BytesStart::new("text").with_attributes([
            ("x", x.as_str()),
            ("y", y.as_str()),
            ("text-anchor", "middle"),
        ])))?;
        writer.write_event(Event::Text(BytesText::new(NO_DATA_TEXT)))?;
        writer.write_event(Event::End(BytesEnd::new("text")))?;
    } else {
        write_polyline(&mut writer, &ChartGeometry::polyline(&geometry.temperature_line), TEMPERATURE_STROKE)?;
        write_polyline(&mut writer, &ChartGeometry::polyline(&geometry.humidity_line), HUMIDITY_STROKE)?;
    }

    writer.write_event(Event::End(BytesEnd::new("svg")))?;

    String::from_utf8(writer.into_inner().into_inner()).map_err(|e| ChartError::Render(e.to_string()))
}

fn write_polyline(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    points: &str,
    stroke: &str,
) -> Result<(), ChartError> {
    writer.write_event(Event::Empty(BytesStart::new("polyline").with_attributes([
        ("fill", "none"),
        ("stroke", stroke),
        ("stroke-width", "2"),
        ("points", points),
    ])))?;
    Ok(())
}
