//! Chart
//!
//! Two renderings of the same history data: a raw index-based mapper that
//! produces SVG coordinates, and a time-scaled axis chart with padded
//! domains used by the text view.

pub mod axis;
pub mod mapper;
pub mod svg;

pub use axis::{
    build_axis_chart, format_axis_value, format_timestamp, format_x_tick, padded_domain, AxisChart,
    XDomain,
};
pub use mapper::{build_chart, x_for_index, y_for_value, ChartGeometry, PlotPoint, ValueRange};
pub use svg::{render_svg, ChartError};
