//! GPS track output
//!
//! Rows carrying a GPS position become GPX track points. GPS logs store time
//! as a week number plus milliseconds into the week, counted from the GPS
//! epoch (1980-01-06T00:00:00Z). No leap-second correction is applied.

use crate::error::{ExportError, Result};
use crate::types::{Row, TrackPoint, Value};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use std::io::Write;
use tracing::debug;

/// Seconds between the Unix epoch and the GPS epoch
pub const GPS_EPOCH_UNIX_SECONDS: i64 = 315_964_800;
const MS_PER_WEEK: i64 = 7 * 24 * 60 * 60 * 1000;

const GPS_TIME: &str = "GPS_TimeMS";
const GPS_WEEK: &str = "GPS_Week";
const GPS_LAT: &str = "GPS_Lat";
const GPS_LNG: &str = "GPS_Lng";
const GPS_ALT: &str = "GPS_Alt";
const GPS_HDOP: &str = "GPS_HDop";
const GPS_SPEED: &str = "GPS_Spd";

/// Convert GPS week + milliseconds of week to UTC. `None` on overflow.
pub fn gps_time_to_utc(week: i64, time_ms: i64) -> Option<DateTime<Utc>> {
    let millis = week
        .checked_mul(MS_PER_WEEK)?
        .checked_add(time_ms)?
        .checked_add(GPS_EPOCH_UNIX_SECONDS * 1000)?;
    Utc.timestamp_millis_opt(millis).single()
}

fn exact_integer(row: &Row, label: &str) -> Result<i64> {
    let value = row.get(label).ok_or_else(|| ExportError::MalformedTimestamp {
        label: label.to_string(),
        value: "<missing>".to_string(),
    })?;
    value.as_exact_i64().ok_or_else(|| ExportError::MalformedTimestamp {
        label: label.to_string(),
        value: value.to_string(),
    })
}

/// Read a finite number. NaN and infinities have no GPX representation.
fn numeric(label: &str, value: &Value) -> Result<f64> {
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ExportError::MalformedField {
            label: label.to_string(),
            value: value.to_string(),
        })
}

fn optional_numeric(row: &Row, label: &str) -> Result<Option<f64>> {
    row.get(label).map(|value| numeric(label, value)).transpose()
}

/// Build a track point from one row.
///
/// Returns `Ok(None)` for rows without `GPS_TimeMS` or without a position.
/// A positioned row whose week or time-of-week is not an integer is an error.
pub fn track_point_from_row(row: &Row) -> Result<Option<TrackPoint>> {
    if !row.contains(GPS_TIME) {
        return Ok(None);
    }
    let (Some(lat), Some(lng), Some(alt)) = (row.get(GPS_LAT), row.get(GPS_LNG), row.get(GPS_ALT))
    else {
        debug!("Skipping GPS row without a position");
        return Ok(None);
    };

    let week = exact_integer(row, GPS_WEEK)?;
    let time_ms = exact_integer(row, GPS_TIME)?;
    let time = gps_time_to_utc(week, time_ms).ok_or_else(|| ExportError::MalformedTimestamp {
        label: GPS_WEEK.to_string(),
        value: format!("week {week}, {time_ms} ms out of range"),
    })?;

    Ok(Some(TrackPoint {
        time,
        latitude: numeric(GPS_LAT, lat)?,
        longitude: numeric(GPS_LNG, lng)?,
        elevation: numeric(GPS_ALT, alt)?,
        hdop: optional_numeric(row, GPS_HDOP)?,
        speed: optional_numeric(row, GPS_SPEED)?,
    }))
}

/// Collect track points in row order
pub fn build_track(rows: &[Row]) -> Result<Vec<TrackPoint>> {
    let mut points = Vec::new();
    for row in rows {
        if let Some(point) = track_point_from_row(row)? {
            points.push(point);
        }
    }
    Ok(points)
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Writes one GPX 1.1 document with a single track and segment
pub struct TrackExporter<W: Write> {
    sink: W,
    points_written: usize,
}

impl<W: Write> TrackExporter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            points_written: 0,
        }
    }

    pub fn write_header(&mut self, track_name: &str) -> Result<()> {
        writeln!(self.sink, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            self.sink,
            r#"<gpx creator="{} {}" version="1.1" xmlns="http://www.topografix.com/GPX/1/1" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://www.topografix.com/GPX/1/1 http://www.topografix.com/GPX/1/1/gpx.xsd">"#,
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        )?;
        let name = escape_xml(track_name);
        writeln!(self.sink, "<trk><name>{name}</name><trkseg>")?;
        Ok(())
    }

    pub fn write_point(&mut self, point: &TrackPoint) -> Result<()> {
        write!(
            self.sink,
            r#"  <trkpt lat="{}" lon="{}"><ele>{}</ele><time>{}</time>"#,
            point.latitude,
            point.longitude,
            point.elevation,
            point.time.to_rfc3339_opts(SecondsFormat::Millis, true)
        )?;
        if let Some(hdop) = point.hdop {
            write!(self.sink, "<hdop>{hdop}</hdop>")?;
        }
        // GPX 1.1 has no speed element
        if let Some(speed) = point.speed {
            write!(self.sink, "<extensions><speed>{speed}</speed></extensions>")?;
        }
        writeln!(self.sink, "</trkpt>")?;
        self.points_written += 1;
        Ok(())
    }

    pub fn points_written(&self) -> usize {
        self.points_written
    }

    /// Close the document and flush
    pub fn finish(mut self) -> Result<()> {
        writeln!(self.sink, "</trkseg></trk>")?;
        writeln!(self.sink, "</gpx>")?;
        self.sink.flush()?;
        Ok(())
    }
}

/// Write a full GPX document for the given points
pub fn write_gpx<W: Write>(sink: W, points: &[TrackPoint], track_name: &str) -> Result<usize> {
    let mut exporter = TrackExporter::new(sink);
    exporter.write_header(track_name)?;
    for point in points {
        exporter.write_point(point)?;
    }
    let points_written = exporter.points_written();
    exporter.finish()?;
    Ok(points_written)
}
