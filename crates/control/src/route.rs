//! Routes and their wire chunking.

use crate::error::{ControlError, ControlResult};
use crate::geo::GeoProjector;
use rangelink_codec::Frame;
use serde::{Deserialize, Serialize};

/// Fixed number of header chunks preceding the waypoint data.
pub const HEADER_CHUNKS: usize = 9;

/// Maximum route name length on the wire, bytes.
pub const NAME_MAX: usize = 12;

/// Chunk indices fit in one byte, so waypoint count is bounded.
const WAYPOINT_MAX: usize = u8::MAX as usize - HEADER_CHUNKS;

/// One route waypoint in course-local metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Easting offset from the course origin
    pub x: f32,
    /// Northing offset from the course origin
    pub y: f32,
    /// Per-waypoint behaviour flag (speed class, pause marker)
    pub flag: f32,
}

/// A named scenario route ready for upload.
///
/// The origin quadruple pins the course: geodetic latitude and longitude
/// followed by the projected local coordinates of the same point. Waypoints
/// are relative to that origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    name: String,
    /// Creation date, packed decimal (yyyymmdd)
    pub date: u32,
    /// Creation time, packed decimal (hhmmss)
    pub time: u32,
    /// Course origin: latitude, longitude, local x, local y
    pub origin: [f32; 4],
    /// Ordered waypoints
    pub waypoints: Vec<Waypoint>,
}

impl Route {
    /// Build a route, validating the name and waypoint count.
    pub fn new(
        name: &str,
        date: u32,
        time: u32,
        origin: [f32; 4],
        waypoints: Vec<Waypoint>,
    ) -> ControlResult<Route> {
        if name.len() > NAME_MAX {
            return Err(ControlError::InvalidRoute(format!(
                "name {:?} exceeds {} bytes",
                name, NAME_MAX
            )));
        }
        if waypoints.len() > WAYPOINT_MAX {
            return Err(ControlError::InvalidRoute(format!(
                "{} waypoints exceed the {} chunk limit",
                waypoints.len(),
                WAYPOINT_MAX
            )));
        }
        Ok(Route {
            name: name.to_string(),
            date,
            time,
            origin,
            waypoints,
        })
    }

    /// Build a route from geodetic waypoints via the supplied projection.
    ///
    /// Each point is (latitude, longitude, flag); the origin quadruple is
    /// filled with the geodetic origin and its projection.
    pub fn from_geodetic(
        projector: &dyn GeoProjector,
        name: &str,
        date: u32,
        time: u32,
        origin_lat: f64,
        origin_lon: f64,
        points: &[(f64, f64, f32)],
    ) -> ControlResult<Route> {
        let (origin_x, origin_y) = projector.to_local(origin_lat, origin_lon);
        let waypoints = points
            .iter()
            .map(|&(lat, lon, flag)| {
                let (x, y) = projector.to_local(lat, lon);
                Waypoint {
                    x: (x - origin_x) as f32,
                    y: (y - origin_y) as f32,
                    flag,
                }
            })
            .collect();
        Route::new(
            name,
            date,
            time,
            [
                origin_lat as f32,
                origin_lon as f32,
                origin_x as f32,
                origin_y as f32,
            ],
            waypoints,
        )
    }

    /// Route name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Chunks this route occupies on the wire, header included.
    pub fn chunk_count(&self) -> usize {
        HEADER_CHUNKS + self.waypoints.len()
    }

    /// Serialize the route into its upload frames, in transmission order.
    ///
    /// Nine header chunks carry the name (two halves), date and time, the
    /// origin quadruple interleaved with zero spacers and finally the
    /// waypoint count; every following chunk is one 12-byte waypoint record.
    pub fn chunks(&self, session: u16) -> ControlResult<Vec<Frame>> {
        let total = self.chunk_count() as u8;
        let last = total - 1;
        let mut name = [0u8; NAME_MAX];
        name[..self.name.len()].copy_from_slice(self.name.as_bytes());

        let mut data: Vec<Vec<u8>> = Vec::with_capacity(self.chunk_count());
        data.push(name[..6].to_vec());
        data.push(name[6..].to_vec());
        let mut stamp = Vec::with_capacity(8);
        stamp.extend_from_slice(&self.date.to_le_bytes());
        stamp.extend_from_slice(&self.time.to_le_bytes());
        data.push(stamp);
        data.push(self.origin[0].to_le_bytes().to_vec());
        data.push(vec![0u8; 8]);
        data.push(self.origin[1].to_le_bytes().to_vec());
        data.push(vec![0u8; 8]);
        let mut tail = Vec::with_capacity(8);
        tail.extend_from_slice(&self.origin[2].to_le_bytes());
        tail.extend_from_slice(&self.origin[3].to_le_bytes());
        data.push(tail);
        let mut count = Vec::with_capacity(4);
        count.extend_from_slice(&(self.waypoints.len() as u16).to_le_bytes());
        count.extend_from_slice(&0u16.to_le_bytes());
        data.push(count);

        for waypoint in &self.waypoints {
            let mut record = Vec::with_capacity(12);
            record.extend_from_slice(&waypoint.x.to_le_bytes());
            record.extend_from_slice(&waypoint.y.to_le_bytes());
            record.extend_from_slice(&waypoint.flag.to_le_bytes());
            data.push(record);
        }

        data.iter()
            .enumerate()
            .map(|(index, chunk)| {
                Frame::upload_chunk(session, total, last, index as u8, chunk)
                    .map_err(ControlError::from)
            })
            .collect()
    }
}
