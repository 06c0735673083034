// Copyright 2018 The GeoRust Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//	http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Unit conversions on the WGS84 ellipsoid and reprojection of GeoJSON
//! values between geographic coordinates and Web Mercator.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use std::fmt;
use std::str::FromStr;

use geojson::{Feature, GeoJson, Geometry, Value};

use crate::Error;

/// Equatorial radius of the WGS84 ellipsoid, in meters.
pub const WGS84_RADIUS: f64 = 6378137.0;

/// Latitude at which Web Mercator becomes a square.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_6;

/// Meters along the equator to degrees of longitude.
pub fn meter_to_degree(meter: f64) -> f64 {
    meter / ((2.0 * PI * WGS84_RADIUS) / 360.0)
}

/// Degrees of longitude to meters along the equator.
pub fn degree_to_meter(degrees: f64) -> f64 {
    degrees * (PI / 180.0) * WGS84_RADIUS
}

/// Arc length on the equator for an angle in radians.
pub fn rad_to_meter(radians: f64) -> f64 {
    radians * WGS84_RADIUS
}

/// Supported coordinate reference systems
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Crs {
    /// Longitude / latitude in degrees (EPSG:4326)
    Wgs84,
    /// Spherical Web Mercator in meters (EPSG:3857)
    WebMercator,
}

impl Crs {
    pub fn code(&self) -> &'static str {
        match *self {
            Crs::Wgs84 => "EPSG:4326",
            Crs::WebMercator => "EPSG:3857",
        }
    }
}

impl FromStr for Crs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EPSG:4326" | "CRS:84" | "WGS84" => Ok(Crs::Wgs84),
            "EPSG:3857" | "EPSG:900913" | "EPSG:102100" => Ok(Crs::WebMercator),
            _ => Err(Error::UnsupportedCrs(s.to_owned())),
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.code())
    }
}

fn to_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE);
    let x = WGS84_RADIUS * lon.to_radians();
    let y = WGS84_RADIUS * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

fn from_mercator(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / WGS84_RADIUS).to_degrees();
    let lat = (2.0 * (y / WGS84_RADIUS).exp().atan() - FRAC_PI_2).to_degrees();
    (lon, lat)
}

/// Reproject one position in place. Values past the second (elevation) are
/// kept as they are.
pub fn transform_position(position: &mut [f64], from: Crs, to: Crs) -> Result<(), Error> {
    if position.len() < 2 {
        return Err(Error::PositionExpectedTwoValues);
    }
    let (x, y) = match (from, to) {
        (Crs::Wgs84, Crs::WebMercator) => to_mercator(position[0], position[1]),
        (Crs::WebMercator, Crs::Wgs84) => from_mercator(position[0], position[1]),
        _ => return Ok(()),
    };
    position[0] = x;
    position[1] = y;
    Ok(())
}

/// Reproject a `[minx, miny, maxx, maxy]` (or six value, 3D) bounding box.
///
/// Both projections are monotonic along each axis, so reprojecting the two
/// corners gives the exact bounds.
pub fn transform_bounds(bbox: &[f64], from: Crs, to: Crs) -> Result<Vec<f64>, Error> {
    let mut out = bbox.to_vec();
    let half = match bbox.len() {
        4 => 2,
        6 => 3,
        _ => return Err(Error::BboxExpectedFourValues),
    };
    let (lower, upper) = out.split_at_mut(half);
    transform_position(lower, from, to)?;
    transform_position(upper, from, to)?;
    Ok(out)
}

fn transform_positions(positions: &mut [Vec<f64>], from: Crs, to: Crs) -> Result<(), Error> {
    positions
        .iter_mut()
        .try_for_each(|p| transform_position(p, from, to))
}

fn transform_bbox(bbox: &mut Option<Vec<f64>>, from: Crs, to: Crs) -> Result<(), Error> {
    if let Some(b) = bbox.as_mut() {
        *b = transform_bounds(b, from, to)?;
    }
    Ok(())
}

/// Reproject every position of a geometry, recursing into collections.
pub fn transform_geometry(geometry: &mut Geometry, from: Crs, to: Crs) -> Result<(), Error> {
    if from == to {
        return Ok(());
    }
    transform_bbox(&mut geometry.bbox, from, to)?;
    match geometry.value {
        Value::Point(ref mut p) => transform_position(p, from, to),
        Value::MultiPoint(ref mut ps) | Value::LineString(ref mut ps) => {
            transform_positions(ps, from, to)
        }
        Value::MultiLineString(ref mut lines) | Value::Polygon(ref mut lines) => lines
            .iter_mut()
            .try_for_each(|line| transform_positions(line, from, to)),
        Value::MultiPolygon(ref mut polygons) => polygons.iter_mut().try_for_each(|polygon| {
            polygon
                .iter_mut()
                .try_for_each(|ring| transform_positions(ring, from, to))
        }),
        Value::GeometryCollection(ref mut geometries) => geometries
            .iter_mut()
            .try_for_each(|g| transform_geometry(g, from, to)),
        #[allow(unreachable_patterns)]
        _ => Ok(()),
    }
}

fn transform_feature(feature: &mut Feature, from: Crs, to: Crs) -> Result<(), Error> {
    transform_bbox(&mut feature.bbox, from, to)?;
    match feature.geometry {
        Some(ref mut geometry) => transform_geometry(geometry, from, to),
        None => Ok(()),
    }
}

/// Reproject a GeoJSON geometry, feature or feature collection in place.
pub fn transform_geojson(geojson: &mut GeoJson, from: Crs, to: Crs) -> Result<(), Error> {
    if from == to {
        return Ok(());
    }
    log::debug!("reprojecting GeoJSON from {} to {}", from, to);
    match geojson {
        GeoJson::Geometry(geometry) => transform_geometry(geometry, from, to),
        GeoJson::Feature(feature) => transform_feature(feature, from, to),
        GeoJson::FeatureCollection(collection) => {
            transform_bbox(&mut collection.bbox, from, to)?;
            collection
                .features
                .iter_mut()
                .try_for_each(|f| transform_feature(f, from, to))
        }
    }
}

/// Parse GeoJSON text, reproject it between the two named systems (for
/// instance `"EPSG:4326"` and `"EPSG:3857"`) and serialize it again.
pub fn transform_geojson_str(s: &str, from: &str, to: &str) -> Result<String, Error> {
    let from: Crs = from.parse()?;
    let to: Crs = to.parse()?;
    let mut geojson = s.parse::<GeoJson>().map_err(|e| {
        log::warn!("unable to parse GeoJSON: {}", e);
        Error::MalformedJson
    })?;
    transform_geojson(&mut geojson, from, to)?;
    Ok(geojson.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF_WORLD: f64 = 20037508.342789244;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-6, "{} != {}", a, b);
    }

    fn decode(json_string: &str) -> GeoJson {
        json_string.parse().unwrap()
    }

    #[test]
    fn unit_conversions() {
        assert_close(degree_to_meter(1.0), 111319.49079327357);
        assert_close(meter_to_degree(degree_to_meter(12.5)), 12.5);
        assert_close(rad_to_meter(PI), HALF_WORLD);
    }

    #[test]
    fn parse_crs() {
        assert_eq!("EPSG:4326".parse::<Crs>(), Ok(Crs::Wgs84));
        assert_eq!("epsg:3857".parse::<Crs>(), Ok(Crs::WebMercator));
        assert_eq!(
            "EPSG:2385".parse::<Crs>(),
            Err(Error::UnsupportedCrs("EPSG:2385".to_owned()))
        );
        assert_eq!(Crs::WebMercator.to_string(), "EPSG:3857");
    }

    #[test]
    fn position_round_trip() {
        let mut p = vec![180.0, 0.0, 12.0];
        transform_position(&mut p, Crs::Wgs84, Crs::WebMercator).unwrap();
        assert_close(p[0], HALF_WORLD);
        assert_close(p[1], 0.0);
        assert_eq!(p[2], 12.0);

        let mut q = vec![116.391, 39.907];
        transform_position(&mut q, Crs::Wgs84, Crs::WebMercator).unwrap();
        transform_position(&mut q, Crs::WebMercator, Crs::Wgs84).unwrap();
        assert_close(q[0], 116.391);
        assert_close(q[1], 39.907);

        assert_eq!(
            transform_position(&mut [1.0], Crs::Wgs84, Crs::WebMercator),
            Err(Error::PositionExpectedTwoValues)
        );
    }

    #[test]
    fn mercator_clamps_poles() {
        let mut p = vec![0.0, 90.0];
        transform_position(&mut p, Crs::Wgs84, Crs::WebMercator).unwrap();
        assert!(p[1].is_finite());
        assert_close(p[1], HALF_WORLD);
    }

    #[test]
    fn bounds() {
        let b = transform_bounds(&[-180.0, 0.0, 180.0, 0.0], Crs::Wgs84, Crs::WebMercator).unwrap();
        assert_close(b[0], -HALF_WORLD);
        assert_close(b[2], HALF_WORLD);
        assert_eq!(
            transform_bounds(&[1.0, 2.0], Crs::Wgs84, Crs::WebMercator),
            Err(Error::BboxExpectedFourValues)
        );
    }

    #[test]
    fn transform_feature_collection() {
        let mut geojson = decode("{\"type\":\"FeatureCollection\",\"features\":[{\"type\":\"Feature\",\"bbox\":[0.0,0.0,180.0,0.0],\"properties\":{\"name\":\"a\"},\"geometry\":{\"type\":\"LineString\",\"coordinates\":[[0.0,0.0],[180.0,0.0]]}},{\"type\":\"Feature\",\"properties\":null,\"geometry\":{\"type\":\"GeometryCollection\",\"geometries\":[{\"type\":\"Point\",\"coordinates\":[-180.0,0.0]}]}}]}");
        transform_geojson(&mut geojson, Crs::Wgs84, Crs::WebMercator).unwrap();

        let collection = match geojson {
            GeoJson::FeatureCollection(fc) => fc,
            _ => unreachable!(),
        };
        let first = &collection.features[0];
        assert_close(first.bbox.as_ref().unwrap()[2], HALF_WORLD);
        match first.geometry.as_ref().unwrap().value {
            Value::LineString(ref line) => assert_close(line[1][0], HALF_WORLD),
            _ => panic!(),
        }
        match collection.features[1].geometry.as_ref().unwrap().value {
            Value::GeometryCollection(ref geometries) => match geometries[0].value {
                Value::Point(ref p) => assert_close(p[0], -HALF_WORLD),
                _ => panic!(),
            },
            _ => panic!(),
        }
    }

    #[test]
    fn transform_geojson_text() {
        let out = transform_geojson_str(
            "{\"type\":\"Point\",\"coordinates\":[0.0,0.0]}",
            "EPSG:3857",
            "EPSG:4326",
        )
        .unwrap();
        match decode(&out) {
            GeoJson::Geometry(g) => assert_eq!(g.value, Value::Point(vec![0.0, 0.0])),
            _ => panic!(),
        }

        assert_eq!(
            transform_geojson_str("{\"type\":\"Nope\"}", "EPSG:4326", "EPSG:3857"),
            Err(Error::MalformedJson)
        );
        assert_eq!(
            transform_geojson_str("{}", "EPSG:4326", "EPSG:1"),
            Err(Error::UnsupportedCrs("EPSG:1".to_owned()))
        );
    }
}
