use kestrel_error::Result;

use crate::arrays::array::Array;
use crate::arrays::array::physical_type::{PhysicalF64, ScalarStorage};
use crate::arrays::datatype::{DataType, DataTypeId};
use crate::arrays::executor::OutBuffer;
use crate::functions::Signature;
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::function_set::ScalarFunctionSet;
use crate::functions::scalar::{RawScalarFunction, ScalarFunction};

/// Mean earth radius in meters.
const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

pub const FUNCTION_SET_GEO_DISTANCE_2POINTS: ScalarFunctionSet = ScalarFunctionSet {
    name: "geo_distance_2points",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::Geo,
        description: "Shortest distance in meters between two points on earth. Returns null if any coordinate is out of range.",
        arguments: &["lon1", "lat1", "lon2", "lat2"],
        example: Some(Example {
            call: "tolong(geo_distance_2points(-122.3518577, 47.6205099, -122.3519241, 47.6097268))",
            output: "1199",
        }),
    }],
    functions: &[RawScalarFunction::new(
        &Signature::new(
            &[
                DataTypeId::Float64,
                DataTypeId::Float64,
                DataTypeId::Float64,
                DataTypeId::Float64,
            ],
            DataTypeId::Float64,
        ),
        &GeoDistance2Points,
    )],
};

fn valid_point(lon: f64, lat: f64) -> bool {
    (-180.0..=180.0).contains(&lon) && (-90.0..=90.0).contains(&lat)
}

/// Haversine distance over a spherical earth.
pub fn haversine_distance(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> Option<f64> {
    if !valid_point(lon1, lat1) || !valid_point(lon2, lat2) {
        return None;
    }

    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    Some(EARTH_RADIUS_METERS * c)
}

#[derive(Debug, Clone, Copy)]
pub struct GeoDistance2Points;

impl ScalarFunction for GeoDistance2Points {
    fn execute(&self, inputs: &[Array], num_rows: usize, return_type: DataType) -> Result<Array> {
        let coords = inputs
            .iter()
            .map(|input| PhysicalF64::get_storage(input.data()))
            .collect::<Result<Vec<_>>>()?;

        let mut out = OutBuffer::<PhysicalF64>::new(num_rows);
        for row in 0..num_rows {
            let distance = if inputs.iter().all(|input| input.is_valid(row)) {
                haversine_distance(coords[0][row], coords[1][row], coords[2][row], coords[3][row])
            } else {
                None
            };
            match distance {
                Some(d) => out.put_buffer(row).put(d),
                None => out.put_buffer(row).put_null(),
            }
        }

        out.into_array(return_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_needle_to_pike_place() {
        let d = haversine_distance(-122.3518577, 47.6205099, -122.3519241, 47.6097268).unwrap();
        assert_eq!(1199, d as i64);
    }

    #[test]
    fn invalid_coordinates() {
        let test_cases = [
            (300.0, 0.0, 0.0, 0.0),
            (0.0, -300.0, 0.0, 0.0),
            (0.0, 0.0, -300.0, 0.0),
            (0.0, 0.0, 0.0, 300.0),
        ];

        for case in test_cases {
            assert_eq!(None, haversine_distance(case.0, case.1, case.2, case.3), "case: {case:?}");
        }
    }
}
