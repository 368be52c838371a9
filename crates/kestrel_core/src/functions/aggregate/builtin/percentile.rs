use kestrel_error::{DbError, Result};

use crate::arrays::array::Array;
use crate::arrays::datatype::{DataType, DataTypeId};
use crate::arrays::scalar::ScalarValue;
use crate::functions::Signature;
use crate::functions::aggregate::{
    Accumulator,
    AggregateFunction,
    RawAggregateFunction,
    constant_arg,
};
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::function_set::AggregateFunctionSet;

pub const FUNCTION_SET_PERCENTILE: AggregateFunctionSet = AggregateFunctionSet {
    name: "percentile",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::STATISTICAL_AGGREGATE,
        description: "Nearest-rank percentile of the non-null values in the group. The result is always one of the input values.",
        arguments: &["value", "percentile"],
        example: Some(Example {
            call: "percentile(x, 50)",
            output: "5",
        }),
    }],
    functions: &[
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Int64, DataTypeId::Float64], DataTypeId::Int64),
            &Percentile,
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::Float64, DataTypeId::Float64], DataTypeId::Float64),
            &Percentile,
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::DateTime, DataTypeId::Float64], DataTypeId::DateTime),
            &Percentile,
        ),
        RawAggregateFunction::new(
            &Signature::new(&[DataTypeId::TimeSpan, DataTypeId::Float64], DataTypeId::TimeSpan),
            &Percentile,
        ),
    ],
};

#[derive(Debug, Clone, Copy)]
pub struct Percentile;

impl AggregateFunction for Percentile {
    fn new_accumulator(&self, return_type: DataType) -> Box<dyn Accumulator> {
        Box::new(PercentileState {
            values: Vec::new(),
            percentile: None,
            return_type,
        })
    }
}

#[derive(Debug)]
struct PercentileState {
    values: Vec<ScalarValue>,
    percentile: Option<f64>,
    return_type: DataType,
}

impl Accumulator for PercentileState {
    fn update(&mut self, inputs: &[&Array], rows: &[usize]) -> Result<()> {
        if self.percentile.is_none() {
            if let Some(p) = constant_arg(inputs, 1, rows)? {
                let p = p
                    .try_as_f64()?
                    .ok_or_else(|| DbError::new("Percentile must not be null"))?;
                if !(0.0..=100.0).contains(&p) {
                    return Err(DbError::new("Percentile must be between 0 and 100")
                        .with_field("percentile", p));
                }
                self.percentile = Some(p);
            }
        }

        let input = inputs
            .first()
            .ok_or_else(|| DbError::overload_mismatch("percentile expects a value input"))?;
        for &row in rows {
            if input.is_valid(row) {
                self.values.push(input.get(row)?);
            }
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<ScalarValue> {
        let (Some(p), false) = (self.percentile, self.values.is_empty()) else {
            return Ok(ScalarValue::null(self.return_type));
        };

        self.values.sort_by(|a, b| a.total_cmp(b));
        let n = self.values.len();
        let rank = ((p / 100.0) * n as f64).ceil() as usize;
        let idx = rank.saturating_sub(1).min(n - 1);

        Ok(std::mem::replace(
            &mut self.values[idx],
            ScalarValue::null(self.return_type),
        ))
    }
}
