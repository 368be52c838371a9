use chrono::{Datelike, NaiveDateTime};
use kestrel_error::Result;

use crate::arrays::array::Array;
use crate::arrays::array::physical_type::{PhysicalI32, PhysicalI64};
use crate::arrays::datatype::{DataType, DataTypeId};
use crate::arrays::executor::UnaryExecutor;
use crate::arrays::scalar::temporal::{
    self,
    TICKS_PER_DAY,
    naive_to_ticks,
    ticks_to_naive,
};
use crate::functions::Signature;
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::function_set::ScalarFunctionSet;
use crate::functions::scalar::{RawScalarFunction, ScalarFunction};

pub const FUNCTION_SET_DAYOFWEEK: ScalarFunctionSet = ScalarFunctionSet {
    name: "dayofweek",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::DateTime,
        description: "Number of days since the preceding Sunday, as a timespan.",
        arguments: &["datetime"],
        example: Some(Example {
            call: "dayofweek(datetime(1970-05-11))",
            output: "1.00:00:00",
        }),
    }],
    functions: &[RawScalarFunction::new(
        &Signature::new(&[DataTypeId::DateTime], DataTypeId::TimeSpan),
        &DayOfWeek,
    )],
};

pub const FUNCTION_SET_DAYOFMONTH: ScalarFunctionSet = ScalarFunctionSet {
    name: "dayofmonth",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::DateTime,
        description: "Day of the month, starting at 1.",
        arguments: &["datetime"],
        example: Some(Example {
            call: "dayofmonth(datetime(2015-12-14))",
            output: "14",
        }),
    }],
    functions: &[RawScalarFunction::new(
        &Signature::new(&[DataTypeId::DateTime], DataTypeId::Int32),
        &DatePart { part: |dt| dt.day() },
    )],
};

pub const FUNCTION_SET_DAYOFYEAR: ScalarFunctionSet = ScalarFunctionSet {
    name: "dayofyear",
    aliases: &[],
    doc: &[&Documentation {
        category: Category::DateTime,
        description: "Day of the year, starting at 1.",
        arguments: &["datetime"],
        example: Some(Example {
            call: "dayofyear(datetime(2015-12-14))",
            output: "348",
        }),
    }],
    functions: &[RawScalarFunction::new(
        &Signature::new(&[DataTypeId::DateTime], DataTypeId::Int32),
        &DatePart { part: |dt| dt.ordinal() },
    )],
};

const DATETIME_TO_DATETIME: Signature =
    Signature::new(&[DataTypeId::DateTime], DataTypeId::DateTime);

const fn period_doc(
    description: &'static str,
    call: &'static str,
    output: &'static str,
) -> Documentation {
    Documentation {
        category: Category::DateTime,
        description,
        arguments: &["datetime"],
        example: Some(Example { call, output }),
    }
}

pub const FUNCTION_SET_STARTOFDAY: ScalarFunctionSet = ScalarFunctionSet {
    name: "startofday",
    aliases: &[],
    doc: &[&period_doc(
        "Start of the day containing the datetime.",
        "startofday(datetime(2017-01-01 10:10:17))",
        "2017-01-01T00:00:00.0000000",
    )],
    functions: &[RawScalarFunction::new(
        &DATETIME_TO_DATETIME,
        &PeriodBoundary { period: Period::Day, end: false },
    )],
};

pub const FUNCTION_SET_ENDOFDAY: ScalarFunctionSet = ScalarFunctionSet {
    name: "endofday",
    aliases: &[],
    doc: &[&period_doc(
        "Last tick of the day containing the datetime.",
        "endofday(datetime(2017-01-01 10:10:17))",
        "2017-01-01T23:59:59.9999999",
    )],
    functions: &[RawScalarFunction::new(
        &DATETIME_TO_DATETIME,
        &PeriodBoundary { period: Period::Day, end: true },
    )],
};

pub const FUNCTION_SET_STARTOFWEEK: ScalarFunctionSet = ScalarFunctionSet {
    name: "startofweek",
    aliases: &[],
    doc: &[&period_doc(
        "Start of the week containing the datetime. Weeks start on Sunday.",
        "startofweek(datetime(2017-01-07))",
        "2017-01-01T00:00:00.0000000",
    )],
    functions: &[RawScalarFunction::new(
        &DATETIME_TO_DATETIME,
        &PeriodBoundary { period: Period::Week, end: false },
    )],
};

pub const FUNCTION_SET_ENDOFWEEK: ScalarFunctionSet = ScalarFunctionSet {
    name: "endofweek",
    aliases: &[],
    doc: &[&period_doc(
        "Last tick of the week containing the datetime.",
        "endofweek(datetime(2017-01-01))",
        "2017-01-07T23:59:59.9999999",
    )],
    functions: &[RawScalarFunction::new(
        &DATETIME_TO_DATETIME,
        &PeriodBoundary { period: Period::Week, end: true },
    )],
};

pub const FUNCTION_SET_STARTOFMONTH: ScalarFunctionSet = ScalarFunctionSet {
    name: "startofmonth",
    aliases: &[],
    doc: &[&period_doc(
        "Start of the month containing the datetime.",
        "startofmonth(datetime(2020-02-29 23:59:59))",
        "2020-02-01T00:00:00.0000000",
    )],
    functions: &[RawScalarFunction::new(
        &DATETIME_TO_DATETIME,
        &PeriodBoundary { period: Period::Month, end: false },
    )],
};

pub const FUNCTION_SET_ENDOFMONTH: ScalarFunctionSet = ScalarFunctionSet {
    name: "endofmonth",
    aliases: &[],
    doc: &[&period_doc(
        "Last tick of the month containing the datetime.",
        "endofmonth(datetime(2017-02-01))",
        "2017-02-28T23:59:59.9999999",
    )],
    functions: &[RawScalarFunction::new(
        &DATETIME_TO_DATETIME,
        &PeriodBoundary { period: Period::Month, end: true },
    )],
};

pub const FUNCTION_SET_STARTOFYEAR: ScalarFunctionSet = ScalarFunctionSet {
    name: "startofyear",
    aliases: &[],
    doc: &[&period_doc(
        "Start of the year containing the datetime.",
        "startofyear(datetime(2020-03-01))",
        "2020-01-01T00:00:00.0000000",
    )],
    functions: &[RawScalarFunction::new(
        &DATETIME_TO_DATETIME,
        &PeriodBoundary { period: Period::Year, end: false },
    )],
};

pub const FUNCTION_SET_ENDOFYEAR: ScalarFunctionSet = ScalarFunctionSet {
    name: "endofyear",
    aliases: &[],
    doc: &[&period_doc(
        "Last tick of the year containing the datetime.",
        "endofyear(datetime(2020-03-01))",
        "2020-12-31T23:59:59.9999999",
    )],
    functions: &[RawScalarFunction::new(
        &DATETIME_TO_DATETIME,
        &PeriodBoundary { period: Period::Year, end: true },
    )],
};

#[derive(Debug, Clone, Copy)]
pub struct DayOfWeek;

impl ScalarFunction for DayOfWeek {
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        UnaryExecutor::execute::<PhysicalI64, PhysicalI64, _>(&inputs[0], return_type, |&ticks, buf| {
            match ticks_to_naive(ticks) {
                Some(dt) => {
                    let days = i64::from(dt.weekday().num_days_from_sunday());
                    buf.put(days * TICKS_PER_DAY)
                }
                None => buf.put_null(),
            }
        })
    }
}

/// Integer component of a datetime.
#[derive(Debug, Clone, Copy)]
pub struct DatePart {
    part: fn(&NaiveDateTime) -> u32,
}

impl ScalarFunction for DatePart {
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        UnaryExecutor::execute::<PhysicalI64, PhysicalI32, _>(&inputs[0], return_type, |&ticks, buf| {
            match ticks_to_naive(ticks).and_then(|dt| i32::try_from((self.part)(&dt)).ok()) {
                Some(v) => buf.put(v),
                None => buf.put_null(),
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
}

impl Period {
    fn start(&self, dt: &NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Self::Day => Some(temporal::start_of_day(dt)),
            Self::Week => Some(temporal::start_of_week(dt)),
            Self::Month => temporal::start_of_month(dt),
            Self::Year => temporal::start_of_year(dt),
        }
    }

    fn next_start(&self, dt: &NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Self::Day => Some(temporal::start_of_day(dt) + chrono::Duration::days(1)),
            Self::Week => Some(temporal::start_of_week(dt) + chrono::Duration::days(7)),
            Self::Month => temporal::start_of_next_month(dt),
            Self::Year => temporal::start_of_next_year(dt),
        }
    }
}

/// Start of a period, or its last tick when `end` is set.
#[derive(Debug, Clone, Copy)]
pub struct PeriodBoundary {
    period: Period,
    end: bool,
}

impl PeriodBoundary {
    fn boundary(&self, ticks: i64) -> Option<i64> {
        let dt = ticks_to_naive(ticks)?;
        if self.end {
            naive_to_ticks(&self.period.next_start(&dt)?)?.checked_sub(1)
        } else {
            naive_to_ticks(&self.period.start(&dt)?)
        }
    }
}

impl ScalarFunction for PeriodBoundary {
    fn execute(&self, inputs: &[Array], _num_rows: usize, return_type: DataType) -> Result<Array> {
        UnaryExecutor::execute::<PhysicalI64, PhysicalI64, _>(&inputs[0], return_type, |&ticks, buf| {
            match self.boundary(ticks) {
                Some(v) => buf.put(v),
                None => buf.put_null(),
            }
        })
    }
}
