use kestrel_error::{DbError, Result};

use super::{PollPull, PullOperator};
use crate::arrays::field::Schema;

/// Checks every chunk produced by the wrapped operator against its schema.
///
/// Only planned when chunk verification is enabled.
#[derive(Debug)]
pub struct PhysicalVerify {
    input: Box<dyn PullOperator>,
}

impl PhysicalVerify {
    pub const OPERATOR_NAME: &str = "Verify";

    pub fn new(input: Box<dyn PullOperator>) -> Self {
        PhysicalVerify { input }
    }
}

impl PullOperator for PhysicalVerify {
    fn operator_name(&self) -> &'static str {
        Self::OPERATOR_NAME
    }

    fn schema(&self) -> &Schema {
        self.input.schema()
    }

    fn poll_pull(&mut self) -> Result<PollPull> {
        match self.input.poll_pull()? {
            PollPull::Batch(batch) => {
                batch.verify_schema(self.input.schema()).map_err(|e| {
                    DbError::with_source("Operator produced an invalid chunk", Box::new(e))
                        .with_field("operator", self.input.operator_name())
                })?;
                Ok(PollPull::Batch(batch))
            }
            PollPull::Exhausted => Ok(PollPull::Exhausted),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::arrays::batch::Batch;
    use crate::arrays::datatype::DataType;
    use crate::arrays::field::Field;
    use crate::execution::operators::testutil::{ctx, i64_values, utf8_values};
    use crate::execution::operators::values::PhysicalValues;

    #[test]
    fn rejects_mismatched_chunk() {
        let ctx = ctx();
        let schema = Schema::try_new([Field::new("a", DataType::Int64)]).unwrap();
        let good = Batch::try_new(vec![i64_values(vec![1])]).unwrap();
        let bad = Batch::try_new(vec![utf8_values(&["x"])]).unwrap();
        let values = PhysicalValues::new(Arc::clone(&ctx), schema, vec![good, bad]);

        let mut verify = PhysicalVerify::new(Box::new(values));
        assert!(matches!(verify.poll_pull().unwrap(), PollPull::Batch(_)));
        let err = verify.poll_pull().unwrap_err();
        assert_eq!(Some("Values"), err.field("operator"));
    }
}
