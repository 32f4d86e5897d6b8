//! A single column bound to its metadata.
//!
//! [`Variable`] pairs a polars [`Series`] with a [`VariableMeta`]. Every
//! transform on a Variable goes to the series first and then copies the
//! metadata onto the result, so a cast or an arithmetic expression never
//! loses the column's description:
//!
//! ```
//! use metatable::Variable;
//! use metatable::meta::VariableMeta;
//! use polars::prelude::*;
//!
//! # fn main() -> metatable::error::Result<()> {
//! let gdp = Variable::new(
//!     Series::new("gdp".into(), &[100i64, 102, 104]),
//!     VariableMeta::default().with_description("One two three"),
//! );
//! let text = gdp.cast(&DataType::String)?;
//! assert_eq!(text.metadata, gdp.metadata);
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use crate::meta::VariableMeta;
use polars::prelude::*;

/// A named column of data plus its descriptive metadata.
#[derive(Debug, Clone)]
pub struct Variable {
    series: Series,
    pub metadata: VariableMeta,
}

impl Variable {
    pub fn new(series: Series, metadata: VariableMeta) -> Self {
        Self { series, metadata }
    }

    pub fn name(&self) -> &str {
        self.series.name().as_str()
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn into_series(self) -> Series {
        self.series
    }

    pub fn into_parts(self) -> (Series, VariableMeta) {
        (self.series, self.metadata)
    }

    pub fn dtype(&self) -> &DataType {
        self.series.dtype()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Apply an elementwise transform to the data.
    ///
    /// The result keeps this Variable's name and a copy of its metadata.
    pub fn apply<F>(&self, f: F) -> Result<Self>
    where
        F: FnOnce(&Series) -> PolarsResult<Series>,
    {
        let mut out = f(&self.series)?;
        out.rename(self.series.name().clone());
        Ok(self.derive(out))
    }

    /// Cast the data to another type, keeping name and metadata.
    pub fn cast(&self, dtype: &DataType) -> Result<Self> {
        let out = self.series.cast(dtype)?;
        Ok(self.derive(out))
    }

    /// Replace the bound metadata.
    pub fn with_metadata(mut self, metadata: VariableMeta) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn rename(mut self, name: &str) -> Self {
        self.series.rename(name.into());
        self
    }

    fn derive(&self, series: Series) -> Self {
        Self {
            series,
            metadata: self.metadata.clone(),
        }
    }
}

impl From<Series> for Variable {
    fn from(series: Series) -> Self {
        Self::new(series, VariableMeta::default())
    }
}

impl From<Variable> for Series {
    fn from(variable: Variable) -> Self {
        variable.series
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
            && self.series.equals_missing(&other.series)
            && self.metadata == other.metadata
    }
}

// Binary operators follow polars: series arithmetic is fallible, so the
// output is a `Result`. Metadata comes from the left operand.
macro_rules! impl_variable_op {
    ($trait:ident, $method:ident) => {
        impl std::ops::$trait for &Variable {
            type Output = Result<Variable>;

            fn $method(self, rhs: Self) -> Self::Output {
                let out = std::ops::$trait::$method(&self.series, &rhs.series)?;
                Ok(self.derive(out.with_name(self.series.name().clone())))
            }
        }
    };
}

impl_variable_op!(Add, add);
impl_variable_op!(Sub, sub);
impl_variable_op!(Mul, mul);
impl_variable_op!(Div, div);
