//! Core traits for reading published variables.

use crate::error::CalculateError;
use crate::value::Value;
use indexmap::IndexMap;

/// Read access to variables by name.
///
/// Implemented by the staged namespace a recomputation pass builds up as
/// each data source finishes, so later sources can read what earlier
/// ones published in the same pass.
pub trait VariableReader {
    /// The current value of `name`, if published.
    fn read(&self, name: &str) -> Option<&Value>;

    /// Read a variable that must be present.
    fn require(&self, name: &str) -> Result<&Value, CalculateError> {
        self.read(name).ok_or_else(|| CalculateError::MissingInput {
            variable: name.to_string(),
        })
    }

    /// Read a variable that must be a number.
    fn require_number(&self, name: &str) -> Result<f64, CalculateError> {
        self.require(name)?
            .as_number()
            .ok_or_else(|| CalculateError::InvalidInput {
                variable: name.to_string(),
                expected: "a number",
            })
    }
}

impl VariableReader for IndexMap<String, Value> {
    fn read(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}
