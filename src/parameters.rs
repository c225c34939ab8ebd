//! Loosely typed solver configuration.
//!
//! Options are stored by name. The adapter only reads the options it knows
//! ([TIMEOUT] and [VERBOSE]); values of the wrong type are ignored.
use fnv::FnvHashMap as HashMap;

/// Wall-clock limit of the search, in seconds. Rounded up to whole seconds.
pub const TIMEOUT: &str = "TIMEOUT";

/// Verbosity level of the engine. 0 is quiet.
pub const VERBOSE: &str = "VERBOSE";

/// An option value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// String option
    Text(String),
    /// Boolean option
    Bool(bool),
    /// Integer option
    Int(i64),
    /// Floating point number option
    Float(f64),
}

impl ParamValue {
    /// Gets the numeric value if applicable.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Int(v) => Some(v as f64),
            Self::Float(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}
impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}
impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        Self::Int(v.into())
    }
}
impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}
impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        Self::Float(v.into())
    }
}
impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}
impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}
impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.into())
    }
}

/// A set of named options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    values: HashMap<String, ParamValue>,
}

impl Parameters {
    /// No option set
    pub fn new() -> Self {
        Parameters::default()
    }

    /// Set an option, returning its previous value
    pub fn set<K: Into<String>, V: Into<ParamValue>>(
        &mut self,
        key: K,
        value: V,
    ) -> Option<ParamValue> {
        self.values.insert(key.into(), value.into())
    }

    /// Get an option
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    /// Unset an option
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.values.remove(key)
    }

    /// The time limit in whole seconds, if [TIMEOUT] holds a usable number.
    ///
    /// Fractions of a second are rounded up. Negative or non-finite values are ignored.
    pub fn timeout(&self) -> Option<u32> {
        let value = self.get(TIMEOUT)?;
        match value.as_f64() {
            Some(seconds) if seconds.is_finite() && seconds >= 0. => {
                Some(seconds.ceil().min(u32::MAX as f64) as u32)
            }
            _ => {
                log::debug!("ignoring {} option with value {:?}", TIMEOUT, value);
                None
            }
        }
    }

    /// The verbosity level, if [VERBOSE] holds a number
    pub fn verbosity(&self) -> Option<i32> {
        let value = self.get(VERBOSE)?;
        match value.as_f64() {
            Some(level) if !level.is_nan() => Some(level as i32),
            _ => {
                log::debug!("ignoring {} option with value {:?}", VERBOSE, value);
                None
            }
        }
    }

    /// Iterates over the options
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The number of options set
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when no option is set
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut parameters = Parameters::new();
        for (k, v) in iter {
            parameters.set(k, v);
        }
        parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_rounded_up() {
        let mut parameters = Parameters::new();
        assert_eq!(parameters.timeout(), None);
        parameters.set(TIMEOUT, 2.1);
        assert_eq!(parameters.timeout(), Some(3));
        parameters.set(TIMEOUT, 4);
        assert_eq!(parameters.timeout(), Some(4));
        parameters.set(TIMEOUT, 0.0001);
        assert_eq!(parameters.timeout(), Some(1));
    }

    #[test]
    fn wrongly_typed_values_are_ignored() {
        let mut parameters = Parameters::new();
        parameters.set(TIMEOUT, "ten seconds");
        parameters.set(VERBOSE, true);
        assert_eq!(parameters.timeout(), None);
        assert_eq!(parameters.verbosity(), None);
        parameters.set(TIMEOUT, f64::NAN);
        assert_eq!(parameters.timeout(), None);
        parameters.set(TIMEOUT, -3);
        assert_eq!(parameters.timeout(), None);
    }

    #[test]
    fn verbosity_is_truncated() {
        let parameters: Parameters = vec![(VERBOSE, 2.7)].into_iter().collect();
        assert_eq!(parameters.verbosity(), Some(2));
    }
}
