//! Input Collector - typed holder for the nine form fields
//!
//! Range enforcement happens here, at entry time. The verdict pipeline
//! trusts a [`WaterSample`] it receives.

use super::fields::Field;
use super::layout::FEATURE_COUNT;
use super::sample::WaterSample;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: Field,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be a finite number")]
    NotFinite { field: Field },

    #[error("{field} is required")]
    Missing { field: Field },

    #[error("unknown field: {0}")]
    UnknownField(String),
}

impl InputError {
    /// Field the error refers to, if any
    pub fn field(&self) -> Option<Field> {
        match self {
            InputError::OutOfRange { field, .. }
            | InputError::NotFinite { field }
            | InputError::Missing { field } => Some(*field),
            InputError::UnknownField(_) => None,
        }
    }
}

/// Current form state. Starts out holding every field's default.
#[derive(Debug, Clone, PartialEq)]
pub struct InputCollector {
    values: [Option<f64>; FEATURE_COUNT],
}

impl InputCollector {
    pub fn new() -> Self {
        let mut values = [None; FEATURE_COUNT];
        for field in Field::ALL {
            values[field.index()] = Some(field.spec().default);
        }
        Self { values }
    }

    /// A collector with no values; every field must be set before
    /// [`sample`](Self::sample) succeeds.
    pub fn empty() -> Self {
        Self {
            values: [None; FEATURE_COUNT],
        }
    }

    /// Set a field, rejecting non-finite or out-of-range values.
    /// A rejected value leaves the previous one in place.
    pub fn set(&mut self, field: Field, value: f64) -> Result<(), InputError> {
        if !value.is_finite() {
            return Err(InputError::NotFinite { field });
        }
        let spec = field.spec();
        if !spec.contains(value) {
            return Err(InputError::OutOfRange {
                field,
                value,
                min: spec.min,
                max: spec.max,
            });
        }
        self.values[field.index()] = Some(value);
        Ok(())
    }

    /// Set a field, clamping finite values into its range.
    /// Returns the value actually stored.
    pub fn set_clamped(&mut self, field: Field, value: f64) -> Result<f64, InputError> {
        if !value.is_finite() {
            return Err(InputError::NotFinite { field });
        }
        let clamped = field.spec().clamp(value);
        if clamped != value {
            log::debug!("{} clamped from {} to {}", field, value, clamped);
        }
        self.values[field.index()] = Some(clamped);
        Ok(clamped)
    }

    /// Set a field addressed by key, layout name or label
    pub fn set_by_name(&mut self, name: &str, value: f64) -> Result<(), InputError> {
        let field = Field::from_name(name).ok_or_else(|| InputError::UnknownField(name.to_string()))?;
        self.set(field, value)
    }

    pub fn clear(&mut self, field: Field) {
        self.values[field.index()] = None;
    }

    pub fn get(&self, field: Field) -> Option<f64> {
        self.values[field.index()]
    }

    /// Fields currently without a value, in layout order
    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.values[f.index()].is_none())
            .collect()
    }

    /// True when a check may be triggered
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    /// The complete sample, or the first missing field
    pub fn sample(&self) -> Result<WaterSample, InputError> {
        let mut pairs = Vec::with_capacity(FEATURE_COUNT);
        for field in Field::ALL {
            let value = self.values[field.index()].ok_or(InputError::Missing { field })?;
            pairs.push((field, value));
        }
        WaterSample::from_named(pairs).ok_or(InputError::Missing { field: Field::Ph })
    }

    /// Apply several entries at once, collecting every rejection.
    ///
    /// Accepted entries are stored even when others are rejected.
    pub fn apply<'a, I>(&mut self, entries: I) -> Result<(), Vec<InputError>>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let errors: Vec<InputError> = entries
            .into_iter()
            .filter_map(|(name, value)| self.set_by_name(name, value).err())
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for InputCollector {
    fn default() -> Self {
        Self::new()
    }
}
