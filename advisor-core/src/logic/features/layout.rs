//! Feature Layout - column order shared with the fitted artifacts
//!
//! Both artifacts were fitted on the nine columns below, in this order.
//! Any vector handed to the scaler is assembled from this table, and an
//! artifact declaring a different list is refused at load time.
//!
//! Reordering, renaming or adding a column bumps `FEATURE_VERSION`.

use crc32fast::Hasher;

/// Layout revision, folded into the layout hash
pub const FEATURE_VERSION: u8 = 1;

/// Dataset column names
pub const FEATURE_LAYOUT: &[&str] = &[
    "ph",              // 0
    "Hardness",        // 1: mg/L
    "Solids",          // 2: ppm (total dissolved solids)
    "Chloramines",     // 3: ppm
    "Sulfate",         // 4: mg/L
    "Conductivity",    // 5: μS/cm
    "Organic_carbon",  // 6: ppm
    "Trihalomethanes", // 7: μg/L
    "Turbidity",       // 8: NTU
];

pub const FEATURE_COUNT: usize = 9;

/// CRC32 over version byte and NUL-terminated names.
/// Reported by the status endpoint and in sample log entries.
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);
    for column in FEATURE_LAYOUT {
        hasher.update(column.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}

/// Column names declared by an artifact differ from [`FEATURE_LAYOUT`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Feature layout mismatch: expected {expected:?}, artifact declares {actual:?}")]
pub struct LayoutMismatchError {
    pub expected: Vec<String>,
    pub actual: Vec<String>,
}

/// Names must match in content and order; a permuted list is a mismatch.
pub fn validate_feature_names<S: AsRef<str>>(names: &[S]) -> Result<(), LayoutMismatchError> {
    let same = names.len() == FEATURE_COUNT
        && names
            .iter()
            .zip(FEATURE_LAYOUT)
            .all(|(declared, column)| declared.as_ref() == *column);

    if same {
        return Ok(());
    }

    Err(LayoutMismatchError {
        expected: FEATURE_LAYOUT.iter().map(|c| c.to_string()).collect(),
        actual: names.iter().map(|n| n.as_ref().to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::fields::Field;

    #[test]
    fn layout_matches_field_table() {
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
        for field in Field::ALL {
            assert_eq!(FEATURE_LAYOUT[field.index()], field.layout_name());
        }
    }

    #[test]
    fn hash_is_stable() {
        assert_eq!(layout_hash(), layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn accepts_exact_layout() {
        assert!(validate_feature_names(FEATURE_LAYOUT).is_ok());
        let owned: Vec<String> = FEATURE_LAYOUT.iter().map(|c| c.to_string()).collect();
        assert!(validate_feature_names(&owned).is_ok());
    }

    #[test]
    fn rejects_permuted_layout() {
        let mut names: Vec<&str> = FEATURE_LAYOUT.to_vec();
        names.swap(0, 1);
        let err = validate_feature_names(&names).unwrap_err();
        assert_eq!(err.actual[0], "Hardness");
        assert_eq!(err.expected[0], "ph");
    }

    #[test]
    fn rejects_short_or_renamed_layout() {
        assert!(validate_feature_names(&FEATURE_LAYOUT[..8]).is_err());

        let mut names: Vec<&str> = FEATURE_LAYOUT.to_vec();
        names[0] = "pH";
        assert!(validate_feature_names(&names).is_err());
    }
}
