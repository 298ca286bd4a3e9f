//! Serde helpers for partial-update payloads.

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
///
/// Use with `#[serde(default, deserialize_with = "common::serde_ext::double_option")]`.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        staff: Option<Option<i32>>,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let p: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(p.staff, None);
        let p: Patch = serde_json::from_str(r#"{"staff": null}"#).unwrap();
        assert_eq!(p.staff, Some(None));
        let p: Patch = serde_json::from_str(r#"{"staff": 3}"#).unwrap();
        assert_eq!(p.staff, Some(Some(3)));
    }
}
