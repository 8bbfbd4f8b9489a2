use std::fmt;

/// A normalized stock keeping unit identifier
///
/// Identifiers may arrive as text or as numbers (`1001`, `1001.0`, `"1001"`).
/// All of them are normalized to the same textual form, so stock and sales
/// rows join on equal keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    /// Normalizes a raw identifier
    pub fn new(raw: &str) -> Self {
        let raw = raw.trim();
        match integral_form(raw) {
            Some(normalized) => Self(normalized),
            None => Self(raw.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// `1001.0` and `1001.00` are the same SKU as `1001`
fn integral_form(raw: &str) -> Option<String> {
    let (int, frac) = raw.split_once('.')?;
    if int.is_empty() || !int.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if frac.is_empty() || !frac.bytes().all(|b| b == b'0') {
        return None;
    }
    Some(int.to_owned())
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Sku {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl<'de> serde::Deserialize<'de> for Sku {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where D: serde::Deserializer<'de>
    {
        // JSON payloads send SKUs both as strings and as numbers
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Unsigned(u64),
            Signed(i64),
            Float(f64),
        }

        Ok(match <Raw as serde::Deserialize>::deserialize(deserializer)? {
            Raw::Text(s) => Sku::new(&s),
            Raw::Unsigned(n) => Sku(n.to_string()),
            Raw::Signed(n) => Sku(n.to_string()),
            Raw::Float(n) => Sku::new(&n.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_whitespace() {
        assert_eq!(Sku::new("  1001 ").as_str(), "1001");
    }

    #[test]
    fn collapses_integral_floats() {
        assert_eq!(Sku::new("1001.0"), Sku::new("1001"));
        assert_eq!(Sku::new("1001.000"), Sku::new("1001"));
    }

    #[test]
    fn keeps_real_fractions_and_text() {
        assert_eq!(Sku::new("1001.5").as_str(), "1001.5");
        assert_eq!(Sku::new("TSHIRT-RED-M").as_str(), "TSHIRT-RED-M");
        assert_eq!(Sku::new(".0").as_str(), ".0");
    }

    #[test]
    fn deserializes_numbers_and_strings() {
        let skus: Vec<Sku> = serde_json::from_str(r#"["1001", 1001, 1001.0, " A-7 "]"#).unwrap();
        assert_eq!(skus, vec![
            Sku::new("1001"),
            Sku::new("1001"),
            Sku::new("1001"),
            Sku::new("A-7"),
        ]);
    }
}
