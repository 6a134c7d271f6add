use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Five-digit US postal code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Zip(String);

impl Zip {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Zip {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.len() == 5 && t.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(t.to_string()))
        } else {
            Err(ValidationError::Zip(s.to_string()))
        }
    }
}

impl TryFrom<String> for Zip {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Zip> for String {
    fn from(zip: Zip) -> Self {
        zip.0
    }
}

impl fmt::Display for Zip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bedroom counts covered by the published rent schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub enum Bedrooms {
    Efficiency,
    One,
    Two,
    Three,
    Four,
}

impl Bedrooms {
    pub const ALL: [Bedrooms; 5] = [
        Bedrooms::Efficiency,
        Bedrooms::One,
        Bedrooms::Two,
        Bedrooms::Three,
        Bedrooms::Four,
    ];

    /// Column name used by the rent schedule feed.
    pub fn field_name(self) -> &'static str {
        match self {
            Bedrooms::Efficiency => "Efficiency",
            Bedrooms::One => "One-Bedroom",
            Bedrooms::Two => "Two-Bedroom",
            Bedrooms::Three => "Three-Bedroom",
            Bedrooms::Four => "Four-Bedroom",
        }
    }

    pub fn count(self) -> u8 {
        match self {
            Bedrooms::Efficiency => 0,
            Bedrooms::One => 1,
            Bedrooms::Two => 2,
            Bedrooms::Three => 3,
            Bedrooms::Four => 4,
        }
    }
}

impl TryFrom<i64> for Bedrooms {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Bedrooms::Efficiency),
            1 => Ok(Bedrooms::One),
            2 => Ok(Bedrooms::Two),
            3 => Ok(Bedrooms::Three),
            4 => Ok(Bedrooms::Four),
            other => Err(ValidationError::Bedrooms(other)),
        }
    }
}

impl TryFrom<u8> for Bedrooms {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Bedrooms::try_from(i64::from(value))
    }
}

impl From<Bedrooms> for u8 {
    fn from(b: Bedrooms) -> Self {
        b.count()
    }
}

impl fmt::Display for Bedrooms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

/// A validated rent lookup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RentQuery {
    pub zip: Zip,
    pub bedrooms: Bedrooms,
}

impl RentQuery {
    pub fn parse(zip: &str, bedrooms: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            zip: zip.parse()?,
            bedrooms: Bedrooms::try_from(bedrooms)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn accepts_five_digit_zip_with_surrounding_whitespace() {
        let zip: Zip = " 39339 ".parse().unwrap();
        assert_eq!(zip.as_str(), "39339");
    }

    #[test]
    fn rejects_malformed_zips() {
        for bad in ["", "3933", "393390", "3933a", "39-39", "３９３３９"] {
            assert_eq!(
                bad.parse::<Zip>(),
                Err(ValidationError::Zip(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn bedroom_field_mapping_is_total_and_injective() {
        let names: HashSet<_> = Bedrooms::ALL.iter().map(|b| b.field_name()).collect();
        assert_eq!(names.len(), Bedrooms::ALL.len());

        for (n, b) in Bedrooms::ALL.iter().enumerate() {
            assert_eq!(Bedrooms::try_from(n as i64).unwrap(), *b);
            assert_eq!(b.count() as usize, n);
        }
        assert_eq!(Bedrooms::Efficiency.field_name(), "Efficiency");
        assert_eq!(Bedrooms::Three.field_name(), "Three-Bedroom");
    }

    #[test]
    fn out_of_range_bedrooms_never_reach_the_resolver() {
        assert_eq!(RentQuery::parse("39339", 5), Err(ValidationError::Bedrooms(5)));
        assert_eq!(RentQuery::parse("39339", -1), Err(ValidationError::Bedrooms(-1)));
        assert!(serde_json::from_str::<Bedrooms>("7").is_err());
        assert_eq!(serde_json::from_str::<Bedrooms>("2").unwrap(), Bedrooms::Two);
    }
}
