use crate::{KensakuError, Result};

/// Parses the `left,right` words of range terms, both bounds inclusive.
#[derive(Default)]
pub struct RangeQueryEncoder {}

impl RangeQueryEncoder {
    pub fn decode(&self, query: &str) -> Result<(u64, u64)> {
        let invalid = || KensakuError::InvalidArgument(format!("malformed range term `{}`", query));
        let (left, right) = query.split_once(',').ok_or_else(invalid)?;
        let left = left.trim().parse::<u64>().map_err(|_| invalid())?;
        let right = right.trim().parse::<u64>().map_err(|_| invalid())?;
        Ok((left, right))
    }
}

#[cfg(test)]
mod tests {
    use super::RangeQueryEncoder;

    #[test]
    fn test_decode() {
        let encoder = RangeQueryEncoder::default();
        assert_eq!(encoder.decode("3,17").unwrap(), (3, 17));
        assert_eq!(encoder.decode(" 5 , 5 ").unwrap(), (5, 5));
        assert!(encoder.decode("5").is_err());
        assert!(encoder.decode("a,5").is_err());
        assert!(encoder.decode("1,-2").is_err());
    }
}
