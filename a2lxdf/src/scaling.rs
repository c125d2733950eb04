use crate::datatype::TypeInfo;

/// A linear conversion from raw ECU values to physical values: `factor * X + offset`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScaling {
    pub factor: f64,
    pub offset: f64,
}

impl LinearScaling {
    /// derive the conversion from the physical limits of a quantity
    ///
    /// The whole raw range `0 ..= 2^bits - 1` is mapped onto `|upper - lower|`.
    /// Unsigned values start at `lower`; signed values are two's complement and keep their
    /// zero point, so their offset is always 0.
    pub fn from_limits(lower_limit: f64, upper_limit: f64, type_info: TypeInfo) -> Self {
        let span = (num_traits::pow(2u64, type_info.size_bits as usize) - 1) as f64;
        let factor = (upper_limit - lower_limit).abs() / span;
        let offset = if type_info.signed { 0.0 } else { lower_limit };
        Self { factor, offset }
    }

    /// the identity conversion
    pub fn identity() -> Self {
        Self {
            factor: 1.0,
            offset: 0.0,
        }
    }

    /// the equation in XDF syntax; the offset term is left out if it is zero
    pub fn equation(&self) -> String {
        if self.offset == 0.0 {
            format!("{} * X", self.factor)
        } else {
            format!("{} * X + {}", self.factor, self.offset)
        }
    }

    /// convert a raw value
    pub fn apply(&self, raw: f64) -> f64 {
        self.factor * raw + self.offset
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const UBYTE: TypeInfo = TypeInfo {
        size_bits: 8,
        signed: false,
    };
    const SWORD: TypeInfo = TypeInfo {
        size_bits: 16,
        signed: true,
    };
    const ULONG: TypeInfo = TypeInfo {
        size_bits: 32,
        signed: false,
    };

    #[test]
    fn unsigned_scaling() {
        let scaling = LinearScaling::from_limits(-40.0, 215.0, UBYTE);
        assert_eq!(scaling.factor, 1.0);
        assert_eq!(scaling.offset, -40.0);
        assert_eq!(scaling.apply(0.0), -40.0);
        assert_eq!(scaling.apply(255.0), 215.0);
        assert_eq!(scaling.equation(), "1 * X + -40");

        let scaling = LinearScaling::from_limits(10.0, 1000.0, ULONG);
        let span = 4294967295.0;
        assert!((scaling.factor * span - 990.0).abs() < 1e-9);
        assert_eq!(scaling.apply(0.0), 10.0);
    }

    #[test]
    fn signed_scaling() {
        let scaling = LinearScaling::from_limits(-100.0, 100.0, SWORD);
        assert_eq!(scaling.offset, 0.0);
        assert!((scaling.factor * 65535.0 - 200.0).abs() < 1e-9);
        assert!(!scaling.equation().contains('+'));
    }

    #[test]
    fn limits_order_does_not_matter() {
        let a = LinearScaling::from_limits(0.0, 51.0, UBYTE);
        let b = LinearScaling::from_limits(51.0, 0.0, UBYTE);
        assert_eq!(a.factor, b.factor);
        assert_eq!(a.factor, 0.2);
        assert_eq!(a.equation(), "0.2 * X");
    }

    #[test]
    fn identity() {
        let scaling = LinearScaling::identity();
        assert_eq!(scaling.equation(), "1 * X");
        assert_eq!(scaling.apply(42.0), 42.0);
    }
}
