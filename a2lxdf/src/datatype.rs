use std::fmt::Display;
use std::str::FromStr;

use crate::XdfError;

/// Description of the basic data types in the ECU program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Ubyte,
    Sbyte,
    Uword,
    Sword,
    Ulong,
    Slong,
    AUint64,
    AInt64,
    Float16Ieee,
    Float32Ieee,
    Float64Ieee,
}

/// element size and signedness of a data type, as far as the XDF layout is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    pub size_bits: u32,
    pub signed: bool,
}

impl DataType {
    /// look up the element size and signedness of this data type
    ///
    /// Only the types the layout generator knows how to scale are supported:
    /// 8, 16 and 32 bit integers and 32 bit floats. Everything else returns None.
    pub fn type_info(self) -> Option<TypeInfo> {
        let (size_bits, signed) = match self {
            DataType::Ubyte => (8, false),
            DataType::Sbyte => (8, true),
            DataType::Uword => (16, false),
            DataType::Sword => (16, true),
            DataType::Ulong => (32, false),
            DataType::Slong => (32, true),
            // floats are treated as signed, so that the scaling has no offset
            DataType::Float32Ieee => (32, true),
            DataType::AUint64 | DataType::AInt64 | DataType::Float16Ieee | DataType::Float64Ieee => {
                return None;
            }
        };
        Some(TypeInfo { size_bits, signed })
    }

    /// like `type_info()`, but an unsupported type becomes a resolution error for the named object
    pub(crate) fn resolve(self, source_type: &str, source_name: &str) -> Result<TypeInfo, XdfError> {
        self.type_info()
            .ok_or_else(|| XdfError::UnsupportedDataType {
                source_type: source_type.to_string(),
                source_name: source_name.to_string(),
                datatype: self,
            })
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Self::Ubyte => "UBYTE",
            Self::Sbyte => "SBYTE",
            Self::Uword => "UWORD",
            Self::Sword => "SWORD",
            Self::Ulong => "ULONG",
            Self::Slong => "SLONG",
            Self::AUint64 => "A_UINT64",
            Self::AInt64 => "A_INT64",
            Self::Float16Ieee => "FLOAT16_IEEE",
            Self::Float32Ieee => "FLOAT32_IEEE",
            Self::Float64Ieee => "FLOAT64_IEEE",
        };
        f.write_str(tag)
    }
}

impl FromStr for DataType {
    type Err = XdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UBYTE" => Ok(Self::Ubyte),
            "SBYTE" => Ok(Self::Sbyte),
            "UWORD" => Ok(Self::Uword),
            "SWORD" => Ok(Self::Sword),
            "ULONG" => Ok(Self::Ulong),
            "SLONG" => Ok(Self::Slong),
            "A_UINT64" => Ok(Self::AUint64),
            "A_INT64" => Ok(Self::AInt64),
            "FLOAT16_IEEE" => Ok(Self::Float16Ieee),
            "FLOAT32_IEEE" => Ok(Self::Float32Ieee),
            "FLOAT64_IEEE" => Ok(Self::Float64Ieee),
            _ => Err(XdfError::InvalidEnumValue {
                enumname: "DataType".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn type_sizes() {
        let cases = [
            (DataType::Ubyte, 8, false),
            (DataType::Sbyte, 8, true),
            (DataType::Uword, 16, false),
            (DataType::Sword, 16, true),
            (DataType::Ulong, 32, false),
            (DataType::Slong, 32, true),
            (DataType::Float32Ieee, 32, true),
        ];
        for (datatype, size_bits, signed) in cases {
            assert_eq!(
                datatype.type_info(),
                Some(TypeInfo { size_bits, signed }),
                "{datatype}"
            );
        }
    }

    #[test]
    fn unsupported_types() {
        assert_eq!(DataType::AUint64.type_info(), None);
        assert_eq!(DataType::Float64Ieee.type_info(), None);

        let result = DataType::AInt64.resolve("MEASUREMENT", "meas");
        assert!(matches!(
            result,
            Err(XdfError::UnsupportedDataType {
                datatype: DataType::AInt64,
                ..
            })
        ));
    }

    #[test]
    fn keyword_round_trip() {
        for datatype in [
            DataType::Ubyte,
            DataType::Slong,
            DataType::AUint64,
            DataType::Float16Ieee,
            DataType::Float64Ieee,
        ] {
            let text = datatype.to_string();
            assert_eq!(text.parse::<DataType>().unwrap(), datatype);
        }
        assert!("UINT8".parse::<DataType>().is_err());
    }
}
