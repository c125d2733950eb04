use crate::XdfError;
use crate::datatype::DataType;
use crate::expression::Identifier;
use crate::specification::{A2lObject, A2lObjectName};

/// The axis member of a record layout (`AXIS_PTS_X` / `AXIS_PTS_Y`)
#[derive(Debug, Clone, PartialEq)]
pub struct AxisLayout {
    /// data type of the axis points
    pub axis_pts: DataType,
}

impl AxisLayout {
    pub fn new(axis_pts: DataType) -> Self {
        Self { axis_pts }
    }
}

/// The function value member of a record layout (`FNC_VALUES`)
#[derive(Debug, Clone, PartialEq)]
pub struct FncValues {
    pub datatype: DataType,
}

impl FncValues {
    pub fn new(datatype: DataType) -> Self {
        Self { datatype }
    }
}

/// Describes how the record of a characteristic is composed in memory
///
/// A record has at most one member per role (x axis, y axis, function values).
/// The constructors enforce the combinations that make sense:
/// - function values only: a value or value block
/// - x axis with optional function values: a curve (a fixed curve may omit the values)
/// - x and y axis with function values: a map
#[derive(Debug, Clone, PartialEq)]
pub struct RecordLayout {
    pub name: Identifier,
    pub line: u32,
    axis_x: Option<AxisLayout>,
    axis_y: Option<AxisLayout>,
    fnc_values: Option<FncValues>,
}

impl RecordLayout {
    /// create a record layout that only contains function values
    ///
    /// # Errors
    ///
    /// [`XdfError::ConstructionError`] if `fnc_values` is None, since the layout would be empty.
    pub fn new_values(name: Identifier, fnc_values: Option<FncValues>) -> Result<Self, XdfError> {
        let Some(fnc_values) = fnc_values else {
            return Err(construction_error(&name, "The given RECORD_LAYOUT is empty"));
        };
        Ok(Self {
            name,
            line: 0,
            axis_x: None,
            axis_y: None,
            fnc_values: Some(fnc_values),
        })
    }

    /// create a record layout for a curve
    pub fn new_curve(name: Identifier, axis_x: AxisLayout, fnc_values: Option<FncValues>) -> Self {
        Self {
            name,
            line: 0,
            axis_x: Some(axis_x),
            axis_y: None,
            fnc_values,
        }
    }

    /// create a record layout for a map
    ///
    /// # Errors
    ///
    /// [`XdfError::ConstructionError`] if `fnc_values` is None.
    pub fn new_map(
        name: Identifier,
        axis_x: AxisLayout,
        axis_y: AxisLayout,
        fnc_values: Option<FncValues>,
    ) -> Result<Self, XdfError> {
        let Some(fnc_values) = fnc_values else {
            return Err(construction_error(
                &name,
                "A RECORD_LAYOUT for a map must have FNC_VALUES",
            ));
        };
        Ok(Self {
            name,
            line: 0,
            axis_x: Some(axis_x),
            axis_y: Some(axis_y),
            fnc_values: Some(fnc_values),
        })
    }

    #[must_use]
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }

    pub fn has_x_axis(&self) -> bool {
        self.axis_x.is_some()
    }

    pub fn has_y_axis(&self) -> bool {
        self.axis_y.is_some()
    }

    pub fn has_fnc_values(&self) -> bool {
        self.fnc_values.is_some()
    }

    pub fn axis_x(&self) -> Option<&AxisLayout> {
        self.axis_x.as_ref()
    }

    pub fn axis_y(&self) -> Option<&AxisLayout> {
        self.axis_y.as_ref()
    }

    pub fn fnc_values(&self) -> Option<&FncValues> {
        self.fnc_values.as_ref()
    }
}

fn construction_error(name: &Identifier, description: &str) -> XdfError {
    XdfError::ConstructionError {
        blockname: "RECORD_LAYOUT".to_string(),
        item_name: name.to_string(),
        description: description.to_string(),
    }
}

impl A2lObjectName for RecordLayout {
    fn get_name(&self) -> &str {
        self.name.as_str()
    }
}

impl A2lObject for RecordLayout {
    fn get_line(&self) -> u32 {
        self.line
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn value_layout() {
        let rl = RecordLayout::new_values("rl".into(), Some(FncValues::new(DataType::Ubyte))).unwrap();
        assert!(!rl.has_x_axis());
        assert!(!rl.has_y_axis());
        assert!(rl.has_fnc_values());
        assert_eq!(rl.fnc_values().unwrap().datatype, DataType::Ubyte);

        let result = RecordLayout::new_values("empty".into(), None);
        assert!(matches!(result, Err(XdfError::ConstructionError { .. })));
    }

    #[test]
    fn curve_layout() {
        let axis = AxisLayout::new(DataType::Uword);
        let rl = RecordLayout::new_curve("rl".into(), axis.clone(), Some(FncValues::new(DataType::Sword)));
        assert!(rl.has_x_axis());
        assert!(!rl.has_y_axis());
        assert!(rl.has_fnc_values());
        assert_eq!(rl.axis_x(), Some(&axis));

        // a fixed curve may be defined without FNC_VALUES
        let rl = RecordLayout::new_curve("fixed".into(), axis, None);
        assert!(!rl.has_fnc_values());
    }

    #[test]
    fn map_layout() {
        let axis_x = AxisLayout::new(DataType::Ubyte);
        let axis_y = AxisLayout::new(DataType::Uword);
        let rl = RecordLayout::new_map(
            "rl".into(),
            axis_x.clone(),
            axis_y.clone(),
            Some(FncValues::new(DataType::Ulong)),
        )
        .unwrap()
        .with_line(12);
        assert!(rl.has_x_axis() && rl.has_y_axis() && rl.has_fnc_values());
        assert_eq!(rl.get_line(), 12);
        assert_eq!(rl.get_name(), "rl");

        let result = RecordLayout::new_map("bad".into(), axis_x, axis_y, None);
        let Err(XdfError::ConstructionError { item_name, .. }) = result else {
            panic!("expected a construction error");
        };
        assert_eq!(item_name, "bad");
    }
}
