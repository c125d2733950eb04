use std::fmt::Display;

use crate::expression::{Format, Identifier};

/// The storage style of an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisStyle {
    /// axis points are stored in a separate `AXIS_PTS` object (`COM_AXIS`)
    External,
    /// axis points are stored inline in front of the function values (`STD_AXIS`)
    Internal,
    /// axis points are constants without any storage (`FIX_AXIS`)
    Fixed,
}

impl Display for AxisStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Self::External => "COM_AXIS",
            Self::Internal => "STD_AXIS",
            Self::Fixed => "FIX_AXIS",
        };
        f.write_str(tag)
    }
}

/// The fields shared by all axis styles
#[derive(Debug, Clone, PartialEq)]
pub struct AxisData {
    /// the measurement that supplies the data type of the axis points
    pub input_quantity: Identifier,
    pub conversion: Identifier,
    pub max_axis_points: u32,
    pub lower_limit: f64,
    pub upper_limit: f64,
}

impl AxisData {
    pub fn new(
        input_quantity: Identifier,
        conversion: Identifier,
        max_axis_points: u32,
        lower_limit: f64,
        upper_limit: f64,
    ) -> Self {
        Self {
            input_quantity,
            conversion,
            max_axis_points,
            lower_limit,
            upper_limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExternalAxis {
    pub data: AxisData,
    pub axis_pts_ref: Identifier,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InternalAxis {
    pub data: AxisData,
    pub format: Format,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixedAxis {
    pub data: AxisData,
    pub format: Format,
}

/// The axis of a curve or map
///
/// The style is fixed when the axis is created, and each variant carries exactly the
/// fields that the style needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Axis {
    External(ExternalAxis),
    Internal(InternalAxis),
    Fixed(FixedAxis),
}

impl Axis {
    pub fn new_external(data: AxisData, axis_pts_ref: Identifier) -> Self {
        Axis::External(ExternalAxis { data, axis_pts_ref })
    }

    pub fn new_internal(data: AxisData, format: Format) -> Self {
        Axis::Internal(InternalAxis { data, format })
    }

    pub fn new_fixed(data: AxisData, format: Format) -> Self {
        Axis::Fixed(FixedAxis { data, format })
    }

    pub fn style(&self) -> AxisStyle {
        match self {
            Axis::External(_) => AxisStyle::External,
            Axis::Internal(_) => AxisStyle::Internal,
            Axis::Fixed(_) => AxisStyle::Fixed,
        }
    }

    pub fn data(&self) -> &AxisData {
        match self {
            Axis::External(ExternalAxis { data, .. })
            | Axis::Internal(InternalAxis { data, .. })
            | Axis::Fixed(FixedAxis { data, .. }) => data,
        }
    }

    /// number of axis points
    pub fn length(&self) -> u32 {
        self.data().max_axis_points
    }

    /// the display format, if the axis style has one
    pub fn format(&self) -> Option<&Format> {
        match self {
            Axis::External(_) => None,
            Axis::Internal(InternalAxis { format, .. }) | Axis::Fixed(FixedAxis { format, .. }) => {
                Some(format)
            }
        }
    }
}
