//! The object model of a parsed a2l calibration description
//!
//! All statements are plain owned values. A statement refers to other statements only by
//! [`Identifier`]; these references are resolved by name through the tables of the [`Module`]
//! whenever they are needed.

use crate::XdfError;
use crate::axis::{Axis, AxisStyle};
use crate::datatype::DataType;
use crate::expression::{Address, Expression, Format, Identifier, Numeric};
use crate::module::Module;
use crate::record_layout::RecordLayout;

/// the compute method reference that stands for the identity conversion without a unit
pub const NO_COMPU_METHOD: &str = "NO_COMPU_METHOD";

/// access the name of a named a2l object
pub trait A2lObjectName {
    fn get_name(&self) -> &str;
}

/// access the source location of an a2l object
pub trait A2lObject {
    /// the line in the source document, or 0 if the object was created programmatically
    fn get_line(&self) -> u32;
}

/// Fields shared by all kinds of characteristics
#[derive(Debug, Clone, PartialEq)]
pub struct CharacteristicData {
    pub name: Identifier,
    pub long_identifier: String,
    pub address: Address,
    /// the record layout describing the storage of this characteristic
    pub deposit: Identifier,
    pub max_diff: f64,
    pub conversion: Identifier,
    pub lower_limit: f64,
    pub upper_limit: f64,
    pub format: Option<Format>,
    pub line: u32,
}

impl CharacteristicData {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: Identifier,
        long_identifier: String,
        address: Address,
        deposit: Identifier,
        max_diff: f64,
        conversion: Identifier,
        lower_limit: f64,
        upper_limit: f64,
    ) -> Self {
        Self {
            name,
            long_identifier,
            address,
            deposit,
            max_diff,
            conversion,
            lower_limit,
            upper_limit,
            format: None,
            line: 0,
        }
    }
}

/// A two-dimensional characteristic
///
/// Both axes always have the same [`AxisStyle`]; this is checked by [`Map::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    pub data: CharacteristicData,
    axis_x: Axis,
    axis_y: Axis,
}

impl Map {
    /// create a new map
    ///
    /// # Errors
    ///
    /// [`XdfError::ConstructionError`] if the two axes use different storage styles.
    pub fn new(data: CharacteristicData, axis_x: Axis, axis_y: Axis) -> Result<Self, XdfError> {
        if axis_x.style() != axis_y.style() {
            return Err(XdfError::ConstructionError {
                blockname: "CHARACTERISTIC".to_string(),
                item_name: data.name.to_string(),
                description: format!(
                    "a MAP cannot combine a {} x axis with a {} y axis",
                    axis_x.style(),
                    axis_y.style()
                ),
            });
        }
        Ok(Self {
            data,
            axis_x,
            axis_y,
        })
    }

    pub fn axis_style(&self) -> AxisStyle {
        self.axis_x.style()
    }

    pub fn axis_x(&self) -> &Axis {
        &self.axis_x
    }

    pub fn axis_y(&self) -> &Axis {
        &self.axis_y
    }

    pub fn axis_x_length(&self) -> u32 {
        self.axis_x.length()
    }

    pub fn axis_y_length(&self) -> u32 {
        self.axis_y.length()
    }
}

/// A one-dimensional characteristic
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub data: CharacteristicData,
    pub axis: Axis,
}

impl Curve {
    pub fn new(data: CharacteristicData, axis: Axis) -> Self {
        Self { data, axis }
    }

    pub fn axis_style(&self) -> AxisStyle {
        self.axis.style()
    }
}

/// A scalar characteristic
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub data: CharacteristicData,
}

impl Value {
    pub fn new(data: CharacteristicData) -> Self {
        Self { data }
    }
}

/// An array of `number` values without axes
#[derive(Debug, Clone, PartialEq)]
pub struct ValBlk {
    pub data: CharacteristicData,
    pub number: u32,
}

impl ValBlk {
    pub fn new(data: CharacteristicData, number: u32) -> Self {
        Self { data, number }
    }
}

/// A string of `size` characters
#[derive(Debug, Clone, PartialEq)]
pub struct CharacteristicText {
    pub data: CharacteristicData,
    pub size: u32,
}

impl CharacteristicText {
    pub fn new(data: CharacteristicData, size: u32) -> Self {
        Self { data, size }
    }
}

/// Any of the characteristic kinds; this is the value type of the characteristics table
#[derive(Debug, Clone, PartialEq)]
pub enum Characteristic {
    Map(Map),
    Curve(Curve),
    Value(Value),
    ValBlk(ValBlk),
    Text(CharacteristicText),
}

impl Characteristic {
    pub fn data(&self) -> &CharacteristicData {
        match self {
            Characteristic::Map(Map { data, .. })
            | Characteristic::Curve(Curve { data, .. })
            | Characteristic::Value(Value { data })
            | Characteristic::ValBlk(ValBlk { data, .. })
            | Characteristic::Text(CharacteristicText { data, .. }) => data,
        }
    }

    /// the a2l keyword of the characteristic type
    pub fn kind(&self) -> &'static str {
        match self {
            Characteristic::Map(_) => "MAP",
            Characteristic::Curve(_) => "CURVE",
            Characteristic::Value(_) => "VALUE",
            Characteristic::ValBlk(_) => "VAL_BLK",
            Characteristic::Text(_) => "ASCII",
        }
    }

    /// the storage style of the axes, for characteristics that have axes
    pub fn axis_style(&self) -> Option<AxisStyle> {
        match self {
            Characteristic::Map(map) => Some(map.axis_style()),
            Characteristic::Curve(curve) => Some(curve.axis_style()),
            _ => None,
        }
    }
}

/// Additional information carried by specialized measurements
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MeasurementKind {
    #[default]
    Plain,
    Bit {
        bit_mask: u64,
    },
    Value {
        conversion: Identifier,
    },
    Array {
        conversion: Identifier,
        array_size: u32,
    },
}

/// A measured quantity of the ECU
///
/// Axes refer to measurements to determine the data type of their axis points.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub name: Identifier,
    pub long_identifier: String,
    pub datatype: DataType,
    pub resolution: i64,
    pub accuracy: i64,
    pub lower_limit: Numeric,
    pub upper_limit: Numeric,
    pub format: Format,
    pub ecu_address: Address,
    pub kind: MeasurementKind,
    pub line: u32,
}

impl Measurement {
    pub fn new(
        name: Identifier,
        long_identifier: String,
        datatype: DataType,
        lower_limit: Numeric,
        upper_limit: Numeric,
        format: Format,
        ecu_address: Address,
    ) -> Self {
        Self {
            name,
            long_identifier,
            datatype,
            resolution: 0,
            accuracy: 100,
            lower_limit,
            upper_limit,
            format,
            ecu_address,
            kind: MeasurementKind::Plain,
            line: 0,
        }
    }
}

/// A separately stored axis, shared by curves and maps with an external axis
#[derive(Debug, Clone, PartialEq)]
pub struct AxisPts {
    pub name: Identifier,
    pub long_identifier: String,
    pub address: Address,
    pub input_quantity: Identifier,
    pub deposit_record: Identifier,
    pub max_diff: f64,
    pub conversion: Identifier,
    pub max_axis_points: u32,
    pub lower_limit: f64,
    pub upper_limit: f64,
    pub format: Format,
    pub line: u32,
}

impl AxisPts {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: Identifier,
        long_identifier: String,
        address: Address,
        input_quantity: Identifier,
        deposit_record: Identifier,
        max_diff: f64,
        conversion: Identifier,
        max_axis_points: u32,
        lower_limit: f64,
        upper_limit: f64,
        format: Format,
    ) -> Self {
        Self {
            name,
            long_identifier,
            address,
            input_quantity,
            deposit_record,
            max_diff,
            conversion,
            max_axis_points,
            lower_limit,
            upper_limit,
            format,
            line: 0,
        }
    }
}

/// A named linear conversion together with its physical unit
#[derive(Debug, Clone, PartialEq)]
pub struct CompuMethod {
    pub name: Identifier,
    pub long_identifier: String,
    pub format: Format,
    pub unit: String,
    pub line: u32,
}

impl CompuMethod {
    pub fn new(name: Identifier, long_identifier: String, format: Format, unit: String) -> Self {
        Self {
            name,
            long_identifier,
            format,
            unit,
            line: 0,
        }
    }
}

/// A functional grouping of characteristics and measurements
///
/// Functions become the categories of the generated document.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Identifier,
    pub long_identifier: String,
    pub def_characteristic: Vec<Identifier>,
    pub ref_characteristic: Vec<Identifier>,
    pub in_measurement: Vec<Identifier>,
    pub out_measurement: Vec<Identifier>,
    pub loc_measurement: Vec<Identifier>,
    pub sub_function: Vec<Identifier>,
    pub line: u32,
}

impl Function {
    pub fn new(name: Identifier, long_identifier: String) -> Self {
        Self {
            name,
            long_identifier,
            def_characteristic: Vec::new(),
            ref_characteristic: Vec::new(),
            in_measurement: Vec::new(),
            out_measurement: Vec::new(),
            loc_measurement: Vec::new(),
            sub_function: Vec::new(),
            line: 0,
        }
    }

    /// all entries of `DEF_CHARACTERISTIC` followed by all entries of `REF_CHARACTERISTIC`
    ///
    /// A characteristic listed in both is returned twice.
    pub fn characteristics(&self) -> impl Iterator<Item = &Identifier> {
        self.def_characteristic
            .iter()
            .chain(self.ref_characteristic.iter())
    }
}

/// A named constant; only valid inside of inner blocks
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub name: Identifier,
    pub value: Expression,
    pub line: u32,
}

/// A named variable; only valid inside of inner blocks
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: Identifier,
    pub value: Option<Expression>,
    pub line: u32,
}

/// Any statement that can appear in the body of a module
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Map(Map),
    Curve(Curve),
    Value(Value),
    ValBlk(ValBlk),
    CharacteristicText(CharacteristicText),
    AxisPts(AxisPts),
    Measurement(Measurement),
    Function(Function),
    CompuMethod(CompuMethod),
    RecordLayout(RecordLayout),
    Constant(Constant),
    Variable(Variable),
}

impl Statement {
    /// the a2l keyword of the statement
    pub fn blockname(&self) -> &'static str {
        match self {
            Statement::Map(_)
            | Statement::Curve(_)
            | Statement::Value(_)
            | Statement::ValBlk(_)
            | Statement::CharacteristicText(_) => "CHARACTERISTIC",
            Statement::AxisPts(_) => "AXIS_PTS",
            Statement::Measurement(_) => "MEASUREMENT",
            Statement::Function(_) => "FUNCTION",
            Statement::CompuMethod(_) => "COMPU_METHOD",
            Statement::RecordLayout(_) => "RECORD_LAYOUT",
            Statement::Constant(_) => "CONSTANT",
            Statement::Variable(_) => "VARIABLE",
        }
    }
}

/// The `HEADER` of a project
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Header {
    pub comment: String,
    pub version: String,
    pub project_no: Identifier,
}

impl Header {
    pub fn new(comment: String, version: String, project_no: Identifier) -> Self {
        Self {
            comment,
            version,
            project_no,
        }
    }
}

/// The root of the object model
///
/// Dropping the project releases the whole tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub header: Header,
    pub module: Module,
}

impl Project {
    pub fn new(header: Header, module: Module) -> Self {
        Self { header, module }
    }
}

macro_rules! impl_a2l_object {
    ( $( $typename:ty ),* ) => {
        $(
            impl A2lObjectName for $typename {
                fn get_name(&self) -> &str {
                    self.name.as_str()
                }
            }

            impl A2lObject for $typename {
                fn get_line(&self) -> u32 {
                    self.line
                }
            }
        )*
    };
}

impl_a2l_object!(
    CharacteristicData,
    Measurement,
    AxisPts,
    CompuMethod,
    Function,
    Constant,
    Variable
);

impl A2lObjectName for Characteristic {
    fn get_name(&self) -> &str {
        self.data().name.as_str()
    }
}

impl A2lObject for Characteristic {
    fn get_line(&self) -> u32 {
        self.data().line
    }
}

impl A2lObjectName for Statement {
    fn get_name(&self) -> &str {
        match self {
            Statement::Map(Map { data, .. })
            | Statement::Curve(Curve { data, .. })
            | Statement::Value(Value { data })
            | Statement::ValBlk(ValBlk { data, .. })
            | Statement::CharacteristicText(CharacteristicText { data, .. }) => data.get_name(),
            Statement::AxisPts(axis_pts) => axis_pts.get_name(),
            Statement::Measurement(measurement) => measurement.get_name(),
            Statement::Function(function) => function.get_name(),
            Statement::CompuMethod(compu_method) => compu_method.get_name(),
            Statement::RecordLayout(record_layout) => record_layout.get_name(),
            Statement::Constant(constant) => constant.get_name(),
            Statement::Variable(variable) => variable.get_name(),
        }
    }
}

impl A2lObject for Statement {
    fn get_line(&self) -> u32 {
        match self {
            Statement::Map(Map { data, .. })
            | Statement::Curve(Curve { data, .. })
            | Statement::Value(Value { data })
            | Statement::ValBlk(ValBlk { data, .. })
            | Statement::CharacteristicText(CharacteristicText { data, .. }) => data.get_line(),
            Statement::AxisPts(axis_pts) => axis_pts.get_line(),
            Statement::Measurement(measurement) => measurement.get_line(),
            Statement::Function(function) => function.get_line(),
            Statement::CompuMethod(compu_method) => compu_method.get_line(),
            Statement::RecordLayout(record_layout) => record_layout.get_line(),
            Statement::Constant(constant) => constant.get_line(),
            Statement::Variable(variable) => variable.get_line(),
        }
    }
}
