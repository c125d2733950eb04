//! The a2l `Module` and its name-keyed lookup tables

use crate::{
    A2lObject, A2lObjectName, ItemList, XdfError, expression::Identifier, record_layout::RecordLayout,
    specification::*,
};

/// A module owns all statements of a calibration description, sorted into one table per kind.
///
/// The tables are filled once by [`Module::build`]. Afterwards the module is only read.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    pub name: Identifier,
    pub long_identifier: String,
    pub characteristics: ItemList<Characteristic>,
    pub axis_pts: ItemList<AxisPts>,
    pub measurements: ItemList<Measurement>,
    pub functions: ItemList<Function>,
    pub compu_methods: ItemList<CompuMethod>,
    pub record_layouts: ItemList<RecordLayout>,
}

/// A reference to any statement stored in one of the tables of a [`Module`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StatementRef<'a> {
    Characteristic(&'a Characteristic),
    AxisPts(&'a AxisPts),
    Measurement(&'a Measurement),
    Function(&'a Function),
    CompuMethod(&'a CompuMethod),
    RecordLayout(&'a RecordLayout),
}

impl Module {
    /// create a new, empty module
    pub fn new(name: Identifier, long_identifier: String) -> Self {
        Self {
            name,
            long_identifier,
            ..Default::default()
        }
    }

    /// build a module from the list of statements in its body
    ///
    /// Every statement is sorted into the table for its kind.
    /// - If a table already contains a statement with the same name, the later statement
    ///   replaces the earlier one. A `NameCollisionError` is added to `log_msgs`.
    /// - Inner statements (`Constant`, `Variable`) cannot be stored in any table; they are
    ///   dropped and an `IndexingError` is added to `log_msgs`.
    pub fn build(
        name: Identifier,
        long_identifier: String,
        statements: Vec<Statement>,
        log_msgs: &mut Vec<XdfError>,
    ) -> Self {
        let mut module = Self::new(name, long_identifier);
        for statement in statements {
            module.index_statement(statement, log_msgs);
        }
        log::debug!(
            "indexed module {}: {} characteristics, {} axis_pts, {} measurements, {} functions, {} compu_methods, {} record_layouts",
            module.name,
            module.characteristics.len(),
            module.axis_pts.len(),
            module.measurements.len(),
            module.functions.len(),
            module.compu_methods.len(),
            module.record_layouts.len()
        );
        module
    }

    fn index_statement(&mut self, statement: Statement, log_msgs: &mut Vec<XdfError>) {
        let blockname = statement.blockname();
        let line = statement.get_line();
        let replaced_line = match statement {
            Statement::Map(map) => replace(&mut self.characteristics, Characteristic::Map(map)),
            Statement::Curve(curve) => {
                replace(&mut self.characteristics, Characteristic::Curve(curve))
            }
            Statement::Value(value) => {
                replace(&mut self.characteristics, Characteristic::Value(value))
            }
            Statement::ValBlk(val_blk) => {
                replace(&mut self.characteristics, Characteristic::ValBlk(val_blk))
            }
            Statement::CharacteristicText(text) => {
                replace(&mut self.characteristics, Characteristic::Text(text))
            }
            Statement::AxisPts(axis_pts) => replace(&mut self.axis_pts, axis_pts),
            Statement::Measurement(measurement) => replace(&mut self.measurements, measurement),
            Statement::Function(function) => replace(&mut self.functions, function),
            Statement::CompuMethod(compu_method) => replace(&mut self.compu_methods, compu_method),
            Statement::RecordLayout(record_layout) => {
                replace(&mut self.record_layouts, record_layout)
            }
            Statement::Constant(Constant { name, .. }) | Statement::Variable(Variable { name, .. }) => {
                let error = XdfError::IndexingError {
                    blockname: blockname.to_string(),
                    item_name: name.to_string(),
                    line,
                };
                log::warn!("{error}");
                log_msgs.push(error);
                return;
            }
        };

        if let Some((item_name, line_1)) = replaced_line {
            let error = XdfError::NameCollisionError {
                item_name,
                blockname: blockname.to_string(),
                line_1,
                line_2: line,
            };
            log::warn!("{error}");
            log_msgs.push(error);
        }
    }

    /// iterate over all statements in all tables
    ///
    /// The order is: characteristics, axis points, measurements, functions, compu methods, record layouts.
    /// Within each table the statements appear in table order.
    pub fn statements(&self) -> impl Iterator<Item = StatementRef<'_>> {
        self.characteristics
            .iter()
            .map(StatementRef::Characteristic)
            .chain(self.axis_pts.iter().map(StatementRef::AxisPts))
            .chain(self.measurements.iter().map(StatementRef::Measurement))
            .chain(self.functions.iter().map(StatementRef::Function))
            .chain(self.compu_methods.iter().map(StatementRef::CompuMethod))
            .chain(self.record_layouts.iter().map(StatementRef::RecordLayout))
    }
}

// insert an item into a table; returns the name and line of the item that was replaced, if any
fn replace<T: A2lObjectName + A2lObject>(table: &mut ItemList<T>, item: T) -> Option<(String, u32)> {
    table
        .insert(item)
        .map(|old| (old.get_name().to_string(), old.get_line()))
}

impl<'a> StatementRef<'a> {
    /// the name of the referenced statement; it borrows from the module, not from `self`
    pub fn name(&self) -> &'a str {
        match *self {
            Self::Characteristic(characteristic) => characteristic.get_name(),
            Self::AxisPts(axis_pts) => axis_pts.get_name(),
            Self::Measurement(measurement) => measurement.get_name(),
            Self::Function(function) => function.get_name(),
            Self::CompuMethod(compu_method) => compu_method.get_name(),
            Self::RecordLayout(record_layout) => record_layout.get_name(),
        }
    }

    pub fn get_line(&self) -> u32 {
        match self {
            Self::Characteristic(characteristic) => characteristic.get_line(),
            Self::AxisPts(axis_pts) => axis_pts.get_line(),
            Self::Measurement(measurement) => measurement.get_line(),
            Self::Function(function) => function.get_line(),
            Self::CompuMethod(compu_method) => compu_method.get_line(),
            Self::RecordLayout(record_layout) => record_layout.get_line(),
        }
    }
}

impl A2lObjectName for StatementRef<'_> {
    fn get_name(&self) -> &str {
        self.name()
    }
}
