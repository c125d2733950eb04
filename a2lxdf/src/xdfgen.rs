//! Generation of the XDF document
//!
//! For every characteristic the generator first resolves all cross references and computes
//! a complete layout plan. Only when the plan is complete is anything written, so an object
//! that fails to resolve is skipped without leaving a partial element in the document.

use std::collections::HashMap;

use fnv::FnvBuildHasher;

use crate::axis::{Axis, AxisStyle};
use crate::config::{ByteOrder, XdfConfig};
use crate::datatype::TypeInfo;
use crate::expression::{Format, Identifier};
use crate::module::{Module, StatementRef};
use crate::record_layout::{FncValues, RecordLayout};
use crate::scaling::LinearScaling;
use crate::xmlwriter::XmlWriter;
use crate::{
    A2lObject, A2lObjectName, Characteristic, CharacteristicData, CharacteristicText, Curve,
    ItemList, Map, NO_COMPU_METHOD, Project, ValBlk, Value, XdfError,
};

const XDF_VERSION: &str = "1.50";

// XDF output types
const OUTPUT_FLOAT: u32 = 1;
const OUTPUT_ASCII: u32 = 4;

/// Generates an XDF document from the characteristics of a [`Project`]
///
/// Usage: create the generator, call [`visit`](Self::visit) or
/// [`visit_characteristic`](Self::visit_characteristic) once per characteristic, then call
/// [`finalize`](Self::finalize) and retrieve the document with [`finish`](Self::finish).
#[derive(Debug)]
pub struct XdfGenerator<'a> {
    module: &'a Module,
    config: XdfConfig,
    writer: XmlWriter,
    // category number (function table index) for each function name
    categories: HashMap<String, usize, FnvBuildHasher>,
    next_uid: u32,
    done: bool,
    log_msgs: Vec<XdfError>,
}

// where and how the data of one axis or value block is stored
#[derive(Debug, Clone, PartialEq)]
struct EmbeddedData {
    type_flags: u32,
    address: u32,
    element_size_bits: u32,
    row_count: Option<u32>,
    col_count: Option<u32>,
    major_stride_bits: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
struct AxisPlan {
    id: &'static str,
    // None for fixed axes, which have no storage
    embedded: Option<EmbeddedData>,
    length: u32,
    units: String,
    decimal_places: u32,
    scaling: LinearScaling,
}

#[derive(Debug, Clone, PartialEq)]
struct ValuesPlan {
    embedded: EmbeddedData,
    units: String,
    decimal_places: u32,
    lower_limit: f64,
    upper_limit: f64,
    output_type: u32,
    scaling: LinearScaling,
}

#[derive(Debug, Clone, PartialEq)]
struct TablePlan {
    title: String,
    description: String,
    categories: Vec<usize>,
    axes: Vec<AxisPlan>,
    values: ValuesPlan,
}

#[derive(Debug, Clone, PartialEq)]
struct ConstantPlan {
    title: String,
    description: String,
    categories: Vec<usize>,
    embedded: EmbeddedData,
    units: String,
    decimal_places: u32,
    scaling: LinearScaling,
}

#[derive(Debug, Clone, PartialEq)]
enum ObjectPlan {
    Table(TablePlan),
    Constant(ConstantPlan),
}

// the resolved conversion of a quantity
struct Conversion<'b> {
    units: String,
    format: Option<&'b Format>,
}

impl<'a> XdfGenerator<'a> {
    /// create a generator for the module of the given project and write the document header
    ///
    /// # Errors
    ///
    /// Only [`XdfError::WriterError`], which indicates a bug in the generator.
    pub fn new(project: &'a Project, config: XdfConfig) -> Result<Self, XdfError> {
        let mut generator = Self {
            module: &project.module,
            config,
            writer: XmlWriter::new(),
            categories: HashMap::default(),
            next_uid: 1,
            done: false,
            log_msgs: Vec::new(),
        };
        generator.create_header(project)?;
        Ok(generator)
    }

    /// visit any statement of the module
    ///
    /// Only characteristics produce output; all other statements exist to be referenced.
    ///
    /// # Errors
    ///
    /// See [`visit_characteristic`](Self::visit_characteristic).
    pub fn visit(&mut self, statement: StatementRef<'_>) -> Result<(), XdfError> {
        match statement {
            StatementRef::Characteristic(characteristic) => self.visit_characteristic(characteristic),
            StatementRef::AxisPts(_)
            | StatementRef::Measurement(_)
            | StatementRef::Function(_)
            | StatementRef::CompuMethod(_)
            | StatementRef::RecordLayout(_) => Ok(()),
        }
    }

    /// generate the XDF object for one characteristic
    ///
    /// If the characteristic cannot be laid out, e.g. because a referenced statement does
    /// not exist, it is skipped and the problem is added to the log messages.
    ///
    /// # Errors
    ///
    /// [`XdfError::WriterError`] if the document can no longer be written, in particular
    /// after [`finalize`](Self::finalize) was called.
    pub fn visit_characteristic(&mut self, characteristic: &Characteristic) -> Result<(), XdfError> {
        log::debug!(
            "generating {} {}",
            characteristic.kind(),
            characteristic.get_name()
        );
        let plan = match characteristic {
            Characteristic::Map(map) => self.plan_map(map).map(ObjectPlan::Table),
            Characteristic::Curve(curve) => self.plan_curve(curve).map(ObjectPlan::Table),
            Characteristic::Value(value) => self.plan_value(value).map(ObjectPlan::Constant),
            Characteristic::ValBlk(val_blk) => self.plan_val_blk(val_blk).map(ObjectPlan::Table),
            Characteristic::Text(text) => self.plan_text(text).map(ObjectPlan::Table),
        };

        match plan {
            Ok(ObjectPlan::Table(table)) => self.write_table(&table),
            Ok(ObjectPlan::Constant(constant)) => self.write_constant(&constant),
            Err(error) => {
                log::warn!(
                    "skipping {} {}: {error}",
                    characteristic.kind(),
                    characteristic.get_name()
                );
                self.log_msgs.push(error);
                Ok(())
            }
        }
    }

    /// close the document. Calling this more than once has no effect.
    pub fn finalize(&mut self) -> Result<(), XdfError> {
        if self.done {
            return Ok(());
        }
        self.writer.close_tag()?;
        self.done = true;
        Ok(())
    }

    /// the document text that has been generated so far
    pub fn materialize(&self) -> &str {
        self.writer.materialize()
    }

    /// all objects that were skipped so far, together with the reason
    pub fn log_msgs(&self) -> &[XdfError] {
        &self.log_msgs
    }

    /// consume the generator and return the document text and the log messages
    pub fn finish(self) -> (String, Vec<XdfError>) {
        (self.writer.finish(), self.log_msgs)
    }

    // ---------------------------------------------------------------------------------
    // header

    fn create_header(&mut self, project: &Project) -> Result<(), XdfError> {
        let title = self
            .config
            .title
            .clone()
            .unwrap_or_else(|| project.header.project_no.to_string());
        let description = self
            .config
            .description
            .clone()
            .unwrap_or_else(|| project.header.comment.clone());
        let lsb_first = if self.config.byte_order == ByteOrder::MsbLast {
            "1"
        } else {
            "0"
        };

        let w = &mut self.writer;
        w.open_tag("XDFFORMAT")?;
        w.attribute("version", XDF_VERSION)?;
        w.open_tag("XDFHEADER")?;
        w.text_element("flags", "0x1")?;
        w.text_element("fileversion", &self.config.file_version)?;
        w.text_element("deftitle", &title)?;
        w.text_element("description", &description)?;
        w.text_element("author", &self.config.author)?;
        w.text_element("baseoffset", &self.config.base_offset.to_string())?;

        w.open_tag("DEFAULTS")?;
        w.attribute("datasizeinbits", "8")?;
        w.attribute("sigdigits", "2")?;
        w.attribute("outputtype", "1")?;
        w.attribute("signed", "0")?;
        w.attribute("lsbfirst", lsb_first)?;
        w.attribute("float", "0")?;
        w.close_tag()?;

        w.open_tag("REGION")?;
        w.attribute("type", "0xFFFFFFFF")?;
        w.attribute("startaddress", "0x0")?;
        w.attribute("size", &format!("0x{:X}", self.config.region_size))?;
        w.attribute("regionflags", "0x0")?;
        w.attribute("name", "Binary File")?;
        w.attribute(
            "desc",
            "This region describes the bin file edited by this XDF",
        )?;
        w.close_tag()?;

        self.create_categories()?;

        // close XDFHEADER; XDFFORMAT stays open until finalize()
        self.writer.close_tag()?;
        Ok(())
    }

    // one CATEGORY per function; the category number is the index of the function in its table
    fn create_categories(&mut self) -> Result<(), XdfError> {
        let module = self.module;
        for (index, function) in module.functions.iter().enumerate() {
            self.categories.insert(function.name.to_string(), index);

            self.writer.open_tag("CATEGORY")?;
            self.writer.attribute("index", &format!("0x{index:X}"))?;
            self.writer.attribute(
                "name",
                &format!("{}: {}", function.name, function.long_identifier),
            )?;
            self.writer.close_tag()?;
        }
        Ok(())
    }

    // ---------------------------------------------------------------------------------
    // layout planning

    fn plan_map(&self, map: &Map) -> Result<TablePlan, XdfError> {
        let data = &map.data;
        let record_layout = self.resolve_record_layout(data)?;
        let fnc_values = require_fnc_values(data, record_layout)?;
        if map.axis_style() == AxisStyle::Internal
            && (!record_layout.has_x_axis() || !record_layout.has_y_axis())
        {
            return Err(missing_axis_description(data, record_layout));
        }

        let mut offset = 0;
        let axis_x = self.plan_axis(data, map.axis_x(), "x", &mut offset)?;
        let axis_y = self.plan_axis(data, map.axis_y(), "y", &mut offset)?;

        let values = self.plan_values(
            data,
            fnc_values,
            offset,
            Some(map.axis_x_length()),
            Some(map.axis_y_length()),
        )?;

        Ok(TablePlan {
            title: data.name.to_string(),
            description: data.long_identifier.clone(),
            categories: self.category_refs(&data.name),
            axes: vec![axis_x, axis_y],
            values,
        })
    }

    fn plan_curve(&self, curve: &Curve) -> Result<TablePlan, XdfError> {
        let data = &curve.data;
        let record_layout = self.resolve_record_layout(data)?;
        let fnc_values = require_fnc_values(data, record_layout)?;
        if curve.axis_style() == AxisStyle::Internal && !record_layout.has_x_axis() {
            return Err(missing_axis_description(data, record_layout));
        }

        let mut offset = 0;
        let axis_x = self.plan_axis(data, &curve.axis, "x", &mut offset)?;
        let values = self.plan_values(data, fnc_values, offset, Some(curve.axis.length()), Some(1))?;

        Ok(TablePlan {
            title: data.name.to_string(),
            description: data.long_identifier.clone(),
            categories: self.category_refs(&data.name),
            axes: vec![axis_x],
            values,
        })
    }

    fn plan_val_blk(&self, val_blk: &ValBlk) -> Result<TablePlan, XdfError> {
        let data = &val_blk.data;
        let record_layout = self.resolve_record_layout(data)?;
        let fnc_values = require_fnc_values(data, record_layout)?;
        let values = self.plan_values(data, fnc_values, 0, Some(1), Some(val_blk.number))?;

        Ok(TablePlan {
            title: data.name.to_string(),
            description: data.long_identifier.clone(),
            categories: self.category_refs(&data.name),
            axes: Vec::new(),
            values,
        })
    }

    fn plan_text(&self, text: &CharacteristicText) -> Result<TablePlan, XdfError> {
        let data = &text.data;
        let record_layout = self.resolve_record_layout(data)?;
        let fnc_values = require_fnc_values(data, record_layout)?;
        let type_info = fnc_values
            .datatype
            .resolve("RECORD_LAYOUT", record_layout.get_name())?;
        let conversion = self.resolve_conversion(&data.conversion, data, "CHARACTERISTIC")?;

        Ok(TablePlan {
            title: data.name.to_string(),
            description: data.long_identifier.clone(),
            categories: self.category_refs(&data.name),
            axes: Vec::new(),
            values: ValuesPlan {
                embedded: EmbeddedData {
                    type_flags: self.type_flags(type_info),
                    address: self.map_address(data, i64::from(data.address.value()))?,
                    element_size_bits: type_info.size_bits,
                    row_count: Some(1),
                    col_count: Some(text.size),
                    major_stride_bits: None,
                },
                units: conversion.units,
                decimal_places: 0,
                lower_limit: data.lower_limit,
                upper_limit: data.upper_limit,
                output_type: OUTPUT_ASCII,
                scaling: LinearScaling::identity(),
            },
        })
    }

    fn plan_value(&self, value: &Value) -> Result<ConstantPlan, XdfError> {
        let data = &value.data;
        let record_layout = self.resolve_record_layout(data)?;
        let fnc_values = require_fnc_values(data, record_layout)?;
        let type_info = fnc_values
            .datatype
            .resolve("RECORD_LAYOUT", record_layout.get_name())?;
        let conversion = self.resolve_conversion(&data.conversion, data, "CHARACTERISTIC")?;
        let decimal_places =
            decimal_places(data.format.as_ref().or(conversion.format), data, "CHARACTERISTIC")?;

        Ok(ConstantPlan {
            title: data.name.to_string(),
            description: data.long_identifier.clone(),
            categories: self.category_refs(&data.name),
            embedded: EmbeddedData {
                type_flags: self.type_flags(type_info),
                address: self.map_address(data, i64::from(data.address.value()))?,
                element_size_bits: type_info.size_bits,
                row_count: None,
                col_count: None,
                major_stride_bits: None,
            },
            units: conversion.units,
            decimal_places,
            scaling: LinearScaling::from_limits(data.lower_limit, data.upper_limit, type_info),
        })
    }

    // lay out one axis of a curve or map
    // Internal axes are stored at the current end of the record and advance `offset` by their size
    fn plan_axis(
        &self,
        owner: &CharacteristicData,
        axis: &Axis,
        id: &'static str,
        offset: &mut u64,
    ) -> Result<AxisPlan, XdfError> {
        let source_type = format!("AXIS_DESCR {id} of CHARACTERISTIC");
        let axis_data = axis.data();

        let measurement = lookup(
            &self.module.measurements,
            &axis_data.input_quantity,
            &source_type,
            owner,
            "MEASUREMENT",
        )?;
        let type_info = measurement
            .datatype
            .resolve("MEASUREMENT", measurement.get_name())?;

        let embedded_address = match axis {
            Axis::External(external) => {
                // the axis points have their own address; the record of the owner is unaffected
                let axis_pts = lookup(
                    &self.module.axis_pts,
                    &external.axis_pts_ref,
                    &source_type,
                    owner,
                    "AXIS_PTS",
                )?;
                Some(self.map_address(owner, i64::from(axis_pts.address.value()))?)
            }
            Axis::Internal(_) => {
                let start = i64::from(owner.address.value()) + *offset as i64;
                *offset += (u64::from(axis.length()) * u64::from(type_info.size_bits)).div_ceil(8);
                Some(self.map_address(owner, start)?)
            }
            Axis::Fixed(_) => None,
        };

        let conversion = self.resolve_conversion(&axis_data.conversion, owner, &source_type)?;
        let decimal_places =
            decimal_places(axis.format().or(conversion.format), owner, &source_type)?;

        Ok(AxisPlan {
            id,
            embedded: embedded_address.map(|address| EmbeddedData {
                type_flags: self.type_flags(type_info),
                address,
                element_size_bits: type_info.size_bits,
                row_count: None,
                col_count: Some(axis.length()),
                major_stride_bits: Some(type_info.size_bits),
            }),
            length: axis.length(),
            units: conversion.units,
            decimal_places,
            scaling: LinearScaling::from_limits(
                axis_data.lower_limit,
                axis_data.upper_limit,
                type_info,
            ),
        })
    }

    // lay out the function values, which follow all internal axes
    fn plan_values(
        &self,
        data: &CharacteristicData,
        fnc_values: &FncValues,
        offset: u64,
        row_count: Option<u32>,
        col_count: Option<u32>,
    ) -> Result<ValuesPlan, XdfError> {
        let type_info = fnc_values.datatype.resolve("CHARACTERISTIC", data.get_name())?;
        let conversion = self.resolve_conversion(&data.conversion, data, "CHARACTERISTIC")?;
        let decimal_places =
            decimal_places(data.format.as_ref().or(conversion.format), data, "CHARACTERISTIC")?;
        let start = i64::from(data.address.value()) + offset as i64;

        Ok(ValuesPlan {
            embedded: EmbeddedData {
                type_flags: self.type_flags(type_info),
                address: self.map_address(data, start)?,
                element_size_bits: type_info.size_bits,
                row_count,
                col_count,
                major_stride_bits: None,
            },
            units: conversion.units,
            decimal_places,
            lower_limit: data.lower_limit,
            upper_limit: data.upper_limit,
            output_type: OUTPUT_FLOAT,
            scaling: LinearScaling::from_limits(data.lower_limit, data.upper_limit, type_info),
        })
    }

    fn resolve_record_layout(&self, data: &CharacteristicData) -> Result<&'a RecordLayout, XdfError> {
        lookup(
            &self.module.record_layouts,
            &data.deposit,
            "CHARACTERISTIC",
            data,
            "RECORD_LAYOUT",
        )
    }

    // NO_COMPU_METHOD is the identity conversion without a unit
    fn resolve_conversion(
        &self,
        conversion: &Identifier,
        owner: &CharacteristicData,
        source_type: &str,
    ) -> Result<Conversion<'a>, XdfError> {
        if conversion == NO_COMPU_METHOD {
            return Ok(Conversion {
                units: "-".to_string(),
                format: None,
            });
        }
        let compu_method = lookup(
            &self.module.compu_methods,
            conversion,
            source_type,
            owner,
            "COMPU_METHOD",
        )?;
        let units = if compu_method.unit.is_empty() {
            "-".to_string()
        } else {
            compu_method.unit.clone()
        };
        Ok(Conversion {
            units,
            format: Some(&compu_method.format),
        })
    }

    // the numbers (index + 1) of all categories whose function lists the named characteristic
    // 0 is reserved for "no category"
    fn category_refs(&self, name: &Identifier) -> Vec<usize> {
        let mut refs = Vec::new();
        for function in &self.module.functions {
            let Some(index) = self.categories.get(function.get_name()) else {
                continue;
            };
            let count = function
                .characteristics()
                .filter(|ident| *ident == name)
                .count();
            refs.extend(std::iter::repeat_n(index + 1, count));
        }
        refs
    }

    fn type_flags(&self, type_info: TypeInfo) -> u32 {
        let mut type_flags = 0;
        if type_info.signed {
            type_flags |= 0x1;
        }
        if self.config.byte_order == ByteOrder::MsbLast {
            // little endian
            type_flags |= 0x2;
        }
        type_flags
    }

    // apply the configured address offset; the result must still be a valid 32 bit address
    fn map_address(&self, owner: &CharacteristicData, address: i64) -> Result<u32, XdfError> {
        address
            .checked_add(self.config.address_offset)
            .and_then(|mapped| u32::try_from(mapped).ok())
            .ok_or_else(|| XdfError::ContentError {
                blockname: "CHARACTERISTIC".to_string(),
                item_name: owner.name.to_string(),
                line: owner.get_line(),
                description: format!(
                    "the address {address:#X} with offset {} is outside of the binary file",
                    self.config.address_offset
                ),
            })
    }

    // ---------------------------------------------------------------------------------
    // output

    fn write_table(&mut self, table: &TablePlan) -> Result<(), XdfError> {
        let uid = self.take_uid();
        let w = &mut self.writer;
        w.open_tag("XDFTABLE")?;
        w.attribute("uniqueid", &uid)?;
        w.attribute("flags", "0x0")?;
        w.text_element("title", &table.title)?;
        w.text_element("description", &table.description)?;
        write_category_refs(w, &table.categories)?;

        for axis in &table.axes {
            write_axis(w, axis)?;
        }

        let values = &table.values;
        w.open_tag("XDFAXIS")?;
        w.attribute("id", "z")?;
        write_embedded_data(w, &values.embedded)?;
        w.text_element("units", &values.units)?;
        w.text_element("decimalpl", &values.decimal_places.to_string())?;
        w.text_element("min", &values.lower_limit.to_string())?;
        w.text_element("max", &values.upper_limit.to_string())?;
        w.text_element("outputtype", &values.output_type.to_string())?;
        write_math(w, &values.scaling)?;
        // close XDFAXIS and XDFTABLE
        w.close_tags(2)?;
        Ok(())
    }

    fn write_constant(&mut self, constant: &ConstantPlan) -> Result<(), XdfError> {
        let uid = self.take_uid();
        let w = &mut self.writer;
        w.open_tag("XDFCONSTANT")?;
        w.attribute("uniqueid", &uid)?;
        w.text_element("title", &constant.title)?;
        w.text_element("description", &constant.description)?;
        write_category_refs(w, &constant.categories)?;
        write_embedded_data(w, &constant.embedded)?;
        w.text_element("units", &constant.units)?;
        w.text_element("decimalpl", &constant.decimal_places.to_string())?;
        w.text_element("datatype", "0")?;
        w.text_element("unittype", "0")?;
        write_dalink(w)?;
        write_math(w, &constant.scaling)?;
        w.close_tag()?;
        Ok(())
    }

    fn take_uid(&mut self) -> String {
        let uid = format!("0x{:X}", self.next_uid);
        self.next_uid += 1;
        uid
    }
}

fn write_axis(w: &mut XmlWriter, axis: &AxisPlan) -> Result<(), XdfError> {
    w.open_tag("XDFAXIS")?;
    w.attribute("id", axis.id)?;
    w.attribute("uniqueid", "0x0")?;
    if let Some(embedded) = &axis.embedded {
        write_embedded_data(w, embedded)?;
    }
    w.text_element("units", &axis.units)?;
    w.text_element("indexcount", &axis.length.to_string())?;
    w.text_element("decimalpl", &axis.decimal_places.to_string())?;
    if axis.embedded.is_some() {
        w.open_tag("embedinfo")?;
        w.attribute("type", "1")?;
        w.close_tag()?;
    }
    w.text_element("datatype", "0")?;
    w.text_element("unittype", "0")?;
    write_dalink(w)?;
    write_math(w, &axis.scaling)?;
    w.close_tag()?;
    Ok(())
}

fn write_embedded_data(w: &mut XmlWriter, embedded: &EmbeddedData) -> Result<(), XdfError> {
    w.open_tag("EMBEDDEDDATA")?;
    w.attribute("mmedtypeflags", &format!("0x{:X}", embedded.type_flags))?;
    w.attribute("mmedaddress", &format!("0x{:X}", embedded.address))?;
    w.attribute("mmedelementsizebits", &embedded.element_size_bits.to_string())?;
    if let Some(row_count) = embedded.row_count {
        w.attribute("mmedrowcount", &row_count.to_string())?;
    }
    if let Some(col_count) = embedded.col_count {
        w.attribute("mmedcolcount", &col_count.to_string())?;
    }
    if let Some(stride) = embedded.major_stride_bits {
        w.attribute("mmedmajorstridebits", &stride.to_string())?;
    }
    w.close_tag()?;
    Ok(())
}

fn write_category_refs(w: &mut XmlWriter, categories: &[usize]) -> Result<(), XdfError> {
    for (index, category) in categories.iter().enumerate() {
        w.open_tag("CATEGORYMEM")?;
        w.attribute("index", &index.to_string())?;
        w.attribute("category", &category.to_string())?;
        w.close_tag()?;
    }
    Ok(())
}

fn write_dalink(w: &mut XmlWriter) -> Result<(), XdfError> {
    w.open_tag("DALINK")?;
    w.attribute("index", "0")?;
    w.close_tag()?;
    Ok(())
}

fn write_math(w: &mut XmlWriter, scaling: &LinearScaling) -> Result<(), XdfError> {
    w.open_tag("MATH")?;
    w.attribute("equation", &scaling.equation())?;
    w.open_tag("VAR")?;
    w.attribute("id", "X")?;
    // close VAR and MATH
    w.close_tags(2)?;
    Ok(())
}

// find a statement by name, or report a cross reference error for the owning characteristic
fn lookup<'b, T: A2lObjectName>(
    table: &'b ItemList<T>,
    name: &Identifier,
    source_type: &str,
    owner: &CharacteristicData,
    target_type: &str,
) -> Result<&'b T, XdfError> {
    table
        .get(name.as_str())
        .ok_or_else(|| XdfError::CrossReferenceError {
            source_type: source_type.to_string(),
            source_name: owner.name.to_string(),
            source_line: owner.get_line(),
            target_type: target_type.to_string(),
            target_name: name.to_string(),
        })
}

fn require_fnc_values<'b>(
    data: &CharacteristicData,
    record_layout: &'b RecordLayout,
) -> Result<&'b FncValues, XdfError> {
    record_layout
        .fnc_values()
        .ok_or_else(|| XdfError::ContentError {
            blockname: "CHARACTERISTIC".to_string(),
            item_name: data.name.to_string(),
            line: data.get_line(),
            description: format!(
                "Referenced RECORD_LAYOUT {} does not have FNC_VALUES.",
                record_layout.name
            ),
        })
}

fn missing_axis_description(data: &CharacteristicData, record_layout: &RecordLayout) -> XdfError {
    XdfError::ContentError {
        blockname: "CHARACTERISTIC".to_string(),
        item_name: data.name.to_string(),
        line: data.get_line(),
        description: format!(
            "Referenced RECORD_LAYOUT {} is missing the axis description.",
            record_layout.name
        ),
    }
}

// a quantity without any format is shown without decimal places
fn decimal_places(
    format: Option<&Format>,
    owner: &CharacteristicData,
    source_type: &str,
) -> Result<u32, XdfError> {
    let Some(format) = format else {
        return Ok(0);
    };
    format
        .decimal_places()
        .ok_or_else(|| XdfError::ContentError {
            blockname: source_type.to_string(),
            item_name: owner.name.to_string(),
            line: owner.get_line(),
            description: format!("invalid format string \"{format}\""),
        })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::axis::AxisData;
    use crate::datatype::DataType;
    use crate::expression::{Address, Numeric};
    use crate::record_layout::AxisLayout;
    use crate::{AxisPts, CompuMethod, Function, Header, Measurement, Statement};

    fn chdata(name: &str, address: u32, deposit: &str) -> CharacteristicData {
        let mut data = CharacteristicData::new(
            name.into(),
            format!("{name} description"),
            Address(address),
            deposit.into(),
            0.0,
            "cm_kpa".into(),
            0.0,
            255.0,
        );
        data.format = Some(Format::from("%5.1"));
        data
    }

    fn measurement(name: &str, datatype: DataType) -> Statement {
        Statement::Measurement(Measurement::new(
            name.into(),
            String::new(),
            datatype,
            Numeric::Integer(0),
            Numeric::Integer(100),
            Format::from("%4.0"),
            Address(0x4000),
        ))
    }

    fn base_statements() -> Vec<Statement> {
        let axis_layout = AxisLayout::new(DataType::Uword);
        vec![
            measurement("meas_uword", DataType::Uword),
            measurement("meas_ubyte", DataType::Ubyte),
            measurement("meas_u64", DataType::AUint64),
            Statement::CompuMethod(CompuMethod::new(
                "cm_kpa".into(),
                String::new(),
                Format::from("%6.2"),
                "kPa".to_string(),
            )),
            Statement::RecordLayout(
                RecordLayout::new_values("rl_ubyte".into(), Some(FncValues::new(DataType::Ubyte)))
                    .unwrap(),
            ),
            Statement::RecordLayout(
                RecordLayout::new_map(
                    "rl_map".into(),
                    axis_layout.clone(),
                    axis_layout.clone(),
                    Some(FncValues::new(DataType::Uword)),
                )
                .unwrap(),
            ),
            Statement::RecordLayout(RecordLayout::new_curve(
                "rl_curve".into(),
                axis_layout,
                Some(FncValues::new(DataType::Sword)),
            )),
            Statement::AxisPts(AxisPts::new(
                "axis_pts_x".into(),
                String::new(),
                Address(0x9000),
                "meas_uword".into(),
                "rl_ubyte".into(),
                0.0,
                "cm_kpa".into(),
                6,
                0.0,
                600.0,
                Format::from("%4.0"),
            )),
            Statement::AxisPts(AxisPts::new(
                "axis_pts_y".into(),
                String::new(),
                Address(0x9100),
                "meas_ubyte".into(),
                "rl_ubyte".into(),
                0.0,
                "cm_kpa".into(),
                4,
                0.0,
                4.0,
                Format::from("%4.0"),
            )),
        ]
    }

    fn project(extra: Vec<Statement>) -> Project {
        let mut statements = base_statements();
        statements.extend(extra);
        let mut log_msgs = Vec::new();
        let module = Module::build("m".into(), String::new(), statements, &mut log_msgs);
        assert!(log_msgs.is_empty());
        Project::new(
            Header::new("comment".to_string(), "V1".to_string(), "EPK123".into()),
            module,
        )
    }

    fn axis(style: AxisStyle, input_quantity: &str, len: u32, axis_pts: &str) -> Axis {
        let data = AxisData::new(input_quantity.into(), "cm_kpa".into(), len, 0.0, 100.0);
        match style {
            AxisStyle::External => Axis::new_external(data, axis_pts.into()),
            AxisStyle::Internal => Axis::new_internal(data, Format::from("%4.1")),
            AxisStyle::Fixed => Axis::new_fixed(data, Format::from("%4.0")),
        }
    }

    fn plan_of(generator: &XdfGenerator, name: &str) -> Result<TablePlan, XdfError> {
        match generator.module.characteristics.get(name).unwrap() {
            Characteristic::Map(map) => generator.plan_map(map),
            Characteristic::Curve(curve) => generator.plan_curve(curve),
            Characteristic::ValBlk(val_blk) => generator.plan_val_blk(val_blk),
            Characteristic::Text(text) => generator.plan_text(text),
            Characteristic::Value(_) => panic!("not a table"),
        }
    }

    #[test]
    fn internal_map_addresses() {
        let map = Map::new(
            chdata("map", 0x1000, "rl_map"),
            axis(AxisStyle::Internal, "meas_uword", 5, ""),
            axis(AxisStyle::Internal, "meas_ubyte", 3, ""),
        )
        .unwrap();
        let project = project(vec![Statement::Map(map)]);
        let generator = XdfGenerator::new(&project, XdfConfig::default()).unwrap();
        let plan = plan_of(&generator, "map").unwrap();

        assert_eq!(plan.axes.len(), 2);
        let x = plan.axes[0].embedded.as_ref().unwrap();
        let y = plan.axes[1].embedded.as_ref().unwrap();
        assert_eq!(x.address, 0x1000);
        assert_eq!(x.element_size_bits, 16);
        // 5 * 16 bit = 10 bytes
        assert_eq!(y.address, 0x100A);
        assert_eq!(y.element_size_bits, 8);
        // 3 * 8 bit = 3 bytes
        assert_eq!(plan.values.embedded.address, 0x100D);
        assert_eq!(plan.values.embedded.row_count, Some(5));
        assert_eq!(plan.values.embedded.col_count, Some(3));
        assert_eq!(plan.values.units, "kPa");
        // the format of the characteristic wins over the format of the compu method
        assert_eq!(plan.values.decimal_places, 1);
        // the axes use their own format
        assert_eq!(plan.axes[0].decimal_places, 1);
    }

    #[test]
    fn curve_values_follow_axis() {
        let mut statements = vec![Statement::RecordLayout(RecordLayout::new_curve(
            "rl_curve_ubyte".into(),
            AxisLayout::new(DataType::Ubyte),
            Some(FncValues::new(DataType::Ubyte)),
        ))];
        // 3 axis points * 8 bit
        statements.push(Statement::Curve(Curve::new(
            chdata("curve", 0x2000, "rl_curve_ubyte"),
            axis(AxisStyle::Internal, "meas_ubyte", 3, ""),
        )));
        let project = project(statements);
        let generator = XdfGenerator::new(&project, XdfConfig::default()).unwrap();
        let plan = plan_of(&generator, "curve").unwrap();
        assert_eq!(plan.values.embedded.address, 0x2003);
        assert_eq!(plan.values.embedded.row_count, Some(3));
        assert_eq!(plan.values.embedded.col_count, Some(1));
    }

    #[test]
    fn external_map_addresses() {
        let map = Map::new(
            chdata("map", 0x1000, "rl_map"),
            axis(AxisStyle::External, "meas_uword", 6, "axis_pts_x"),
            axis(AxisStyle::External, "meas_ubyte", 4, "axis_pts_y"),
        )
        .unwrap();
        let project = project(vec![Statement::Map(map)]);
        let generator = XdfGenerator::new(&project, XdfConfig::default()).unwrap();
        let plan = plan_of(&generator, "map").unwrap();

        assert_eq!(plan.axes[0].embedded.as_ref().unwrap().address, 0x9000);
        assert_eq!(plan.axes[1].embedded.as_ref().unwrap().address, 0x9100);
        // external axes do not move the function values
        assert_eq!(plan.values.embedded.address, 0x1000);
    }

    #[test]
    fn fixed_map_addresses() {
        let map = Map::new(
            chdata("map", 0x1000, "rl_map"),
            axis(AxisStyle::Fixed, "meas_uword", 6, ""),
            axis(AxisStyle::Fixed, "meas_ubyte", 4, ""),
        )
        .unwrap();
        let project = project(vec![Statement::Map(map)]);
        let generator = XdfGenerator::new(&project, XdfConfig::default()).unwrap();
        let plan = plan_of(&generator, "map").unwrap();

        assert!(plan.axes.iter().all(|axis| axis.embedded.is_none()));
        assert_eq!(plan.axes[0].length, 6);
        assert_eq!(plan.values.embedded.address, 0x1000);
    }

    #[test]
    fn address_offset() {
        let map = Map::new(
            chdata("map", 0x801000, "rl_map"),
            axis(AxisStyle::Internal, "meas_ubyte", 2, ""),
            axis(AxisStyle::Internal, "meas_ubyte", 2, ""),
        )
        .unwrap();
        let project = project(vec![Statement::Map(map)]);
        let config = XdfConfig {
            address_offset: -0x800000,
            ..Default::default()
        };
        let generator = XdfGenerator::new(&project, config).unwrap();
        let plan = plan_of(&generator, "map").unwrap();
        assert_eq!(plan.axes[0].embedded.as_ref().unwrap().address, 0x1000);
        assert_eq!(plan.values.embedded.address, 0x1004);

        // an address below the start of the file cannot be represented
        let config = XdfConfig {
            address_offset: -0x900000,
            ..Default::default()
        };
        let generator = XdfGenerator::new(&project, config).unwrap();
        let result = plan_of(&generator, "map");
        assert!(matches!(result, Err(XdfError::ContentError { .. })));
    }

    #[test]
    fn address_offset_overflow() {
        let project = project(vec![
            Statement::Value(Value::new(chdata("val_top", 0xFFFF_FFFF, "rl_ubyte"))),
            Statement::Value(Value::new(chdata("val_low", 0x10, "rl_ubyte"))),
        ]);
        for address_offset in [i64::MAX, i64::MIN] {
            let config = XdfConfig {
                address_offset,
                ..Default::default()
            };
            let (text, log_msgs) = crate::generate(&project, config).unwrap();
            // both values are skipped instead of overflowing
            assert_eq!(log_msgs.len(), 2);
            assert!(log_msgs.iter().all(|msg| matches!(msg, XdfError::ContentError { .. })));
            assert!(!text.contains("<XDFCONSTANT"));
        }
    }

    #[test]
    fn resolution_errors() {
        let statements = vec![
            // missing axis points
            Statement::Map(
                Map::new(
                    chdata("no_axis_pts", 0x1000, "rl_map"),
                    axis(AxisStyle::External, "meas_uword", 6, "missing"),
                    axis(AxisStyle::External, "meas_ubyte", 4, "axis_pts_y"),
                )
                .unwrap(),
            ),
            // missing measurement
            Statement::Curve(Curve::new(
                chdata("no_meas", 0x1000, "rl_curve"),
                axis(AxisStyle::Internal, "missing", 6, ""),
            )),
            // unsupported data type
            Statement::Curve(Curve::new(
                chdata("u64_axis", 0x1000, "rl_curve"),
                axis(AxisStyle::Internal, "meas_u64", 6, ""),
            )),
            // missing record layout
            Statement::ValBlk(ValBlk::new(chdata("no_rl", 0x1000, "missing"), 4)),
            // record layout without the axis description
            Statement::Curve(Curve::new(
                chdata("no_axis_layout", 0x1000, "rl_ubyte"),
                axis(AxisStyle::Internal, "meas_ubyte", 6, ""),
            )),
        ];
        let project = project(statements);
        let generator = XdfGenerator::new(&project, XdfConfig::default()).unwrap();

        let result = plan_of(&generator, "no_axis_pts");
        assert!(matches!(
            result,
            Err(XdfError::CrossReferenceError { ref target_type, ref target_name, .. })
                if target_type == "AXIS_PTS" && target_name == "missing"
        ));
        let result = plan_of(&generator, "no_meas");
        assert!(matches!(
            result,
            Err(XdfError::CrossReferenceError { ref target_type, .. }) if target_type == "MEASUREMENT"
        ));
        let result = plan_of(&generator, "u64_axis");
        assert!(matches!(result, Err(XdfError::UnsupportedDataType { .. })));
        let result = plan_of(&generator, "no_rl");
        assert!(matches!(
            result,
            Err(XdfError::CrossReferenceError { ref target_type, .. }) if target_type == "RECORD_LAYOUT"
        ));
        let result = plan_of(&generator, "no_axis_layout");
        assert!(matches!(result, Err(XdfError::ContentError { .. })));
    }

    #[test]
    fn no_compu_method() {
        let mut data = chdata("text", 0x3000, "rl_ubyte");
        data.conversion = NO_COMPU_METHOD.into();
        let project = project(vec![Statement::CharacteristicText(CharacteristicText::new(
            data, 12,
        ))]);
        let generator = XdfGenerator::new(&project, XdfConfig::default()).unwrap();
        let plan = plan_of(&generator, "text").unwrap();
        assert_eq!(plan.values.units, "-");
        assert_eq!(plan.values.output_type, OUTPUT_ASCII);
        assert_eq!(plan.values.embedded.col_count, Some(12));
        assert_eq!(plan.values.scaling, LinearScaling::identity());
    }

    #[test]
    fn category_numbers() {
        let mut f1 = Function::new("F1".into(), "first".to_string());
        f1.ref_characteristic.push("val".into());
        let mut f2 = Function::new("F2".into(), "second".to_string());
        f2.def_characteristic.push("val".into());
        f2.ref_characteristic.push("other".into());
        let project = project(vec![
            Statement::Function(f1),
            Statement::Function(f2),
            Statement::Value(Value::new(chdata("val", 0x10, "rl_ubyte"))),
        ]);
        let generator = XdfGenerator::new(&project, XdfConfig::default()).unwrap();
        assert_eq!(generator.category_refs(&"val".into()), vec![1, 2]);
        assert_eq!(generator.category_refs(&"other".into()), vec![2]);
        assert!(generator.category_refs(&"nothing".into()).is_empty());

        let text = generator.materialize();
        assert!(text.contains(r#"<CATEGORY index="0x0" name="F1: first" />"#));
        assert!(text.contains(r#"<CATEGORY index="0x1" name="F2: second" />"#));
    }

    #[test]
    fn type_flags() {
        let project = project(vec![]);
        let generator = XdfGenerator::new(&project, XdfConfig::default()).unwrap();
        let signed = TypeInfo {
            size_bits: 16,
            signed: true,
        };
        let unsigned = TypeInfo {
            size_bits: 8,
            signed: false,
        };
        assert_eq!(generator.type_flags(signed), 0x3);
        assert_eq!(generator.type_flags(unsigned), 0x2);

        let config = XdfConfig {
            byte_order: ByteOrder::MsbFirst,
            ..Default::default()
        };
        let generator = XdfGenerator::new(&project, config).unwrap();
        assert_eq!(generator.type_flags(signed), 0x1);
        assert_eq!(generator.type_flags(unsigned), 0x0);
    }

    #[test]
    fn skipped_objects_leave_no_output() {
        let project = project(vec![Statement::ValBlk(ValBlk::new(
            chdata("no_rl", 0x1000, "missing"),
            4,
        ))]);
        let mut generator = XdfGenerator::new(&project, XdfConfig::default()).unwrap();
        let before = generator.materialize().to_string();
        for statement in project.module.statements() {
            generator.visit(statement).unwrap();
        }
        assert_eq!(generator.materialize(), before);
        assert_eq!(generator.log_msgs().len(), 1);

        generator.finalize().unwrap();
        // finalize is idempotent
        generator.finalize().unwrap();
        let (text, log_msgs) = generator.finish();
        assert!(text.ends_with("</XDFFORMAT>\n"));
        assert_eq!(text.matches("</XDFFORMAT>").count(), 1);
        assert_eq!(log_msgs.len(), 1);
    }

    #[test]
    fn visit_after_finalize() {
        let project = project(vec![Statement::Value(Value::new(chdata(
            "val", 0x10, "rl_ubyte",
        )))]);
        let mut generator = XdfGenerator::new(&project, XdfConfig::default()).unwrap();
        generator.finalize().unwrap();
        let characteristic = project.module.characteristics.get("val").unwrap();
        let result = generator.visit_characteristic(characteristic);
        assert!(matches!(result, Err(XdfError::WriterError { .. })));
    }

    #[test]
    fn header() {
        let project = project(vec![]);
        let generator = XdfGenerator::new(&project, XdfConfig::default()).unwrap();
        let text = generator.materialize();
        assert!(text.starts_with("<XDFFORMAT version=\"1.50\">\n  <XDFHEADER>\n"));
        assert!(text.contains("<deftitle>EPK123</deftitle>"));
        assert!(text.contains("<description>comment</description>"));
        assert!(text.contains("<author>generated</author>"));
        assert!(text.contains("lsbfirst=\"1\""));
        assert!(text.contains("size=\"0x100000\""));
        assert!(text.ends_with("</XDFHEADER>\n"));

        let config = XdfConfig {
            title: Some("custom".to_string()),
            region_size: 0x80000,
            ..Default::default()
        };
        let generator = XdfGenerator::new(&project, config).unwrap();
        assert!(generator.materialize().contains("<deftitle>custom</deftitle>"));
        assert!(generator.materialize().contains("size=\"0x80000\""));
    }
}
