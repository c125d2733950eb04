use crate::axis::{Axis, AxisStyle};
use crate::datatype::DataType;
use crate::expression::Identifier;
use crate::{A2lObject, A2lObjectName, ItemList, Module, XdfError, specification::*};

// check the cross references between the statements of the module
pub(crate) fn check(module: &Module) -> Vec<XdfError> {
    let mut results = Vec::new();

    for characteristic in &module.characteristics {
        check_characteristic(characteristic, module, &mut results);
    }

    for axis_pts in &module.axis_pts {
        check_axis_pts(axis_pts, module, &mut results);
    }

    for measurement in &module.measurements {
        check_measurement(measurement, module, &mut results);
    }

    for function in &module.functions {
        check_function(function, module, &mut results);
    }

    results
}

fn check_characteristic(
    characteristic: &Characteristic,
    module: &Module,
    log_msgs: &mut Vec<XdfError>,
) {
    let data = characteristic.data();
    let line = data.get_line();

    check_conversion(
        "CHARACTERISTIC",
        data.get_name(),
        line,
        &data.conversion,
        module,
        log_msgs,
    );

    match module.record_layouts.get(data.deposit.as_str()) {
        Some(record_layout) => {
            if let Some(fnc_values) = record_layout.fnc_values() {
                check_datatype(
                    "RECORD_LAYOUT",
                    record_layout.get_name(),
                    fnc_values.datatype,
                    log_msgs,
                );
            } else {
                log_msgs.push(XdfError::ContentError {
                    blockname: "CHARACTERISTIC".to_string(),
                    item_name: data.name.to_string(),
                    line,
                    description: format!(
                        "Referenced RECORD_LAYOUT {} does not have FNC_VALUES.",
                        record_layout.name
                    ),
                });
            }

            if characteristic.axis_style() == Some(AxisStyle::Internal) {
                let needs_y = matches!(characteristic, Characteristic::Map(_));
                if !record_layout.has_x_axis() || (needs_y && !record_layout.has_y_axis()) {
                    log_msgs.push(XdfError::ContentError {
                        blockname: "CHARACTERISTIC".to_string(),
                        item_name: data.name.to_string(),
                        line,
                        description: format!(
                            "Referenced RECORD_LAYOUT {} is missing the axis description.",
                            record_layout.name
                        ),
                    });
                }

                // inline axis points are stored with the data type of the record layout
                let axis_layouts = record_layout.axis_x().into_iter();
                for axis_layout in axis_layouts.chain(record_layout.axis_y()) {
                    check_datatype(
                        "RECORD_LAYOUT",
                        record_layout.get_name(),
                        axis_layout.axis_pts,
                        log_msgs,
                    );
                }
            }
        }
        None => log_msgs.push(XdfError::CrossReferenceError {
            source_type: "CHARACTERISTIC".to_string(),
            source_name: data.name.to_string(),
            source_line: line,
            target_type: "RECORD_LAYOUT".to_string(),
            target_name: data.deposit.to_string(),
        }),
    }

    match characteristic {
        Characteristic::Map(map) => {
            check_axis("x", data, map.axis_x(), module, log_msgs);
            check_axis("y", data, map.axis_y(), module, log_msgs);
        }
        Characteristic::Curve(curve) => check_axis("x", data, &curve.axis, module, log_msgs),
        Characteristic::Value(_) | Characteristic::ValBlk(_) | Characteristic::Text(_) => {}
    }
}

fn check_axis(
    id: &str,
    owner: &CharacteristicData,
    axis: &Axis,
    module: &Module,
    log_msgs: &mut Vec<XdfError>,
) {
    let source_type = format!("AXIS_DESCR {id} of CHARACTERISTIC");
    let line = owner.get_line();
    let axis_data = axis.data();

    match module.measurements.get(axis_data.input_quantity.as_str()) {
        Some(measurement) => check_datatype(
            "MEASUREMENT",
            measurement.get_name(),
            measurement.datatype,
            log_msgs,
        ),
        None => log_msgs.push(XdfError::CrossReferenceError {
            source_type: source_type.clone(),
            source_name: owner.name.to_string(),
            source_line: line,
            target_type: "MEASUREMENT".to_string(),
            target_name: axis_data.input_quantity.to_string(),
        }),
    }

    if let Axis::External(external) = axis {
        if !module.axis_pts.contains_key(external.axis_pts_ref.as_str()) {
            log_msgs.push(XdfError::CrossReferenceError {
                source_type: source_type.clone(),
                source_name: owner.name.to_string(),
                source_line: line,
                target_type: "AXIS_PTS".to_string(),
                target_name: external.axis_pts_ref.to_string(),
            });
        }
    }

    check_conversion(
        &source_type,
        owner.get_name(),
        line,
        &axis_data.conversion,
        module,
        log_msgs,
    );
}

fn check_axis_pts(axis_pts: &AxisPts, module: &Module, log_msgs: &mut Vec<XdfError>) {
    let name = axis_pts.get_name();
    let line = axis_pts.get_line();

    if !module.measurements.contains_key(axis_pts.input_quantity.as_str()) {
        log_msgs.push(XdfError::CrossReferenceError {
            source_type: "AXIS_PTS".to_string(),
            source_name: name.to_string(),
            source_line: line,
            target_type: "MEASUREMENT".to_string(),
            target_name: axis_pts.input_quantity.to_string(),
        });
    }

    if !module
        .record_layouts
        .contains_key(axis_pts.deposit_record.as_str())
    {
        log_msgs.push(XdfError::CrossReferenceError {
            source_type: "AXIS_PTS".to_string(),
            source_name: name.to_string(),
            source_line: line,
            target_type: "RECORD_LAYOUT".to_string(),
            target_name: axis_pts.deposit_record.to_string(),
        });
    }

    check_conversion(
        "AXIS_PTS",
        name,
        line,
        &axis_pts.conversion,
        module,
        log_msgs,
    );
}

fn check_measurement(measurement: &Measurement, module: &Module, log_msgs: &mut Vec<XdfError>) {
    match &measurement.kind {
        MeasurementKind::Value { conversion } | MeasurementKind::Array { conversion, .. } => {
            check_conversion(
                "MEASUREMENT",
                measurement.get_name(),
                measurement.get_line(),
                conversion,
                module,
                log_msgs,
            );
        }
        MeasurementKind::Plain | MeasurementKind::Bit { .. } => {}
    }
}

fn check_function(function: &Function, module: &Module, log_msgs: &mut Vec<XdfError>) {
    let name = function.get_name();
    let line = function.get_line();
    check_reference_list(
        "DEF_CHARACTERISTIC",
        name,
        "CHARACTERISTIC",
        line,
        &function.def_characteristic,
        &module.characteristics,
        log_msgs,
    );
    check_reference_list(
        "REF_CHARACTERISTIC",
        name,
        "CHARACTERISTIC",
        line,
        &function.ref_characteristic,
        &module.characteristics,
        log_msgs,
    );
    check_reference_list(
        "IN_MEASUREMENT",
        name,
        "MEASUREMENT",
        line,
        &function.in_measurement,
        &module.measurements,
        log_msgs,
    );
    check_reference_list(
        "OUT_MEASUREMENT",
        name,
        "MEASUREMENT",
        line,
        &function.out_measurement,
        &module.measurements,
        log_msgs,
    );
    check_reference_list(
        "LOC_MEASUREMENT",
        name,
        "MEASUREMENT",
        line,
        &function.loc_measurement,
        &module.measurements,
        log_msgs,
    );
    check_reference_list(
        "SUB_FUNCTION",
        name,
        "FUNCTION",
        line,
        &function.sub_function,
        &module.functions,
        log_msgs,
    );
}

fn check_conversion(
    source_type: &str,
    source_name: &str,
    line: u32,
    conversion: &Identifier,
    module: &Module,
    log_msgs: &mut Vec<XdfError>,
) {
    if conversion != NO_COMPU_METHOD && !module.compu_methods.contains_key(conversion.as_str()) {
        log_msgs.push(XdfError::CrossReferenceError {
            source_type: source_type.to_string(),
            source_name: source_name.to_string(),
            source_line: line,
            target_type: "COMPU_METHOD".to_string(),
            target_name: conversion.to_string(),
        });
    }
}

fn check_datatype(
    source_type: &str,
    source_name: &str,
    datatype: DataType,
    log_msgs: &mut Vec<XdfError>,
) {
    if let Err(error) = datatype.resolve(source_type, source_name) {
        log_msgs.push(error);
    }
}

fn check_reference_list<T: A2lObjectName>(
    container_type: &str,
    owner_name: &str,
    ref_type: &str,
    line: u32,
    identifier_list: &[Identifier],
    table: &ItemList<T>,
    log_msgs: &mut Vec<XdfError>,
) {
    for ident in identifier_list {
        if !table.contains_key(ident.as_str()) {
            log_msgs.push(XdfError::CrossReferenceError {
                source_type: format!("{container_type} of FUNCTION"),
                source_name: owner_name.to_string(),
                source_line: line,
                target_type: ref_type.to_string(),
                target_name: ident.to_string(),
            });
        }
    }
}
