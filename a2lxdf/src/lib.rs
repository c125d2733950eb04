//! a2lxdf generates XDF calibration layouts for tuning tools from an a2l object model.
//!
//! The object model ([`Project`], [`Module`] and the statements it contains) describes where
//! calibration data is stored in the ECU memory and how raw values are converted to physical
//! values. [`XdfGenerator`] turns every characteristic into an XDF table or constant.
//!
//! # Features
//!
//! - `check`: check all cross references of a module without generating anything

mod axis;
#[cfg(feature = "check")]
mod checker;
mod config;
mod datatype;
mod expression;
mod itemlist;
mod module;
mod record_layout;
mod scaling;
mod specification;
mod xdfgen;
mod xmlwriter;

use std::convert::AsRef;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

// re-export for the crate user
pub use axis::{Axis, AxisData, AxisStyle, ExternalAxis, FixedAxis, InternalAxis};
pub use config::{ByteOrder, XdfConfig};
pub use datatype::{DataType, TypeInfo};
pub use expression::{Address, Expression, Format, Identifier, Numeric};
pub use itemlist::ItemList;
pub use module::{Module, StatementRef};
pub use record_layout::{AxisLayout, FncValues, RecordLayout};
pub use scaling::LinearScaling;
pub use specification::*;
pub use xdfgen::XdfGenerator;
pub use xmlwriter::{WriterError, WriterState, XmlWriter};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum XdfError {
    /// `ConstructionError`: An object was created with an invalid combination of members
    #[error("Construction error: {blockname} {item_name}: {description}")]
    ConstructionError {
        blockname: String,
        item_name: String,
        description: String,
    },

    /// `CrossReferenceError`: A reference to a non-existent item was found
    #[error(
        "Cross-reference error: {source_type} {source_name} on line {source_line} references a non-existent {target_type} {target_name}"
    )]
    CrossReferenceError {
        source_type: String,
        source_name: String,
        source_line: u32,
        target_type: String,
        target_name: String,
    },

    /// `UnsupportedDataType`: The layout of a data type is not known
    #[error("Unsupported data type: {source_type} {source_name} uses {datatype}, which cannot be represented")]
    UnsupportedDataType {
        source_type: String,
        source_name: String,
        datatype: DataType,
    },

    /// `ContentError`: A block contains invalid content of some description
    #[error("Content error: {blockname} {item_name} on line {line}: {description}")]
    ContentError {
        blockname: String,
        item_name: String,
        line: u32,
        description: String,
    },

    /// `IndexingError`: A statement cannot be stored in any table of a module
    #[error("Indexing error: {blockname} {item_name} on line {line} cannot be stored in a MODULE")]
    IndexingError {
        blockname: String,
        item_name: String,
        line: u32,
    },

    /// `NameCollisionError`: A name collision occurred between two blocks of the same type
    #[error(
        "Name collision: {blockname} blocks on line {line_1} and {line_2} both use the name \"{item_name}\""
    )]
    NameCollisionError {
        item_name: String,
        blockname: String,
        line_1: u32,
        line_2: u32,
    },

    /// `InvalidAddress`: Text that should contain an address could not be parsed
    #[error("Invalid address \"{value}\"")]
    InvalidAddress { value: String },

    /// `InvalidEnumValue`: Text that should contain a keyword could not be parsed
    #[error("Invalid value \"{value}\" for {enumname}")]
    InvalidEnumValue { enumname: String, value: String },

    /// `WriterError`: The document writer was used incorrectly
    #[error("Writer error: {writer_error}")]
    WriterError {
        #[from]
        writer_error: WriterError,
    },

    /// `FileWriteError`: An `IoError` that occurred while writing to a file
    #[error("Could not write to {filename}: {ioerror}")]
    FileWriteError {
        filename: PathBuf,
        ioerror: std::io::Error,
    },
}

impl XdfError {
    /// true for errors that only affect a single object, which is then skipped
    #[must_use]
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            XdfError::CrossReferenceError { .. } | XdfError::UnsupportedDataType { .. }
        )
    }
}

impl Project {
    #[cfg(feature = "check")]
    /// check all cross references in the module of this project
    #[must_use]
    pub fn check(&self) -> Vec<XdfError> {
        checker::check(&self.module)
    }
}

impl Module {
    #[cfg(feature = "check")]
    /// check that every reference can be resolved and every data type can be represented
    #[must_use]
    pub fn check(&self) -> Vec<XdfError> {
        checker::check(self)
    }
}

/**
Generate the XDF document for all characteristics of a project

Characteristics that cannot be laid out are skipped; the reasons are returned together with the document.

# Example

```rust
# use a2lxdf::*;
# fn main() -> Result<(), XdfError> {
let mut log_msgs = Vec::new();
let module = Module::build("m".into(), String::new(), Vec::new(), &mut log_msgs);
let project = Project::new(Header::default(), module);
let (text, skipped) = a2lxdf::generate(&project, XdfConfig::default())?;
assert!(text.starts_with("<XDFFORMAT"));
assert!(skipped.is_empty());
# Ok(())
# }
```

# Errors

Only [`XdfError::WriterError`], which indicates a bug in the generator.
 */
pub fn generate(
    project: &Project,
    config: XdfConfig,
) -> Result<(String, Vec<XdfError>), XdfError> {
    let mut generator = XdfGenerator::new(project, config)?;
    for characteristic in &project.module.characteristics {
        generator.visit_characteristic(characteristic)?;
    }
    generator.finalize()?;
    Ok(generator.finish())
}

/// Generate the XDF document for a project and write it to a file
///
/// Returns the list of skipped characteristics, like [`generate`].
///
/// # Errors
///
/// [`XdfError::FileWriteError`] if writing the file fails.
pub fn write_xdf<P: AsRef<Path>>(
    path: P,
    project: &Project,
    config: XdfConfig,
) -> Result<Vec<XdfError>, XdfError> {
    let (text, log_msgs) = generate(project, config)?;
    std::fs::write(&path, text).map_err(|ioerror| XdfError::FileWriteError {
        filename: path.as_ref().to_path_buf(),
        ioerror,
    })?;
    log::debug!(
        "wrote {}, {} characteristics skipped",
        path.as_ref().display(),
        log_msgs.len()
    );
    Ok(log_msgs)
}
