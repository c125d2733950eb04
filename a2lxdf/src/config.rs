/// Byte order of multi-byte values in the ECU memory image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// little endian (`MSB_LAST`)
    #[default]
    MsbLast,
    /// big endian (`MSB_FIRST`)
    MsbFirst,
}

/// Settings for the XDF generator
///
/// All fields have usable defaults; `XdfConfig::default()` produces a document where every
/// address is exactly the address from the a2l description.
#[derive(Debug, Clone, PartialEq)]
pub struct XdfConfig {
    /// `<deftitle>` of the header. Taken from the project number in the `HEADER` if None.
    pub title: Option<String>,
    /// `<description>` of the header. Taken from the comment in the `HEADER` if None.
    pub description: Option<String>,
    pub author: String,
    pub file_version: String,
    /// value of `<baseoffset>`, interpreted by the tuning tool
    pub base_offset: i64,
    /// added to every address that is written to the document
    ///
    /// This maps ECU addresses to offsets in the binary file, e.g. `-0x800000` for a
    /// flash image that starts at 0x800000 in the ECU address space.
    pub address_offset: i64,
    /// size of the binary file region
    pub region_size: u32,
    pub byte_order: ByteOrder,
}

impl Default for XdfConfig {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            author: "generated".to_string(),
            file_version: "Version 1".to_string(),
            base_offset: 0,
            address_offset: 0,
            region_size: 0x100000,
            byte_order: ByteOrder::MsbLast,
        }
    }
}
