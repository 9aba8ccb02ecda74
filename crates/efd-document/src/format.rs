use efd_canonical::BlockId;
use std::collections::BTreeMap;

/// Text layout of serialized lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFormat {
    /// Field delimiter.
    pub delimiter: char,
    /// Decimal separator of numeric fields.
    pub decimal_separator: char,
    /// Line terminator written after every line.
    pub terminator: String,
    /// Whether lines start and end with the delimiter.
    pub enclosed: bool,
}

impl Default for LineFormat {
    fn default() -> Self {
        Self {
            delimiter: '|',
            decimal_separator: ',',
            terminator: "\r\n".to_string(),
            enclosed: true,
        }
    }
}

/// Default line format plus per-block overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineFormats {
    default: LineFormat,
    overrides: BTreeMap<BlockId, LineFormat>,
}

impl LineFormats {
    /// Uses `format` for every block.
    pub fn new(format: LineFormat) -> Self {
        Self {
            default: format,
            overrides: BTreeMap::new(),
        }
    }

    /// Overrides the format of one block.
    pub fn with_block(mut self, block: BlockId, format: LineFormat) -> Self {
        self.overrides.insert(block, format);
        self
    }

    /// Format used for records of `block`.
    pub fn for_block(&self, block: BlockId) -> &LineFormat {
        self.overrides.get(&block).unwrap_or(&self.default)
    }
}
