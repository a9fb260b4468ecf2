pub mod block;
pub mod document;
pub mod parser;
pub mod writer;

/// First line every keyvalues2 model document carries.
pub const SIGNATURE: &str = "<!-- dmx encoding keyvalues2 1 format model 1 -->";

/// Type tag of a combination input control record.
pub const COMBINATION_INPUT_CONTROL: &str = "DmeCombinationInputControl";

/// Substring marking the line that opens the control list in a combination operator.
pub const ELEMENT_ARRAY: &str = "element_array";

/// Field names used by combination input control records.
pub mod fields {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const RAW_CONTROL_NAMES: &str = "rawControlNames";
    pub const STEREO: &str = "stereo";
    pub const EYELID: &str = "eyelid";
    pub const WRINKLE_SCALES: &str = "wrinkleScales";
}
