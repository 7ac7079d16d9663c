// Major types and initial-byte values shared by the decoder and encoder.
pub const MAJOR_UNSIGNED: u8 = 0;
pub const MAJOR_NEGATIVE: u8 = 1;
pub const MAJOR_BYTES: u8 = 2;
pub const MAJOR_TEXT: u8 = 3;
pub const MAJOR_ARRAY: u8 = 4;
pub const MAJOR_MAP: u8 = 5;
pub const MAJOR_TAG: u8 = 6;
pub const MAJOR_SIMPLE: u8 = 7;

pub const AI_ONE_BYTE: u8 = 24;
pub const AI_TWO_BYTES: u8 = 25;
pub const AI_FOUR_BYTES: u8 = 26;
pub const AI_EIGHT_BYTES: u8 = 27;
pub const AI_INDEFINITE: u8 = 31;

pub const SIMPLE_FALSE: u8 = 20;
pub const SIMPLE_TRUE: u8 = 21;
pub const SIMPLE_NULL: u8 = 22;
pub const SIMPLE_UNDEFINED: u8 = 23;

pub const BREAK: u8 = 0xff;

pub fn is_f32_roundtrip(value: f64) -> bool {
    (value as f32) as f64 == value || value.is_nan()
}
