//! Sprite bitmaps shared by the display drivers.

pub const INVADER_COLS: i32 = 11;
pub const INVADER_ROWS: i32 = 8;
pub const INVADER_SCALE: i32 = 2;
pub const INVADER_WIDTH: i32 = INVADER_COLS * INVADER_SCALE;
pub const INVADER_HEIGHT: i32 = INVADER_ROWS * INVADER_SCALE;

/// Bit 10 is the leftmost column.
const INVADER: [u16; INVADER_ROWS as usize] = [
    0b001_0000_0100,
    0b000_1000_1000,
    0b001_1111_1100,
    0b011_0111_0110,
    0b111_1111_1111,
    0b101_1111_1101,
    0b101_0000_0101,
    0b000_1101_1000,
];

pub const ZAP_COLS: i32 = 3;
pub const ZAP_ROWS: i32 = 15;

/// Bit 2 is the leftmost column.
const ZAP: [u8; ZAP_ROWS as usize] = [
    0b010, 0b100, 0b010, 0b001, 0b010, 0b100, 0b010, 0b001, 0b010, 0b100, 0b010, 0b001, 0b010,
    0b111, 0b010,
];

/// Lit pixel offsets of the invader, already scaled.
pub fn invader_pixels() -> impl Iterator<Item = (i32, i32)> {
    (0..INVADER_HEIGHT).flat_map(|dy| {
        (0..INVADER_WIDTH).filter_map(move |dx| {
            let row = INVADER[(dy / INVADER_SCALE) as usize];
            let bit = INVADER_COLS - 1 - dx / INVADER_SCALE;
            (row >> bit & 1 == 1).then_some((dx, dy))
        })
    })
}

/// Lit pixel offsets of the enemy shot.
pub fn zap_pixels() -> impl Iterator<Item = (i32, i32)> {
    (0..ZAP_ROWS).flat_map(|dy| {
        (0..ZAP_COLS).filter_map(move |dx| {
            let bit = ZAP_COLS - 1 - dx;
            (ZAP[dy as usize] >> bit & 1 == 1).then_some((dx, dy))
        })
    })
}
