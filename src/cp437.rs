//! Convert entry names in IBM codepage 437 to UTF-8
//!
//! The ZIP appnote prescribes CP437 for names unless general-purpose bit 11
//! marks them as UTF-8. Only the high half needs a table; 0x00-0x7F is
//! identical to ASCII.

/// Conversion of a CP437 byte sequence into a UTF-8 string.
pub(crate) trait FromCp437 {
    /// The associated conversion target
    type Target;

    /// Converts CP437 data to a UTF-8 representation.
    fn from_cp437(self) -> Self::Target;
}

impl FromCp437 for Vec<u8> {
    type Target = String;

    fn from_cp437(self) -> String {
        self.into_iter().map(char_from_cp437).collect()
    }
}

fn char_from_cp437(byte: u8) -> char {
    if byte.is_ascii() {
        byte as char
    } else {
        CP437_HIGH[byte as usize - 0x80]
    }
}

#[rustfmt::skip]
static CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];
