/// Convert an offset counted in UTF-16 code units (as reported by the
/// checking service) into a character index into `text`.
///
/// Offsets pointing into the middle of a surrogate pair resolve to the
/// character containing them. Returns `None` for offsets past the end.
#[must_use]
pub fn utf16_to_char_index(text: &str, utf16_offset: usize) -> Option<usize> {
    let mut seen_units = 0;

    for (index, character) in text.chars().enumerate() {
        if seen_units >= utf16_offset {
            return Some(index);
        }

        seen_units += character.len_utf16();

        if seen_units > utf16_offset {
            return Some(index);
        }
    }

    (seen_units == utf16_offset).then(|| text.chars().count())
}
