/// Character-offset selection inside a text control. `start == end` is a bare
/// cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn cursor(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }

    pub fn range(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

pub fn char_count(value: &str) -> usize {
    value.chars().count()
}

pub fn clamp_cursor(cursor: usize, value: &str) -> usize {
    cursor.min(char_count(value))
}

/// Replaces the selected text with `text` and returns the cursor position
/// right after the inserted text.
pub fn insert_at_selection(value: &mut String, selection: Selection, text: &str) -> usize {
    let end = clamp_cursor(selection.end.max(selection.start), value);
    let start = clamp_cursor(selection.start, value).min(end);

    let start_byte = byte_index_at_char(value, start);
    let end_byte = byte_index_at_char(value, end);
    value.replace_range(start_byte..end_byte, text);

    start + char_count(text)
}

fn byte_index_at_char(value: &str, char_idx: usize) -> usize {
    if char_idx == 0 {
        return 0;
    }
    value
        .char_indices()
        .nth(char_idx)
        .map(|(idx, _)| idx)
        .unwrap_or(value.len())
}
