//! Code editing surface over the diagram source.
//!
//! The editor never owns the text: every edit produces a new string that the
//! app records into its history, and the cursor is clamped back onto whatever
//! text the history hands out after undo/redo.

/// Cursor position: line index and column in chars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub line: usize,
    pub col: usize,
}

impl Cursor {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// Text-changing operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Insert(char),
    Newline,
    Indent,
    Backspace,
    Delete,
}

/// Cursor movements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
    PageUp(usize),
    PageDown(usize),
    DocStart,
    DocEnd,
}

fn lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

fn line_len(line: &str) -> usize {
    line.chars().count()
}

/// Byte offset of a (valid) cursor
fn byte_offset(text: &str, cursor: Cursor) -> usize {
    let mut offset = 0;
    for (i, line) in text.split('\n').enumerate() {
        if i == cursor.line {
            return offset
                + line
                    .char_indices()
                    .nth(cursor.col)
                    .map(|(b, _)| b)
                    .unwrap_or(line.len());
        }
        offset += line.len() + 1;
    }
    text.len()
}

/// Move a cursor onto the nearest valid position in `text`
pub fn clamp(text: &str, cursor: Cursor) -> Cursor {
    let lines = lines(text);
    let line = cursor.line.min(lines.len() - 1);
    Cursor::new(line, cursor.col.min(line_len(lines[line])))
}

/// Apply an edit, returning the new text and cursor, or `None` if nothing changes
pub fn apply(text: &str, cursor: Cursor, edit: Edit, tab_width: usize) -> Option<(String, Cursor)> {
    let cursor = clamp(text, cursor);
    let offset = byte_offset(text, cursor);
    let mut out = String::with_capacity(text.len() + tab_width + 1);

    match edit {
        Edit::Insert(ch) => {
            out.push_str(&text[..offset]);
            out.push(ch);
            out.push_str(&text[offset..]);
            Some((out, Cursor::new(cursor.line, cursor.col + 1)))
        }
        Edit::Indent => {
            let width = tab_width.max(1);
            out.push_str(&text[..offset]);
            out.extend(std::iter::repeat_n(' ', width));
            out.push_str(&text[offset..]);
            Some((out, Cursor::new(cursor.line, cursor.col + width)))
        }
        Edit::Newline => {
            let current = lines(text)[cursor.line];
            let indent: String = current
                .chars()
                .take(cursor.col)
                .take_while(|c| *c == ' ' || *c == '\t')
                .collect();
            out.push_str(&text[..offset]);
            out.push('\n');
            out.push_str(&indent);
            out.push_str(&text[offset..]);
            Some((out, Cursor::new(cursor.line + 1, indent.chars().count())))
        }
        Edit::Backspace => {
            if cursor.col > 0 {
                let start = byte_offset(text, Cursor::new(cursor.line, cursor.col - 1));
                out.push_str(&text[..start]);
                out.push_str(&text[offset..]);
                Some((out, Cursor::new(cursor.line, cursor.col - 1)))
            } else if cursor.line > 0 {
                let prev_len = line_len(lines(text)[cursor.line - 1]);
                out.push_str(&text[..offset - 1]);
                out.push_str(&text[offset..]);
                Some((out, Cursor::new(cursor.line - 1, prev_len)))
            } else {
                None
            }
        }
        Edit::Delete => {
            if offset >= text.len() {
                return None;
            }
            let next = text[offset..].chars().next().map_or(1, char::len_utf8);
            out.push_str(&text[..offset]);
            out.push_str(&text[offset + next..]);
            Some((out, cursor))
        }
    }
}

/// Move the cursor within `text`
pub fn motion(text: &str, cursor: Cursor, motion: Motion) -> Cursor {
    let lines = lines(text);
    let cursor = clamp(text, cursor);
    let last = lines.len() - 1;
    let len_of = |line: usize| line_len(lines[line]);

    match motion {
        Motion::Left if cursor.col > 0 => Cursor::new(cursor.line, cursor.col - 1),
        Motion::Left if cursor.line > 0 => Cursor::new(cursor.line - 1, len_of(cursor.line - 1)),
        Motion::Left => cursor,
        Motion::Right if cursor.col < len_of(cursor.line) => Cursor::new(cursor.line, cursor.col + 1),
        Motion::Right if cursor.line < last => Cursor::new(cursor.line + 1, 0),
        Motion::Right => cursor,
        Motion::Up => clamp(text, Cursor::new(cursor.line.saturating_sub(1), cursor.col)),
        Motion::Down => clamp(text, Cursor::new(cursor.line + 1, cursor.col)),
        Motion::LineStart => Cursor::new(cursor.line, 0),
        Motion::LineEnd => Cursor::new(cursor.line, len_of(cursor.line)),
        Motion::PageUp(n) => clamp(text, Cursor::new(cursor.line.saturating_sub(n), cursor.col)),
        Motion::PageDown(n) => clamp(text, Cursor::new(cursor.line + n, cursor.col)),
        Motion::DocStart => Cursor::default(),
        Motion::DocEnd => Cursor::new(last, len_of(last)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(text: &str, line: usize, col: usize, op: Edit) -> (String, Cursor) {
        apply(text, Cursor::new(line, col), op, 4).unwrap()
    }

    #[test]
    fn insert_handles_multibyte_text() {
        let (text, cursor) = edit("A-->é", 0, 5, Edit::Insert('x'));
        assert_eq!(text, "A-->éx");
        assert_eq!(cursor, Cursor::new(0, 6));

        let (text, _) = edit("éé", 0, 1, Edit::Insert('-'));
        assert_eq!(text, "é-é");
    }

    #[test]
    fn newline_keeps_indentation() {
        let (text, cursor) = edit("flowchart TD\n    A-->B", 1, 9, Edit::Newline);
        assert_eq!(text, "flowchart TD\n    A-->B\n    ");
        assert_eq!(cursor, Cursor::new(2, 4));
    }

    #[test]
    fn backspace_joins_lines() {
        let (text, cursor) = edit("ab\ncd", 1, 0, Edit::Backspace);
        assert_eq!(text, "abcd");
        assert_eq!(cursor, Cursor::new(0, 2));
        assert!(apply("ab", Cursor::default(), Edit::Backspace, 4).is_none());
    }

    #[test]
    fn delete_at_end_is_none() {
        assert!(apply("ab", Cursor::new(0, 2), Edit::Delete, 4).is_none());
        let (text, cursor) = edit("ab\ncd", 0, 2, Edit::Delete);
        assert_eq!(text, "abcd");
        assert_eq!(cursor, Cursor::new(0, 2));
    }

    #[test]
    fn indent_inserts_spaces() {
        let (text, cursor) = edit("A", 0, 0, Edit::Indent);
        assert_eq!(text, "    A");
        assert_eq!(cursor, Cursor::new(0, 4));
    }

    #[test]
    fn cursor_is_clamped_after_text_shrinks() {
        assert_eq!(clamp("short", Cursor::new(4, 20)), Cursor::new(0, 5));
        assert_eq!(clamp("", Cursor::new(1, 1)), Cursor::new(0, 0));
    }

    #[test]
    fn motions_wrap_across_lines() {
        let text = "ab\ncdef\ng";
        assert_eq!(motion(text, Cursor::new(1, 0), Motion::Left), Cursor::new(0, 2));
        assert_eq!(motion(text, Cursor::new(0, 2), Motion::Right), Cursor::new(1, 0));
        assert_eq!(motion(text, Cursor::new(1, 4), Motion::Down), Cursor::new(2, 1));
        assert_eq!(motion(text, Cursor::new(2, 1), Motion::PageUp(10)), Cursor::new(0, 1));
        assert_eq!(motion(text, Cursor::default(), Motion::DocEnd), Cursor::new(2, 1));
        assert_eq!(motion(text, Cursor::new(2, 1), Motion::Right), Cursor::new(2, 1));
    }
}
