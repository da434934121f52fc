use super::PlaceholderStyle;
use super::parsers::{is_block_comment_end, is_block_comment_start, is_line_comment_start};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    Bracketed,
    Backticked,
    LineComment,
    BlockComment(u32),
}

impl State {
    /// Consume the byte at `idx` and return the index of the last byte consumed.
    ///
    /// Two-byte tokens (comment delimiters, doubled quotes, backslash escapes) are consumed
    /// whole so the caller never sees their second half.
    pub(super) fn step(&mut self, bytes: &[u8], idx: usize, style: PlaceholderStyle) -> usize {
        let b = bytes[idx];
        match *self {
            State::Normal => match b {
                b'\'' => *self = State::SingleQuoted,
                b'"' => *self = State::DoubleQuoted,
                b'[' if style == PlaceholderStyle::Mssql => *self = State::Bracketed,
                b'`' if style == PlaceholderStyle::Mysql => *self = State::Backticked,
                b'#' if style == PlaceholderStyle::Mysql => *self = State::LineComment,
                _ if is_line_comment_start(bytes, idx) => {
                    *self = State::LineComment;
                    return idx + 1;
                }
                _ if is_block_comment_start(bytes, idx) => {
                    *self = State::BlockComment(1);
                    return idx + 1;
                }
                _ => {}
            },
            State::SingleQuoted | State::DoubleQuoted => {
                let quote = if *self == State::SingleQuoted { b'\'' } else { b'"' };
                if b == b'\\' && style == PlaceholderStyle::Mysql {
                    return idx + 1;
                }
                if b == quote {
                    if bytes.get(idx + 1) == Some(&quote) {
                        return idx + 1;
                    }
                    *self = State::Normal;
                }
            }
            State::Bracketed => {
                if b == b']' {
                    if bytes.get(idx + 1) == Some(&b']') {
                        return idx + 1;
                    }
                    *self = State::Normal;
                }
            }
            State::Backticked => {
                if b == b'`' {
                    if bytes.get(idx + 1) == Some(&b'`') {
                        return idx + 1;
                    }
                    *self = State::Normal;
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    *self = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                // T-SQL block comments nest; MySQL's do not.
                if style == PlaceholderStyle::Mssql && is_block_comment_start(bytes, idx) {
                    *self = State::BlockComment(depth + 1);
                    return idx + 1;
                }
                if is_block_comment_end(bytes, idx) {
                    *self = if depth <= 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    return idx + 1;
                }
            }
        }
        idx
    }

    /// True when a byte consumed in this state, before stepping, is executable SQL rather
    /// than whitespace or comment text.
    pub(super) fn is_code(self, bytes: &[u8], idx: usize, style: PlaceholderStyle) -> bool {
        match self {
            State::Normal => {
                let b = bytes[idx];
                !(b.is_ascii_whitespace()
                    || (b == b'#' && style == PlaceholderStyle::Mysql)
                    || is_line_comment_start(bytes, idx)
                    || is_block_comment_start(bytes, idx))
            }
            State::LineComment | State::BlockComment(_) => false,
            _ => true,
        }
    }
}
