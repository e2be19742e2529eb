//! Splitting report content into size-bounded parts

/// Comment placed above a report delivered in one message
pub const SINGLE_PART_COMMENT: &str = "Here's the detailed report:";

/// One message worth of report content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePart {
    /// 1-based position
    pub index: usize,
    /// Number of parts in the report
    pub total: usize,
    /// Content slice, never longer than the part limit
    pub body: String,
    /// Header shown above the body
    pub title: String,
    /// Comment shown above the header
    pub comment: String,
}

/// Split `content` into contiguous slices of exactly `max_chars` characters
///
/// The last slice may be shorter. Lengths count characters, not bytes, so multi-byte text
/// is never cut inside a character. A limit of 0 is treated as 1.
pub fn split_content(content: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut parts = Vec::with_capacity(content.len() / max_chars + 1);
    let mut start = 0;
    let mut count = 0;

    for (offset, _) in content.char_indices() {
        if count == max_chars {
            parts.push(&content[start..offset]);
            start = offset;
            count = 0;
        }
        count += 1;
    }

    if start < content.len() {
        parts.push(&content[start..]);
    }

    parts
}

/// Plan the messages for a report
///
/// Content within the limit becomes one part titled after the file; anything longer
/// becomes "Report Part i/N" parts.
pub fn plan_parts(content: &str, max_chars: usize, file_name: &str) -> Vec<MessagePart> {
    if content.chars().count() <= max_chars {
        return vec![MessagePart {
            index: 1,
            total: 1,
            body: content.to_string(),
            title: format!("Report: {file_name}"),
            comment: SINGLE_PART_COMMENT.to_string(),
        }];
    }

    let slices = split_content(content, max_chars);
    let total = slices.len();

    slices
        .into_iter()
        .enumerate()
        .map(|(i, body)| MessagePart {
            index: i + 1,
            total,
            body: body.to_string(),
            title: format!("Report Part {}/{}", i + 1, total),
            comment: format!("Report: {file_name} (continued)"),
        })
        .collect()
}
