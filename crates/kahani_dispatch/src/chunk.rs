//! Paragraph-aware text chunking.

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Paragraphs (separated by blank lines) are packed greedily and joined with
/// `"\n\n"`, so joining the chunks with `"\n\n"` gives back the paragraph
/// structure. A paragraph longer than `max_chars` is split on line breaks,
/// and a line longer than `max_chars` on word or character boundaries.
/// Every chunk is non-empty; blank input yields no chunks.
///
/// ```
/// use kahani_dispatch::chunk_text;
///
/// let chunks = chunk_text("First paragraph.\n\nSecond paragraph.", 20);
/// assert_eq!(chunks, vec!["First paragraph.", "Second paragraph."]);
/// ```
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in paragraphs(text) {
        let pieces = if char_len(&paragraph) > max_chars {
            split_lines(&paragraph, max_chars)
        } else {
            vec![paragraph]
        };

        for piece in pieces {
            if current.is_empty() {
                current = piece;
            } else if char_len(&current) + 2 + char_len(&piece) <= max_chars {
                current.push_str("\n\n");
                current.push_str(&piece);
            } else {
                chunks.push(std::mem::replace(&mut current, piece));
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !lines.is_empty() {
                paragraphs.push(lines.join("\n"));
                lines.clear();
            }
        } else {
            lines.push(line.trim_end());
        }
    }
    if !lines.is_empty() {
        paragraphs.push(lines.join("\n"));
    }
    paragraphs
}

/// Pack lines of an oversize paragraph, splitting oversize lines.
fn split_lines(paragraph: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for line in paragraph.lines() {
        let parts = if char_len(line) > max_chars {
            split_words(line, max_chars)
        } else {
            vec![line.to_string()]
        };

        for part in parts {
            if current.is_empty() {
                current = part;
            } else if char_len(&current) + 1 + char_len(&part) <= max_chars {
                current.push('\n');
                current.push_str(&part);
            } else {
                pieces.push(std::mem::replace(&mut current, part));
            }
        }
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Pack words of an oversize line, hard-splitting oversize words.
fn split_words(line: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        let parts: Vec<String> = if char_len(word) > max_chars {
            word.chars()
                .collect::<Vec<_>>()
                .chunks(max_chars)
                .map(|c| c.iter().collect())
                .collect()
        } else {
            vec![word.to_string()]
        };

        for part in parts {
            if current.is_empty() {
                current = part;
            } else if char_len(&current) + 1 + char_len(&part) <= max_chars {
                current.push(' ');
                current.push_str(&part);
            } else {
                pieces.push(std::mem::replace(&mut current, part));
            }
        }
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
