//! Small tokenizing helpers shared by the line parsers.

/// Length of the abbreviated sha shown in lists.
pub const SHORT_SHA_LEN: usize = 7;

/// Split `line` into at most `n` fields separated by runs of spaces.
///
/// The last field is the untouched remainder of the line, so a trailing
/// path keeps any spaces or tabs it contains.
pub fn split_fields(line: &str, n: usize) -> Vec<&str> {
    let mut fields = Vec::with_capacity(n);
    let mut rest = line.trim_start_matches(' ');
    while !rest.is_empty() {
        if fields.len() + 1 == n {
            fields.push(rest);
            break;
        }
        match rest.find(' ') {
            Some(end) => {
                fields.push(&rest[..end]);
                rest = rest[end..].trim_start_matches(' ');
            }
            None => {
                fields.push(rest);
                break;
            }
        }
    }
    fields
}

/// Lines of `text` split on `\n` only, so CRLF content keeps its `\r`.
///
/// A trailing newline does not produce a final empty line.
pub fn raw_lines(text: &str) -> impl Iterator<Item = &str> {
    let body = text.strip_suffix('\n').unwrap_or(text);
    (!body.is_empty()).then(|| body.split('\n')).into_iter().flatten()
}

/// First seven characters of a sha (or the whole value when shorter).
pub fn short_sha(sha: &str) -> String {
    sha.chars().take(SHORT_SHA_LEN).collect()
}

/// Split a `%D`-style decoration (`HEAD -> main, origin/main, tag: v1`).
pub fn split_refs(decoration: &str) -> Vec<String> {
    decoration
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}

/// Undo git's C-style quoting of paths with unusual characters.
///
/// `"caf\303\251.txt"` becomes `café.txt`; unquoted input is returned as is.
pub fn unquote_path(raw: &str) -> String {
    let inner = match raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) => inner,
        None => return raw.to_string(),
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut iter = inner.bytes().peekable();
    while let Some(b) = iter.next() {
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        match iter.next() {
            Some(b'n') => bytes.push(b'\n'),
            Some(b't') => bytes.push(b'\t'),
            Some(b'r') => bytes.push(b'\r'),
            Some(b'a') => bytes.push(0x07),
            Some(b'b') => bytes.push(0x08),
            Some(b'f') => bytes.push(0x0c),
            Some(b'v') => bytes.push(0x0b),
            Some(d @ b'0'..=b'7') => {
                let mut value = u32::from(d - b'0');
                for _ in 0..2 {
                    match iter.peek() {
                        Some(&o @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(o - b'0');
                            iter.next();
                        }
                        _ => break,
                    }
                }
                bytes.push((value & 0xff) as u8);
            }
            Some(other) => bytes.push(other),
            None => bytes.push(b'\\'),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}
