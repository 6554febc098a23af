//! Mount-path normalization.

/// Path separator required by the mount APIs.
pub const SEPARATOR: char = '\\';

/// Prefix marking a verbatim path, exempt from cleaning.
const VERBATIM_PREFIX: &str = r"\\?\";

/// Canonicalize a path into the trailing-separator form the OS mount APIs
/// require.
///
/// Forward slashes become backslashes, redundant separators and `.`
/// segments are removed, `..` segments pop their parent where one exists,
/// and exactly one trailing separator is appended. Verbatim paths (`\\?\`
/// prefix, including GUID-form volume identifiers) skip cleaning the same
/// way the OS does and only receive the trailing-separator rule.
#[must_use]
pub fn normalize_mount_path(path: &str) -> String {
    if path.starts_with(VERBATIM_PREFIX) {
        let trimmed = path.trim_end_matches(SEPARATOR);
        return format!("{trimmed}{SEPARATOR}");
    }

    let mut cleaned = clean(path);
    if !cleaned.ends_with(SEPARATOR) {
        cleaned.push(SEPARATOR);
    }
    cleaned
}

fn clean(path: &str) -> String {
    let path = path.replace('/', "\\");
    let (prefix, rest) = match path.strip_prefix(r"\\") {
        Some(stripped) => (r"\\", stripped),
        None => path.split_at(drive_prefix_len(&path)),
    };
    let rooted = rest.starts_with(SEPARATOR);

    let mut stack: Vec<&str> = Vec::new();
    for segment in rest.split(SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => match stack.last() {
                Some(&"..") => stack.push(".."),
                Some(_) => {
                    stack.pop();
                }
                None if rooted => {}
                None => stack.push(".."),
            },
            segment => stack.push(segment),
        }
    }

    let mut out = String::from(prefix);
    if rooted {
        out.push(SEPARATOR);
    }
    out.push_str(&stack.join("\\"));
    if out.is_empty() {
        out.push('.');
    }
    out
}

fn drive_prefix_len(path: &str) -> usize {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        2
    } else {
        0
    }
}
