//! Content-Disposition header parsing (filename and filename*).

/// Extracts the filename from a raw Content-Disposition header value.
///
/// Supports `filename="value"`, `filename=value` and
/// `filename*=UTF-8''percent-encoded`; `filename*` wins when both are present.
pub fn parse_content_disposition_filename(header_value: &str) -> Option<String> {
    let mut from_token: Option<String> = None;

    for param in header_value.trim().split(';') {
        let Some((name, v)) = param.trim().split_once('=') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        let v = v.trim();

        if name == "filename*" {
            let encoded = v
                .strip_prefix("utf-8''")
                .or_else(|| v.strip_prefix("UTF-8''"));
            if let Some(decoded) = encoded.and_then(|rest| urlencoding::decode(rest).ok()) {
                if !decoded.is_empty() {
                    return Some(decoded.into_owned());
                }
            }
        }

        if name == "filename" {
            let unquoted = if v.len() >= 2 && v.starts_with('"') && v.ends_with('"') {
                unescape_quoted(&v[1..v.len() - 1])
            } else {
                v.to_string()
            };
            if !unquoted.is_empty() {
                from_token = Some(unquoted);
            }
        }
    }

    from_token
}

/// Drop the backslash in `\"` and `\\`.
fn unescape_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next @ ('"' | '\\')) = chars.peek() {
                out.push(next);
                chars.next();
                continue;
            }
        }
        out.push(c);
    }
    out
}
