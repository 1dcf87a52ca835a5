use memchr::{memchr, memchr3};

pub(crate) fn escape_text_into(out: &mut String, text: &str) {
    escape_into(out, text, false);
}

pub(crate) fn escape_attribute_into(out: &mut String, value: &str) {
    escape_into(out, value, true);
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    let bytes = text.as_bytes();
    let mut start = 0;
    while let Some(rel) = next_special(&bytes[start..], attribute) {
        let pos = start + rel;
        // Specials are ASCII, so `pos` is always a char boundary.
        out.push_str(&text[start..pos]);
        out.push_str(match bytes[pos] {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            _ => "&quot;",
        });
        start = pos + 1;
    }
    out.push_str(&text[start..]);
}

fn next_special(rest: &[u8], attribute: bool) -> Option<usize> {
    let markup = memchr3(b'&', b'<', b'>', rest);
    if !attribute {
        return markup;
    }
    match (markup, memchr(b'"', rest)) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
