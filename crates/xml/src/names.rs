/// Returns true when `name` is usable as an element, attribute, or
/// processing-instruction target name.
///
/// ASCII characters follow the XML 1.0 `Name` production; every non-ASCII
/// character is accepted.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    is_name_start(first) && chars.all(is_name_char)
}

fn is_name_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == ':' || !ch.is_ascii()
}

fn is_name_char(ch: char) -> bool {
    is_name_start(ch) || ch.is_ascii_digit() || ch == '-' || ch == '.'
}

pub(crate) fn is_reserved_target(target: &str) -> bool {
    target.eq_ignore_ascii_case("xml")
}
