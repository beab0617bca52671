/// Truncates `text` to at most `max_chars` characters.
///
/// Operates on `char` boundaries so multi-byte content is never split
/// mid-codepoint. Returns the input unchanged when it already fits.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let mut out = String::new();
    for (count, ch) in text.chars().enumerate() {
        if count >= max_chars {
            break;
        }
        out.push(ch);
    }
    out
}
