/// Characters that must be backslash-escaped inside `WIFI:` and `MEBKM:` fields.
pub const RESERVED: [char; 5] = ['\\', ';', ',', '"', ':'];

/// Escapes the reserved characters of the WiFi/bookmark micro-formats.
///
/// Each of `\ ; , " :` is prefixed with a backslash. The input is scanned once,
/// left to right, so a backslash inserted by this function is never escaped again.
///
/// # Example
///
/// ```
/// use qrgen::escape::escape_wifi;
///
/// assert_eq!(escape_wifi(r#"my;net"#), r#"my\;net"#);
/// assert_eq!(escape_wifi(r"a\b"), r"a\\b");
/// ```
pub fn escape_wifi(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    for c in text.chars() {
        if RESERVED.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
