// src/core/sanitize.rs

/// Decode the handful of entities league sites actually emit.
/// Unknown entities are left as-is.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        // last, so "&amp;lt;" decodes to "&lt;" and not "<"
        .replace("&amp;", "&")
}

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Comparison key for free-text team names: lowercase, punctuation dropped,
/// whitespace collapsed. `"St. Mary's  Wildcats"` → `"st marys wildcats"`.
pub fn normalize_key(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = true;
    for ch in s.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if ch.is_whitespace() || ch == '-' || ch == '/' {
            if !prev_space { out.push(' '); prev_space = true; }
        }
        // everything else is punctuation: dropped without a separator
    }
    out.truncate(out.trim_end().len());
    out
}

/// True when every word of `needle` appears, in order and contiguous, in `hay`.
/// Both sides are normalized first. Used to spot "Waterloo Wildcats" inside
/// "Waterloo Wildcats U13 AA".
pub fn contains_words(hay: &str, needle: &str) -> bool {
    let hay = normalize_key(hay);
    let needle = normalize_key(needle);
    if needle.is_empty() { return false; }
    if hay == needle { return true; }
    let padded = join!(" ", &hay, " ");
    padded.contains(&join!(" ", &needle, " "))
}

/// Split a bare full team name into `(location, name)`: the last word is the
/// team name, everything before it the location. Single words have no location.
pub fn split_full_name(full: &str) -> (String, String) {
    let full = normalize_ws(full);
    match full.rsplit_once(' ') {
        Some((loc, name)) => (loc.to_string(), name.to_string()),
        None => (s!(), full),
    }
}

pub fn sanitize_filename(name: &str, fallback: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_us = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() { out.push(ch); last_us = false; }
        else if ch.is_whitespace() { if !last_us { out.push('_'); last_us = true; } }
        else if ch=='-' || ch=='_' { if !(last_us && ch=='_') { out.push(ch); } last_us = ch=='_'; }
    }
    let out = out.trim_matches('_').to_string();
    if out.is_empty() { fallback.to_string() } else { out }
}
