// src/core/html.rs
//! Tolerant, case-insensitive tag scanning.
//!
//! Nothing here builds a DOM. Pages drift; we only need to find a known
//! container and walk its rows and cells. The lowercase copy of the input is
//! made once per scanner so walking a whole table stays a single linear pass.

use super::sanitize::{decode_entities, normalize_ws};

/// ASCII-only lowercase. Non-ASCII chars are left alone so byte offsets
/// in the result line up with the original.
pub fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

/// Case-insensitive scanner over one document (or fragment).
pub struct Scanner<'a> {
    src: &'a str,
    lc: String,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, lc: to_lower(src) }
    }

    pub fn src(&self) -> &'a str { self.src }

    /// Next `<tag …>…</tag>` block starting at or after `from`.
    /// Returns `(start, end)` where `end` is one past the closing tag.
    pub fn next_block(&self, tag: &str, from: usize) -> Option<(usize, usize)> {
        let open = join!("<", tag);
        let close = join!("</", tag, ">");
        let start = self.find_open(&open, from)?;
        let open_end = self.lc[start..].find('>')? + start + 1;
        let end_rel = self.lc[open_end..].find(&close)?;
        Some((start, open_end + end_rel + close.len()))
    }

    /// Every `<tag …>…</tag>` block, in document order.
    pub fn blocks(&self, tag: &str) -> Vec<&'a str> {
        let mut out = Vec::new();
        let mut pos = 0usize;
        while let Some((s, e)) = self.next_block(tag, pos) {
            out.push(&self.src[s..e]);
            pos = e;
        }
        out
    }

    /// Split on every opening `<tag`, returning the content after each opener's `>`
    /// up to the next opener. Closing tags are left in place (they strip away).
    /// Tolerates rows and cells that are never closed.
    pub fn split_on_open(&self, tag: &str) -> Vec<&'a str> {
        let open = join!("<", tag);
        let mut starts = Vec::new();
        let mut pos = 0usize;
        while let Some(s) = self.find_open(&open, pos) {
            starts.push(s);
            pos = s + open.len();
        }

        let mut out = Vec::with_capacity(starts.len());
        for (i, &s) in starts.iter().enumerate() {
            let limit = starts.get(i + 1).copied().unwrap_or(self.src.len());
            let body_start = match self.lc[s..limit].find('>') {
                Some(gt) => s + gt + 1,
                None => limit,
            };
            out.push(&self.src[body_start..limit]);
        }
        out
    }

    // `<td` must not match `<tdx`; the char after the name ends the tag name.
    fn find_open(&self, open: &str, from: usize) -> Option<usize> {
        let mut pos = from;
        loop {
            let at = self.lc.get(pos..)?.find(open)? + pos;
            let after = self.lc.as_bytes().get(at + open.len()).copied();
            match after {
                Some(b'>') | Some(b'/') | None => return Some(at),
                Some(c) if c.is_ascii_whitespace() => return Some(at),
                _ => pos = at + open.len(),
            }
        }
    }
}

/// The opening tag of a block, e.g. `<tbody aria-live="polite">`, lowercased.
pub fn opener_lc(block: &str) -> String {
    let end = block.find('>').map(|e| e + 1).unwrap_or(block.len());
    to_lower(&block[..end])
}

pub fn inner_after_open_tag(block: &str) -> &str {
    if let Some(oe) = block.find('>') {
        if let Some(cs) = block.rfind('<') {
            if cs > oe {
                return &block[oe + 1..cs];
            }
        }
        return &block[oe + 1..];
    }
    ""
}

pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();

    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&out)
}

/// Visible text of a cell fragment: tags stripped first, then entities decoded,
/// so an encoded `&lt;b&gt;` survives as literal text.
pub fn cell_text(fragment: &str) -> String {
    normalize_ws(&decode_entities(&strip_tags(fragment)))
}

/// Inner text of the first `<a …>…</a>` in the fragment, if any.
pub fn first_link_text(fragment: &str) -> Option<String> {
    let sc = Scanner::new(fragment);
    let (s, e) = sc.next_block("a", 0)?;
    Some(cell_text(inner_after_open_tag(&fragment[s..e])))
}

/// Split a fragment on line-break tags (`<br>`, `<br/>`, `<BR />`).
pub fn split_line_breaks(fragment: &str) -> Vec<&str> {
    let lc = to_lower(fragment);
    let mut out = Vec::new();
    let mut seg_start = 0usize;
    let mut pos = 0usize;
    while let Some(rel) = lc[pos..].find("<br") {
        let at = pos + rel;
        let next = lc.as_bytes().get(at + 3).copied();
        let is_br = matches!(next, Some(b'>') | Some(b'/') | None) || next.is_some_and(|c| c.is_ascii_whitespace());
        let tag_end = lc[at..].find('>').map(|gt| at + gt + 1).unwrap_or(lc.len());
        if is_br {
            out.push(&fragment[seg_start..at]);
            seg_start = tag_end;
        }
        pos = tag_end.max(at + 3);
    }
    out.push(&fragment[seg_start..]);
    out
}
