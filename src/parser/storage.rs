// file: src/parser/storage.rs
// description: flattening of Confluence storage-format XHTML into plain text
// reference: https://confluence.atlassian.com/doc/confluence-storage-format-790796544.html

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref CDATA: Regex =
        Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("CDATA regex is valid");
    static ref LINE_BREAK: Regex =
        Regex::new(r"(?i)<br\s*/?>").expect("LINE_BREAK regex is valid");
    static ref LIST_ITEM: Regex =
        Regex::new(r"(?i)<li(\s[^>]*)?>").expect("LIST_ITEM regex is valid");
    static ref BLOCK_END: Regex = Regex::new(
        r"(?i)</(p|div|h[1-6]|li|tr|blockquote|pre|table|ul|ol|ac:task)>"
    )
    .expect("BLOCK_END regex is valid");
    static ref TABLE_CELL_END: Regex =
        Regex::new(r"(?i)</t[dh]>").expect("TABLE_CELL_END regex is valid");
    static ref ANY_TAG: Regex = Regex::new(r"<[^>]+>").expect("ANY_TAG regex is valid");
    static ref NUMERIC_ENTITY: Regex =
        Regex::new(r"&#([xX][0-9a-fA-F]+|[0-9]+);").expect("NUMERIC_ENTITY regex is valid");
    static ref BLANK_RUN: Regex = Regex::new(r"\n{3,}").expect("BLANK_RUN regex is valid");
}

/// Reduce a storage-format body to readable plain text.
pub fn to_plain_text(storage: &str) -> String {
    // CDATA first so macro bodies survive tag stripping
    let text = CDATA.replace_all(storage, |caps: &Captures| escape_angles(&caps[1]));
    let text = LINE_BREAK.replace_all(&text, "\n");
    let text = LIST_ITEM.replace_all(&text, "- ");
    let text = TABLE_CELL_END.replace_all(&text, " | ");
    let text = BLOCK_END.replace_all(&text, "\n");
    let text = ANY_TAG.replace_all(&text, "");
    let text = decode_entities(&text);

    let lines = text
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");

    BLANK_RUN.replace_all(&lines, "\n\n").trim().to_string()
}

fn escape_angles(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn decode_entities(text: &str) -> String {
    let numeric = NUMERIC_ENTITY.replace_all(text, |caps: &Captures| {
        let code = &caps[1];
        let parsed = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        parsed
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    // &amp; last so "&amp;lt;" decodes to "&lt;" and not "<"
    numeric
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&ndash;", "–")
        .replace("&mdash;", "—")
        .replace("&hellip;", "…")
        .replace("&amp;", "&")
}
