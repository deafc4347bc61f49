//! Namespace segment munging
//!
//! Clojure namespace segments may contain characters that are not safe in
//! file or class names. The compiler maps each of them to a fixed token
//! (`-` → `_`, `?` → `_QMARK_`, ...). `munge` applies that mapping and
//! `demunge` reverses it for names read back from the filesystem.

/// Characters with a munged form and their tokens
pub const CHAR_MAP: [(char, &str); 24] = [
    ('-', "_"),
    (':', "_COLON_"),
    ('+', "_PLUS_"),
    ('>', "_GT_"),
    ('<', "_LT_"),
    ('=', "_EQ_"),
    ('~', "_TILDE_"),
    ('!', "_BANG_"),
    ('@', "_CIRCA_"),
    ('#', "_SHARP_"),
    ('\'', "_SINGLEQUOTE_"),
    ('"', "_DOUBLEQUOTE_"),
    ('%', "_PERCENT_"),
    ('^', "_CARET_"),
    ('&', "_AMPERSAND_"),
    ('*', "_STAR_"),
    ('|', "_BAR_"),
    ('{', "_LBRACE_"),
    ('}', "_RBRACE_"),
    ('[', "_LBRACK_"),
    (']', "_RBRACK_"),
    ('/', "_SLASH_"),
    ('\\', "_BSLASH_"),
    ('?', "_QMARK_"),
];

/// Tokens ordered longest first.
///
/// `demunge` tries them in this order at every position, so a token is never
/// shadowed by a shorter token that is its prefix (every token starts with `_`,
/// which is itself the token for `-`).
const DEMUNGE_ORDER: [(&str, char); 24] = [
    ("_DOUBLEQUOTE_", '"'),
    ("_SINGLEQUOTE_", '\''),
    ("_AMPERSAND_", '&'),
    ("_PERCENT_", '%'),
    ("_LBRACE_", '{'),
    ("_RBRACE_", '}'),
    ("_LBRACK_", '['),
    ("_RBRACK_", ']'),
    ("_BSLASH_", '\\'),
    ("_COLON_", ':'),
    ("_TILDE_", '~'),
    ("_CIRCA_", '@'),
    ("_SHARP_", '#'),
    ("_CARET_", '^'),
    ("_SLASH_", '/'),
    ("_QMARK_", '?'),
    ("_PLUS_", '+'),
    ("_BANG_", '!'),
    ("_STAR_", '*'),
    ("_BAR_", '|'),
    ("_GT_", '>'),
    ("_LT_", '<'),
    ("_EQ_", '='),
    ("_", '-'),
];

/// Replace every munged character with its token
pub fn munge(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        match CHAR_MAP.iter().find(|(c, _)| *c == ch) {
            Some((_, token)) => out.push_str(token),
            None => out.push(ch),
        }
    }
    out
}

/// Replace every token with the character it stands for.
///
/// Single left-to-right scan: at each position the longest matching token
/// wins; anything else is copied through unchanged.
pub fn demunge(munged: &str) -> String {
    let mut out = String::with_capacity(munged.len());
    let mut rest = munged;

    while let Some(ch) = rest.chars().next() {
        match DEMUNGE_ORDER
            .iter()
            .find(|(token, _)| rest.starts_with(token))
        {
            Some((token, original)) => {
                out.push(*original);
                rest = &rest[token.len()..];
            }
            None => {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    out
}
