//! Line tokenizer for register definition sources.

/// Characters that end a line.
#[inline]
fn is_eol(c: char) -> bool {
    matches!(c, '\0' | '\n' | '\r')
}

#[inline]
fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

#[inline]
fn starts_comment(rest: &[char]) -> bool {
    match rest {
        ['#', ..] => true,
        ['/', '/', ..] => true,
        _ => false,
    }
}

/// Splits one line of a definitions source into tokens.
///
/// Tokens are separated by spaces, tabs or commas. A comma right after a token is a separator,
/// never a token of its own. A token may be quoted with `'` or `"` to embed whitespace and
/// commas; the quotes are not part of the token. An unquoted `#` or `//` at the start of a token
/// begins a comment that runs to the end of the line.
///
/// Blank lines and comment lines yield no tokens.
///
/// ```
/// use fpga_reg::token::tokenize;
///
/// assert_eq!(tokenize("reg ADDRH, 0x04  # trailing"), ["reg", "ADDRH", "0x04"]);
/// assert_eq!(tokenize("field \"my field\" 0 8"), ["field", "my field", "0", "8"]);
/// assert!(tokenize("   // nothing here").is_empty());
/// ```
pub fn tokenize(line: &str) -> Vec<String> {
    let end = line.find(is_eol).unwrap_or(line.len());
    let chars: Vec<char> = line[..end].chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        while i < chars.len() && is_blank(chars[i]) {
            i += 1;
        }
        if i == chars.len() {
            break;
        }

        let quote = match chars[i] {
            q @ ('"' | '\'') => {
                i += 1;
                Some(q)
            }
            _ => None,
        };
        if quote.is_none() && starts_comment(&chars[i..]) {
            break;
        }

        let mut token = String::new();
        while i < chars.len() {
            let c = chars[i];
            match quote {
                Some(q) if c == q => {
                    i += 1;
                    break;
                }
                None if is_blank(c) || c == ',' => break,
                _ => {}
            }
            token.push(c);
            i += 1;
        }
        tokens.push(token);

        while i < chars.len() && is_blank(chars[i]) {
            i += 1;
        }
        if i < chars.len() && chars[i] == ',' {
            i += 1;
        }
    }

    tokens
}
