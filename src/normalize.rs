//! Splits raw program text into one normalized string per clause.

use tracing::debug;

const SYMBOL_CHARS: &str = "+-*/\\^<>=~:.?@#&$";

pub fn split_clauses(source: &str) -> Vec<String> {
    let chars: Vec<char> = source.chars().collect();
    let mut clauses = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let next = chars.get(i + 1).copied();
        match ch {
            '\'' if is_char_code(&current) => {
                let len = char_code_len(&chars[i + 1..]);
                current.extend(&chars[i..=i + len]);
                i += len;
            }
            '\'' | '"' | '`' => match closing_quote(&chars, i) {
                Some(close) => {
                    current.extend(&chars[i..=close]);
                    i = close;
                }
                None => {
                    // Unbalanced quote: keep the mark and go on scanning the
                    // rest of the line as plain text.
                    debug!(offset = i, "unterminated quote");
                    current.push(ch);
                }
            },
            '%' => {
                while i + 1 < chars.len() && chars[i + 1] != '\n' {
                    i += 1;
                }
                push_space(&mut current);
            }
            '/' if next_is(&chars, i, '*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && next_is(&chars, i, '/')) {
                    i += 1;
                }
                i += 1;
                push_space(&mut current);
            }
            '(' | '[' | '{' => {
                depth += 1;
                current.push(ch);
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            '.' => {
                let ends_clause = depth == 0
                    && next.is_none_or(|next| next.is_whitespace() || next == '%')
                    && !current
                        .trim_end()
                        .chars()
                        .next_back()
                        .is_some_and(|prev| SYMBOL_CHARS.contains(prev));
                current.push('.');
                if ends_clause {
                    finish_clause(&mut current, &mut clauses);
                    depth = 0;
                }
            }
            ch if ch.is_whitespace() => push_space(&mut current),
            _ => current.push(ch),
        }
        i += 1;
    }

    if !current.trim().is_empty() {
        current.push('.');
        finish_clause(&mut current, &mut clauses);
    }

    debug!(clauses = clauses.len(), "normalized source");
    clauses
}

/// Index of the quote closing the one at `open`. Quoted text may not run past
/// the end of its line.
fn closing_quote(chars: &[char], open: usize) -> Option<usize> {
    let quote = chars[open];
    let mut i = open + 1;
    while i < chars.len() {
        match chars[i] {
            '\n' => return None,
            '\\' => i += 1,
            ch if ch == quote => {
                // A doubled quote is an escaped quote, not the end.
                if chars.get(i + 1) == Some(&quote) {
                    i += 1;
                } else {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// `0'c` character codes: a quote right after a standalone `0`.
fn is_char_code(current: &str) -> bool {
    let mut rev = current.chars().rev();
    rev.next() == Some('0') && !rev.next().is_some_and(|ch| ch.is_alphanumeric() || ch == '_')
}

/// Characters after the quote that belong to a character code.
fn char_code_len(rest: &[char]) -> usize {
    match rest {
        ['\\', _, ..] | ['\'', '\'', ..] => 2,
        [_, ..] => 1,
        [] => 0,
    }
}

fn next_is(chars: &[char], i: usize, expected: char) -> bool {
    chars.get(i + 1) == Some(&expected)
}

fn push_space(current: &mut String) {
    if !current.is_empty() && !current.ends_with(' ') {
        current.push(' ');
    }
}

fn finish_clause(current: &mut String, clauses: &mut Vec<String>) {
    let text = std::mem::take(current);
    let text = text.trim();
    if text == "." || text.is_empty() {
        return;
    }
    if text.starts_with(":-") || text.starts_with("?-") {
        debug!(directive = text, "skipping directive");
        return;
    }
    clauses.push(text.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_facts_and_rules() {
        let source = "parent(tom, bob).\nparent(bob, ann).\n\ngrand(X, Z) :-\n    parent(X, Y),\n    parent(Y, Z).\n";
        assert_eq!(
            split_clauses(source),
            vec![
                "parent(tom, bob).",
                "parent(bob, ann).",
                "grand(X, Z) :- parent(X, Y), parent(Y, Z).",
            ]
        );
    }

    #[test]
    fn empty_source_has_no_clauses() {
        assert!(split_clauses("").is_empty());
        assert!(split_clauses("   \n\t ").is_empty());
        assert!(split_clauses("% just a comment\n").is_empty());
    }

    #[test]
    fn strips_comments() {
        let source = "a. % trailing\n/* block\n comment. */ b.";
        assert_eq!(split_clauses(source), vec!["a.", "b."]);
    }

    #[test]
    fn periods_inside_quotes_numbers_and_lists_do_not_split() {
        let source = "p('a. b', \"x. y\"). q(3.14). r([a. b]). s(X) :- X =.. L.";
        assert_eq!(
            split_clauses(source),
            vec![
                "p('a. b', \"x. y\").",
                "q(3.14).",
                "r([a. b]).",
                "s(X) :- X =.. L.",
            ]
        );
    }

    #[test]
    fn doubled_quotes_stay_inside_atom() {
        assert_eq!(split_clauses("p('it''s. ok')."), vec!["p('it''s. ok')."]);
    }

    #[test]
    fn unterminated_tail_is_kept() {
        assert_eq!(split_clauses("a. b(X)"), vec!["a.", "b(X)."]);
    }

    #[test]
    fn unbalanced_quote_only_spoils_its_own_clause() {
        assert_eq!(
            split_clauses("good(a).\nbad('oops).\nfine(b).\nalso(c)."),
            vec!["good(a).", "bad('oops).", "fine(b).", "also(c)."]
        );
    }

    #[test]
    fn character_codes_are_not_quotes() {
        assert_eq!(
            split_clauses("v(X) :- X = 0'a.\nw(0''').\nz(0'\\n).\nnext(b)."),
            vec!["v(X) :- X = 0'a.", "w(0''').", "z(0'\\n).", "next(b)."]
        );
        assert_eq!(split_clauses("p('a0'). q."), vec!["p('a0').", "q."]);
    }

    #[test]
    fn directives_are_dropped() {
        assert_eq!(split_clauses(":- dynamic foo/1.\nfoo(a)."), vec!["foo(a)."]);
    }
}
