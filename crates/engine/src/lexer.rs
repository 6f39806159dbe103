//! A light GraphQL tokenizer, for the few facts the parser drops from its AST.

use std::collections::HashSet;

use async_graphql_parser::Pos;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Token<'s> {
    Punctuator(char),
    Name(&'s str),
    Other,
}

/// A tokenizer that only keeps names and punctuators apart.
struct Scanner<'s> {
    source: &'s str,
    offset: usize,
    line: usize,
    column: usize,
}

impl<'s> Scanner<'s> {
    fn new(source: &'s str) -> Self {
        Scanner {
            source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.offset..].chars().next()
    }

    fn starts_with(&self, pattern: &str) -> bool {
        self.source[self.offset..].starts_with(pattern)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();

        match c {
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            '\r' if self.peek() != Some('\n') => {
                self.line += 1;
                self.column = 1;
            }
            '\r' => {}
            _ => self.column += 1,
        }

        Some(c)
    }

    fn bump_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&predicate) {
            self.bump();
        }
    }

    fn skip_string(&mut self) {
        if self.starts_with("\"\"\"") {
            for _ in 0..3 {
                self.bump();
            }
            while self.peek().is_some() {
                if self.starts_with("\\\"\"\"") {
                    for _ in 0..4 {
                        self.bump();
                    }
                } else if self.starts_with("\"\"\"") {
                    for _ in 0..3 {
                        self.bump();
                    }
                    return;
                } else {
                    self.bump();
                }
            }
            return;
        }

        self.bump();
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    self.bump();
                }
                '"' | '\n' | '\r' => return,
                _ => {}
            }
        }
    }

    fn next_token(&mut self) -> Option<(Token<'s>, Pos)> {
        loop {
            let c = self.peek()?;
            let pos = Pos {
                line: self.line,
                column: self.column,
            };

            match c {
                c if c.is_whitespace() || c == ',' || c == '\u{feff}' => {
                    self.bump();
                }
                '#' => self.bump_while(|c| c != '\n' && c != '\r'),
                '"' => {
                    self.skip_string();
                    return Some((Token::Other, pos));
                }
                c if c == '_' || c.is_ascii_alphabetic() => {
                    let start = self.offset;
                    self.bump_while(|c| c == '_' || c.is_ascii_alphanumeric());
                    return Some((Token::Name(&self.source[start..self.offset]), pos));
                }
                c if c == '-' || c.is_ascii_digit() => {
                    self.bump();
                    self.bump_while(|c| c.is_ascii_alphanumeric() || c == '.' || c == '+' || c == '-');
                    return Some((Token::Other, pos));
                }
                c => {
                    self.bump();
                    return Some((Token::Punctuator(c), pos));
                }
            }
        }
    }
}

/// Tokens of a document with their position. Strings, numbers and other literals collapse into [`Token::Other`].
pub(crate) fn tokens(source: &str) -> Vec<(Token<'_>, Pos)> {
    let mut scanner = Scanner::new(source);
    let mut tokens = Vec::new();
    while let Some(token) = scanner.next_token() {
        tokens.push(token);
    }
    tokens
}

/// Names of the directives an SDL document declares with the `repeatable` keyword.
pub(crate) fn repeatable_directives(source: &str) -> HashSet<String> {
    let tokens = tokens(source);
    let mut repeatable = HashSet::new();
    let mut index = 0;

    while index < tokens.len() {
        let (Token::Name("directive"), _) = tokens[index] else {
            index += 1;
            continue;
        };
        let (Some((Token::Punctuator('@'), _)), Some((Token::Name(name), _))) =
            (tokens.get(index + 1), tokens.get(index + 2))
        else {
            index += 1;
            continue;
        };

        index += 3;
        if let Some((Token::Punctuator('('), _)) = tokens.get(index) {
            let mut depth = 0usize;
            while let Some((token, _)) = tokens.get(index) {
                index += 1;
                match token {
                    Token::Punctuator('(') => depth += 1,
                    Token::Punctuator(')') => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }

        if let Some((Token::Name("repeatable"), _)) = tokens.get(index) {
            repeatable.insert((*name).to_string());
        }
    }

    repeatable
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_the_repeatable_keyword() {
        let repeatable = repeatable_directives(
            r#"
            "A directive @fake repeatable on FIELD in a description"
            directive @tag(name: String = "directive @x repeatable") repeatable on FIELD_DEFINITION | OBJECT
            directive @once(reason: String) on FIELD_DEFINITION
            # directive @commented repeatable on FIELD
            directive @bare repeatable on FIELD
            type Query { directive: Int, repeatable: Int }
            "#,
        );

        let mut names = repeatable.into_iter().collect::<Vec<_>>();
        names.sort();
        assert_eq!(names, ["bare", "tag"]);
    }

    #[test]
    fn positions_are_one_based() {
        let tokens = tokens("{\n  a }");
        assert_eq!(tokens[1], (Token::Name("a"), Pos { line: 2, column: 3 }));
    }
}
