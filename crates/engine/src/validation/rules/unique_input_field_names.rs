//! Input object literals with a repeated field.
//!
//! The parser folds object literals into maps, so repeated fields are only visible in the
//! text of the document, which is scanned here.

use async_graphql_parser::{types::ExecutableDocument, Pos};

use crate::{
    lexer::{self, Token},
    validation::visitor::{Rule, Visitor, VisitorContext},
};

pub(crate) struct UniqueInputFieldNames;

impl<'a> Visitor<'a> for UniqueInputFieldNames {
    fn enter_document(&mut self, ctx: &mut VisitorContext<'a>, _doc: &'a ExecutableDocument) {
        let Some(source) = ctx.source else {
            return;
        };

        for duplicate in duplicate_input_fields(source) {
            ctx.report_error(
                Rule::UniqueInputFieldNames,
                vec![duplicate.first, duplicate.second],
                format!("There can be only one input field named \"{}\".", duplicate.name),
            );
        }
    }
}

#[derive(Debug, PartialEq)]
struct Duplicate<'s> {
    name: &'s str,
    first: Pos,
    second: Pos,
}

#[derive(Clone, Copy, PartialEq)]
enum Frame {
    Parentheses,
    List,
    Object,
    SelectionSet,
}

fn duplicate_input_fields(source: &str) -> Vec<Duplicate<'_>> {
    let tokens = lexer::tokens(source);

    let mut duplicates = Vec::new();
    let mut frames: Vec<(Frame, Vec<(&str, Pos)>)> = Vec::new();

    for (index, (token, pos)) in tokens.iter().enumerate() {
        match token {
            Token::Punctuator('(') => frames.push((Frame::Parentheses, Vec::new())),
            Token::Punctuator('[') => frames.push((Frame::List, Vec::new())),
            Token::Punctuator('{') => {
                let frame = match frames.last() {
                    Some((Frame::Parentheses | Frame::List | Frame::Object, _)) => Frame::Object,
                    _ => Frame::SelectionSet,
                };
                frames.push((frame, Vec::new()));
            }
            Token::Punctuator(')' | ']' | '}') => {
                frames.pop();
            }
            Token::Name(name) => {
                let name = *name;
                let Some((Frame::Object, seen)) = frames.last_mut() else {
                    continue;
                };
                let is_key = matches!(tokens.get(index + 1), Some((Token::Punctuator(':'), _)))
                    && !matches!(index.checked_sub(1).and_then(|i| tokens.get(i)), Some((Token::Punctuator('$'), _)));
                if !is_key {
                    continue;
                }

                match seen.iter().find(|(seen, _)| *seen == name) {
                    Some((_, first)) => duplicates.push(Duplicate {
                        name,
                        first: *first,
                        second: *pos,
                    }),
                    None => seen.push((name, *pos)),
                }
            }
            _ => {}
        }
    }

    duplicates
}
