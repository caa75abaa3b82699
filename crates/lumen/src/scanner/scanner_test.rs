// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Lumen Authors

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::{Scanner, TokenKind};

fn scan_all(source: &str) -> Vec<(TokenKind, &str)> {
    let mut scanner = Scanner::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = scanner.scan_token();
        let done = token.kind == TokenKind::Eof;
        tokens.push((token.kind, token.lexeme));
        if done {
            break;
        }
    }
    tokens
}

#[test]
fn scans_punctuation() {
    let tokens = scan_all("(){};,.-+/*");
    let kinds: Vec<_> = tokens.iter().map(|(k, _)| *k).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::LeftParen,
            TokenKind::RightParen,
            TokenKind::LeftBrace,
            TokenKind::RightBrace,
            TokenKind::Semicolon,
            TokenKind::Comma,
            TokenKind::Dot,
            TokenKind::Minus,
            TokenKind::Plus,
            TokenKind::Slash,
            TokenKind::Star,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn scans_compound_operators() {
    let tokens = scan_all("!= == <= >= ! = < >");
    let kinds: Vec<_> = tokens.iter().map(|(k, _)| *k).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::BangEqual,
            TokenKind::EqualEqual,
            TokenKind::LessEqual,
            TokenKind::GreaterEqual,
            TokenKind::Bang,
            TokenKind::Equal,
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn scans_keywords_and_identifiers() {
    let tokens = scan_all("var print foobar");
    assert_eq!(tokens[0].0, TokenKind::Var);
    assert_eq!(tokens[1].0, TokenKind::Print);
    assert_eq!(tokens[2], (TokenKind::Identifier, "foobar"));
}

#[test]
fn scans_numbers_with_optional_fraction() {
    let tokens = scan_all("123 4.5");
    assert_eq!(tokens[0], (TokenKind::Number, "123"));
    assert_eq!(tokens[1], (TokenKind::Number, "4.5"));
}

#[test]
fn trailing_dot_is_not_consumed_into_the_number() {
    let tokens = scan_all("123.");
    assert_eq!(tokens[0], (TokenKind::Number, "123"));
    assert_eq!(tokens[1].0, TokenKind::Dot);
}

#[test]
fn scans_string_literal_excluding_quotes() {
    let tokens = scan_all("\"hello world\"");
    assert_eq!(tokens[0], (TokenKind::String, "\"hello world\""));
}

#[test]
fn unterminated_string_yields_error_token() {
    let tokens = scan_all("\"oops");
    assert_eq!(tokens[0].0, TokenKind::Error);
    assert_eq!(tokens[0].1, "Unterminated string.");
}

#[test]
fn newline_inside_string_advances_line() {
    let mut scanner = Scanner::new("\"a\nb\"\nnext");
    let string_token = scanner.scan_token();
    assert_eq!(string_token.kind, TokenKind::String);
    let next_token = scanner.scan_token();
    assert_eq!(next_token.line, 3);
}

#[test]
fn line_comment_runs_to_end_of_line() {
    let tokens = scan_all("1 // this is ignored\n2");
    assert_eq!(tokens[0], (TokenKind::Number, "1"));
    assert_eq!(tokens[1], (TokenKind::Number, "2"));
}

#[test]
fn block_comment_tracks_newlines_and_is_not_nested() {
    let mut scanner = Scanner::new("/* line1\nline2 */ 42");
    let token = scanner.scan_token();
    assert_eq!(token, super::Token {
        kind: TokenKind::Number,
        lexeme: "42",
        line: 2,
    });
}

#[test]
fn unterminated_block_comment_runs_silently_to_eof() {
    let tokens = scan_all("1 /* never closes");
    let kinds: Vec<_> = tokens.iter().map(|(k, _)| *k).collect();
    assert_eq!(kinds, vec![TokenKind::Number, TokenKind::Eof]);
}

#[test]
fn unknown_character_yields_error_token() {
    let tokens = scan_all("@");
    assert_eq!(tokens[0].0, TokenKind::Error);
    assert_eq!(tokens[0].1, "Unexpected character.");
}

#[test]
fn empty_source_yields_only_eof() {
    let tokens = scan_all("");
    assert_eq!(tokens, vec![(TokenKind::Eof, "")]);
}
