mod common;

#[cfg(test)]
mod scanner_tests {
    use loxwalk as lox;

    use lox::diagnostic::{ReportStyle, Reporter};
    use lox::error::{LoxError, Span};
    use lox::scanner::*;
    use lox::token::*;
    use pretty_assertions::assert_eq;

    use super::common::SharedBuf;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len(), "tokens: {:?}", tokens);

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_two_char_operators_win() {
        assert_token_sequence(
            "!= == <= >= ** => ! = < > * ? :",
            &[
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::STAR_STAR, "**"),
                (TokenType::EQUAL_GREATER, "=>"),
                (TokenType::BANG, "!"),
                (TokenType::EQUAL, "="),
                (TokenType::LESS, "<"),
                (TokenType::GREATER, ">"),
                (TokenType::STAR, "*"),
                (TokenType::QUESTION, "?"),
                (TokenType::COLON, ":"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_comments_and_whitespace() {
        assert_token_sequence(
            "a // the rest is ignored ( { \n\t/ b",
            &[
                (TokenType::IDENTIFIER, "a"),
                (TokenType::SLASH, "/"),
                (TokenType::IDENTIFIER, "b"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_numbers() {
        let tokens: Vec<Token> = Scanner::new("12 3.25 123.")
            .filter_map(Result::ok)
            .collect();

        assert_eq!(tokens[0].literal(), Some(Literal::Number(12.0)));
        assert_eq!(tokens[1].literal(), Some(Literal::Number(3.25)));

        // A trailing '.' is not part of the number.
        assert_eq!(tokens[2].lexeme, "123");
        assert_eq!(tokens[3].token_type, TokenType::DOT);
        assert_eq!(tokens[4].token_type, TokenType::EOF);
    }

    #[test]
    fn test_scanner_05_strings_span_lines() {
        let tokens: Vec<Token> = Scanner::new("\"one\ntwo\" \"\"")
            .filter_map(Result::ok)
            .collect();

        assert_eq!(tokens[0].literal(), Some(Literal::Str("one\ntwo".into())));
        assert_eq!(tokens[0].lexeme, "\"one\ntwo\"");
        assert_eq!(tokens[1].literal(), Some(Literal::Str(String::new())));
    }

    #[test]
    fn test_scanner_06_keywords_and_identifiers() {
        assert_token_sequence(
            "switch this super orchid _x Var",
            &[
                (TokenType::SWITCH, "switch"),
                (TokenType::THIS, "this"),
                (TokenType::SUPER, "super"),
                (TokenType::IDENTIFIER, "orchid"),
                (TokenType::IDENTIFIER, "_x"),
                (TokenType::IDENTIFIER, "Var"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_07_unicode_identifiers() {
        assert_token_sequence(
            "var café = 1;",
            &[
                (TokenType::VAR, "var"),
                (TokenType::IDENTIFIER, "café"),
                (TokenType::EQUAL, "="),
                (TokenType::NUMBER(0.0), "1"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let results: Vec<_> = Scanner::new(",.$(#").collect();

        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let messages: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(|e| e.to_string())
            .collect();

        assert_eq!(
            messages,
            vec![
                "Unexpected character '$'.".to_string(),
                "Unexpected character '#'.".to_string(),
            ]
        );
    }

    #[test]
    fn test_unexpected_multibyte_char_spans_whole_char() {
        let results: Vec<_> = Scanner::new("a → b").collect();

        match &results[1] {
            Err(LoxError::Lex { span, .. }) => assert_eq!(*span, Span::new(2, '→'.len_utf8())),
            other => panic!("expected a lexical error, got {:?}", other),
        }

        assert_token_matches(&results[2], TokenType::IDENTIFIER, "b");
    }

    #[test]
    fn test_unterminated_string_spans_the_run() {
        let results: Vec<_> = Scanner::new("print \"abc").collect();

        match &results[1] {
            Err(LoxError::Lex { message, span }) => {
                assert_eq!(message, "Unterminated string.");
                assert_eq!(*span, Span::new(6, 4));
            }
            other => panic!("expected a lexical error, got {:?}", other),
        }

        assert_token_matches(&results[2], TokenType::EOF, "");
    }

    #[test]
    fn test_tokens_record_end_offsets() {
        let tokens: Vec<Token> = Scanner::new("var ab")
            .filter_map(Result::ok)
            .collect();

        assert_eq!(tokens[0].offset, 3);
        assert_eq!(tokens[1].offset, 6);
        assert_eq!(tokens[2].offset, 6);
        assert_eq!(Span::of_token(&tokens[1]), Span::new(4, 2));
    }

    #[test]
    fn test_token_display() {
        let shown: Vec<String> = Scanner::new("x 3 \"s\"")
            .filter_map(Result::ok)
            .map(|t| t.to_string())
            .collect();

        assert_eq!(
            shown,
            vec!["IDENTIFIER x null", "NUMBER 3 3.0", "STRING \"s\" s", "EOF  null"]
        );
    }

    #[test]
    fn test_scan_all_reports_and_keeps_going() {
        let sink = SharedBuf::default();
        let mut reporter = Reporter::with_sink(ReportStyle::Reduced, Box::new(sink.clone()));
        let source = "1 @ 2";
        reporter.set_source(source);

        let tokens = Scanner::new(source).scan_all(&mut reporter).unwrap();

        assert_eq!(tokens.len(), 3);
        assert_eq!(reporter.error_count(), 1);
        assert_eq!(
            sink.contents(),
            "[line 1] LexicalError at '@': Unexpected character '@'.\n"
        );
        assert!(reporter.checkpoint().is_err());
    }

    fn assert_token_matches(
        result: &Result<Token, LoxError>,
        expected_type: TokenType,
        expected_lexeme: &str,
    ) {
        match result {
            Ok(token) => {
                assert_eq!(token.token_type, expected_type);
                assert_eq!(token.lexeme, expected_lexeme);
            }
            Err(e) => panic!("Expected token, got error: {}", e),
        }
    }
}
