pub mod token;

use logos::{Lexer, Logos};
pub use token::{Token, TokenKind};

/// Returns an iterator over the token kinds produced by the tokenizer.
pub fn tokenize(input: &str) -> Lexer<TokenKind> {
    TokenKind::lexer(input)
}

/// Returns an owned array containing all of the tokens produced by the tokenizer. This allows us
/// to backtrack in case of an error.
///
/// Characters the tokenizer does not recognize become [`TokenKind::Symbol`] tokens, so the parser
/// can report them with a span instead of silently dropping them.
pub fn tokenize_complete(input: &str) -> Box<[Token]> {
    let mut lexer = tokenize(input);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        tokens.push(Token {
            span: lexer.span(),
            kind: result.unwrap_or(TokenKind::Symbol),
            lexeme: lexer.slice(),
        });
    }

    tokens.into_boxed_slice()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Compares the tokens produced by the tokenizer to the raw expected tokens.
    fn compare_tokens<'source, const N: usize>(input: &'source str, expected: [(TokenKind, &'source str); N]) {
        let mut lexer = tokenize(input);

        for (expected_kind, expected_lexeme) in expected.into_iter() {
            assert_eq!(lexer.next(), Some(Ok(expected_kind)));
            assert_eq!(lexer.slice(), expected_lexeme);
        }

        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn basic_expr() {
        compare_tokens(
            "1 + 2",
            [
                (TokenKind::Int, "1"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Add, "+"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Int, "2"),
            ],
        );
    }

    #[test]
    fn operator_variants() {
        compare_tokens(
            "a×b·c⋅d∗e−f÷g:h/i",
            [
                (TokenKind::Name, "a"),
                (TokenKind::Mul, "×"),
                (TokenKind::Name, "b"),
                (TokenKind::Mul, "·"),
                (TokenKind::Name, "c"),
                (TokenKind::Mul, "⋅"),
                (TokenKind::Name, "d"),
                (TokenKind::Mul, "∗"),
                (TokenKind::Name, "e"),
                (TokenKind::Sub, "−"),
                (TokenKind::Name, "f"),
                (TokenKind::Div, "÷"),
                (TokenKind::Name, "g"),
                (TokenKind::Div, ":"),
                (TokenKind::Name, "h"),
                (TokenKind::Slash, "/"),
                (TokenKind::Name, "i"),
            ],
        );
    }

    #[test]
    fn frac_macro_and_decimals() {
        compare_tokens(
            "\\frac{3.}{x_1} $",
            [
                (TokenKind::FracMacro, "\\frac"),
                (TokenKind::OpenCurly, "{"),
                (TokenKind::Decimal, "3."),
                (TokenKind::CloseCurly, "}"),
                (TokenKind::OpenCurly, "{"),
                (TokenKind::Name, "x_1"),
                (TokenKind::CloseCurly, "}"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Symbol, "$"),
            ],
        );
    }
}
