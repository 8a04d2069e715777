//! Command parser.
//!
//! Hand-written cursor parser for the two conditional command shapes:
//!
//! ```text
//! buy  <symbol> if price goes below <number>
//! sell <symbol> if price goes above <number>
//! ```
//!
//! Input is lower-cased first and tokens are separated by single spaces. A
//! shape may appear anywhere in the text; the buy
//! shape is searched over the whole input before the sell shape. On failure the
//! error from the attempt that got furthest is returned.

use crate::domain::command::{Action, CommandIntent};
use crate::domain::error::ParseError;

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn at(input: &'a str, pos: usize) -> Self {
        Self { input, pos }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn peek_word(&self) -> String {
        let mut word = String::new();
        for ch in self.remaining().chars() {
            if is_word_char(ch) {
                word.push(ch);
            } else {
                break;
            }
        }
        if word.is_empty() {
            self.peek()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "end of input".to_string())
        } else {
            word
        }
    }

    /// Tokens are separated by exactly one space.
    fn expect_space(&mut self) -> Result<(), ParseError> {
        self.expect_keyword(" ")
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        if self.remaining().starts_with(keyword) {
            self.pos += keyword.len();
            Ok(())
        } else {
            Err(ParseError {
                message: format!("expected '{}', found '{}'", keyword, self.peek_word()),
                position: self.pos,
            })
        }
    }

    fn parse_symbol(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        while self.peek().is_some_and(is_word_char) {
            self.advance();
        }
        if self.pos == start {
            return Err(ParseError {
                message: format!("expected symbol, found '{}'", self.peek_word()),
                position: start,
            });
        }
        Ok(self.input[start..self.pos].to_uppercase())
    }

    fn consume_digits(&mut self) -> usize {
        let mut digits = 0;
        while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
            self.advance();
            digits += 1;
        }
        digits
    }

    /// `digits ('.' digits)?` over ASCII digits only. A dot not followed by a
    /// digit ends the number.
    fn parse_number(&mut self) -> Result<f64, ParseError> {
        let start = self.pos;
        if self.consume_digits() == 0 {
            return Err(ParseError {
                message: format!("expected number, found '{}'", self.peek_word()),
                position: start,
            });
        }

        let mut fraction = self.remaining().chars();
        if fraction.next() == Some('.') && fraction.next().is_some_and(|ch| ch.is_ascii_digit()) {
            self.advance();
            self.consume_digits();
        }

        let num_str = &self.input[start..self.pos];
        num_str.parse::<f64>().map_err(|_| ParseError {
            message: format!("invalid number: {}", num_str),
            position: start,
        })
    }

    fn parse_shape(&mut self, action: Action) -> Result<CommandIntent, ParseError> {
        self.expect_keyword(action.keyword())?;
        self.expect_space()?;
        let symbol = self.parse_symbol()?;
        for keyword in ["if", "price", "goes", action.direction()] {
            self.expect_space()?;
            self.expect_keyword(keyword)?;
        }
        self.expect_space()?;
        let threshold = self.parse_number()?;

        Ok(CommandIntent {
            action,
            symbol,
            threshold,
        })
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Parse a free-text command. Positions in the returned error refer to the
/// lower-cased input.
pub fn parse(input: &str) -> Result<CommandIntent, ParseError> {
    let text = input.to_lowercase();
    let mut furthest: Option<ParseError> = None;

    for action in [Action::Buy, Action::Sell] {
        for (start, _) in text.match_indices(action.keyword()) {
            match Parser::at(&text, start).parse_shape(action) {
                Ok(intent) => return Ok(intent),
                Err(err) => {
                    if furthest.as_ref().is_none_or(|f| err.position > f.position) {
                        furthest = Some(err);
                    }
                }
            }
        }
    }

    Err(furthest.unwrap_or_else(|| ParseError {
        message: "expected 'buy' or 'sell' command".to_string(),
        position: 0,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_buy() {
        let intent = parse("buy aapl if price goes below 150").unwrap();
        assert_eq!(intent.action, Action::Buy);
        assert_eq!(intent.symbol, "AAPL");
        assert_eq!(intent.threshold, 150.0);
    }

    #[test]
    fn parse_sell_with_fraction() {
        let intent = parse("sell tsla if price goes above 700.25").unwrap();
        assert_eq!(intent.action, Action::Sell);
        assert_eq!(intent.symbol, "TSLA");
        assert_eq!(intent.threshold, 700.25);
    }

    #[test]
    fn parse_is_case_insensitive() {
        let intent = parse("Buy AAPL If Price Goes BELOW 150.5").unwrap();
        assert_eq!(intent.action, Action::Buy);
        assert_eq!(intent.symbol, "AAPL");
        assert_eq!(intent.threshold, 150.5);
    }

    #[test]
    fn parse_finds_command_inside_sentence() {
        let intent = parse("please buy msft if price goes below 300 thanks").unwrap();
        assert_eq!(intent.symbol, "MSFT");
        assert_eq!(intent.threshold, 300.0);
    }

    #[test]
    fn parse_symbol_allows_digits_and_underscore() {
        let intent = parse("buy brk_b2 if price goes below 10").unwrap();
        assert_eq!(intent.symbol, "BRK_B2");
    }

    #[test]
    fn repeated_space_is_rejected() {
        let err = parse("buy  aapl if price goes below 150").unwrap_err();
        assert!(err.message.contains("expected symbol"), "{}", err.message);
        assert_eq!(err.position, 4);
    }

    #[test]
    fn newline_and_tab_separators_are_rejected() {
        assert!(parse("buy aapl\nif price goes below 150").is_err());
        assert!(parse("sell nvda if\tprice goes above 90").is_err());
        assert!(parse("sell nvda if price goes above  90").is_err());
    }

    #[test]
    fn non_ascii_digits_are_rejected() {
        let err = parse("buy aapl if price goes below \u{661}\u{665}\u{660}").unwrap_err();
        assert!(err.message.contains("expected number"), "{}", err.message);
        assert_eq!(err.position, 29);
    }

    #[test]
    fn trailing_dot_is_not_part_of_number() {
        let intent = parse("buy aapl if price goes below 150.").unwrap();
        assert_eq!(intent.threshold, 150.0);
    }

    #[test]
    fn text_after_number_is_ignored() {
        let intent = parse("buy aapl if price goes below 150.5 dollars").unwrap();
        assert_eq!(intent.threshold, 150.5);
    }

    #[test]
    fn buy_shape_wins_over_earlier_sell_shape() {
        let intent = parse(
            "sell tsla if price goes above 700 and buy aapl if price goes below 100",
        )
        .unwrap();
        assert_eq!(intent.action, Action::Buy);
        assert_eq!(intent.symbol, "AAPL");
    }

    #[test]
    fn wrong_direction_is_rejected() {
        let err = parse("buy aapl if price goes above 150").unwrap_err();
        assert!(err.message.contains("expected 'below'"), "{}", err.message);
        assert_eq!(err.position, 23);
    }

    #[test]
    fn missing_number_is_rejected() {
        let err = parse("sell tsla if price goes above").unwrap_err();
        assert!(err.message.contains("expected ' '"), "{}", err.message);
    }

    #[test]
    fn negative_number_is_rejected() {
        let err = parse("sell tsla if price goes above -5").unwrap_err();
        assert!(err.message.contains("expected number"), "{}", err.message);
    }

    #[test]
    fn unrelated_text_is_rejected() {
        let err = parse("what is the weather").unwrap_err();
        assert_eq!(err.position, 0);
        assert!(err.message.contains("'buy' or 'sell'"));
    }

    #[test]
    fn empty_text_is_rejected() {
        assert!(parse("").is_err());
    }

    #[test]
    fn missing_symbol_is_rejected() {
        let err = parse("buy  if price goes below 10").unwrap_err();
        assert!(err.position > 0);
    }

    #[test]
    fn furthest_attempt_is_reported() {
        let err = parse("buy now, buy aapl if price goes beneath 5").unwrap_err();
        assert!(err.message.contains("expected 'below'"), "{}", err.message);
    }

    proptest! {
        #[test]
        fn buy_round_trips(sym in "[a-z][a-z0-9]{0,5}", whole in 0u32..100_000, frac in 0u32..100) {
            let text = format!("buy {} if price goes below {}.{:02}", sym, whole, frac);
            let intent = parse(&text).unwrap();
            let expected: f64 = format!("{}.{:02}", whole, frac).parse().unwrap();
            prop_assert_eq!(intent.action, Action::Buy);
            prop_assert_eq!(intent.symbol, sym.to_uppercase());
            prop_assert_eq!(intent.threshold, expected);
        }

        #[test]
        fn sell_round_trips(sym in "[A-Za-z][A-Za-z0-9]{0,5}", whole in 0u32..100_000) {
            let text = format!("SELL {} IF PRICE GOES ABOVE {}", sym, whole);
            let intent = parse(&text).unwrap();
            prop_assert_eq!(intent.action, Action::Sell);
            prop_assert_eq!(intent.symbol, sym.to_uppercase());
            prop_assert_eq!(intent.threshold, whole as f64);
        }

        #[test]
        fn text_without_keywords_never_parses(text in "[c-r ]{0,40}") {
            prop_assert!(parse(&text).is_err());
        }
    }
}
