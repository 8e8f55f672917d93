use crate::{
    ast::Notation,
    interpreter::{lexer::Lexeme, parser::core::Parser},
};

#[derive(Default)]
struct NumberBuffer {
    text:  String,
    point: bool,
    sign:  bool,
}

impl NumberBuffer {
    fn ends_with_digit(&self) -> bool {
        self.text.ends_with(|c: char| c.is_ascii_digit())
    }

    fn flush_into(&mut self, out: &mut Vec<Lexeme>) {
        if !self.text.is_empty() {
            out.push(std::mem::take(&mut self.text));
        }
        self.point = false;
        self.sign = false;
    }
}

impl Parser {
    /// Reassembles digit runs, decimal points and leading signs into single
    /// numeric lexemes.
    ///
    /// A `.` joins the number being built if that number has no point yet. A
    /// `-` starts a negative number only when the number buffer is empty and
    /// the last emitted lexeme leaves the parser expecting an operand: nothing
    /// at all, an open bracket, an infix operator or a postfix operator. Two
    /// adjacent digit runs never join.
    ///
    /// # Example
    /// ```
    /// use calctree::interpreter::parser::core::Parser;
    ///
    /// let parser = Parser::standard();
    /// let lexemes = parser.tokenize("12+3.5*2").unwrap();
    ///
    /// assert_eq!(parser.merge_numbers(&lexemes), ["12", "+", "3.5", "*", "2"]);
    ///
    /// let lexemes = parser.tokenize("4 - -2").unwrap();
    /// assert_eq!(parser.merge_numbers(&lexemes), ["4", "-", "-2"]);
    /// ```
    #[must_use]
    #[tracing::instrument(level = "trace", skip_all, fields(count = lexemes.len()))]
    pub fn merge_numbers(&self, lexemes: &[Lexeme]) -> Vec<Lexeme> {
        let mut out: Vec<Lexeme> = Vec::with_capacity(lexemes.len());
        let mut buffer = NumberBuffer::default();

        for lexeme in lexemes {
            if lexeme.chars().all(|c| c.is_ascii_digit()) && !lexeme.is_empty() {
                if buffer.ends_with_digit() {
                    buffer.flush_into(&mut out);
                }
                buffer.text.push_str(lexeme);
                continue;
            }

            if lexeme == "."
               && !buffer.point
               && (buffer.text.is_empty() || buffer.ends_with_digit() || buffer.text == "-")
            {
                buffer.text.push('.');
                buffer.point = true;
                continue;
            }

            if lexeme == "-"
               && buffer.text.is_empty()
               && !buffer.sign
               && self.expects_operand_after(out.last())
            {
                buffer.text.push('-');
                buffer.sign = true;
                continue;
            }

            buffer.flush_into(&mut out);
            out.push(lexeme.clone());
        }

        buffer.flush_into(&mut out);
        out
    }

    fn expects_operand_after(&self, previous: Option<&Lexeme>) -> bool {
        let Some(previous) = previous else {
            return true;
        };
        self.config.is_open_bracket(previous)
        || self.config.raw_bracket(previous).is_some()
        || matches!(self.config.fixity(previous),
                    Some(Notation::Infix | Notation::Postfix))
    }
}
