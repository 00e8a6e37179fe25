use crate::{
    ast::Formula,
    error::ExpressionParseError,
    lexer::Lexer,
    schema::Schema,
    strings::StringTable,
};
use lalrpop_util::lalrpop_mod;

lalrpop_mod!(grammar);

use self::grammar::ExpressionParser;

/// Parses a textual boolean expression against `schema` and normalizes it.
///
/// Operand strings are interned into `strings` as a side effect; the index
/// proper is untouched, so a failed parse leaves nothing to roll back.
#[inline]
pub(crate) fn parse<'a>(
    input: &'a str,
    schema: &Schema,
    strings: &mut StringTable,
) -> Result<Formula, ExpressionParseError<'a>> {
    let lexer = Lexer::new(input);
    ExpressionParser::new()
        .parse(schema, strings, lexer)
        .map(|expression| expression.normalize())
}
