use nom::{
	branch::alt,
	bytes::complete::{
		tag,
		take_till1
	},
	character::complete::{
		digit1,
		multispace0,
		space0,
		space1
	},
	combinator::{
		eof,
		map_res,
		peek
	},
	error::{
		FromExternalError,
		ParseError
	},
	IResult,
	Parser,
	sequence::{
		delimited,
		preceded,
		terminated
	},
};

use std::num::ParseIntError;

/// Parses `word` as a whole word: it must be followed by whitespace or the end of input,
/// so `element` does not match `elements`.
pub fn keyword<'a, E>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str, E>
where
	E: ParseError<&'a str>
{
	terminated(tag(word), peek(alt((space1, eof))))
}

/// Parses a run of non-whitespace characters
pub fn token<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
where
	E: ParseError<&'a str>
{
	take_till1(|c: char| c.is_whitespace())(input)
}

/// Parses the maximal run of ASCII digits following optional spaces as an unsigned integer.
/// Anything after the last digit is left unconsumed.
pub fn uint<'a, E>(input: &'a str) -> IResult<&'a str, usize, E>
where
	E: ParseError<&'a str> + FromExternalError<&'a str, ParseIntError>
{
	preceded(space0, map_res(digit1, |digits: &str| digits.parse::<usize>()))(input)
}

/// A combinator that takes a parser `inner` and produces a parser that also consumes both leading and
/// trailing whitespace, returning the output of `inner`.
///
/// From https://github.com/Geal/nom/blob/master/doc/nom_recipes.md with minor edits
pub fn ws<'a, F, O, E>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O, E>
where
	E: ParseError<&'a str>,
	F: Parser<&'a str, O, E>,
{
	delimited(multispace0, inner, multispace0)
}

#[cfg(test)]
mod tests {
	use nom::error::Error;

	#[test]
	fn test_keyword() {
		assert_eq!(super::keyword::<Error<&str>>("element")("element vertex 8"), Ok((" vertex 8", "element")));
		assert_eq!(super::keyword::<Error<&str>>("vertex")("vertex"), Ok(("", "vertex")));
		assert!(super::keyword::<Error<&str>>("vertex")("vertex_indices").is_err());
		assert!(super::keyword::<Error<&str>>("face")("vertex").is_err());
	}

	#[test]
	fn test_token() {
		assert_eq!(super::token::<Error<&str>>("ascii 1.0"), Ok((" 1.0", "ascii")));
		assert!(super::token::<Error<&str>>("").is_err());
	}

	#[test]
	fn test_uint() {
		assert_eq!(super::uint::<Error<&str>>("4327"), Ok(("", 4327)));
		assert_eq!(super::uint::<Error<&str>>("   12 uchar"), Ok((" uchar", 12)));
		assert_eq!(super::uint::<Error<&str>>("8a"), Ok(("a", 8)));
		assert!(super::uint::<Error<&str>>("-1").is_err());
		assert!(super::uint::<Error<&str>>("").is_err());
		assert!(super::uint::<Error<&str>>("99999999999999999999999999").is_err());
	}

	#[test]
	fn test_ws() {
		use super::token;

		assert_eq!(super::ws(token::<Error<&str>>)("  ascii  1.0"), Ok(("1.0", "ascii")));
	}
}
