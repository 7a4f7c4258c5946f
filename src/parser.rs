pub mod cnf;

use nom::{
    bytes::complete::tag,
    character::complete::{digit1, multispace0, multispace1},
    combinator::{map_res, opt, recognize},
    multi::separated_list0,
    sequence::{pair, preceded},
    IResult, Parser,
};

fn parse_i32(input: &str) -> IResult<&str, i32> {
    map_res(recognize(pair(opt(tag("-")), digit1)), str::parse).parse(input)
}

fn parse_usize(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse).parse(input)
}

/// The whitespace separated integers at the start of the input.
fn parse_ints(input: &str) -> IResult<&str, Vec<i32>> {
    preceded(multispace0, separated_list0(multispace1, parse_i32)).parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_stop_at_the_first_non_number() {
        assert_eq!(parse_ints("  1 -2\t3 x 4"), Ok((" x 4", vec![1, -2, 3])));
        assert_eq!(parse_ints(""), Ok(("", vec![])));
        assert!(parse_i32("-").is_err());
    }
}
