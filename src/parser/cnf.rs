use super::{parse_ints, parse_usize};
use anyhow::{anyhow, bail, Result};
use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1},
    sequence::tuple,
    IResult, Parser,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub vars: usize,
    pub clauses: usize,
}

fn parse_header(input: &str) -> IResult<&str, Header> {
    let (input, _) =
        tuple((multispace0, tag("p"), multispace1, tag("cnf"), multispace1)).parse(input)?;
    let (input, (vars, _, clauses)) =
        tuple((parse_usize, multispace1, parse_usize)).parse(input)?;
    Ok((input, Header { vars, clauses }))
}

/// Parse a formula in dimacs cnf format. Clauses are terminated by 0 and may
/// share a line or span several lines. A line starting with `%` ends the
/// formula.
pub fn parse(input: &str) -> Result<(Header, Vec<Vec<i32>>)> {
    tracing::info!("parsing cnf");
    let mut lines = input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('c'));
    let header = {
        let line = lines.next().ok_or(anyhow!("empty input"))?;
        let (_, header) = parse_header(line).map_err(|_| anyhow!("invalid dimacs header '{}'", line))?;
        tracing::info!("{} variables and {} clauses", header.vars, header.clauses);
        header
    };

    let mut clauses = Vec::with_capacity(header.clauses);
    let mut clause = vec![];
    for line in lines {
        if line.starts_with('%') {
            break;
        }
        let (rest, ints) = parse_ints(line).map_err(|_| anyhow!("invalid clause '{}'", line))?;
        if !rest.trim().is_empty() {
            bail!("unexpected '{}' in clause '{}'", rest.trim(), line);
        }
        for lit in ints {
            if lit == 0 {
                clauses.push(std::mem::take(&mut clause));
            } else if lit.unsigned_abs() as usize > header.vars {
                bail!("literal {} exceeds the {} declared variables", lit, header.vars);
            } else {
                clause.push(lit);
            }
        }
    }
    if !clause.is_empty() {
        bail!("last clause is not terminated by 0");
    }
    if clauses.len() != header.clauses {
        tracing::warn!(
            "header announces {} clauses but {} were read",
            header.clauses,
            clauses.len()
        );
    }
    Ok((header, clauses))
}
