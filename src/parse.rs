use nom::{
    branch::alt,
    bytes::complete::{is_not, take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::{all_consuming, opt, recognize},
    error::ParseError,
    multi::separated_list1,
    sequence::{delimited, preceded, separated_pair},
    IResult,
};

/// A combinator that takes a parser `inner` and produces a parser that also consumes both leading and
/// trailing whitespace, returning the output of `inner`.
fn ws<'a, F: 'a, O, E: ParseError<&'a str>>(
    inner: F,
) -> impl FnMut(&'a str) -> IResult<&'a str, O, E>
where
    F: FnMut(&'a str) -> IResult<&'a str, O, E>,
{
    delimited(multispace0, inner, multispace0)
}

fn is_atext(c: char) -> bool {
    c.is_alphanumeric() || "!#$%&'*+-/=?^_`{|}~".contains(c)
}

// atom *("." atom)
fn dot_atom(i: &str) -> IResult<&str, &str> {
    recognize(separated_list1(char('.'), take_while1(is_atext)))(i)
}

// "any text except quotes"
fn quoted_string(i: &str) -> IResult<&str, &str> {
    recognize(delimited(char('"'), take_while(|c: char| c != '"'), char('"')))(i)
}

fn local_part(i: &str) -> IResult<&str, &str> {
    alt((quoted_string, dot_atom))(i)
}

// [192.168.0.1]
fn domain_literal(i: &str) -> IResult<&str, &str> {
    recognize(delimited(char('['), is_not("[]\\ "), char(']')))(i)
}

fn domain(i: &str) -> IResult<&str, &str> {
    alt((domain_literal, dot_atom))(i)
}

/// local@domain, returning the domain.
fn addr_spec(i: &str) -> IResult<&str, &str> {
    let (i, (_, host)) = separated_pair(local_part, char('@'), domain)(i)?;
    Ok((i, host))
}

/// Optional display name followed by <local@domain>.
fn name_addr(i: &str) -> IResult<&str, &str> {
    preceded(
        opt(alt((quoted_string, is_not("<\"")))),
        delimited(ws(char('<')), addr_spec, ws(char('>'))),
    )(i)
}

fn mailbox(i: &str) -> IResult<&str, &str> {
    all_consuming(ws(alt((addr_spec, name_addr))))(i)
}

/// Extracts the host part of an email address, as written.
///
/// Accepts `local@domain` and `Display Name <local@domain>`. Returns `None` for
/// anything that isn't a well-formed address.
pub fn email_domain(address: &str) -> Option<&str> {
    mailbox(address).ok().map(|(_, host)| host)
}
