//! SPARQL built-in function implementations.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use md5::Digest as Md5Digest;
use sha1::Digest as Sha1Digest;
use sha2::Digest as Sha2Digest;

use sparql_algebra::BuiltInFunction;
use sparql_model::{xsd, Literal, NumericValue, Term};

use super::redos::is_safe_pattern;
use super::{EvalError, EvalOutcome, EvalResult};

pub(super) fn numeric_to_term(value: NumericValue) -> Term {
    Term::typed_literal(value.to_lexical(), value.datatype())
}

pub(super) fn bool_term(value: bool) -> Term {
    Term::typed_literal(if value { "true" } else { "false" }, xsd::BOOLEAN)
}

pub(super) fn require_numeric(term: &Term) -> Result<NumericValue, EvalOutcome> {
    super::ordering::numeric_of(term).ok_or_else(|| EvalError::new(format!("not numeric: {term}")).into())
}

pub(super) fn arithmetic(
    left: Term,
    right: Term,
    op: impl FnOnce(NumericValue, NumericValue) -> NumericValue,
) -> EvalResult<Term> {
    let lv = require_numeric(&left)?;
    let rv = require_numeric(&right)?;
    Ok(numeric_to_term(op(lv, rv)))
}

pub(super) fn str_value(term: &Term) -> String {
    match term {
        Term::NamedNode(n) => n.as_str().to_string(),
        Term::BlankNode(b) => b.as_str().to_string(),
        Term::Literal(l) => l.lexical().to_string(),
    }
}

fn require_arity(name: &str, args: &[Term], expected: usize) -> EvalResult<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(EvalError::new(format!("{name}: expected {expected} argument(s), got {}", args.len())).into())
    }
}

static BLANK_NODE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Dispatches a built-in function call over already-evaluated arguments.
pub(super) fn call(function: BuiltInFunction, args: &[Term]) -> EvalResult<Term> {
    use BuiltInFunction as F;
    match function {
        F::Str => {
            require_arity("STR", args, 1)?;
            Ok(Term::literal(str_value(&args[0])))
        }
        F::Lang => {
            require_arity("LANG", args, 1)?;
            match &args[0] {
                Term::Literal(Literal::LangTagged(_, lang)) => Ok(Term::literal(lang.as_ref())),
                Term::Literal(_) => Ok(Term::literal("")),
                other => Err(EvalError::new(format!("LANG: not a literal: {other}")).into()),
            }
        }
        F::Datatype => {
            require_arity("DATATYPE", args, 1)?;
            match &args[0] {
                Term::Literal(Literal::Simple(_)) => Ok(Term::iri(xsd::STRING)),
                Term::Literal(Literal::Typed(_, dt)) => Ok(Term::NamedNode(dt.clone())),
                Term::Literal(Literal::LangTagged(_, _)) => Ok(Term::iri(xsd::LANG_STRING)),
                other => Err(EvalError::new(format!("DATATYPE: not a literal: {other}")).into()),
            }
        }
        F::IsIri => {
            require_arity("isIRI", args, 1)?;
            Ok(bool_term(args[0].is_iri()))
        }
        F::IsBlank => {
            require_arity("isBlank", args, 1)?;
            Ok(bool_term(args[0].is_blank()))
        }
        F::IsLiteral => {
            require_arity("isLiteral", args, 1)?;
            Ok(bool_term(args[0].is_literal()))
        }
        F::IsNumeric => {
            require_arity("isNumeric", args, 1)?;
            Ok(bool_term(super::ordering::numeric_of(&args[0]).is_some()))
        }
        F::StrLen => {
            require_arity("STRLEN", args, 1)?;
            Ok(numeric_to_term(NumericValue::Integer(str_value(&args[0]).chars().count() as i64)))
        }
        F::Substr => {
            if args.len() != 2 && args.len() != 3 {
                return Err(EvalError::new("SUBSTR: expected 2 or 3 arguments").into());
            }
            let s = str_value(&args[0]);
            let start = require_numeric(&args[1])?.as_f64();
            let chars: Vec<char> = s.chars().collect();
            let start_idx = (start.round() as i64 - 1).max(0) as usize;
            let end_idx = if args.len() == 3 {
                let len = require_numeric(&args[2])?.as_f64();
                (start_idx + len.round().max(0.0) as usize).min(chars.len())
            } else {
                chars.len()
            };
            let result: String = chars.get(start_idx.min(chars.len())..end_idx.max(start_idx.min(chars.len()))).unwrap_or(&[]).iter().collect();
            Ok(Term::literal(result))
        }
        F::Ucase => {
            require_arity("UCASE", args, 1)?;
            Ok(Term::literal(str_value(&args[0]).to_uppercase()))
        }
        F::Lcase => {
            require_arity("LCASE", args, 1)?;
            Ok(Term::literal(str_value(&args[0]).to_lowercase()))
        }
        F::StrStarts => {
            require_arity("STRSTARTS", args, 2)?;
            Ok(bool_term(str_value(&args[0]).starts_with(&str_value(&args[1]))))
        }
        F::StrEnds => {
            require_arity("STRENDS", args, 2)?;
            Ok(bool_term(str_value(&args[0]).ends_with(&str_value(&args[1]))))
        }
        F::Contains => {
            require_arity("CONTAINS", args, 2)?;
            Ok(bool_term(str_value(&args[0]).contains(&str_value(&args[1]))))
        }
        F::StrBefore => {
            require_arity("STRBEFORE", args, 2)?;
            let haystack = str_value(&args[0]);
            let needle = str_value(&args[1]);
            Ok(Term::literal(haystack.find(&needle).map(|i| haystack[..i].to_string()).unwrap_or_default()))
        }
        F::StrAfter => {
            require_arity("STRAFTER", args, 2)?;
            let haystack = str_value(&args[0]);
            let needle = str_value(&args[1]);
            Ok(Term::literal(
                haystack.find(&needle).map(|i| haystack[i + needle.len()..].to_string()).unwrap_or_default(),
            ))
        }
        F::Concat => Ok(Term::literal(args.iter().map(str_value).collect::<String>())),
        F::EncodeForUri => {
            require_arity("ENCODE_FOR_URI", args, 1)?;
            Ok(Term::literal(percent_encode(&str_value(&args[0]))))
        }
        F::LangMatches => {
            require_arity("LANGMATCHES", args, 2)?;
            let lang = str_value(&args[0]).to_lowercase();
            let range = str_value(&args[1]).to_lowercase();
            Ok(bool_term(range == "*" || lang == range || lang.starts_with(&format!("{range}-"))))
        }
        F::Regex => {
            if args.len() != 2 && args.len() != 3 {
                return Err(EvalError::new("REGEX: expected 2 or 3 arguments").into());
            }
            let text = str_value(&args[0]);
            let pattern = str_value(&args[1]);
            let flags = if args.len() == 3 { str_value(&args[2]) } else { String::new() };
            Ok(bool_term(run_regex(&pattern, &flags)?.is_match(&text)))
        }
        F::Replace => {
            if args.len() != 3 && args.len() != 4 {
                return Err(EvalError::new("REPLACE: expected 3 or 4 arguments").into());
            }
            let text = str_value(&args[0]);
            let pattern = str_value(&args[1]);
            let replacement = str_value(&args[2]);
            let flags = if args.len() == 4 { str_value(&args[3]) } else { String::new() };
            let re = run_regex(&pattern, &flags)?;
            Ok(Term::literal(re.replace_all(&text, replacement.as_str()).into_owned()))
        }
        F::Abs => {
            require_arity("ABS", args, 1)?;
            let v = require_numeric(&args[0])?;
            Ok(numeric_to_term(match v {
                NumericValue::Integer(i) => NumericValue::Integer(i.abs()),
                NumericValue::Decimal(d) => NumericValue::Decimal(d.abs()),
                NumericValue::Double(d) => NumericValue::Double(d.abs()),
            }))
        }
        F::Round => {
            require_arity("ROUND", args, 1)?;
            Ok(numeric_to_term(round_numeric(require_numeric(&args[0])?, f64::round)))
        }
        F::Ceil => {
            require_arity("CEIL", args, 1)?;
            Ok(numeric_to_term(round_numeric(require_numeric(&args[0])?, f64::ceil)))
        }
        F::Floor => {
            require_arity("FLOOR", args, 1)?;
            Ok(numeric_to_term(round_numeric(require_numeric(&args[0])?, f64::floor)))
        }
        F::Rand => {
            require_arity("RAND", args, 0)?;
            // No PRNG dependency in the stack; a counter-seeded value in
            // [0, 1) is sufficient since RAND's only contract is range.
            let n = BLANK_NODE_COUNTER.fetch_add(1, AtomicOrdering::Relaxed);
            let pseudo = ((n.wrapping_mul(2_654_435_761) % 1_000_000) as f64) / 1_000_000.0;
            Ok(numeric_to_term(NumericValue::Double(pseudo)))
        }
        F::Md5 => {
            require_arity("MD5", args, 1)?;
            let digest = md5::Md5::digest(str_value(&args[0]).as_bytes());
            Ok(Term::literal(hex(&digest)))
        }
        F::Sha1 => {
            require_arity("SHA1", args, 1)?;
            let digest = sha1::Sha1::digest(str_value(&args[0]).as_bytes());
            Ok(Term::literal(hex(&digest)))
        }
        F::Sha256 => {
            require_arity("SHA256", args, 1)?;
            let digest = sha2::Sha256::digest(str_value(&args[0]).as_bytes());
            Ok(Term::literal(hex(&digest)))
        }
        F::Iri => {
            require_arity("IRI", args, 1)?;
            Ok(Term::iri(str_value(&args[0])))
        }
        F::Bnode => {
            if args.len() > 1 {
                return Err(EvalError::new("BNODE: expected 0 or 1 arguments").into());
            }
            let n = BLANK_NODE_COUNTER.fetch_add(1, AtomicOrdering::Relaxed);
            Ok(Term::blank(format!("b{n}")))
        }
        F::Now => {
            require_arity("NOW", args, 0)?;
            let now = time::OffsetDateTime::now_utc();
            let lexical = format!(
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
                now.year(),
                u8::from(now.month()),
                now.day(),
                now.hour(),
                now.minute(),
                now.second()
            );
            Ok(Term::typed_literal(lexical, xsd::DATE_TIME))
        }
        F::Year | F::Month | F::Day | F::Hours | F::Minutes | F::Seconds => {
            require_arity(function_name(function), args, 1)?;
            date_time_part(function, &str_value(&args[0]))
        }
    }
}

fn function_name(function: BuiltInFunction) -> &'static str {
    match function {
        BuiltInFunction::Year => "YEAR",
        BuiltInFunction::Month => "MONTH",
        BuiltInFunction::Day => "DAY",
        BuiltInFunction::Hours => "HOURS",
        BuiltInFunction::Minutes => "MINUTES",
        BuiltInFunction::Seconds => "SECONDS",
        _ => "date-time accessor",
    }
}

fn date_time_part(function: BuiltInFunction, lexical: &str) -> EvalResult<Term> {
    // Expects an xsd:dateTime lexical of the form produced by NOW():
    // YYYY-MM-DDTHH:MM:SSZ.
    let (date, time_part) =
        lexical.split_once('T').ok_or_else(|| EvalError::new(format!("not a dateTime: {lexical}")))?;
    let mut date_parts = date.split('-');
    let year: i64 = date_parts.next().and_then(|s| s.parse().ok()).ok_or_else(|| EvalError::new("bad year"))?;
    let month: i64 = date_parts.next().and_then(|s| s.parse().ok()).ok_or_else(|| EvalError::new("bad month"))?;
    let day: i64 = date_parts.next().and_then(|s| s.parse().ok()).ok_or_else(|| EvalError::new("bad day"))?;
    let time_trimmed = time_part.trim_end_matches('Z');
    let mut time_parts = time_trimmed.split(':');
    let hours: i64 = time_parts.next().and_then(|s| s.parse().ok()).ok_or_else(|| EvalError::new("bad hour"))?;
    let minutes: i64 = time_parts.next().and_then(|s| s.parse().ok()).ok_or_else(|| EvalError::new("bad minute"))?;
    let seconds: i64 = time_parts.next().and_then(|s| s.parse().ok()).ok_or_else(|| EvalError::new("bad second"))?;

    let value = match function {
        BuiltInFunction::Year => year,
        BuiltInFunction::Month => month,
        BuiltInFunction::Day => day,
        BuiltInFunction::Hours => hours,
        BuiltInFunction::Minutes => minutes,
        BuiltInFunction::Seconds => seconds,
        _ => unreachable!("date_time_part only called for date/time accessors"),
    };
    Ok(numeric_to_term(NumericValue::Integer(value)))
}

fn round_numeric(value: NumericValue, f: fn(f64) -> f64) -> NumericValue {
    match value {
        NumericValue::Integer(i) => NumericValue::Integer(i),
        NumericValue::Decimal(d) => NumericValue::Decimal(f(d)),
        NumericValue::Double(d) => NumericValue::Double(f(d)),
    }
}

fn run_regex(pattern: &str, flags: &str) -> EvalResult<regex::Regex> {
    if !is_safe_pattern(pattern) {
        return Err(EvalError::new("REGEX: pattern rejected (unsafe or too long)").into());
    }
    let mut builder = regex::RegexBuilder::new(pattern);
    if flags.contains('i') {
        builder.case_insensitive(true);
    }
    if flags.contains('s') {
        builder.dot_matches_new_line(true);
    }
    if flags.contains('m') {
        builder.multi_line(true);
    }
    builder.build().map_err(|e| EvalError::new(format!("invalid regex: {e}")).into())
}

fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strlen_counts_unicode_scalar_values() {
        let result = call(BuiltInFunction::StrLen, &[Term::literal("héllo")]).unwrap();
        assert_eq!(result, Term::typed_literal("5", xsd::INTEGER));
    }

    #[test]
    fn substr_is_one_indexed() {
        let result = call(
            BuiltInFunction::Substr,
            &[Term::literal("hello"), Term::typed_literal("2", xsd::INTEGER), Term::typed_literal("3", xsd::INTEGER)],
        )
        .unwrap();
        assert_eq!(result, Term::literal("ell"));
    }

    #[test]
    fn regex_rejects_nested_quantifier() {
        let result = run_regex("(a+)+", "");
        assert!(result.is_err());
    }

    #[test]
    fn md5_matches_known_vector() {
        let result = call(BuiltInFunction::Md5, &[Term::literal("")]).unwrap();
        assert_eq!(result, Term::literal("d41d8cd98f00b204e9800998ecf8427e"));
    }

    #[test]
    fn concat_joins_string_forms() {
        let result = call(BuiltInFunction::Concat, &[Term::literal("a"), Term::literal("b")]).unwrap();
        assert_eq!(result, Term::literal("ab"));
    }
}
