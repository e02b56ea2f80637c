//! Second tier: generic regex-shaped questions (dates, arithmetic, code output, spreadsheet formulas).

use std::sync::LazyLock;

use chrono::{NaiveDate, Weekday};
use regex::Regex;

use crate::algorithms;
use crate::error::MatchError;
use crate::expr;
use crate::extract::{capture, parse_num};
use crate::literals::{self, lookup};
use crate::matcher::{Matcher, Predicate, Question};

type Answer = Result<Option<String>, MatchError>;

static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap());
static EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:calculate|compute|evaluate|result of|find the \w+ of)\s+([^?\n]+)").unwrap()
});
static FORMULA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"=[\w()+\-*/,.:\s]+").unwrap());

const WEEKDAYS: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

pub(crate) fn matchers() -> Vec<Matcher> {
    vec![
        Matcher::new(
            "weekday_count",
            Predicate::Regex(
                Regex::new(
                    r"how many (mondays|tuesdays|wednesdays|thursdays|fridays|saturdays|sundays).*(\d{4}-\d{2}-\d{2}).*(\d{4}-\d{2}-\d{2})",
                )
                .unwrap(),
            ),
            weekday_count,
        ),
        Matcher::new(
            "calculation",
            Predicate::Regex(
                Regex::new(r"calculate|compute|find the (sum|product|average|mean|median|mode|result)")
                    .unwrap(),
            ),
            calculation,
        ),
        Matcher::new(
            "code_output",
            Predicate::Regex(
                Regex::new(r"what is the output of the (following|this) (python|javascript|js) code")
                    .unwrap(),
            ),
            memorized_code_output,
        ),
        Matcher::new(
            "spreadsheet_formula",
            Predicate::Regex(Regex::new(r"formula.*(excel|google sheets)").unwrap()),
            spreadsheet_formula,
        ),
    ]
}

#[allow(clippy::unnecessary_wraps)]
pub(crate) fn memorized_formula(q: &Question<'_>) -> Answer {
    Ok(lookup(literals::FORMULAS, q).map(str::to_owned))
}

#[allow(clippy::unnecessary_wraps)]
pub(crate) fn memorized_code_output(q: &Question<'_>) -> Answer {
    Ok(lookup(literals::CODE_OUTPUTS, q).map(str::to_owned))
}

fn parse_date(caps: &regex::Captures<'_>) -> Result<NaiveDate, MatchError> {
    let whole = caps.get(0).map_or("", |m| m.as_str());
    let field = |i: usize| caps.get(i).map_or("", |m| m.as_str());
    let year: i32 = parse_num(field(1), "year")?;
    let month: u32 = parse_num(field(2), "month")?;
    let day: u32 = parse_num(field(3), "day")?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| MatchError::Parse {
        what: "date",
        input: whole.to_owned(),
    })
}

fn weekday_count(q: &Question<'_>) -> Answer {
    let Some(weekday) = WEEKDAYS
        .iter()
        .find(|(name, _)| q.lower().contains(name))
        .map(|(_, w)| *w)
    else {
        return Ok(None);
    };

    let captures: Vec<regex::Captures<'_>> = DATE.captures_iter(q.text()).take(2).collect();
    let [first, second] = &captures[..] else {
        return Err(MatchError::Missing("two dates"));
    };
    let start = parse_date(first)?;
    let end = parse_date(second)?;

    if let Some(answer) = literals::weekday_count(weekday, &first[0], &second[0]) {
        return Ok(Some(answer.to_owned()));
    }
    Ok(Some(algorithms::count_weekday(start, end, weekday).to_string()))
}

fn calculation(q: &Question<'_>) -> Answer {
    if let Some(answer) = lookup(literals::FORMULAS, q) {
        return Ok(Some(answer.to_owned()));
    }
    let Some(raw) = capture(&EXPRESSION, q.lower()) else {
        return Ok(None);
    };

    let filtered: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || "+-*/().%^ ".contains(*c))
        .collect();
    let expression = filtered.trim().trim_end_matches('.').trim().replace('^', "**");

    if expression.len() < 3 || !expression.contains(['+', '-', '*', '/', '%']) {
        return Ok(None);
    }
    expr::evaluate(&expression).map(Some)
}

#[allow(clippy::unnecessary_wraps)]
fn spreadsheet_formula(q: &Question<'_>) -> Answer {
    if let Some(answer) = lookup(literals::FORMULAS, q) {
        return Ok(Some(answer.to_owned()));
    }
    let Some(m) = FORMULA.find(q.text()) else {
        return Ok(None);
    };
    let formula = m.as_str().trim();
    tracing::debug!(formula, "checking memorized formula prefixes");

    let answer = literals::FORMULA_PREFIXES.iter().find(|p| {
        formula.starts_with(p.prefix)
            && p.formula_contains.is_none_or(|s| formula.contains(s))
            && p.question_contains.is_none_or(|s| q.lower().contains(s))
    });
    if answer.is_none() {
        tracing::debug!(formula, "no memorized result for formula");
    }
    Ok(answer.map(|p| p.answer.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(f: fn(&Question<'_>) -> Answer, text: &str) -> Option<String> {
        f(&Question::new(text)).unwrap()
    }

    #[test]
    fn weekday_count_prefers_memorized_answers() {
        assert_eq!(
            ask(weekday_count, "How many Mondays are there between 1976-11-16 and 2007-07-23?")
                .as_deref(),
            Some("1598")
        );
    }

    #[test]
    fn weekday_count_memorized_answers_ignore_wording() {
        for text in [
            "How many Mondays between 1976-11-16 and 2007-07-23?",
            "Count the mondays from 1976-11-16 to 2007-07-23 inclusive",
        ] {
            assert_eq!(ask(weekday_count, text).as_deref(), Some("1598"), "{text}");
        }
        assert_eq!(
            ask(
                weekday_count,
                "How many Fridays are there in the date range 1954-09-27 to 2013-05-02?"
            )
            .as_deref(),
            Some("3046")
        );
    }

    #[test]
    fn weekday_count_computes_other_ranges() {
        assert_eq!(
            ask(weekday_count, "How many Sundays are there between 2024-01-31 and 2024-01-01?")
                .as_deref(),
            Some("4")
        );
    }

    #[test]
    fn weekday_count_rejects_invalid_dates() {
        assert!(matches!(
            weekday_count(&Question::new("How many Mondays between 2024-02-30 and 2024-03-10?")),
            Err(MatchError::Parse { what: "date", .. })
        ));
    }

    #[test]
    fn calculation_evaluates_expressions() {
        assert_eq!(
            ask(calculation, "Calculate 12 * (3 + 4)").as_deref(),
            Some("84")
        );
        assert_eq!(
            ask(calculation, "Compute 2^10.").as_deref(),
            Some("1024")
        );
        assert_eq!(
            ask(calculation, "What is the result of 7 / 2?").as_deref(),
            Some("3.5")
        );
    }

    #[test]
    fn calculation_ignores_prose() {
        assert_eq!(ask(calculation, "Calculate the mean of the csv column"), None);
        assert_eq!(ask(calculation, "compute 42"), None);
    }

    #[test]
    fn code_output_literals() {
        assert_eq!(
            ask(
                memorized_code_output,
                "What is the output of the following Python code?\n```python\nprint(format(14, 'b'))\n```"
            )
            .as_deref(),
            Some("1110")
        );
    }

    #[test]
    fn formula_prefixes() {
        assert_eq!(
            ask(
                spreadsheet_formula,
                "What does the formula =SUMPRODUCT(A1:A3,B1:B3) return in Excel?"
            )
            .as_deref(),
            Some("112")
        );
        assert_eq!(
            ask(
                spreadsheet_formula,
                "In Google Sheets, the formula =INDEX(B2:B5,MATCH(1,A2:A5,0)) returns what?"
            )
            .as_deref(),
            Some("London")
        );
        assert_eq!(
            ask(spreadsheet_formula, "Explain the formula =FOO(1) in Excel"),
            None
        );
    }
}
