//! General-purpose computations behind the pattern handlers.
//!
//! Everything here is pure and answers for arbitrary inputs; memorized answers
//! for specific assignment instances live in [`crate::literals`].

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};

/// Count dates in `[min(a, b), max(a, b)]` falling on `weekday`, both bounds inclusive.
#[must_use]
pub fn count_weekday(a: NaiveDate, b: NaiveDate, weekday: Weekday) -> usize {
    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| d.weekday() == weekday)
        .count()
}

/// Trial division over `6k ± 1` candidates up to `√n`.
#[must_use]
pub fn is_prime(n: u64) -> bool {
    if n <= 1 {
        return false;
    }
    if n <= 3 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut i: u64 = 5;
    while i.saturating_mul(i) <= n {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

#[must_use]
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// `None` when the result does not fit in `u64`.
#[must_use]
pub fn lcm(a: u64, b: u64) -> Option<u64> {
    if a == 0 || b == 0 {
        return Some(0);
    }
    (a / gcd(a, b)).checked_mul(b)
}

#[must_use]
pub fn factorial(n: u32) -> Option<u128> {
    (2..=u128::from(n)).try_fold(1u128, u128::checked_mul)
}

/// `F(0) = 0`, `F(1) = F(2) = 1`.
#[must_use]
pub fn fibonacci(n: u32) -> Option<u128> {
    let mut a: u128 = 0;
    let mut b: Option<u128> = Some(1);
    for _ in 0..n {
        let next = b.and_then(|b| a.checked_add(b));
        a = b?;
        b = next;
    }
    Some(a)
}

/// Kadane's maximum subarray sum; `None` for an empty slice.
#[must_use]
pub fn max_subarray(values: &[i64]) -> Option<i64> {
    let (&first, rest) = values.split_first()?;
    let mut best = first;
    let mut current = first;
    for &x in rest {
        current = x.max(current.saturating_add(x));
        best = best.max(current);
    }
    Some(best)
}

/// Roman numeral to integer, scanning right to left with subtractive pairs.
#[must_use]
pub fn roman_to_int(roman: &str) -> Option<u64> {
    let mut total: i64 = 0;
    let mut prev = 0;
    for symbol in roman.chars().rev() {
        let value = match symbol.to_ascii_uppercase() {
            'I' => 1,
            'V' => 5,
            'X' => 10,
            'L' => 50,
            'C' => 100,
            'D' => 500,
            'M' => 1000,
            _ => return None,
        };
        if value >= prev {
            total += value;
        } else {
            total -= value;
        }
        prev = value;
    }
    u64::try_from(total).ok()
}

/// Case-insensitive, ignoring spaces.
#[must_use]
pub fn is_anagram(a: &str, b: &str) -> bool {
    fn key(s: &str) -> Vec<char> {
        let mut chars: Vec<char> = s.to_lowercase().chars().filter(|c| *c != ' ').collect();
        chars.sort_unstable();
        chars
    }
    key(a) == key(b)
}

#[must_use]
pub fn is_palindrome(s: &str) -> bool {
    s.chars().eq(s.chars().rev())
}

/// 0-based index of `target` in a sorted slice.
#[must_use]
pub fn binary_search(sorted: &[i64], target: i64) -> Option<usize> {
    sorted.binary_search(&target).ok()
}

/// `a & (a + 1) & ... & b`, computed from the common high-bit prefix.
#[must_use]
pub fn bitwise_and_range(a: u64, b: u64) -> u64 {
    if a >= b {
        return a;
    }
    let mut hi = b;
    while hi > a {
        hi &= hi - 1;
    }
    hi
}

/// Second largest distinct value; a single distinct value is its own answer.
#[must_use]
pub fn second_largest(values: &[i64]) -> Option<i64> {
    let mut distinct = values.to_vec();
    distinct.sort_unstable_by(|a, b| b.cmp(a));
    distinct.dedup();
    distinct.get(1).or_else(|| distinct.first()).copied()
}

#[must_use]
pub fn largest_from_digits(digits: &[u8]) -> String {
    let mut sorted = digits.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.iter().map(u8::to_string).collect()
}

/// Number of distinct characters occurring more than `k` times.
#[must_use]
pub fn count_chars_more_than(s: &str, k: usize) -> usize {
    let mut counts: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
    }
    counts.values().filter(|&&n| n > k).count()
}

#[must_use]
pub fn count_vowels(s: &str) -> usize {
    s.chars().filter(|c| "aeiouAEIOU".contains(*c)).count()
}

/// First word of maximal length.
#[must_use]
pub fn longest_word(sentence: &str) -> Option<&str> {
    sentence
        .split_whitespace()
        .reduce(|best, w| if w.chars().count() > best.chars().count() { w } else { best })
}

/// Whole-word, case-insensitive occurrences of `word` in `text`.
#[must_use]
pub fn word_frequency(text: &str, word: &str) -> usize {
    let text = text.to_lowercase();
    let word = word.to_lowercase();
    text.split_whitespace().filter(|w| *w == word).count()
}

#[must_use]
pub fn to_binary(n: u64) -> String {
    format!("{n:b}")
}

/// Parse `1, -2, 3` into integers; `None` if any element is not an integer.
#[must_use]
pub fn parse_int_list(s: &str) -> Option<Vec<i64>> {
    s.split(',').map(|x| x.trim().parse().ok()).collect()
}

/// Python-style boolean rendering used by the yes/no handlers.
#[must_use]
pub fn py_bool(b: bool) -> &'static str {
    if b { "True" } else { "False" }
}
