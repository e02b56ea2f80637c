//! Reduce free-form model output to the single value that gets submitted.

const COMMAND_HEADERS: &[&str] = &["version:", "os version:"];
const ANSWER_MARKERS: &[&str] = &["answer:", "the answer is:", "result:"];
const PREFIXES: &[&str] = &[
    "the answer is ",
    "answer: ",
    "result: ",
    "value: ",
    "the value is ",
    "output: ",
    "the output is ",
];
const QUOTES: &[char] = &['"', '\''];

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn is_command_header(line: &str) -> bool {
    COMMAND_HEADERS
        .iter()
        .any(|h| starts_with_ignore_case(line, h))
}

/// The text after the first colon of an `Answer:`-style line.
fn marked_answer(line: &str) -> Option<&str> {
    if !ANSWER_MARKERS
        .iter()
        .any(|m| starts_with_ignore_case(line, m))
    {
        return None;
    }
    line.split_once(':').map(|(_, rest)| rest.trim())
}

/// Strip wrapping quotes and boilerplate prefixes until nothing changes.
fn strip_value(value: &str) -> String {
    let mut current = value.trim();
    loop {
        let mut next = current.trim_matches(QUOTES).trim();
        if let Some(prefix) = PREFIXES
            .iter()
            .find(|p| starts_with_ignore_case(next, p))
        {
            next = next[prefix.len()..].trim();
        }
        if next == current {
            return current.to_owned();
        }
        current = next;
    }
}

/// Clean `raw` model output for `question`.
///
/// Multi-line command output is kept whole. Otherwise an explicit
/// `Answer:` line wins, then the shortest line. The shortest-line rule is a
/// weak heuristic and can pick a fragment of an explanation.
#[must_use]
pub fn clean(raw: &str, question: &str) -> String {
    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let Some(&first) = lines.first() else {
        return String::new();
    };
    let question = question.to_lowercase();

    if question.contains("code -s")
        && question.contains("output")
        && lines.iter().any(|l| is_command_header(l))
    {
        return lines.join("\n");
    }

    let value = if lines.len() > 1 {
        if let Some(answer) = lines.iter().find_map(|l| marked_answer(l)) {
            answer
        } else if lines.iter().any(|l| is_command_header(l))
            || question.contains("command")
            || question.contains("output")
        {
            return lines.join("\n");
        } else {
            lines
                .iter()
                .copied()
                .reduce(|best, l| {
                    if l.chars().count() < best.chars().count() { l } else { best }
                })
                .unwrap_or(first)
        }
    } else {
        first
    };

    strip_value(value)
}
