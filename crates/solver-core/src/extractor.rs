//! Render uploaded files into prompt text.
//!
//! Extraction never fails: read and parse errors become an inline
//! `Error processing ...` string so the rest of the request can proceed.

use std::fmt::Write as _;
use std::path::Path;

use csv::ReaderBuilder;

use crate::config::ExtractConfig;

const CODE_EXTENSIONS: &[(&str, &str)] = &[
    ("py", "Python"),
    ("js", "JavaScript"),
    ("java", "Java"),
    ("cpp", "C++"),
    ("c", "C"),
    ("html", "HTML"),
    ("css", "CSS"),
    ("r", "R"),
    ("sql", "SQL"),
    ("sh", "Shell"),
];

const TEXT_EXTENSIONS: &[&str] = &["txt", "log", "md", "xml"];

const SUMMARY_ROWS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv { separator: char },
    Json,
    Code,
    Text,
    Other,
}

impl FileKind {
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let ext = extension(path);
        match ext.as_str() {
            "csv" => Self::Csv { separator: ',' },
            "tsv" => Self::Csv { separator: '\t' },
            "json" => Self::Json,
            e if CODE_EXTENSIONS.iter().any(|(x, _)| *x == e) => Self::Code,
            e if TEXT_EXTENSIONS.contains(&e) => Self::Text,
            _ => Self::Other,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Csv { .. } => "CSV ",
            Self::Json => "JSON ",
            Self::Code | Self::Text => "text ",
            Self::Other => "",
        }
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// Turns one file into the text placed in the prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct Extractor {
    limits: ExtractConfig,
}

impl Extractor {
    #[must_use]
    pub fn new(limits: ExtractConfig) -> Self {
        Self { limits }
    }

    /// Extract `path` according to its extension.
    #[must_use]
    pub fn extract_path(&self, path: &Path) -> String {
        self.extract(path, FileKind::from_path(path))
    }

    #[must_use]
    pub fn extract(&self, path: &Path, kind: FileKind) -> String {
        let result = match kind {
            FileKind::Csv { separator } => std::fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|content| self.render_csv(&content, separator)),
            FileKind::Json => render_json(path),
            FileKind::Code => std::fs::read_to_string(path)
                .map(|content| self.render_code(&content, &extension(path)))
                .map_err(|e| e.to_string()),
            FileKind::Text => std::fs::read_to_string(path)
                .map(|content| self.render_text(&content))
                .map_err(|e| e.to_string()),
            FileKind::Other => std::fs::metadata(path)
                .map(|meta| {
                    tracing::warn!(path = %path.display(), "limited support for file type");
                    format!(
                        "File type .{} not directly processable. Size: {} bytes.",
                        extension(path),
                        meta.len()
                    )
                })
                .map_err(|e| e.to_string()),
        };

        result.unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), "failed to extract file: {e}");
            format!("Error processing {}file: {e}", kind.label())
        })
    }

    fn render_csv(&self, content: &str, separator: char) -> Result<String, String> {
        let mut records = parse_delimited(content, separator)?.into_iter();
        let header = records
            .next()
            .ok_or_else(|| "No columns to parse from file".to_owned())?;
        let rows: Vec<Vec<String>> = records
            .enumerate()
            .map(|(i, mut row)| {
                if row.len() > header.len() {
                    return Err(format!(
                        "Error tokenizing data. Expected {} fields in line {}, saw {}",
                        header.len(),
                        i + 2,
                        row.len()
                    ));
                }
                row.resize(header.len(), String::new());
                Ok(row)
            })
            .collect::<Result<_, _>>()?;

        if let Some(col) = header
            .iter()
            .position(|h| h.to_lowercase().contains("answer"))
        {
            let name = &header[col];
            tracing::debug!(column = %name, "found answer column");
            return Ok(match rows.as_slice() {
                [only] => format!("The value in the '{name}' column is: {}", only[col]),
                _ => {
                    let values: Vec<&str> = rows.iter().map(|r| r[col].as_str()).collect();
                    format!("Values in the '{name}' column: [{}]", values.join(", "))
                }
            });
        }

        if rows.len() <= self.limits.csv_max_rows && header.len() <= self.limits.csv_max_cols {
            return Ok(format!(
                "CSV File Contents:\n{}",
                render_table(&header, &rows, 0)
            ));
        }

        let head = &rows[..SUMMARY_ROWS.min(rows.len())];
        let tail_start = rows.len().saturating_sub(SUMMARY_ROWS);
        let mut out = String::from("CSV File Summary:\n");
        let _ = writeln!(out, "Rows: {}", rows.len());
        let _ = writeln!(out, "Columns: {}", header.join(", "));
        let _ = writeln!(out, "First 5 rows:\n{}", render_table(&header, head, 0));
        let _ = writeln!(
            out,
            "Last 5 rows:\n{}",
            render_table(&header, &rows[tail_start..], tail_start)
        );
        let _ = write!(out, "Data types:\n{}", render_dtypes(&header, &rows));
        Ok(out)
    }

    fn render_code(&self, content: &str, ext: &str) -> String {
        let name = CODE_EXTENSIONS
            .iter()
            .find(|(x, _)| *x == ext)
            .map_or("Code", |(_, n)| *n);
        match truncate(content, self.limits.max_chars) {
            Some(head) => format!(
                "{name} code file (first {} chars):\n```{ext}\n{head}\n```...",
                self.limits.max_chars
            ),
            None => format!("{name} code file:\n```{ext}\n{content}\n```"),
        }
    }

    fn render_text(&self, content: &str) -> String {
        match truncate(content, self.limits.max_chars) {
            Some(head) => format!(
                "Text file (first {} chars):\n{head}...",
                self.limits.max_chars
            ),
            None => format!("Text file contents:\n{content}"),
        }
    }
}

fn render_json(path: &Path) -> Result<String, String> {
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let value: serde_json::Value = serde_json::from_str(&content).map_err(|e| e.to_string())?;
    let pretty = serde_json::to_string_pretty(&value).map_err(|e| e.to_string())?;
    Ok(format!("JSON file contents:\n{pretty}"))
}

/// The first `max_chars` chars of `s`, or `None` when `s` already fits.
fn truncate(s: &str, max_chars: usize) -> Option<&str> {
    s.char_indices().nth(max_chars).map(|(idx, _)| &s[..idx])
}

/// Split delimited text into records. Quoted fields may contain the
/// separator, newlines and doubled quotes. Blank lines are skipped and rows
/// may differ in length; the caller decides what a ragged row means.
fn parse_delimited(content: &str, separator: char) -> Result<Vec<Vec<String>>, String> {
    let delimiter =
        u8::try_from(separator).map_err(|_| format!("unsupported separator {separator:?}"))?;
    ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes())
        .into_records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_owned).collect())
                .map_err(|e| e.to_string())
        })
        .collect()
}

/// Right-aligned columns with a leading row index, two spaces apart.
fn render_table(header: &[String], rows: &[Vec<String>], first_index: usize) -> String {
    let index_width = rows
        .len()
        .checked_sub(1)
        .map_or(1, |last| (first_index + last).to_string().len());
    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(col, h)| {
            rows.iter()
                .map(|r| r[col].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = " ".repeat(index_width);
    for (h, w) in header.iter().zip(widths.iter().copied()) {
        let _ = write!(out, "  {h:>w$}");
    }
    for (i, row) in rows.iter().enumerate() {
        let _ = write!(out, "\n{:<index_width$}", first_index + i);
        for (v, w) in row.iter().zip(widths.iter().copied()) {
            let _ = write!(out, "  {v:>w$}");
        }
    }
    out
}

fn render_dtypes(header: &[String], rows: &[Vec<String>]) -> String {
    let width = header.iter().map(|h| h.chars().count()).max().unwrap_or(0);
    header
        .iter()
        .enumerate()
        .map(|(col, h)| {
            let values = rows.iter().map(|r| r[col].trim()).filter(|v| !v.is_empty());
            let dtype = if values.clone().all(|v| v.parse::<i64>().is_ok()) {
                "int64"
            } else if values.clone().all(|v| v.parse::<f64>().is_ok()) {
                "float64"
            } else {
                "object"
            };
            format!("{h:<width$}    {dtype}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn extractor() -> Extractor {
        Extractor::default()
    }

    #[test]
    fn kinds_from_extension() {
        let kind = |p: &str| FileKind::from_path(Path::new(p));
        assert_eq!(kind("a.csv"), FileKind::Csv { separator: ',' });
        assert_eq!(kind("a.TSV"), FileKind::Csv { separator: '\t' });
        assert_eq!(kind("a.json"), FileKind::Json);
        assert_eq!(kind("a.py"), FileKind::Code);
        assert_eq!(kind("a.sh"), FileKind::Code);
        assert_eq!(kind("notes.md"), FileKind::Text);
        assert_eq!(kind("a.log"), FileKind::Text);
        assert_eq!(kind("a.xlsx"), FileKind::Other);
        assert_eq!(kind("Makefile"), FileKind::Other);
    }

    #[test]
    fn csv_single_answer_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "q.csv", "id,Answer\n1,42\n");
        assert_eq!(
            extractor().extract_path(&path),
            "The value in the 'Answer' column is: 42"
        );
    }

    #[test]
    fn csv_multiple_answer_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "q.csv", "final_answer,x\na,1\nb,2\n\"c, d\",3\n");
        assert_eq!(
            extractor().extract_path(&path),
            "Values in the 'final_answer' column: [a, b, c, d]"
        );
    }

    #[test]
    fn small_csv_rendered_as_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "t.csv", "name,score\nann,9\nbob,10\n");
        assert_eq!(
            extractor().extract_path(&path),
            "CSV File Contents:\n   name  score\n0   ann      9\n1   bob     10"
        );
    }

    #[test]
    fn tsv_uses_tabs() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "t.tsv", "a\tb\n1\t2\n");
        assert_eq!(
            extractor().extract_path(&path),
            "CSV File Contents:\n   a  b\n0  1  2"
        );
    }

    #[test]
    fn large_csv_is_summarized() {
        let dir = tempfile::tempdir().unwrap();
        let mut content = String::from("n,label\n");
        for i in 0..150 {
            let _ = writeln!(content, "{i},row{i}");
        }
        let path = write(&dir, "big.csv", &content);
        let out = extractor().extract_path(&path);
        assert!(out.starts_with("CSV File Summary:\nRows: 150\nColumns: n, label\n"));
        assert!(out.contains("First 5 rows:"));
        assert!(out.contains("145  145  row145"));
        assert!(out.contains("149  149  row149"));
        assert!(!out.contains("row100"));
        assert!(out.contains("n        int64"));
        assert!(out.contains("label    object"));
    }

    #[test]
    fn csv_errors_are_inline() {
        let dir = tempfile::tempdir().unwrap();
        let empty = write(&dir, "empty.csv", "");
        assert_eq!(
            extractor().extract_path(&empty),
            "Error processing CSV file: No columns to parse from file"
        );
        let ragged = write(&dir, "ragged.csv", "a,b\n1,2,3\n");
        assert!(extractor()
            .extract_path(&ragged)
            .starts_with("Error processing CSV file: Error tokenizing data"));
    }

    #[test]
    fn json_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "d.json", r#"{"a":[1,2]}"#);
        assert_eq!(
            extractor().extract_path(&path),
            "JSON file contents:\n{\n  \"a\": [\n    1,\n    2\n  ]\n}"
        );
        let bad = write(&dir, "bad.json", "{");
        assert!(extractor()
            .extract_path(&bad)
            .starts_with("Error processing JSON file: "));
    }

    #[test]
    fn code_is_fenced_and_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "s.py", "print(1)");
        assert_eq!(
            extractor().extract_path(&path),
            "Python code file:\n```py\nprint(1)\n```"
        );

        let small = Extractor::new(ExtractConfig {
            max_chars: 5,
            ..ExtractConfig::default()
        });
        assert_eq!(
            small.extract_path(&path),
            "Python code file (first 5 chars):\n```py\nprint\n```..."
        );
    }

    #[test]
    fn text_truncates_on_char_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "n.txt", "héllo wörld");
        let small = Extractor::new(ExtractConfig {
            max_chars: 2,
            ..ExtractConfig::default()
        });
        assert_eq!(small.extract_path(&path), "Text file (first 2 chars):\nhé...");
        assert_eq!(
            extractor().extract_path(&path),
            "Text file contents:\nhéllo wörld"
        );
    }

    #[test]
    fn other_files_report_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.png");
        std::fs::write(&path, [0u8; 16]).unwrap();
        assert_eq!(
            extractor().extract_path(&path),
            "File type .png not directly processable. Size: 16 bytes."
        );
    }

    #[test]
    fn unreadable_text_is_an_inline_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin.txt");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert!(extractor()
            .extract_path(&path)
            .starts_with("Error processing text file: "));
    }

    #[test]
    fn quoted_fields() {
        let records = parse_delimited("a,b\n\"x, \"\"y\"\"\",\"multi\nline\"\n", ',').unwrap();
        assert_eq!(records[1], vec!["x, \"y\"".to_owned(), "multi\nline".to_owned()]);
    }

    #[test]
    fn delimited_rows_skip_blank_lines_and_keep_ragged_rows() {
        let records = parse_delimited("a\tb\n\n1\t2\t3\n4\n", '\t').unwrap();
        assert_eq!(
            records,
            vec![
                vec!["a".to_owned(), "b".to_owned()],
                vec!["1".to_owned(), "2".to_owned(), "3".to_owned()],
                vec!["4".to_owned()],
            ]
        );
        assert!(parse_delimited("a,b\n", '\u{e9}').is_err());
    }
}
