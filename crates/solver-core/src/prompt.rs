use std::fmt::Write as _;

use crate::ingest::FileContentMap;

pub const GENERAL_SYSTEM_PROMPT: &str = "\
You are an expert in Tools in Data Science from IIT Madras' Online Degree program. \
The user has provided a question from one of the 5 graded assignments. \
Follow these strict rules when providing your answer:
1. Analyze the question and any provided file contents carefully.
2. Provide ONLY the exact answer value that should be submitted - nothing else.
3. Do not include explanations or any additional text.
4. If the question requires extracting a value from a CSV file's 'answer' column, return only that value.
5. If the question asks for a code output or terminal command output, provide only that exact output text.
6. For questions about command outputs like 'code -s', be very specific and factual.
7. Provide the complete output when requested for command results.
8. Make sure your answer can be directly entered in the assignment submission field.
9. If the answer is a number, provide just the number without units unless explicitly requested.
10. Your response must directly answer the assignment question.";

pub const CODING_SYSTEM_PROMPT: &str = "\
You are an expert programming instructor specializing in data science tools and languages. \
The user has provided a coding question from a data science assignment. \
Follow these strict rules when providing your answer:
1. For coding questions, focus on producing the exact output that the code would generate.
2. If you need to write code to solve a problem, ensure it is correct and efficient.
3. When asked for the output of code, execute the code mentally and provide ONLY the exact output.
4. For complex calculations, work through them step by step to ensure accuracy.
5. If asked for specific command outputs, provide the exact expected format.
6. For algorithmic problems, ensure your solution has the correct time and space complexity.
7. Provide ONLY the final answer with no explanations or additional text.
8. If extracting from provided files, ensure you use the correct data parsing techniques.
9. Make sure numeric answers have the correct precision and format.
10. Your response must be the exact answer that would be submitted for the assignment.";

/// Phrases asking for code to be run rather than explained.
const EXECUTION_CUES: &[&str] = &[
    "what is the output of",
    "run this code",
    "execute this code",
    "what will be the result",
    "what does this code print",
    "compute the result",
    "calculate",
    "the output is",
    "run the following",
    "execute the following",
];

#[must_use]
pub fn system_prompt(coding: bool) -> &'static str {
    if coding {
        CODING_SYSTEM_PROMPT
    } else {
        GENERAL_SYSTEM_PROMPT
    }
}

/// The user message: the question, then each file's extracted text in upload order.
#[must_use]
pub fn build_prompt(question: &str, files: &FileContentMap) -> String {
    let mut prompt = format!("Question: {question}\n\n");
    if !files.is_empty() {
        prompt.push_str("File contents:\n");
        for (name, content) in files.iter() {
            let _ = write!(prompt, "File: {name}\n{content}\n\n");
        }
    }
    prompt
}

#[must_use]
pub fn asks_for_execution(question: &str) -> bool {
    let lower = question.to_lowercase();
    EXECUTION_CUES.iter().any(|cue| lower.contains(cue))
}
