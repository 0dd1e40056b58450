//! Prompt assembly: fixed-order concatenation of labeled sections.
//!
//! No normalization, truncation or token budgeting happens here; an oversized
//! prompt is for the inference endpoint to reject.

use crate::models::record::RecordRow;

const TEMPLATE_LABEL: &str = "プロンプト:";
const CANDIDATE_LABEL: &str = "候補者情報:";
const SKILL_SHEET_LABEL: &str = "候補者のスキルシート:";
const JOBS_LABEL: &str = "案件情報:";

/// Candidate → job: template, candidate text, skill sheet text, job records.
/// An empty record list still yields the (empty) records section.
pub fn candidate_to_job_prompt(
    template: &str,
    candidate_text: &str,
    skill_sheet_text: &str,
    records: &[RecordRow],
) -> String {
    format!(
        "{TEMPLATE_LABEL}\n{template}\n\n\
         {CANDIDATE_LABEL}\n{}\n\n\
         {SKILL_SHEET_LABEL}\n{skill_sheet_text}\n\n\
         {JOBS_LABEL}\n{}",
        candidate_text.trim(),
        format_records(records)
    )
}

/// Job → candidate: template followed by the job description only.
pub fn job_to_candidate_prompt(template: &str, job_text: &str) -> String {
    format!(
        "{TEMPLATE_LABEL}\n{template}\n\n{JOBS_LABEL}\n{}",
        job_text.trim()
    )
}

/// One block per record, numbered from 1, blocks separated by a line break.
pub fn format_records(records: &[RecordRow]) -> String {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            format!(
                "案件 {}:\n日時: {}\n件名: {}\n本文: {}",
                i + 1,
                record.date(),
                record.subject(),
                record.body()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, subject: &str, body: &str) -> RecordRow {
        RecordRow::new(
            [date, "from", "to", subject, body, "FALSE"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        )
    }

    #[test]
    fn test_candidate_prompt_with_no_records_exact_text() {
        let prompt = candidate_to_job_prompt("T", "C", "S", &[]);
        assert_eq!(
            prompt,
            "プロンプト:\nT\n\n候補者情報:\nC\n\n候補者のスキルシート:\nS\n\n案件情報:\n"
        );
    }

    #[test]
    fn test_candidate_text_is_trimmed_but_skill_sheet_is_not() {
        let prompt = candidate_to_job_prompt("T", "  C \n", " S\n", &[]);
        assert!(prompt.contains("候補者情報:\nC\n\n"));
        assert!(prompt.contains("候補者のスキルシート:\n S\n\n\n案件情報:"));
    }

    #[test]
    fn test_records_are_numbered_from_one() {
        let records = vec![
            record("2024/10/01", "Java案件", "本文1"),
            record("2024/10/02", "Rust案件", "本文2\n詳細"),
        ];
        assert_eq!(
            format_records(&records),
            "案件 1:\n日時: 2024/10/01\n件名: Java案件\n本文: 本文1\n\
             案件 2:\n日時: 2024/10/02\n件名: Rust案件\n本文: 本文2\n詳細"
        );
    }

    #[test]
    fn test_candidate_prompt_section_order() {
        let records = vec![record("d", "s", "b")];
        let prompt = candidate_to_job_prompt("TEMPLATE", "CANDIDATE", "SHEET", &records);
        let positions: Vec<usize> = ["TEMPLATE", "CANDIDATE", "SHEET", "案件 1:"]
            .iter()
            .map(|needle| prompt.find(needle).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(prompt.ends_with("本文: b"));
    }

    #[test]
    fn test_empty_template_keeps_section_labels() {
        let prompt = candidate_to_job_prompt("", "C", "S", &[]);
        assert!(prompt.starts_with("プロンプト:\n\n\n候補者情報:\nC"));
    }

    #[test]
    fn test_job_prompt_exact_text() {
        assert_eq!(
            job_to_candidate_prompt("T", "\nJ  "),
            "プロンプト:\nT\n\n案件情報:\nJ"
        );
    }
}
