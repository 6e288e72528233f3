//! Prescription drafting: prompt construction and structured-field recovery.
//!
//! The generative-text service is instructed to answer with six numbered,
//! colon-terminated section headers in a fixed order. Its reply is free text
//! with no guaranteed structure, so the extractor recovers the six fields by
//! literal line-prefix match: the first line starting with a header wins, and
//! a header the model dropped degrades to an empty field rather than an
//! error. The prefix-scan semantics (first match wins, same-line capture
//! only, exact case-sensitive headers) are the compatibility contract with
//! previously stored replies and must not be loosened.

use crate::text::NonEmptyText;

/// The six section headers, in the order the model is instructed to emit them.
const FIELD_PREFIXES: [&str; 6] = [
    "1. Diagnosis:",
    "2. Test/Surgery Suggested:",
    "3. Medications:",
    "4. Dosage and Instructions:",
    "5. Follow-up advice:",
    "6. Notes/Observations:",
];

/// Advisory line prepended to a reply formatted for display.
const DISPLAY_DISCLAIMER: &str = "Note: The following prescription is AI-generated and intended for informational purposes only. It must be reviewed and confirmed by a licensed medical professional before use.";

/// Builds the instruction string sent to the generative-text service.
///
/// Restates both inputs verbatim and asks the model to respond using exactly
/// the six fixed section headers and nothing else. Byte-identical output for
/// identical inputs; never fails.
pub fn prescription_prompt(symptoms: &NonEmptyText, history: &NonEmptyText) -> String {
    let mut prompt = String::new();
    prompt.push_str(&format!("Patient symptoms: {symptoms}\n"));
    prompt.push_str(&format!("Medical history: {history}\n"));
    prompt.push_str(
        "Based on the above, generate an AI prescription in the following format only \
         (do not add any other text, disclaimers, or asterisks):\n",
    );
    for prefix in FIELD_PREFIXES {
        prompt.push_str(prefix);
        prompt.push_str(" \n");
    }
    prompt.push_str("Fill in each point with the appropriate content. Do not add anything else.");
    prompt
}

/// Structured fields recovered from a generated prescription.
///
/// Each field is independently optional: an empty string means the model did
/// not produce a matching section. Derived on demand from the raw reply and
/// never persisted; the raw text is the value of record.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PrescriptionFields {
    pub diagnosis: String,
    pub test_or_surgery: String,
    pub medications: String,
    pub dosage_instructions: String,
    pub follow_up_advice: String,
    pub notes_observations: String,
}

/// Recovers the six structured fields from a generated reply.
///
/// Splits the reply on newlines and, per header, takes the first line that
/// starts with the exact literal prefix (case-sensitive, no leading
/// whitespace tolerance). The field value is the remainder of that line,
/// trimmed and stripped of any trailing run of periods, colons, and
/// whitespace. Later occurrences of a repeated header are ignored, and
/// content on lines below a header is not appended.
///
/// Pure and infallible: running it twice on the same input yields identical
/// output, and a reply with no matching headers yields six empty fields.
pub fn extract_fields(reply: &str) -> PrescriptionFields {
    let lines: Vec<&str> = reply.split('\n').collect();

    PrescriptionFields {
        diagnosis: extract_field(&lines, FIELD_PREFIXES[0]),
        test_or_surgery: extract_field(&lines, FIELD_PREFIXES[1]),
        medications: extract_field(&lines, FIELD_PREFIXES[2]),
        dosage_instructions: extract_field(&lines, FIELD_PREFIXES[3]),
        follow_up_advice: extract_field(&lines, FIELD_PREFIXES[4]),
        notes_observations: extract_field(&lines, FIELD_PREFIXES[5]),
    }
}

/// First line starting with `prefix`, with the prefix removed and trailing
/// punctuation stripped. Empty string when no line matches.
fn extract_field(lines: &[&str], prefix: &str) -> String {
    let Some(line) = lines.iter().find(|line| line.starts_with(prefix)) else {
        return String::new();
    };

    line[prefix.len()..]
        .trim()
        .trim_end_matches(|c: char| c == '.' || c == ':' || c.is_whitespace())
        .to_string()
}

/// Formats a raw generated reply for on-screen display.
///
/// Prepends the AI-review disclaimer and inserts a blank line after every
/// line shaped like a numbered section header, so the sections read as
/// separate paragraphs.
pub fn format_for_display(reply: &str) -> String {
    let spaced = reply
        .split('\n')
        .map(|line| {
            if is_section_header(line) {
                format!("{line}\n")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("\n{DISPLAY_DISCLAIMER}\n{spaced}\n")
        .trim()
        .to_string()
}

/// A line of the shape `<digits>. <text>:`, with at least one character
/// between the dot-space and the colon.
fn is_section_header(line: &str) -> bool {
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == line.len() {
        return false;
    }
    let Some(rest) = rest.strip_prefix(". ") else {
        return false;
    };
    matches!(rest.find(':'), Some(pos) if pos >= 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED_REPLY: &str = "1. Diagnosis: Type 2 Diabetes\n\
         2. Test/Surgery Suggested: HbA1c test\n\
         3. Medications: Metformin\n\
         4. Dosage and Instructions: 500mg twice daily\n\
         5. Follow-up advice: Review in 2 weeks\n\
         6. Notes/Observations: Monitor fasting sugar";

    #[test]
    fn test_prompt_restates_inputs_and_headers() {
        let symptoms = NonEmptyText::new("frequent urination, fatigue").unwrap();
        let history = NonEmptyText::new("obesity, family history of diabetes").unwrap();
        let prompt = prescription_prompt(&symptoms, &history);

        assert!(prompt.starts_with("Patient symptoms: frequent urination, fatigue\n"));
        assert!(prompt.contains("Medical history: obesity, family history of diabetes\n"));
        for prefix in FIELD_PREFIXES {
            assert!(prompt.contains(&format!("{prefix} \n")));
        }
        assert!(prompt.ends_with("Do not add anything else."));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let symptoms = NonEmptyText::new("cough").unwrap();
        let history = NonEmptyText::new("none").unwrap();
        assert_eq!(
            prescription_prompt(&symptoms, &history),
            prescription_prompt(&symptoms, &history)
        );
    }

    #[test]
    fn test_extract_well_formed_reply() {
        let fields = extract_fields(WELL_FORMED_REPLY);

        assert_eq!(fields.diagnosis, "Type 2 Diabetes");
        assert_eq!(fields.test_or_surgery, "HbA1c test");
        assert_eq!(fields.medications, "Metformin");
        assert_eq!(fields.dosage_instructions, "500mg twice daily");
        assert_eq!(fields.follow_up_advice, "Review in 2 weeks");
        assert_eq!(fields.notes_observations, "Monitor fasting sugar");
    }

    #[test]
    fn test_extract_is_idempotent() {
        assert_eq!(
            extract_fields(WELL_FORMED_REPLY),
            extract_fields(WELL_FORMED_REPLY)
        );
    }

    #[test]
    fn test_extract_missing_header_degrades_to_empty() {
        let reply = "1. Diagnosis: Migraine\n\
             3. Medications: Sumatriptan\n\
             4. Dosage and Instructions: 50mg as needed\n\
             5. Follow-up advice: Return if attacks increase\n\
             6. Notes/Observations: Keep a headache diary";
        let fields = extract_fields(reply);

        assert_eq!(fields.test_or_surgery, "");
        assert_eq!(fields.diagnosis, "Migraine");
        assert_eq!(fields.medications, "Sumatriptan");
        assert_eq!(fields.notes_observations, "Keep a headache diary");
    }

    #[test]
    fn test_extract_first_match_wins() {
        let reply = "1. Diagnosis: Asthma\n1. Diagnosis: Bronchitis";
        assert_eq!(extract_fields(reply).diagnosis, "Asthma");
    }

    #[test]
    fn test_extract_captures_same_line_only() {
        let reply = "3. Medications: Amoxicillin\n\
             Clavulanate potassium\n\
             4. Dosage and Instructions: 625mg three times daily";
        let fields = extract_fields(reply);

        assert_eq!(fields.medications, "Amoxicillin");
        assert_eq!(fields.dosage_instructions, "625mg three times daily");
    }

    #[test]
    fn test_extract_strips_trailing_punctuation() {
        let reply = "1. Diagnosis: Hypertension. : ";
        assert_eq!(extract_fields(reply).diagnosis, "Hypertension");
    }

    #[test]
    fn test_extract_requires_exact_prefix() {
        // Indented, renumbered, or repunctuated headers are not matched.
        let reply = "  1. Diagnosis: Flu\nDiagnosis: Flu\n1) Diagnosis: Flu";
        assert_eq!(extract_fields(reply).diagnosis, "");
    }

    #[test]
    fn test_extract_ignores_leading_disclaimer_text() {
        let reply = "I am not a doctor, but here is a draft:\n\
             1. Diagnosis: Tension headache";
        assert_eq!(extract_fields(reply).diagnosis, "Tension headache");
    }

    #[test]
    fn test_extract_empty_reply_yields_default() {
        assert_eq!(extract_fields(""), PrescriptionFields::default());
    }

    #[test]
    fn test_format_for_display_prepends_disclaimer() {
        let display = format_for_display(WELL_FORMED_REPLY);
        assert!(display.starts_with("Note: The following prescription is AI-generated"));
    }

    #[test]
    fn test_format_for_display_spaces_out_headers() {
        let display = format_for_display("1. Diagnosis: Flu\n2. Test/Surgery Suggested: None");
        assert!(display.contains("1. Diagnosis: Flu\n\n2. Test/Surgery Suggested: None"));
    }

    #[test]
    fn test_section_header_shape() {
        assert!(is_section_header("1. Diagnosis: Flu"));
        assert!(is_section_header("12. Anything else: x"));
        assert!(!is_section_header("Diagnosis: Flu"));
        assert!(!is_section_header("1. No colon here"));
        assert!(!is_section_header("1. : colon immediately"));
    }
}
