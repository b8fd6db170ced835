//! Interpreter Instructions
//!
//! Builds the system instructions sent to the realtime model. The model acts as
//! a two-party front-desk interpreter between a receptionist and a patient, and
//! must answer using a closed set of line tags that the browser client parses.

use crate::languages::Language;

/// Prefix for a translation addressed to the patient.
pub const TAG_TO_PATIENT: &str = "[[TO_PATIENT]]";
/// Prefix for a translation addressed to the receptionist.
pub const TAG_TO_RECEPTIONIST: &str = "[[TO_RECEPTIONIST]]";
/// Prefix for the optional structured intake summary.
pub const TAG_SUMMARY: &str = "[[SUMMARY]]";

/// The only tags the model is allowed to emit.
pub const ALLOWED_TAGS: [&str; 3] = [TAG_TO_PATIENT, TAG_TO_RECEPTIONIST, TAG_SUMMARY];

/// Fields the model may include in a summary line, when they were spoken.
pub const SUMMARY_FIELDS: [&str; 7] = [
    "reason_for_visit",
    "department",
    "urgency",
    "file_number",
    "name",
    "age",
    "notes",
];

/// Renders the interpreter instructions for one receptionist/patient pair.
///
/// Pure string templating: the same four inputs always produce the same text.
pub fn build_instructions(
    rec_lang_code: &str,
    pat_lang_code: &str,
    rec_label: &str,
    pat_label: &str,
) -> String {
    let receptionist = format!("{} ({})", rec_label, rec_lang_code);
    let patient = format!("{} ({})", pat_label, pat_lang_code);
    let summary_example = summary_example();

    format!(
        r#"ROLE: Real-time two-party hospital interpreter at the front desk.

PARTIES & LANGUAGES:
- Receptionist language: {receptionist}
- Patient language: {patient}

LANGUAGE DETECTION:
- For each human utterance, detect which of these two languages it is in (no others).
- Then translate ONLY into the OPPOSITE language.

TURN-TAKING & TIMING (VAD):
- Wait for a complete utterance (VAD end-of-speech) BEFORE replying.
- Never interrupt or talk over a speaker. Never greet or start on your own.
- Stay silent between turns.

STRICT TEXT OUTPUT (newline-delimited frames):
- If the utterance is in {patient}: {TAG_TO_RECEPTIONIST} <translation in {rec_label}>
- If the utterance is in {receptionist}: {TAG_TO_PATIENT} <translation in {pat_label}>
- Exactly ONE tagged translation per completed turn. No combined tags, no extra prose.
- Optionally, when explicitly stated by the speakers, add at most one structured line:
  {TAG_SUMMARY} {summary_example}
  (Include only fields that were explicitly mentioned; omit unknowns.)

ECHO-LOOP AVOIDANCE:
- Never re-translate your own previous output. If the input matches what you just said, ignore it.

NO HALLUCINATIONS:
- Translate ONLY what was spoken. Do NOT add meaning, advice, names, IDs, diagnoses, or content not spoken.
- If uncertain, say nothing and wait for the next turn.

REMINDERS:
- Allowed tags are exactly: {TAG_TO_PATIENT}, {TAG_TO_RECEPTIONIST}, {TAG_SUMMARY}
- Keep translations concise, polite, neutral, and faithful to meaning and tone."#
    )
}

/// Convenience wrapper deriving codes and labels from validated languages.
pub fn build_for(receptionist: Language, patient: Language) -> String {
    build_instructions(
        receptionist.code(),
        patient.code(),
        receptionist.label(),
        patient.label(),
    )
}

fn summary_example() -> String {
    let fields = SUMMARY_FIELDS
        .iter()
        .map(|field| match *field {
            "age" => format!("\"{}\":0", field),
            _ => format!("\"{}\":\"...\"", field),
        })
        .collect::<Vec<_>>()
        .join(",");
    format!("{{{}}}", fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Collects every `[[...]]` token in the text.
    fn tags_in(text: &str) -> Vec<&str> {
        let mut tags = Vec::new();
        let mut rest = text;
        while let Some(start) = rest.find("[[") {
            let after = &rest[start..];
            match after.find("]]") {
                Some(end) => {
                    tags.push(&after[..end + 2]);
                    rest = &after[end + 2..];
                }
                None => break,
            }
        }
        tags
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = build_instructions("en", "zh", "English", "Chinese (Mandarin)");
        let b = build_instructions("en", "zh", "English", "Chinese (Mandarin)");
        assert_eq!(a, b);
    }

    #[test]
    fn test_build_mentions_both_languages() {
        let text = build_instructions("ar", "ur", "Arabic", "Urdu");
        assert!(text.contains("Arabic (ar)"));
        assert!(text.contains("Urdu (ur)"));
        assert!(text.contains("[[TO_RECEPTIONIST]] <translation in Arabic>"));
        assert!(text.contains("[[TO_PATIENT]] <translation in Urdu>"));
        assert!(!text.contains("English"));
    }

    #[test]
    fn test_only_allowed_tags_appear() {
        let text = build_instructions("en", "es", "English", "Spanish");
        let tags = tags_in(&text);
        assert!(!tags.is_empty());
        for tag in &tags {
            assert!(ALLOWED_TAGS.contains(tag), "unexpected tag {}", tag);
        }
        for allowed in ALLOWED_TAGS {
            assert!(tags.contains(&allowed), "missing tag {}", allowed);
        }
    }

    #[test]
    fn test_summary_lists_every_field() {
        let text = build_instructions("en", "hi", "English", "Hindi");
        let summary_line = text
            .lines()
            .find(|line| line.trim_start().starts_with(TAG_SUMMARY))
            .expect("summary example line");
        let json = summary_line.trim_start().trim_start_matches(TAG_SUMMARY).trim();
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        for field in SUMMARY_FIELDS {
            assert!(value.get(field).is_some(), "missing field {}", field);
        }
        assert_eq!(value["age"], 0);
    }

    #[test]
    fn test_build_for_matches_build_instructions() {
        let rec = Language::from_code("de").unwrap();
        let pat = Language::from_code("tr").unwrap();
        assert_eq!(
            build_for(rec, pat),
            build_instructions("de", "tr", "German", "Turkish")
        );
    }
}
