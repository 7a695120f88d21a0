//! Coding tips for a single code.

use cpt_types::modifier::base_code;

use crate::catalog::CodeCatalog;

/// Phrase-triggered tips, matched case-insensitively against the procedure text.
const TEXT_TIPS: &[(&str, &str)] = &[
    (
        "consultation",
        "Initial consultations may require different codes than follow-up visits.",
    ),
    (
        "biopsy",
        "Verify if the biopsy was for diagnostic or therapeutic purposes.",
    ),
    (
        "endoscopic",
        "Endoscopic procedures often have specific bundling rules.",
    ),
];

/// Returns documentation tips for `code` in the context of a procedure.
///
/// Key indicator and charge tips are only given when the catalog entry
/// supports them.
pub fn coding_tips(code: &str, procedure_text: &str, catalog: &CodeCatalog) -> Vec<String> {
    let mut tips = vec![
        "Ensure the documentation supports medical necessity.".to_string(),
        "Check that the procedure description matches the code definition exactly.".to_string(),
    ];

    let text = procedure_text.to_lowercase();
    tips.extend(
        TEXT_TIPS
            .iter()
            .filter(|(phrase, _)| text.contains(phrase))
            .map(|(_, tip)| tip.to_string()),
    );

    match catalog.get_details(base_code(code)) {
        Ok(entry) => {
            if entry.key_indicator {
                tips.push(
                    "This is a key indicator code and should be prioritized when applicable."
                        .to_string(),
                );
            }
            if entry.has_charge() {
                tips.push(format!(
                    "Consider the standard charge (${:.2}) as an indicator of procedure complexity.",
                    entry.standard_charge
                ));
            }
        }
        Err(e) => tips.push(format!("{e}; verify the code before submission.")),
    }

    tips
}
