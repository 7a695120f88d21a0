//! End-to-end analysis over a small ENT catalog.

use std::sync::Arc;

use cpt_engine::cpt_types::{AnalysisStatus, MatchQuality};
use cpt_engine::{CatalogConfig, CodeCatalog, KeywordExpander, Matcher, RuleEngine};

const ENT_CATALOG: &str = "\
CPT Code,Description,Category,Subspecialty,Related_Codes,Key Indicator,standard_charge|gross
31231,\"Nasal endoscopy, diagnostic, unilateral or bilateral\",Nose,Rhinology,31233,Yes,$450.00
31233,Nasal/sinus endoscopy with maxillary sinusoscopy,Sinus,Rhinology,31231,No,$780.00
31255,\"Nasal/sinus endoscopy, surgical, with ethmoidectomy, total\",Sinus,Rhinology,,Yes,\"$2,890.00\"
30520,Septoplasty or submucous resection,Nose,Rhinology,30140,Yes,\"$1,800.00\"
30140,Submucous resection inferior turbinate,Nose,Rhinology,30520,No,$950.00
69436,\"Tympanostomy, general anesthesia\",Ear,Otology,69433,Yes,\"$1,250.00\"
69433,\"Tympanostomy, local or topical anesthesia\",Ear,Otology,69436,No,$600.00
42820,Tonsillectomy and adenoidectomy; younger than age 12,Throat,Pediatric,,Yes,\"$2,100.00\"
42410,Excision of parotid tumor or parotid gland; lateral lobe,Head and Neck,,42420,No,
42420,\"Excision of parotid tumor or parotid gland; total, with dissection of facial nerve\",Head and Neck,,42410,Yes,\"$4,200.00\"
";

fn ent_catalog() -> CodeCatalog {
    CodeCatalog::from_reader(ENT_CATALOG.as_bytes(), &CatalogConfig::default()).unwrap()
}

fn codes(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_bilateral_nasal_endoscopy() {
    let catalog = ent_catalog();
    let engine = RuleEngine::new();

    let result = engine.analyze_procedure(
        "bilateral nasal endoscopy",
        &codes(&["31231", "31233"]),
        &catalog,
    );

    assert_eq!(result.status, AnalysisStatus::Success);
    assert_eq!(result.recommended_codes, vec!["31231-50"]);
    assert_eq!(result.excluded_codes, vec!["31233"]);
    assert_eq!(result.explanations_for_rule("R001").count(), 1);
    assert_eq!(result.explanations_for_rule("R002").count(), 1);
}

#[test]
fn test_priority_then_bundling() {
    let catalog = ent_catalog();
    let engine = RuleEngine::new();

    // 30140 and 30520 bundle; priority puts the key indicator first so it is kept
    let result = engine.analyze_procedure(
        "septoplasty with turbinate reduction",
        &codes(&["30140", "30520", "31255"]),
        &catalog,
    );

    assert_eq!(result.recommended_codes, vec!["31255", "30520"]);
    assert_eq!(result.excluded_codes, vec!["30140"]);

    let priority: Vec<&str> = result
        .explanations_for_rule("R000")
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(
        priority,
        vec![
            "Code 31255 is a key indicator with standard charge $2890.00",
            "Code 30520 is a key indicator with standard charge $1800.00",
            "Code 30140 has standard charge $950.00",
        ]
    );

    // Two codes remain, so the modifier 51 reminder fires
    assert_eq!(result.explanations_for_rule("R004").count(), 1);
    assert_eq!(result.explanations_for_rule("R002").count(), 0);
}

#[test]
fn test_explanations_follow_rule_order() {
    let catalog = ent_catalog();
    let engine = RuleEngine::new();

    let result = engine.analyze_procedure(
        "post-op follow-up after bilateral tubes",
        &codes(&["69433", "69436"]),
        &catalog,
    );

    let order: Vec<&str> = result.explanations.iter().map(|e| e.rule_id.as_str()).collect();
    let mut deduped = order.clone();
    deduped.dedup();
    assert_eq!(deduped, vec!["R000", "R001", "R003", "R002", "R005"]);
    assert_eq!(result.recommended_codes, vec!["69436-50"]);
}

#[test]
fn test_search_then_analyze() {
    let catalog = Arc::new(ent_catalog());
    let matcher = Matcher::new(Arc::clone(&catalog), KeywordExpander::new());

    let candidates = matcher.search("parotid", 10);
    assert!(candidates.iter().all(|c| c.match_quality == MatchQuality::Exact));
    let candidate_codes: Vec<String> = candidates.into_iter().map(|c| c.code).collect();
    assert_eq!(candidate_codes, vec!["42410", "42420"]);

    let result = RuleEngine::new().analyze_procedure("parotidectomy", &candidate_codes, &catalog);
    assert_eq!(result.recommended_codes, vec!["42420"]);
    assert_eq!(result.excluded_codes, vec!["42410"]);
}

#[test]
fn test_keyword_search_over_catalog() {
    let catalog = Arc::new(ent_catalog());
    let matcher = Matcher::new(catalog, KeywordExpander::new());

    let results = matcher.search("ear tubes placed", 10);
    assert!(!results.is_empty());
    assert!(results.iter().all(|c| c.match_quality == MatchQuality::Keyword));
    let top: Vec<&str> = results.iter().take(2).map(|c| c.code.as_str()).collect();
    assert!(top.contains(&"69436"));
    assert!(top.contains(&"69433"));
}

#[test]
fn test_categories_and_validation() {
    let catalog = ent_catalog();

    assert_eq!(
        catalog.categories(),
        ["Nose", "Sinus", "Ear", "Throat", "Head and Neck"]
    );
    assert_eq!(catalog.get_by_category("Ear").len(), 2);
    assert!(catalog.validate("42820").valid);
    assert!(!catalog.validate("42820-50").valid);
    assert_eq!(catalog.get_by_subspecialty("Otology").len(), 2);
}
