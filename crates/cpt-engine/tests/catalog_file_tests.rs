//! Loading catalogs and synonym tables from disk.

use std::io::Write;

use cpt_engine::{CatalogConfig, CatalogError, CatalogHandle, CodeCatalog, KeywordExpander};
use proptest::prelude::*;
use tempfile::{NamedTempFile, TempDir};

fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_with_stats() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "ent_codes.csv",
        "\u{feff}cpt_code,long_description,category,key_indicator,standard_charge\n\
         31231.0,Nasal endoscopy,Nose,Y,450\n\
         ,blank code row,Nose,,\n\
         69436,Tympanostomy,Ear,no,\n",
    );

    let (catalog, stats) = CodeCatalog::load_with_stats(&path, &CatalogConfig::default()).unwrap();

    assert_eq!(catalog.len(), 2);
    assert!(catalog.contains("31231"));
    assert_eq!(stats.codes_loaded, 2);
    assert_eq!(stats.rows_skipped, 1);
    assert_eq!(stats.key_indicators, 1);
    assert_eq!(stats.charged_codes, 1);
}

#[test]
fn test_load_tab_delimited() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "code\tdescription\tcategory").unwrap();
    writeln!(file, "42820\tTonsillectomy and adenoidectomy, age < 12\tThroat").unwrap();
    file.flush().unwrap();

    let catalog = CodeCatalog::from_path(file.path(), &CatalogConfig::tsv()).unwrap();
    assert_eq!(
        catalog.get_details("42820").unwrap().description,
        "Tonsillectomy and adenoidectomy, age < 12"
    );
}

#[test]
fn test_load_errors() {
    let dir = TempDir::new().unwrap();
    let config = CatalogConfig::default();

    let missing = CodeCatalog::from_path(dir.path().join("absent.csv"), &config);
    assert!(matches!(missing, Err(CatalogError::FileNotFound { .. })));

    let no_code = write_file(&dir, "no_code.csv", "description,category\nSeptoplasty,Nose\n");
    assert!(matches!(
        CodeCatalog::from_path(&no_code, &config),
        Err(CatalogError::MissingColumn { ref column }) if column == "code"
    ));

    let bad_flag = write_file(&dir, "bad_flag.csv", "code,description,key_indicator\n30520,Septoplasty,maybe\n");
    assert!(matches!(
        CodeCatalog::from_path(&bad_flag, &config),
        Err(CatalogError::InvalidBoolean { ref value, .. }) if value == "maybe"
    ));

    let bad_charge = write_file(&dir, "bad_charge.csv", "code,description,charge\n30520,Septoplasty,-10\n");
    assert!(matches!(
        CodeCatalog::from_path(&bad_charge, &config),
        Err(CatalogError::InvalidCharge { .. })
    ));
}

#[test]
fn test_synonyms_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "synonyms.json", r#"{"stapes": ["stapedectomy"]}"#);

    let expander = KeywordExpander::new().merge_json_path(&path).unwrap();
    assert_eq!(expander.expand("stapes"), vec!["stapes", "stapedectomy"]);

    let missing = KeywordExpander::new().merge_json_path(dir.path().join("none.json"));
    assert!(matches!(missing, Err(CatalogError::FileNotFound { .. })));
}

#[test]
fn test_handle_reload_from_disk() {
    let dir = TempDir::new().unwrap();
    let config = CatalogConfig::default();
    let path = write_file(&dir, "ent_codes.csv", "code,description\n30520,Septoplasty\n");

    let handle = CatalogHandle::new(CodeCatalog::from_path(&path, &config).unwrap(), KeywordExpander::new());
    let before = handle.current();

    write_file(&dir, "ent_codes.csv", "code,description\n30520,Septoplasty\n30140,Turbinate resection\n");
    handle.reload_from_path(&path, &config).unwrap();
    assert_eq!(handle.current().catalog().len(), 2);
    assert_eq!(before.catalog().len(), 1);

    write_file(&dir, "ent_codes.csv", "code,description\n30520,Septoplasty\n30520,Duplicate\n");
    assert!(matches!(
        handle.reload_from_path(&path, &config),
        Err(CatalogError::DuplicateCode { line: 3, .. })
    ));
    assert_eq!(handle.current().catalog().len(), 2);
    assert_eq!(handle.current().matcher().search("turbinate", 10)[0].code, "30140");
}

const WORDS: &[&str] = &["nasal", "sinus", "endoscopy", "parotid", "excision", "biopsy", "turbinate"];

fn row_strategy() -> impl Strategy<Value = (Vec<usize>, bool, u32, Vec<usize>)> {
    (
        prop::collection::vec(0..WORDS.len(), 1..4),
        any::<bool>(),
        0u32..100_000,
        prop::collection::vec(0usize..60, 0..3),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_written_rows_load(rows in prop::collection::vec(row_strategy(), 1..60)) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("generated.csv");
        let codes: Vec<String> = (0..rows.len()).map(|i| format!("{}", 40000 + i)).collect();

        let mut writer = csv::Writer::from_path(&path).unwrap();
        writer
            .write_record(["CPT Code", "Description", "Category", "Related_Codes", "Key Indicator", "standard_charge|gross"])
            .unwrap();
        for (i, (words, key, charge, related)) in rows.iter().enumerate() {
            let description = words.iter().map(|&w| WORDS[w]).collect::<Vec<_>>().join(" ");
            let related = related
                .iter()
                .filter(|&&r| r < rows.len())
                .map(|&r| codes[r].as_str())
                .collect::<Vec<_>>()
                .join(",");
            let charge = format!("${charge}");
            writer
                .write_record([
                    codes[i].as_str(),
                    description.as_str(),
                    "Nose",
                    related.as_str(),
                    if *key { "Yes" } else { "No" },
                    charge.as_str(),
                ])
                .unwrap();
        }
        writer.flush().unwrap();
        drop(writer);

        let catalog = CodeCatalog::from_path(&path, &CatalogConfig::default()).unwrap();

        prop_assert_eq!(catalog.len(), rows.len());
        for (code, (_, key, charge, _)) in codes.iter().zip(&rows) {
            let entry = catalog.get_details(code).unwrap();
            prop_assert_eq!(entry.key_indicator, *key);
            prop_assert_eq!(entry.standard_charge, f64::from(*charge));
            prop_assert!(!entry.related_codes.contains(code));
            prop_assert!(entry.related_codes.iter().all(|r| catalog.contains(r)));
        }
    }
}
