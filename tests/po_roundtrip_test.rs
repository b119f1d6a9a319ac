use indexmap::IndexMap;
use locsync::po::po_entries_to_api_format;
use locsync::{parse_po_file, surgical_update_po_file, SilentLogger, SurgicalOptions, TranslationPayload};

const CATALOG: &str = r#"# Swedish translations for the shop.
msgid ""
msgstr ""
"Language: sv\n"
"Content-Type: text/plain; charset=UTF-8\n"
"Plural-Forms: nplurals=2; plural=(n != 1);\n"

#. Shown on the checkout page
#: src/checkout.js:12
msgid "Pay now"
msgstr ""

#: src/cart.js:4
#, fuzzy
msgid "Remove"
msgstr "Ta bort gammal"

msgctxt "menu"
msgid "Open"
msgstr "Öppna"

msgid "One item"
msgid_plural "%d items"
msgstr[0] "En vara"
msgstr[1] ""

#~ msgid "Old"
#~ msgstr "Gammal"
"#;

fn update(original: &str, payload: &TranslationPayload) -> String {
    surgical_update_po_file(original, payload, &SurgicalOptions::default(), &SilentLogger).unwrap()
}

#[test]
fn test_empty_payload_returns_original_bytes() {
    assert_eq!(update(CATALOG, &TranslationPayload::default()), CATALOG);
}

#[test]
fn test_updated_catalog_still_parses() {
    let payload: TranslationPayload = [
        ("Pay now", "Betala nu"),
        ("menu|Open", "Öppna meny"),
        ("One item__plural_1", "%d varor"),
    ]
    .into();

    let updated = update(CATALOG, &payload);
    let before = parse_po_file(CATALOG).unwrap();
    let after = parse_po_file(&updated).unwrap();

    assert_eq!(after.entries.len(), before.entries.len());
    assert_eq!(after.find(None, "Pay now").unwrap().msgstr, vec!["Betala nu".to_string()]);
    assert_eq!(after.find(Some("menu"), "Open").unwrap().msgstr, vec!["Öppna meny".to_string()]);
    assert_eq!(
        after.find(None, "One item").unwrap().msgstr,
        vec!["En vara".to_string(), "%d varor".to_string()]
    );
    assert!(updated.contains("#. Shown on the checkout page\n#: src/checkout.js:12\nmsgid \"Pay now\""));
    assert!(updated.ends_with("#~ msgid \"Old\"\n#~ msgstr \"Gammal\"\n"));
}

#[test]
fn test_second_application_changes_nothing() {
    let payload: TranslationPayload = [("Pay now", "Betala nu"), ("Checkout", "Kassa")].into();

    let once = update(CATALOG, &payload);
    let twice = update(&once, &payload);

    assert_eq!(once, twice);
    assert_eq!(once.matches("msgid \"Checkout\"").count(), 1);
}

#[test]
fn test_new_entries_are_appended_and_parse() {
    let payload: TranslationPayload = [("Checkout", "Kassa")].into();

    let updated = update(CATALOG, &payload);
    let parsed = parse_po_file(&updated).unwrap();

    assert!(updated.starts_with(CATALOG.trim_end_matches('\n')));
    assert_eq!(parsed.find(None, "Checkout").unwrap().msgstr, vec!["Kassa".to_string()]);
}

#[test]
fn test_crlf_catalog_keeps_line_endings() {
    let original = CATALOG.replace('\n', "\r\n");
    let payload: TranslationPayload = [("Pay now", "Betala nu")].into();

    let updated = update(&original, &payload);

    assert!(updated.contains("msgid \"Pay now\"\r\nmsgstr \"Betala nu\"\r\n"));
    assert_eq!(updated.matches('\n').count(), updated.matches("\r\n").count());
}

#[test]
fn test_api_keys_address_their_own_entries() {
    let catalog = "msgid \"Home | Site\"\nmsgstr \"\"\n\nmsgctxt \"menu\"\nmsgid \"Open\"\nmsgstr \"\"\n";
    let parsed = parse_po_file(catalog).unwrap();
    let keys = po_entries_to_api_format(&parsed.entries, None);

    let translations: IndexMap<String, serde_json::Value> = keys
        .keys()
        .map(|key| (key.clone(), serde_json::json!(format!("sv: {}", key))))
        .collect();
    let updated = update(catalog, &translations.into());

    let reparsed = parse_po_file(&updated).unwrap();
    assert_eq!(reparsed.entries.len(), parsed.entries.len());
    assert_eq!(
        reparsed.find(None, "Home | Site").unwrap().msgstr,
        vec!["sv: Home | Site".to_string()]
    );
    assert_eq!(reparsed.find(Some("menu"), "Open").unwrap().msgstr, vec!["sv: menu|Open".to_string()]);
}
