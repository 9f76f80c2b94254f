use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Context;

use crate::models::{FaqEntry, PropertyRecord};

/// Static per-property reference data: the Property Directory and the FAQ Table.
///
/// Both are indexed at load time by normalized property name; lookups are
/// exact matches on that key.
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    properties: HashMap<String, PropertyRecord>,
    faqs: HashMap<String, Vec<Trigger>>,
}

#[derive(Debug)]
struct Trigger {
    phrase: String,
    answer: String,
}

impl KnowledgeBase {
    pub fn new(properties: Vec<PropertyRecord>, faqs: Vec<FaqEntry>) -> Self {
        let mut kb = KnowledgeBase::default();

        for record in properties {
            let key = normalize_key(&record.property_name);
            if key.is_empty() {
                continue;
            }
            if kb.properties.contains_key(&key) {
                tracing::warn!(property = %record.property_name, "duplicate property record, keeping the first");
                continue;
            }
            kb.properties.insert(key, record);
        }

        for entry in faqs {
            let key = normalize_key(&entry.property_name);
            let phrase = entry.trigger.trim().to_lowercase();
            if key.is_empty() || phrase.is_empty() {
                continue;
            }
            kb.faqs.entry(key).or_default().push(Trigger {
                phrase,
                answer: entry.answer,
            });
        }

        kb
    }

    pub fn load(properties_path: &str, faq_path: &str) -> anyhow::Result<Self> {
        let properties = read_table(properties_path, properties_from_csv::<File>)?;
        let faqs = read_table(faq_path, faqs_from_csv::<File>)?;
        let kb = Self::new(properties, faqs);
        tracing::info!(
            properties = kb.property_count(),
            faqs = kb.faq_count(),
            "knowledge base loaded"
        );
        Ok(kb)
    }

    /// Canned answer of the first FAQ entry for `property_name` whose trigger
    /// phrase occurs in `message`, ignoring case.
    pub fn lookup_answer(&self, property_name: &str, message: &str) -> Option<&str> {
        let message = message.to_lowercase();
        self.faqs
            .get(&normalize_key(property_name))?
            .iter()
            .find(|t| message.contains(&t.phrase))
            .map(|t| t.answer.as_str())
    }

    pub fn lookup_property(&self, property_name: &str) -> Option<&PropertyRecord> {
        self.properties.get(&normalize_key(property_name))
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    pub fn faq_count(&self) -> usize {
        self.faqs.values().map(Vec::len).sum()
    }
}

/// Trimmed, lowercased, with internal whitespace runs collapsed to one space.
pub fn normalize_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn read_table<T, F>(path: &str, from_csv: F) -> anyhow::Result<Vec<T>>
where
    T: serde::de::DeserializeOwned,
    F: FnOnce(File) -> anyhow::Result<Vec<T>>,
{
    let file = File::open(path).with_context(|| format!("failed to open {path}"))?;
    let is_csv = Path::new(path)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        from_csv(file).with_context(|| format!("failed to parse {path}"))
    } else {
        serde_json::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("failed to parse {path}"))
    }
}

/// Reads the property sheet exported as CSV. The key column is the
/// "Appartamento/stanza" column when present.
pub fn properties_from_csv<R: Read>(reader: R) -> anyhow::Result<Vec<PropertyRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();

    let key_col = headers
        .iter()
        .position(|h| {
            let h = h.to_lowercase();
            h.contains("appartamento") && h.contains("stanza")
        })
        .or_else(|| find_column(&headers, &["property_name", "struttura", "property"]))
        .context("no property name column in header")?;
    let display_col = find_column(&headers, &["display_name", "nome"]);
    let kind_col = find_column(&headers, &["type", "tipologia", "tipo"]);
    let address_col = find_column(&headers, &["address", "indirizzo"]);
    let municipality_col = find_column(&headers, &["municipality", "comune"]);

    let mut records = vec![];
    for row in rdr.records() {
        let row = row?;
        let cell = |col: Option<usize>| {
            col.and_then(|c| row.get(c))
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };
        let property_name = cell(Some(key_col));
        if property_name.is_empty() {
            continue;
        }
        records.push(PropertyRecord {
            property_name,
            display_name: cell(display_col),
            kind: cell(kind_col),
            address: cell(address_col),
            municipality: cell(municipality_col),
        });
    }
    Ok(records)
}

pub fn faqs_from_csv<R: Read>(reader: R) -> anyhow::Result<Vec<FaqEntry>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();

    let property_col = headers
        .iter()
        .position(|h| {
            let h = h.to_lowercase();
            h.contains("appartamento") && h.contains("stanza")
        })
        .or_else(|| find_column(&headers, &["property_name", "struttura", "property"]))
        .context("no property name column in header")?;
    let trigger_col = find_column(&headers, &["trigger", "domanda", "question"])
        .context("no trigger column in header")?;
    let answer_col = find_column(&headers, &["answer", "risposta"])
        .context("no answer column in header")?;

    let mut entries = vec![];
    for row in rdr.records() {
        let row = row?;
        let get = |c: usize| row.get(c).unwrap_or("").trim().to_string();
        entries.push(FaqEntry {
            property_name: get(property_col),
            trigger: get(trigger_col),
            answer: get(answer_col),
        });
    }
    Ok(entries)
}

fn find_column(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| aliases.iter().any(|a| h.trim().eq_ignore_ascii_case(a)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faq(property: &str, trigger: &str, answer: &str) -> FaqEntry {
        FaqEntry {
            property_name: property.to_string(),
            trigger: trigger.to_string(),
            answer: answer.to_string(),
        }
    }

    fn property(name: &str) -> PropertyRecord {
        PropertyRecord {
            property_name: name.to_string(),
            display_name: format!("{name} (display)"),
            kind: "Appartamento".to_string(),
            address: "Via Roma 1".to_string(),
            municipality: "Pisa".to_string(),
        }
    }

    fn kb() -> KnowledgeBase {
        KnowledgeBase::new(
            vec![property("Privilege Pisa Tuscany"), property("Casa Lucca")],
            vec![
                faq("Privilege Pisa Tuscany", "orario check-in", "Il check-in è dalle 15:00."),
                faq("Privilege Pisa Tuscany", "wifi", "La password è ospite2024."),
                faq("Casa Lucca", "orario check-in", "Il check-in è dalle 14:00."),
            ],
        )
    }

    #[test]
    fn test_trigger_match_is_case_insensitive_substring() {
        let kb = kb();
        assert_eq!(
            kb.lookup_answer("Privilege Pisa Tuscany", "Buongiorno, qual è l'ORARIO Check-In?"),
            Some("Il check-in è dalle 15:00.")
        );
    }

    #[test]
    fn test_answers_are_scoped_per_property() {
        let kb = kb();
        assert_eq!(
            kb.lookup_answer("Casa Lucca", "orario check-in?"),
            Some("Il check-in è dalle 14:00.")
        );
        assert_eq!(kb.lookup_answer("Casa Lucca", "wifi?"), None);
    }

    #[test]
    fn test_first_matching_entry_wins() {
        let kb = kb();
        assert_eq!(
            kb.lookup_answer("Privilege Pisa Tuscany", "wifi e orario check-in"),
            Some("Il check-in è dalle 15:00.")
        );
    }

    #[test]
    fn test_no_match_and_unknown_property() {
        let kb = kb();
        assert_eq!(kb.lookup_answer("Privilege Pisa Tuscany", "c'è la piscina?"), None);
        assert_eq!(kb.lookup_answer("Villa Siena", "orario check-in"), None);
    }

    #[test]
    fn test_property_key_is_normalized_not_substring() {
        let kb = kb();
        assert!(kb.lookup_property("  privilege   PISA tuscany ").is_some());
        assert!(kb.lookup_property("Privilege Pisa").is_none());
        assert_eq!(
            kb.lookup_answer("PRIVILEGE PISA TUSCANY", "wifi"),
            Some("La password è ospite2024.")
        );
    }

    #[test]
    fn test_blank_triggers_are_dropped() {
        let kb = KnowledgeBase::new(vec![], vec![faq("Casa Lucca", "  ", "sempre")]);
        assert_eq!(kb.faq_count(), 0);
        assert_eq!(kb.lookup_answer("Casa Lucca", "qualsiasi cosa"), None);
    }

    #[test]
    fn test_properties_from_spreadsheet_csv() {
        let csv = "Nome,Appartamento / stanza,Tipologia,Indirizzo,Comune\n\
                   Privilege,Privilege Pisa Tuscany,Appartamento,Via Roma 1,Pisa\n\
                   ,,,,\n";
        let records = properties_from_csv(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].property_name, "Privilege Pisa Tuscany");
        assert_eq!(records[0].display_name, "Privilege");
        assert_eq!(records[0].municipality, "Pisa");
    }

    #[test]
    fn test_faqs_from_csv_with_italian_headers() {
        let csv = "Struttura,Domanda,Risposta\n\
                   Privilege Pisa Tuscany,orario check-in,Il check-in è dalle 15:00.\n";
        let entries = faqs_from_csv(csv.as_bytes()).unwrap();
        assert_eq!(entries, vec![faq("Privilege Pisa Tuscany", "orario check-in", "Il check-in è dalle 15:00.")]);
    }

    #[test]
    fn test_faqs_from_csv_requires_answer_column() {
        let csv = "Struttura,Domanda\nCasa,wifi\n";
        assert!(faqs_from_csv(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_load_bundled_data_files() {
        let kb = KnowledgeBase::load("data/properties.json", "data/faq.json").unwrap();
        assert!(kb.lookup_property("Privilege Pisa Tuscany").is_some());
        assert_eq!(
            kb.lookup_answer("Privilege Pisa Tuscany", "orario check-in"),
            Some("Il check-in è dalle 15:00.")
        );
    }
}
