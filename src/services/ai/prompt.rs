use crate::models::{Exchange, PropertyRecord};
use crate::services::ai::Message;

pub const SYSTEM_PROMPT: &str = "Sei il concierge virtuale di una struttura per affitti brevi. \
Rispondi all'ospite in modo cordiale e conciso, nella lingua in cui scrive. \
Usa solo le informazioni sulla struttura fornite nel messaggio; \
se non conosci la risposta, invita l'ospite a contattare l'assistenza.";

/// Prior exchanges become alternating user/assistant turns; the final user
/// turn carries the question enriched with the property context.
pub fn build_messages(
    property_name: &str,
    property: Option<&PropertyRecord>,
    history: &[Exchange],
    question: &str,
) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() * 2 + 1);
    for exchange in history {
        messages.push(Message::user(exchange.message.clone()));
        messages.push(Message::assistant(exchange.reply.clone()));
    }
    messages.push(Message::user(enriched_question(property_name, property, question)));
    messages
}

fn enriched_question(property_name: &str, property: Option<&PropertyRecord>, question: &str) -> String {
    let mut context = format!("Struttura: {property_name}");
    if let Some(p) = property {
        for (label, value) in [
            ("Nome", &p.display_name),
            ("Tipologia", &p.kind),
            ("Indirizzo", &p.address),
            ("Comune", &p.municipality),
        ] {
            if !value.is_empty() {
                context.push_str(&format!("\n{label}: {value}"));
            }
        }
    }
    format!("{context}\n\nDomanda dell'ospite: {question}")
}
