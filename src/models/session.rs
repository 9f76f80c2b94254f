use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// One inbound guest message and the reply that was sent for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exchange {
    pub message: String,
    pub reply: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub phone: String,
    pub exchanges: Vec<Exchange>,
    pub last_seen: NaiveDateTime,
}

impl Session {
    pub fn new(phone: &str) -> Self {
        Self {
            phone: phone.to_string(),
            exchanges: vec![],
            last_seen: Utc::now().naive_utc(),
        }
    }

    pub fn push(&mut self, message: &str, reply: &str) {
        self.exchanges.push(Exchange {
            message: message.to_string(),
            reply: reply.to_string(),
        });
    }

    /// The last `n` exchanges, oldest first.
    pub fn recent(&self, n: usize) -> &[Exchange] {
        let start = self.exchanges.len().saturating_sub(n);
        &self.exchanges[start..]
    }

    pub fn touch(&mut self) {
        self.last_seen = Utc::now().naive_utc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_returns_tail_in_order() {
        let mut s = Session::new("+391");
        for i in 0..4 {
            s.push(&format!("q{i}"), &format!("a{i}"));
        }
        let tail: Vec<&str> = s.recent(2).iter().map(|e| e.message.as_str()).collect();
        assert_eq!(tail, vec!["q2", "q3"]);
        assert_eq!(s.recent(10).len(), 4);
        assert!(s.recent(0).is_empty());
    }

    #[test]
    fn test_repeated_questions_are_kept() {
        let mut s = Session::new("+391");
        s.push("wifi?", "pwd");
        s.push("wifi?", "pwd");
        assert_eq!(s.exchanges.len(), 2);
    }
}
