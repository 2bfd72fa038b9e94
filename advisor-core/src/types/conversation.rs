use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Who authored a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One turn of the conversation, oldest first in the history sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Coarse classification label attached to a generated answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    Portfolio,
    Risk,
    Market,
    News,
    General,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::Portfolio => "portfolio",
            AnalysisType::Risk => "risk",
            AnalysisType::Market => "market",
            AnalysisType::News => "news",
            AnalysisType::General => "general",
        }
    }
}

/// Final, classified and source-attributed answer for one request.
#[derive(Debug, Clone, Serialize)]
pub struct RagResponse {
    pub response: String,
    pub analysis_type: AnalysisType,
    pub relevant_stocks: BTreeSet<String>,
    pub sources: BTreeSet<String>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&MessageRole::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&MessageRole::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn test_analysis_type_lowercase_on_wire() {
        assert_eq!(
            serde_json::to_string(&AnalysisType::Portfolio).unwrap(),
            "\"portfolio\""
        );
        let parsed: AnalysisType = serde_json::from_str("\"risk\"").unwrap();
        assert_eq!(parsed, AnalysisType::Risk);
        assert_eq!(AnalysisType::General.as_str(), "general");
    }

    #[test]
    fn test_message_constructors() {
        let msg = ConversationMessage::user("what is diversification?");
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.content, "what is diversification?");

        let reply = ConversationMessage::assistant("spreading risk across assets");
        assert_eq!(reply.role, MessageRole::Assistant);
    }

    #[test]
    fn test_rag_response_serialization() {
        let response = RagResponse {
            response: "AAPL reported strong earnings.".to_string(),
            analysis_type: AnalysisType::Market,
            relevant_stocks: ["AAPL".to_string()].into_iter().collect(),
            sources: ["earnings-wire".to_string()].into_iter().collect(),
            timestamp: Utc::now(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["analysis_type"], "market");
        assert_eq!(json["relevant_stocks"][0], "AAPL");
        // chrono serializes DateTime<Utc> as RFC 3339
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
    }
}
