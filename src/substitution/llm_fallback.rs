use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::api_connection::{ChatCompletionRequest, ChatMessage, Provider};
use crate::sources::FallbackResolver;

static JSON_OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid JSON object pattern"));

/// Asks a chat model for swaps the static table does not cover.
pub struct LlmSubstitutionResolver {
    provider: Provider,
    model: String,
}

impl LlmSubstitutionResolver {
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    fn build_prompt(missing: &[String], pool: &[String]) -> Result<String> {
        let missing = serde_json::to_string(missing)?;
        let pool = serde_json::to_string(pool)?;
        Ok(format!(
            "/no_thinking
You are a cooking substitution expert. For each missing ingredient below,
suggest a practical cooking substitution using ONLY items from the available pantry list.
If no reasonable substitution exists, respond with null.

Missing ingredients: {missing}
Available pantry items: {pool}

Return ONLY a JSON object mapping each missing ingredient to its substitution string or null.
Example: {{\"ginger\": \"1/4 tsp dried ginger\", \"saffron\": null}}
Return ONLY the JSON object, no other text."
        ))
    }
}

fn object_to_mapping(value: Value) -> Option<HashMap<String, Option<String>>> {
    let Value::Object(map) = value else {
        return None;
    };
    Some(
        map.into_iter()
            .map(|(key, value)| {
                let substitution = match value {
                    Value::String(s) => Some(s),
                    _ => None,
                };
                (key.trim().to_lowercase(), substitution)
            })
            .collect(),
    )
}

/// Extracts the substitution mapping from a model reply.
///
/// Tries the reply as-is, then without markdown code fences, then the outermost `{...}` span.
/// Anything unparseable yields an empty mapping.
pub fn parse_substitution_reply(content: &str) -> HashMap<String, Option<String>> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .map(str::trim);

    let candidates = [
        Some(trimmed),
        unfenced,
        JSON_OBJECT_RE.find(trimmed).map(|m| m.as_str()),
    ];
    for candidate in candidates.into_iter().flatten() {
        if let Some(mapping) = serde_json::from_str::<Value>(candidate)
            .ok()
            .and_then(object_to_mapping)
        {
            return mapping;
        }
    }

    debug!("Could not find a JSON object in substitution reply:\n{}", content);
    HashMap::new()
}

#[async_trait]
impl FallbackResolver for LlmSubstitutionResolver {
    async fn resolve_unknown(
        &self,
        missing: &[String],
        pool: &[String],
    ) -> Result<HashMap<String, Option<String>>> {
        if missing.is_empty() {
            return Ok(HashMap::new());
        }

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(Self::build_prompt(missing, pool)?)],
            temperature: Some(0.0),
            max_tokens: Some(1024),
        };

        let response = self
            .provider
            .call_chat_completion(request)
            .await
            .context("Substitution model call failed")?;
        let content = response
            .first_content()
            .ok_or_else(|| anyhow!("No response choices received from substitution model"))?;

        let mapping = parse_substitution_reply(content);
        if mapping.is_empty() {
            warn!("Substitution model returned no usable mapping");
        }
        Ok(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_object() {
        let mapping =
            parse_substitution_reply(r#"{"Saffron": "pinch of Turmeric", "truffle": null}"#);
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping["saffron"].as_deref(), Some("pinch of Turmeric"));
        assert_eq!(mapping["truffle"], None);
    }

    #[test]
    fn test_parse_fenced_object() {
        let reply = "```json\n{\"ginger\": \"1/4 tsp dried ginger\"}\n```";
        let mapping = parse_substitution_reply(reply);
        assert_eq!(mapping["ginger"].as_deref(), Some("1/4 tsp dried ginger"));
    }

    #[test]
    fn test_parse_object_embedded_in_prose() {
        let reply = "Sure! Here you go:\n{\"thyme\": \"dried oregano\"}\nEnjoy.";
        let mapping = parse_substitution_reply(reply);
        assert_eq!(mapping["thyme"].as_deref(), Some("dried oregano"));
    }

    #[test]
    fn test_parse_garbage_and_non_objects() {
        assert!(parse_substitution_reply("I cannot help with that").is_empty());
        assert!(parse_substitution_reply("[\"a\", \"b\"]").is_empty());
        assert!(parse_substitution_reply("{not json}").is_empty());
    }

    #[test]
    fn test_non_string_values_become_none() {
        let mapping = parse_substitution_reply(r#"{"saffron": 3}"#);
        assert_eq!(mapping["saffron"], None);
    }

    #[test]
    fn test_prompt_lists_missing_and_pool() -> Result<()> {
        let prompt = LlmSubstitutionResolver::build_prompt(
            &["saffron".to_string()],
            &["rice".to_string(), "turmeric".to_string()],
        )?;
        assert!(prompt.contains(r#"Missing ingredients: ["saffron"]"#));
        assert!(prompt.contains(r#"Available pantry items: ["rice","turmeric"]"#));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_api_key_is_an_error() {
        let resolver = LlmSubstitutionResolver::new(
            Provider::openrouter("PANTRY_MATCH_TEST_KEY_THAT_DOES_NOT_EXIST"),
            "qwen/qwen3-32b",
        );
        let result = resolver
            .resolve_unknown(&["saffron".to_string()], &["rice".to_string()])
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_nothing_missing_skips_the_call() -> Result<()> {
        let resolver = LlmSubstitutionResolver::new(
            Provider::openrouter("PANTRY_MATCH_TEST_KEY_THAT_DOES_NOT_EXIST"),
            "qwen/qwen3-32b",
        );
        assert!(resolver.resolve_unknown(&[], &[]).await?.is_empty());
        Ok(())
    }
}
