//! Product suggestions for a customer based on a past sale.

use std::collections::HashSet;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use coronda_core::{Product, ProductId, SaleItem};

use super::{ClaudeError, LanguageModel};

/// Upper bound on returned suggestions.
pub const MAX_SUGGESTIONS: usize = 3;

const SYSTEM_PROMPT: &str = "Sos un asistente de ventas de una tienda de productos artesanales \
(mermeladas, dulces, mates y similares). Analizás lo que compró un cliente y recomendás \
productos del catálogo que probablemente le gusten. Respondé solo con JSON.";

/// A recommended product with the reason it was picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub product_id: ProductId,
    pub product_name: String,
    pub justification: String,
}

#[derive(Debug, Deserialize)]
struct SuggestionReply {
    #[serde(default)]
    suggestions: Vec<Suggestion>,
}

/// Suggest up to [`MAX_SUGGESTIONS`] catalog products the buyer has not
/// purchased.
///
/// Returns an empty list without calling the model when the sale has no
/// items or every catalog product was already bought.
///
/// # Errors
///
/// Returns `ClaudeError` if the model call fails or the reply is not the
/// expected JSON.
#[instrument(skip_all, fields(purchased = purchased.len(), catalog = catalog.len()))]
pub async fn suggest_products(
    model: &dyn LanguageModel,
    purchased: &[SaleItem],
    catalog: &[Product],
) -> Result<Vec<Suggestion>, ClaudeError> {
    let purchased_ids: HashSet<&ProductId> = purchased.iter().map(|item| &item.id).collect();
    let candidates: Vec<&Product> = catalog
        .iter()
        .filter(|p| !purchased_ids.contains(&p.id))
        .collect();

    if purchased.is_empty() || candidates.is_empty() {
        return Ok(Vec::new());
    }

    let reply = model
        .complete(SYSTEM_PROMPT, &build_prompt(purchased, &candidates))
        .await?;
    let suggestions = parse_suggestions(&reply)?;

    let candidate_ids: HashSet<&ProductId> = candidates.iter().map(|p| &p.id).collect();
    let mut seen = HashSet::new();
    let kept: Vec<Suggestion> = suggestions
        .into_iter()
        .filter(|s| candidate_ids.contains(&s.product_id) && seen.insert(s.product_id.clone()))
        .take(MAX_SUGGESTIONS)
        .collect();

    tracing::info!(count = kept.len(), "Product suggestions generated");
    Ok(kept)
}

fn build_prompt(purchased: &[SaleItem], candidates: &[&Product]) -> String {
    let mut prompt = String::from("Compras del cliente:\n");
    for item in purchased {
        let _ = writeln!(prompt, "- {} (Categoría: {})", item.name, item.category);
    }

    prompt.push_str("\nCatálogo disponible:\n");
    for product in candidates {
        let _ = writeln!(
            prompt,
            "- ID: {}, Producto: {}, Descripción: {}, Categoría: {}",
            product.id, product.name, product.description, product.category
        );
    }

    let _ = write!(
        prompt,
        "\nRecomendá hasta {MAX_SUGGESTIONS} productos del catálogo disponible que el cliente \
         no haya comprado, con una justificación breve y personalizada para cada uno. \
         Respondé con este formato exacto:\n\
         {{\"suggestions\":[{{\"productId\":\"...\",\"productName\":\"...\",\"justification\":\"...\"}}]}}"
    );
    prompt
}

/// Parse the model reply, accepting a bare object or one inside a
/// fenced code block.
fn parse_suggestions(reply: &str) -> Result<Vec<Suggestion>, ClaudeError> {
    let json = strip_code_fence(reply);
    serde_json::from_str::<SuggestionReply>(json)
        .map(|r| r.suggestions)
        .map_err(|e| ClaudeError::Parse(format!("suggestions reply: {e}")))
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line, e.g. "json".
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use coronda_core::Money;

    use super::*;

    struct ScriptedModel {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                prompts: Mutex::default(),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(&self, _system: &str, prompt: &str) -> Result<String, ClaudeError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    fn product(id: &str, name: &str) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id, "name": name, "description": "Artesanal",
            "price": 3000, "category": "Dulces", "stock": 5
        }))
        .unwrap()
    }

    fn item(id: &str, name: &str) -> SaleItem {
        SaleItem {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Money::from_units(3000),
            image_url: String::new(),
            category: "Dulces".to_string(),
            quantity: 1,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("p1", "Dulce de leche"),
            product("p2", "Mermelada de higo"),
            product("p3", "Alfajores"),
            product("p4", "Miel de monte"),
            product("p5", "Mermelada de frutilla"),
        ]
    }

    #[tokio::test]
    async fn test_filters_purchased_unknown_and_caps() {
        let reply = r#"```json
{"suggestions":[
  {"productId":"p1","productName":"Dulce de leche","justification":"ya lo compró"},
  {"productId":"p2","productName":"Mermelada de higo","justification":"combina"},
  {"productId":"zz","productName":"Inventado","justification":"no existe"},
  {"productId":"p3","productName":"Alfajores","justification":"clásico"},
  {"productId":"p2","productName":"Mermelada de higo","justification":"repetido"},
  {"productId":"p4","productName":"Miel de monte","justification":"natural"},
  {"productId":"p5","productName":"Mermelada de frutilla","justification":"sobra"}
]}
```"#;
        let model = ScriptedModel::new(reply);
        let result = suggest_products(&model, &[item("p1", "Dulce de leche")], &catalog())
            .await
            .unwrap();

        let ids: Vec<&str> = result.iter().map(|s| s.product_id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p3", "p4"]);

        let prompt = model.prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("Dulce de leche (Categoría: Dulces)"));
        assert!(!prompt.contains("ID: p1"));
    }

    #[tokio::test]
    async fn test_empty_sale_skips_model() {
        let model = ScriptedModel::new("not json");
        let result = suggest_products(&model, &[], &catalog()).await.unwrap();
        assert!(result.is_empty());
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_everything_purchased_skips_model() {
        let model = ScriptedModel::new("not json");
        let purchased = [item("p1", "Dulce de leche")];
        let result = suggest_products(&model, &purchased, &[product("p1", "Dulce de leche")])
            .await
            .unwrap();
        assert!(result.is_empty());
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_reply_is_parse_error() {
        let model = ScriptedModel::new("Te recomiendo la miel.");
        let result = suggest_products(&model, &[item("p1", "Dulce de leche")], &catalog()).await;
        assert!(matches!(result, Err(ClaudeError::Parse(_))));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}```"), "{\"a\":1}");
    }
}
