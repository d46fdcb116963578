/// Lead enrichment pipeline shared by the HTTP handlers, the batch importer
/// and the CLI:
/// 1. Send the raw lead text to the enrichment service
/// 2. Parse the structured answer (blank or error on malformed output)
/// 3. Store the lead with the original text
use crate::config::MalformedResponsePolicy;
use crate::db_storage::LeadStore;
use crate::errors::AppError;
use crate::models::{EnrichmentResult, NewLead, ENRICHMENT_FIELDS};
use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::OnceLock;

/// Persona and research policy sent as the system instruction of every call.
pub const SYSTEM_INSTRUCTION: &str = "Você é o Especialista em OSINT (Open Source Intelligence) e Inteligência Comercial da Athalaia Gráfica. Sua missão é a DESCOBERTA e VALIDAÇÃO total de dados.

DIRETRIZES DE INVESTIGAÇÃO EXAUSTIVA:
1. VARREDURA TOTAL: Não se limite a uma fonte. Cruze dados do LinkedIn, Google Maps, Portais de Transparência, Registro.br, e diretórios empresariais para garantir que o dado é VERDADEIRO.
2. HIERARQUIA DE DECISORES: Busque o \"Dono do Dinheiro\". Em construtoras e editoras, foque em Sócios, Diretores e Gerentes de Expansão/Marketing. Valide o nome atual no Quadro de Sócios (QSA).
3. QUALIDADE DO E-MAIL: Priorize o e-mail que o decisor realmente abre. Se o e-mail nominal for @gmail ou @outlook mas for do Sócio, ele é mais valioso que um @empresa genérico. Rejeite e-mails de contabilidade externa.
4. TELEFONES E WHATSAPP: Localize o máximo de pontos de contato. Se o telefone for de um 'Stand de Vendas', identifique-o como tal, pois é um caminho direto para o marketing.

Você deve retornar os dados estritamente no formato JSON solicitado.";

/// Task text for one lead.
pub fn build_prompt(raw_text: &str) -> String {
    format!(
        "Realize uma investigação OSINT exaustiva para este lead: {}",
        raw_text
    )
}

/// JSON response schema: every enrichment key, all `STRING`, all required.
pub fn response_schema() -> Value {
    let mut properties = Map::new();
    for spec in ENRICHMENT_FIELDS.iter() {
        let mut property = json!({ "type": "STRING" });
        if let Some(description) = spec.description {
            property["description"] = json!(description);
        }
        properties.insert(spec.label.to_string(), property);
    }

    let required: Vec<&str> = ENRICHMENT_FIELDS.iter().map(|f| f.label).collect();

    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
    })
}

/// Anything that can turn raw lead text into enrichment fields.
#[async_trait]
pub trait LeadEnricher: Send + Sync {
    /// One best-effort call; no retries.
    async fn enrich(&self, raw_text: &str) -> Result<EnrichmentResult, AppError>;
}

fn code_fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*\s*\n?(.*?)\n?\s*```\s*$")
            .expect("code fence regex is valid")
    })
}

/// Strips a surrounding Markdown code fence (```json ... ```), if any.
pub fn strip_code_fences(text: &str) -> &str {
    match code_fence_regex().captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => text.trim(),
    }
}

/// Parses the model's text answer into an `EnrichmentResult`.
///
/// An empty answer counts as `{}`. Anything that is not a JSON object is
/// handled according to `policy`.
pub fn parse_model_output(
    text: Option<&str>,
    policy: MalformedResponsePolicy,
) -> Result<EnrichmentResult, AppError> {
    let body = strip_code_fences(text.unwrap_or(""));
    let body = if body.is_empty() { "{}" } else { body };

    let parsed = serde_json::from_str::<Value>(body)
        .map_err(|e| e.to_string())
        .and_then(|value| match value {
            Value::Object(_) => {
                serde_json::from_value::<EnrichmentResult>(value).map_err(|e| e.to_string())
            }
            other => Err(format!("expected a JSON object, got {}", json_kind(&other))),
        });

    match (parsed, policy) {
        (Ok(result), _) => Ok(result),
        (Err(reason), MalformedResponsePolicy::Blank) => {
            tracing::warn!(
                "Malformed enrichment response ({}), storing blank fields",
                reason
            );
            Ok(EnrichmentResult::default())
        }
        (Err(reason), MalformedResponsePolicy::Fail) => Err(AppError::ExternalApiError(
            format!("Malformed enrichment response: {}", reason),
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Enriches one raw lead and stores it, returning the new id.
///
/// Enrichment errors abort before anything is written.
pub async fn process_lead(
    enricher: &dyn LeadEnricher,
    store: &LeadStore,
    raw_text: &str,
) -> Result<i64, AppError> {
    let enrichment = enricher.enrich(raw_text).await?;
    if enrichment.is_blank() {
        tracing::warn!("Enrichment returned no data for input: {}", raw_text);
    }

    store.insert(&NewLead::new(raw_text, enrichment)).await
}
