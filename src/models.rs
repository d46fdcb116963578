use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;

// ============ Field Table ============

/// One enrichment attribute: the key used by the AI schema and the POST body,
/// the column it is stored in, and an optional hint sent with the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub label: &'static str,
    pub column: &'static str,
    pub description: Option<&'static str>,
}

const fn field(label: &'static str, column: &'static str) -> FieldSpec {
    FieldSpec {
        label,
        column,
        description: None,
    }
}

const fn described(
    label: &'static str,
    column: &'static str,
    description: &'static str,
) -> FieldSpec {
    FieldSpec {
        label,
        column,
        description: Some(description),
    }
}

/// Number of enrichment attributes carried by every lead.
pub const ENRICHMENT_FIELD_COUNT: usize = 23;

/// Enrichment key → column mapping, in storage and export order.
///
/// `EnrichmentResult::values` returns values in this same order.
pub const ENRICHMENT_FIELDS: [FieldSpec; ENRICHMENT_FIELD_COUNT] = [
    field("Nome e Sobrenome", "nome_sobrenome"),
    field("Cargo", "cargo"),
    field("Empresa", "empresa"),
    field("Site", "site"),
    described("Email 1", "email_1", "Prioridade Nominal"),
    described("Email 2", "email_2", "Alternativo/Sócio"),
    described("Email 3", "email_3", "Geral Validado"),
    described("Telefone 1", "telefone_1", "Natureza: ex Sede"),
    described("Telefone 2", "telefone_2", "Natureza: ex Direto"),
    field("Telefone 3 lusha", "telefone_3_lusha"),
    field("Telefone 4 (Apollo)", "telefone_4_apollo"),
    field("Telefone 5 (Google)", "telefone_5_google"),
    field("Telefone Assertiva", "telefone_assertiva"),
    field("Whatsapp", "whatsapp"),
    field(
        "Regiões Administrativas e ou Cidade",
        "regioes_administrativas_cidade",
    ),
    field("Estado", "estado"),
    field("País", "pais"),
    field("Segmento", "segmento"),
    field(
        "Empresa Média de Colaboradores",
        "empresa_media_colaboradores",
    ),
    field("LinkedIn Contato", "linkedin_contato"),
    field("LinkedIn Empresa", "linkedin_empresa"),
    described(
        "insight",
        "insight",
        "Análise crítica sobre a veracidade dos dados encontrados.",
    ),
    described(
        "sugestao_abordagem",
        "sugestao_abordagem",
        "Pitch personalizado de alto impacto para impressão offset de luxo.",
    ),
];

/// Accepts any JSON value where a text field is expected.
///
/// `null` becomes an empty string, numbers and booleans keep their textual form.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    })
}

// ============ Enrichment Models ============

/// Structured result of one enrichment call.
///
/// Keys match the response schema sent to the AI service. Every field is
/// optional on the wire and defaults to an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct EnrichmentResult {
    #[serde(rename = "Nome e Sobrenome", deserialize_with = "lenient_string")]
    pub nome_sobrenome: String,
    #[serde(rename = "Cargo", deserialize_with = "lenient_string")]
    pub cargo: String,
    #[serde(rename = "Empresa", deserialize_with = "lenient_string")]
    pub empresa: String,
    #[serde(rename = "Site", deserialize_with = "lenient_string")]
    pub site: String,
    #[serde(rename = "Email 1", deserialize_with = "lenient_string")]
    pub email_1: String,
    #[serde(rename = "Email 2", deserialize_with = "lenient_string")]
    pub email_2: String,
    #[serde(rename = "Email 3", deserialize_with = "lenient_string")]
    pub email_3: String,
    #[serde(rename = "Telefone 1", deserialize_with = "lenient_string")]
    pub telefone_1: String,
    #[serde(rename = "Telefone 2", deserialize_with = "lenient_string")]
    pub telefone_2: String,
    #[serde(rename = "Telefone 3 lusha", deserialize_with = "lenient_string")]
    pub telefone_3_lusha: String,
    #[serde(rename = "Telefone 4 (Apollo)", deserialize_with = "lenient_string")]
    pub telefone_4_apollo: String,
    #[serde(rename = "Telefone 5 (Google)", deserialize_with = "lenient_string")]
    pub telefone_5_google: String,
    #[serde(rename = "Telefone Assertiva", deserialize_with = "lenient_string")]
    pub telefone_assertiva: String,
    #[serde(rename = "Whatsapp", deserialize_with = "lenient_string")]
    pub whatsapp: String,
    #[serde(
        rename = "Regiões Administrativas e ou Cidade",
        deserialize_with = "lenient_string"
    )]
    pub regioes_administrativas_cidade: String,
    #[serde(rename = "Estado", deserialize_with = "lenient_string")]
    pub estado: String,
    #[serde(rename = "País", deserialize_with = "lenient_string")]
    pub pais: String,
    #[serde(rename = "Segmento", deserialize_with = "lenient_string")]
    pub segmento: String,
    #[serde(
        rename = "Empresa Média de Colaboradores",
        deserialize_with = "lenient_string"
    )]
    pub empresa_media_colaboradores: String,
    #[serde(rename = "LinkedIn Contato", deserialize_with = "lenient_string")]
    pub linkedin_contato: String,
    #[serde(rename = "LinkedIn Empresa", deserialize_with = "lenient_string")]
    pub linkedin_empresa: String,
    #[serde(rename = "insight", deserialize_with = "lenient_string")]
    pub insight: String,
    #[serde(rename = "sugestao_abordagem", deserialize_with = "lenient_string")]
    pub sugestao_abordagem: String,
}

impl EnrichmentResult {
    /// Field values in `ENRICHMENT_FIELDS` order.
    pub fn values(&self) -> [&str; ENRICHMENT_FIELD_COUNT] {
        [
            &self.nome_sobrenome,
            &self.cargo,
            &self.empresa,
            &self.site,
            &self.email_1,
            &self.email_2,
            &self.email_3,
            &self.telefone_1,
            &self.telefone_2,
            &self.telefone_3_lusha,
            &self.telefone_4_apollo,
            &self.telefone_5_google,
            &self.telefone_assertiva,
            &self.whatsapp,
            &self.regioes_administrativas_cidade,
            &self.estado,
            &self.pais,
            &self.segmento,
            &self.empresa_media_colaboradores,
            &self.linkedin_contato,
            &self.linkedin_empresa,
            &self.insight,
            &self.sugestao_abordagem,
        ]
    }

    /// True when every field is empty (e.g. a blanked malformed response).
    pub fn is_blank(&self) -> bool {
        self.values().iter().all(|v| v.is_empty())
    }
}

// ============ Database Models ============

/// A stored lead. Rows are inserted and deleted wholesale, never updated.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Lead {
    /// Autoincrement id; insertion order equals id order.
    pub id: i64,
    /// Raw text the lead was enriched from.
    pub input_data: String,
    pub nome_sobrenome: String,
    pub cargo: String,
    pub empresa: String,
    pub site: String,
    pub email_1: String,
    pub email_2: String,
    pub email_3: String,
    pub telefone_1: String,
    pub telefone_2: String,
    pub telefone_3_lusha: String,
    pub telefone_4_apollo: String,
    pub telefone_5_google: String,
    pub telefone_assertiva: String,
    pub whatsapp: String,
    pub regioes_administrativas_cidade: String,
    pub estado: String,
    pub pais: String,
    pub segmento: String,
    pub empresa_media_colaboradores: String,
    pub linkedin_contato: String,
    pub linkedin_empresa: String,
    pub insight: String,
    pub sugestao_abordagem: String,
    /// Set by the store at insert time.
    pub created_at: DateTime<Utc>,
}

impl Lead {
    /// The enrichment attributes of this lead, without id, input or timestamp.
    pub fn enrichment(&self) -> EnrichmentResult {
        EnrichmentResult {
            nome_sobrenome: self.nome_sobrenome.clone(),
            cargo: self.cargo.clone(),
            empresa: self.empresa.clone(),
            site: self.site.clone(),
            email_1: self.email_1.clone(),
            email_2: self.email_2.clone(),
            email_3: self.email_3.clone(),
            telefone_1: self.telefone_1.clone(),
            telefone_2: self.telefone_2.clone(),
            telefone_3_lusha: self.telefone_3_lusha.clone(),
            telefone_4_apollo: self.telefone_4_apollo.clone(),
            telefone_5_google: self.telefone_5_google.clone(),
            telefone_assertiva: self.telefone_assertiva.clone(),
            whatsapp: self.whatsapp.clone(),
            regioes_administrativas_cidade: self.regioes_administrativas_cidade.clone(),
            estado: self.estado.clone(),
            pais: self.pais.clone(),
            segmento: self.segmento.clone(),
            empresa_media_colaboradores: self.empresa_media_colaboradores.clone(),
            linkedin_contato: self.linkedin_contato.clone(),
            linkedin_empresa: self.linkedin_empresa.clone(),
            insight: self.insight.clone(),
            sugestao_abordagem: self.sugestao_abordagem.clone(),
        }
    }

    /// Case-insensitive substring search over company, raw input and contact name.
    ///
    /// An empty term matches every lead.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        [&self.empresa, &self.input_data, &self.nome_sobrenome]
            .iter()
            .any(|haystack| haystack.to_lowercase().contains(&needle))
    }
}

// ============ API Request/Response Models ============

/// Body of `POST /api/leads`: the raw input plus the enrichment keys, flattened.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct NewLead {
    #[serde(default, deserialize_with = "lenient_string")]
    pub input_data: String,
    #[serde(flatten)]
    pub enrichment: EnrichmentResult,
}

impl NewLead {
    pub fn new(input_data: impl Into<String>, enrichment: EnrichmentResult) -> Self {
        Self {
            input_data: input_data.into(),
            enrichment,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatedLead {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteResult {
    pub success: bool,
}

/// Body of `POST /api/leads/enrich`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EnrichRequest {
    pub input: String,
}
