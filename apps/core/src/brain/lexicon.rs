//! Weighted keyword tables for both triage classes.
//!
//! Each category carries a fixed weight multiplier applied per keyword
//! occurrence. The tables are Portuguese-first because that is the corpus the
//! scorer was tuned on; English loanwords that show up in Brazilian corporate
//! mail ("meeting", "deadline", "bug", "fyi") are included where they are
//! common.
//!
//! Matching is done by plain substring counting on normalized text, so every
//! keyword here must be lowercase.

/// Weight applied to the high-signal categories.
pub const STRONG_WEIGHT: f64 = 3.0;

/// Weight applied to every other category.
pub const REGULAR_WEIGHT: f64 = 2.0;

/// Categories of keywords that indicate an email requires action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductiveCategory {
    Action,
    Urgency,
    Request,
    Meeting,
    Decision,
    Problem,
    Question,
    ResponseNeeded,
}

impl ProductiveCategory {
    pub const ALL: [ProductiveCategory; 8] = [
        ProductiveCategory::Action,
        ProductiveCategory::Urgency,
        ProductiveCategory::Request,
        ProductiveCategory::Meeting,
        ProductiveCategory::Decision,
        ProductiveCategory::Problem,
        ProductiveCategory::Question,
        ProductiveCategory::ResponseNeeded,
    ];

    /// Keyword list for this category.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            ProductiveCategory::Action => &[
                "ação",
                "fazer",
                "implementar",
                "desenvolver",
                "criar",
                "modificar",
                "alterar",
                "corrigir",
            ],
            ProductiveCategory::Urgency => &[
                "urgente",
                "importante",
                "prioridade",
                "deadline",
                "prazo",
                "imediato",
            ],
            ProductiveCategory::Request => &[
                "solicito",
                "preciso",
                "necessário",
                "requer",
                "pedido",
                "solicitação",
            ],
            ProductiveCategory::Meeting => &[
                "reunião",
                "meeting",
                "encontro",
                "agenda",
                "agendamento",
                "horário",
            ],
            ProductiveCategory::Decision => &[
                "decisão",
                "aprovar",
                "autorizar",
                "confirmar",
                "validar",
                "aceitar",
            ],
            ProductiveCategory::Problem => {
                &["problema", "erro", "bug", "falha", "defeito", "issue"]
            }
            ProductiveCategory::Question => &[
                "pergunta",
                "dúvida",
                "questão",
                "esclarecimento",
                "como",
                "quando",
                "onde",
            ],
            ProductiveCategory::ResponseNeeded => &[
                "resposta",
                "responder",
                "retorno",
                "feedback",
                "confirmação",
            ],
        }
    }

    /// Weight multiplier applied per keyword occurrence.
    pub fn weight(self) -> f64 {
        match self {
            ProductiveCategory::Action
            | ProductiveCategory::Urgency
            | ProductiveCategory::Request => STRONG_WEIGHT,
            _ => REGULAR_WEIGHT,
        }
    }
}

/// Categories of keywords that indicate an informational or courtesy email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnproductiveCategory {
    Courtesy,
    Informational,
    Social,
    Automated,
    Fyi,
}

impl UnproductiveCategory {
    pub const ALL: [UnproductiveCategory; 5] = [
        UnproductiveCategory::Courtesy,
        UnproductiveCategory::Informational,
        UnproductiveCategory::Social,
        UnproductiveCategory::Automated,
        UnproductiveCategory::Fyi,
    ];

    /// Keyword list for this category.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            UnproductiveCategory::Courtesy => &[
                "obrigado",
                "parabéns",
                "felicitações",
                "sucesso",
                "gratidão",
            ],
            UnproductiveCategory::Informational => &[
                "informação",
                "comunicado",
                "aviso",
                "notificação",
                "atualização",
            ],
            UnproductiveCategory::Social => &[
                "aniversário",
                "festa",
                "evento social",
                "confraternização",
            ],
            UnproductiveCategory::Automated => &[
                "automático",
                "sistema",
                "newsletter",
                "boletim",
                "relatório automático",
            ],
            UnproductiveCategory::Fyi => &[
                "para conhecimento",
                "fyi",
                "informativo",
                "apenas informando",
            ],
        }
    }

    /// Weight multiplier applied per keyword occurrence.
    pub fn weight(self) -> f64 {
        match self {
            UnproductiveCategory::Courtesy | UnproductiveCategory::Automated => STRONG_WEIGHT,
            _ => REGULAR_WEIGHT,
        }
    }
}

/// Startup sanity check over both tables: every category must carry at least
/// one keyword, and every keyword must be lowercase (substring matching runs
/// against lowercased text).
pub fn validate_lexicon() -> Result<(), String> {
    for category in ProductiveCategory::ALL {
        check_keywords(&format!("{:?}", category), category.keywords())?;
    }
    for category in UnproductiveCategory::ALL {
        check_keywords(&format!("{:?}", category), category.keywords())?;
    }
    Ok(())
}

fn check_keywords(category: &str, keywords: &[&str]) -> Result<(), String> {
    if keywords.is_empty() {
        return Err(format!("keyword category {} is empty", category));
    }
    for keyword in keywords {
        if keyword.trim().is_empty() {
            return Err(format!("keyword category {} contains a blank entry", category));
        }
        if keyword.chars().any(|c| c.is_uppercase()) {
            return Err(format!(
                "keyword {:?} in category {} is not lowercase",
                keyword, category
            ));
        }
    }
    Ok(())
}
