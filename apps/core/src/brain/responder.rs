//! Suggested-reply synthesis.
//!
//! Maps a classification plus content cues to one of a fixed set of reply
//! templates. The containment checks run over the original (unnormalized)
//! content, lowercased, and the branch order is a deliberate tie-break
//! policy: the first matching cue wins.

use crate::models::Classification;

const REPLY_URGENT: &str = "Obrigado pelo seu email. Entendo a importância e urgência da solicitação. Vou priorizar esta demanda e retornar com uma resposta detalhada o mais breve possível.";
const REPLY_MEETING: &str = "Obrigado pela solicitação de reunião. Vou verificar minha agenda e retornar com opções de horários que funcionem para ambos. Aguarde meu retorno em breve.";
const REPLY_QUESTION: &str = "Obrigado pela sua pergunta. Vou analisar os pontos levantados e retornar com uma resposta detalhada. Se precisar de esclarecimentos adicionais, por favor me informe.";
const REPLY_PROBLEM: &str = "Obrigado por reportar esta questão. Vou investigar o problema imediatamente e trabalhar em uma solução. Manterei você informado sobre o progresso.";
const REPLY_PRODUCTIVE_DEFAULT: &str = "Obrigado pelo seu email. Recebi sua solicitação e vou trabalhar nisso. Retornarei com uma resposta completa em breve.";

const REPLY_GRATITUDE: &str = "De nada! Foi um prazer ajudar. Se precisar de mais alguma coisa, não hesite em entrar em contato.";
const REPLY_CONGRATULATIONS: &str = "Muito obrigado pelas felicitações! Fico feliz em compartilhar esta conquista com você.";
const REPLY_INFORMATIONAL: &str = "Obrigado pela informação. Recebi o comunicado e tomarei as ações necessárias conforme apropriado.";
const REPLY_UNPRODUCTIVE_DEFAULT: &str = "Obrigado pelo seu email. Recebi a informação e fico à disposição se precisar de algo mais.";

// Cue groups, in priority order per class.
const URGENCY_CUES: &[&str] = &["urgente", "importante", "prioridade"];
const MEETING_CUES: &[&str] = &["reunião", "meeting", "agenda"];
const QUESTION_CUES: &[&str] = &["pergunta", "dúvida", "questão", "?"];
const PROBLEM_CUES: &[&str] = &["problema", "erro", "bug", "falha"];

const GRATITUDE_CUES: &[&str] = &["obrigado", "obrigada", "agradec"];
const CONGRATULATION_CUES: &[&str] = &["parabéns", "felicitações"];
const INFORMATIONAL_CUES: &[&str] = &["informação", "comunicado", "aviso"];

/// Picks the reply template for a classified email.
pub fn synthesize(classification: Classification, content: &str) -> String {
    let content_lower = content.to_lowercase();
    let contains_any =
        |cues: &[&str]| cues.iter().any(|cue| content_lower.contains(cue));

    let reply = match classification {
        Classification::Productive => {
            if contains_any(URGENCY_CUES) {
                REPLY_URGENT
            } else if contains_any(MEETING_CUES) {
                REPLY_MEETING
            } else if contains_any(QUESTION_CUES) {
                REPLY_QUESTION
            } else if contains_any(PROBLEM_CUES) {
                REPLY_PROBLEM
            } else {
                REPLY_PRODUCTIVE_DEFAULT
            }
        }
        Classification::Unproductive => {
            if contains_any(GRATITUDE_CUES) {
                REPLY_GRATITUDE
            } else if contains_any(CONGRATULATION_CUES) {
                REPLY_CONGRATULATIONS
            } else if contains_any(INFORMATIONAL_CUES) {
                REPLY_INFORMATIONAL
            } else {
                REPLY_UNPRODUCTIVE_DEFAULT
            }
        }
    };

    reply.to_string()
}
