//! Keyword classification for untagged assistant messages
//!
//! Rules are checked in order and the first match wins:
//! - `assistant_inicial`: welcome text, or a greeting near the start
//! - `emprestimo_agent`: a loan together with an approval or installment
//! - `file_search_agent`: transactions or balances
//! - `web_search_agent`: exchange rates
//! - `assistant_geral`: everything else
//!
//! This is a best-effort heuristic for old records, not ground truth.

use super::label::AgentLabel;

/// Markers anywhere in the content that identify a welcome message
const WELCOME_INDICATORS: &[&str] = &["bem-vindo"];

/// Greetings only count inside the opening window
const GREETING_INDICATORS: &[&str] = &["olá"];

/// Size of the opening window, in characters
const GREETING_WINDOW: usize = 50;

const LOAN_INDICATORS: &[&str] = &["empréstimo"];

/// A loan mention only counts alongside one of these
const LOAN_OUTCOME_INDICATORS: &[&str] = &["aprovado", "parcela"];

const STATEMENT_INDICATORS: &[&str] = &["transação", "saldo"];

const MARKET_INDICATORS: &[&str] = &["cotação", "dólar"];

/// Assign an agent label to assistant message content
pub fn classify(content: &str) -> AgentLabel {
    let content_lower = content.to_lowercase();

    if contains_any(&content_lower, WELCOME_INDICATORS) || contains_any(&opening(content), GREETING_INDICATORS) {
        return AgentLabel::AssistantInicial;
    }

    if contains_any(&content_lower, LOAN_INDICATORS) && contains_any(&content_lower, LOAN_OUTCOME_INDICATORS) {
        return AgentLabel::EmprestimoAgent;
    }

    if contains_any(&content_lower, STATEMENT_INDICATORS) {
        return AgentLabel::FileSearchAgent;
    }

    if contains_any(&content_lower, MARKET_INDICATORS) {
        return AgentLabel::WebSearchAgent;
    }

    AgentLabel::AssistantGeral
}

/// Lowercased first `GREETING_WINDOW` characters of the content
fn opening(content: &str) -> String {
    content.chars().take(GREETING_WINDOW).collect::<String>().to_lowercase()
}

fn contains_any(content: &str, indicators: &[&str]) -> bool {
    indicators.iter().any(|ind| content.contains(ind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_preempts_loan() {
        assert_eq!(
            classify("Bem-vindo! Seu empréstimo foi aprovado."),
            AgentLabel::AssistantInicial
        );
    }

    #[test]
    fn test_greeting_in_opening_window() {
        assert_eq!(classify("Olá Maria, como posso ajudar?"), AgentLabel::AssistantInicial);
    }

    #[test]
    fn test_greeting_outside_opening_window() {
        let content = format!("{}olá", "x".repeat(GREETING_WINDOW));
        assert_eq!(classify(&content), AgentLabel::AssistantGeral);

        let content = format!("{}olá", "x".repeat(GREETING_WINDOW - 3));
        assert_eq!(classify(&content), AgentLabel::AssistantInicial);
    }

    #[test]
    fn test_opening_window_counts_characters() {
        // 47 two-byte characters still leave room for the greeting
        let content = format!("{}olá", "é".repeat(GREETING_WINDOW - 3));
        assert_eq!(classify(&content), AgentLabel::AssistantInicial);
    }

    #[test]
    fn test_loan_approved() {
        assert_eq!(
            classify("Seu empréstimo foi aprovado, parcela de R$500."),
            AgentLabel::EmprestimoAgent
        );
        assert_eq!(classify("EMPRÉSTIMO APROVADO"), AgentLabel::EmprestimoAgent);
    }

    #[test]
    fn test_loan_without_outcome_falls_through() {
        assert_eq!(classify("Quer saber sobre empréstimo?"), AgentLabel::AssistantGeral);
        assert_eq!(
            classify("Sobre o empréstimo, seu saldo não permite."),
            AgentLabel::FileSearchAgent
        );
    }

    #[test]
    fn test_statement() {
        assert_eq!(
            classify("Sua transação foi processada, saldo atualizado."),
            AgentLabel::FileSearchAgent
        );
    }

    #[test]
    fn test_market() {
        assert_eq!(classify("A cotação do dólar hoje é R$5,20."), AgentLabel::WebSearchAgent);
    }

    #[test]
    fn test_statement_preempts_market() {
        assert_eq!(classify("Seu saldo em dólar é 10."), AgentLabel::FileSearchAgent);
    }

    #[test]
    fn test_default() {
        assert_eq!(classify("Posso ajudar com outra coisa?"), AgentLabel::AssistantGeral);
        assert_eq!(classify(""), AgentLabel::AssistantGeral);
    }

    #[test]
    fn test_only_backfillable_labels_produced() {
        let samples = [
            "",
            "Bem-vindo",
            "olá",
            "empréstimo aprovado",
            "saldo",
            "dólar",
            "guardrail bloqueou",
            "erro interno",
            "análise de risco",
        ];
        for sample in samples {
            assert!(classify(sample).is_backfillable(), "sample: {}", sample);
        }
    }
}
