use std::fmt;
use std::str::FromStr;

use rw_core::{Error, Tone};

const PERSONA: &str = "Tu es un assistant de rédaction expert, spécialisé dans la transformation de textes bruts en articles journalistiques de haute qualité.";

const MISSION: &str = "**Mission :** Analyse le texte brut fourni ci-dessous et réécris-le intégralement en respectant les contraintes suivantes.\n**Contrainte de style impérative :** Tu dois adopter le ton et le style suivants :";

const FORMAT_CONTRACT: &str = "**Contrainte de format de sortie :** Ta réponse DOIT être un objet JSON valide et rien d'autre. Ne renvoie AUCUN texte avant ou après l'objet JSON, et n'utilise pas de formatage Markdown comme ```json.\nL'objet JSON doit avoir la structure suivante :\n{ \"title\": \"string\", \"lede\": \"string\", \"hook\": \"string\", \"section1\": { \"intertitle\": \"string\", \"paragraph\": \"string\" }, \"section2\": { \"intertitle\": \"string\", \"paragraph\": \"string\" } }";

const QUOTES_STRICT: &str = "**RÈGLE - GESTION DES CITATIONS (VERBATIM) :**\nSi le texte brut de l'utilisateur contient des passages entre guillemets français (« ... »), tu dois les traiter comme des citations directes et sacrées.\n1.  **Intégration Obligatoire :** Tu DOIS intégrer ces citations telles quelles dans l'article généré, là où c'est logiquement pertinent.\n2.  **Préservation du Contenu :** Tu n'as PAS le droit de modifier le vocabulaire, la syntaxe, ou la structure de la phrase à l'intérieur des guillemets.\n3.  **Correction Orthographique Autorisée :** Tu es UNIQUEMENT autorisé à corriger discrètement les fautes d'orthographe à l'intérieur des guillemets, mais seulement si cela ne change en rien le sens ou le style original de la citation. Le reste doit être identique.";

const QUOTES_BRIEF: &str = "**RÈGLE - GESTION DES CITATIONS (VERBATIM) :**\nSi le texte brut de l'utilisateur contient des passages entre guillemets français (« ... »), tu dois les traiter comme des citations directes et sacrées. Intègre-les telles quelles, en ne corrigeant que l'orthographe si nécessaire.";

const SEPARATOR: &str = "---";

/// How the prompt treats «guillemets» quotations found in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteRule {
    /// Quotations are kept word for word; only spelling may be fixed.
    #[default]
    Strict,
    /// One-paragraph version of the same rule.
    Brief,
    Off,
}

impl QuoteRule {
    fn text(self) -> Option<&'static str> {
        match self {
            QuoteRule::Strict => Some(QUOTES_STRICT),
            QuoteRule::Brief => Some(QUOTES_BRIEF),
            QuoteRule::Off => None,
        }
    }
}

impl FromStr for QuoteRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(QuoteRule::Strict),
            "brief" => Ok(QuoteRule::Brief),
            "off" | "none" => Ok(QuoteRule::Off),
            _ => Err(Error::Config(format!(
                "Invalid quote rule '{}', expected strict, brief or off",
                s
            ))),
        }
    }
}

impl fmt::Display for QuoteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QuoteRule::Strict => "strict",
            QuoteRule::Brief => "brief",
            QuoteRule::Off => "off",
        })
    }
}

/// Shape of the request a provider sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// A single user turn holding every instruction.
    Combined,
    /// Persona and output format as a system message, the rest as the user turn.
    Chat,
}

#[derive(Debug, Clone)]
pub struct Prompt {
    pub tone: Tone,
    pub source: String,
    quote_rule: QuoteRule,
}

impl Prompt {
    fn style_block(&self) -> String {
        format!(
            "{}\n{}\nTON : {}\nDÉFINITION DU STYLE À APPLIQUER : {}\n{}",
            MISSION,
            SEPARATOR,
            self.tone.id().to_uppercase(),
            self.tone.description(),
            SEPARATOR
        )
    }

    fn source_block(&self) -> String {
        format!(
            "**Texte brut à transformer :**\n{}\n{}\n{}",
            SEPARATOR, self.source, SEPARATOR
        )
    }

    /// Every instruction in one message, for single-turn endpoints.
    pub fn combined(&self) -> String {
        let mut blocks = vec![PERSONA.to_string(), self.style_block()];
        blocks.extend(self.quote_rule.text().map(str::to_string));
        blocks.push(FORMAT_CONTRACT.to_string());
        blocks.push(self.source_block());
        blocks.join("\n")
    }

    pub fn system(&self) -> String {
        format!("{}\n{}", PERSONA, FORMAT_CONTRACT)
    }

    pub fn user(&self) -> String {
        let mut blocks = vec![self.style_block()];
        blocks.extend(self.quote_rule.text().map(str::to_string));
        blocks.push(self.source_block());
        blocks.join("\n")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder {
    quote_rule: QuoteRule,
}

impl PromptBuilder {
    pub fn new(quote_rule: QuoteRule) -> Self {
        Self { quote_rule }
    }

    pub fn build(&self, raw_text: &str, tone: Tone) -> Prompt {
        Prompt {
            tone,
            source: raw_text.to_string(),
            quote_rule: self.quote_rule,
        }
    }
}
