use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Editorial register requested for the generated article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    #[serde(rename = "informatif")]
    Informatif,
    #[serde(rename = "formel")]
    Formel,
    #[serde(rename = "narratif")]
    Narratif,
    #[serde(rename = "descriptif")]
    Descriptif,
    #[serde(rename = "émotionnel")]
    Emotionnel,
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::Informatif,
        Tone::Formel,
        Tone::Narratif,
        Tone::Descriptif,
        Tone::Emotionnel,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Tone::Informatif => "informatif",
            Tone::Formel => "formel",
            Tone::Narratif => "narratif",
            Tone::Descriptif => "descriptif",
            Tone::Emotionnel => "émotionnel",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tone::Informatif => "Informatif",
            Tone::Formel => "Formel",
            Tone::Narratif => "Narratif",
            Tone::Descriptif => "Descriptif",
            Tone::Emotionnel => "Émotionnel",
        }
    }

    /// Style definition inserted verbatim into the prompt.
    pub fn description(self) -> &'static str {
        match self {
            Tone::Informatif => "Style d'agence de presse (type AFP, Reuters). Neutre, factuel, objectif. Utilise la structure de la pyramide inversée (l'information la plus importante en premier). Phrases claires et concises. Pas d'opinion.",
            Tone::Formel => "Style des grands quotidiens nationaux (type Le Monde, Le Figaro). Vocabulaire soutenu et précis. Phrases complexes mais bien structurées. Ton analytique, distant et expert. Évite les familiarités et les expressions idiomatiques.",
            Tone::Narratif => "Style du journalisme \"long-form\" ou \"feature\" (type M le Magazine du Monde, The New Yorker). Raconte une histoire. Utilise des techniques de narration : scènes, personnages, dialogues (si présents dans le texte source), tension dramatique.",
            Tone::Descriptif => "Style du reportage ou de la critique (type Géo, Télérama). Riche en détails sensoriels. Utilise des adjectifs évocateurs et des métaphores pour peindre une image vivide dans l'esprit du lecteur. L'ambiance et l'atmosphère sont primordiales.",
            Tone::Emotionnel => "Style de l'article \"human interest\" ou de la chronique engagée (type Libération, certain journalisme de témoignage). Cherche à créer une connexion émotionnelle avec le lecteur. Utilise un champ lexical fort, centré sur le pathos. Peut inclure des questions rhétoriques et un point de vue plus personnel.",
        }
    }

    /// Lenient lookup: anything unrecognised falls back to [`Tone::Informatif`].
    pub fn resolve(tone: Option<&str>) -> Tone {
        tone.and_then(|t| t.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for Tone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "informatif" | "informative" => Ok(Tone::Informatif),
            "formel" | "formal" => Ok(Tone::Formel),
            "narratif" | "narrative" => Ok(Tone::Narratif),
            "descriptif" | "descriptive" => Ok(Tone::Descriptif),
            "émotionnel" | "emotionnel" | "emotional" => Ok(Tone::Emotionnel),
            _ => Err(Error::UnknownTone(s.to_string())),
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
