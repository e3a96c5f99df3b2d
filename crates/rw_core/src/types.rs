use serde::{Deserialize, Serialize};

pub const TITLE_MAX_CHARS: usize = 60;
pub const LEDE_MAX_CHARS: usize = 250;

/// The structured article produced for one raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleOutput {
    pub title: String,
    pub lede: String,
    pub hook: String,
    pub section1: Section,
    pub section2: Section,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub intertitle: String,
    pub paragraph: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LengthWarning {
    pub field: &'static str,
    pub len: usize,
    pub max: usize,
}

impl ArticleOutput {
    /// Plain-text layout used by the "copy all" action.
    pub fn to_plain_text(&self) -> String {
        format!(
            "Titre : {}\n\nChapeau : {}\n\nAccroche : {}\n\n{}\n{}\n\n{}\n{}",
            self.title,
            self.lede,
            self.hook,
            self.section1.intertitle,
            self.section1.paragraph,
            self.section2.intertitle,
            self.section2.paragraph,
        )
    }

    /// Fields longer than their intended size. The article is still usable.
    pub fn length_warnings(&self) -> Vec<LengthWarning> {
        [
            ("title", &self.title, TITLE_MAX_CHARS),
            ("lede", &self.lede, LEDE_MAX_CHARS),
        ]
        .into_iter()
        .filter_map(|(field, value, max)| {
            let len = value.chars().count();
            (len > max).then_some(LengthWarning { field, len, max })
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> ArticleOutput {
        ArticleOutput {
            title: "Le maire promet des investissements".to_string(),
            lede: "La municipalité s'engage.".to_string(),
            hook: "« Nous investirons », a-t-il déclaré.".to_string(),
            section1: Section {
                intertitle: "Une annonce attendue".to_string(),
                paragraph: "Hier, le maire a pris la parole.".to_string(),
            },
            section2: Section {
                intertitle: "Et maintenant ?".to_string(),
                paragraph: "Le budget sera voté en juin.".to_string(),
            },
        }
    }

    #[test]
    fn test_plain_text_layout() {
        let expected = "Titre : Le maire promet des investissements\n\
\n\
Chapeau : La municipalité s'engage.\n\
\n\
Accroche : « Nous investirons », a-t-il déclaré.\n\
\n\
Une annonce attendue\n\
Hier, le maire a pris la parole.\n\
\n\
Et maintenant ?\n\
Le budget sera voté en juin.";
        assert_eq!(article().to_plain_text(), expected);
    }

    #[test]
    fn test_length_warnings() {
        let mut article = article();
        assert!(article.length_warnings().is_empty());

        article.title = "é".repeat(TITLE_MAX_CHARS);
        assert!(article.length_warnings().is_empty());

        article.title.push('!');
        let warnings = article.length_warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "title");
        assert_eq!(warnings[0].len, TITLE_MAX_CHARS + 1);
    }

    #[test]
    fn test_article_json_keys() {
        let value = serde_json::to_value(article()).unwrap();
        for key in ["title", "lede", "hook", "section1", "section2"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        assert!(value["section1"]["intertitle"].is_string());
        assert!(value["section2"]["paragraph"].is_string());
    }
}
