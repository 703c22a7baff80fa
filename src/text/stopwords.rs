use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Language whose stop-word list the normalizer applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Portuguese,
    /// No built-in list; only `extra_stop_words` apply
    None,
}

/// NLTK Portuguese stop words.
pub const PORTUGUESE: &[&str] = &[
    "a", "à", "ao", "aos", "aquela", "aquelas", "aquele", "aqueles", "aquilo", "as", "às",
    "até", "com", "como", "da", "das", "de", "dela", "delas", "dele", "deles", "depois",
    "do", "dos", "e", "é", "ela", "elas", "ele", "eles", "em", "entre", "era", "eram",
    "éramos", "essa", "essas", "esse", "esses", "esta", "está", "estamos", "estão", "estar",
    "estas", "estava", "estavam", "estávamos", "este", "esteja", "estejam", "estejamos",
    "estes", "esteve", "estive", "estivemos", "estiver", "estivera", "estiveram",
    "estivéramos", "estiverem", "estivermos", "estivesse", "estivessem", "estivéssemos",
    "estou", "eu", "foi", "fomos", "for", "fora", "foram", "fôramos", "forem", "formos",
    "fosse", "fossem", "fôssemos", "fui", "há", "haja", "hajam", "hajamos", "hão",
    "havemos", "haver", "hei", "houve", "houvemos", "houver", "houvera", "houverá",
    "houveram", "houvéramos", "houverão", "houverei", "houverem", "houveremos",
    "houveria", "houveriam", "houveríamos", "houvermos", "houvesse", "houvessem",
    "houvéssemos", "isso", "isto", "já", "lhe", "lhes", "mais", "mas", "me", "mesmo",
    "meu", "meus", "minha", "minhas", "muito", "na", "não", "nas", "nem", "no", "nos",
    "nós", "nossa", "nossas", "nosso", "nossos", "num", "numa", "o", "os", "ou", "para",
    "pela", "pelas", "pelo", "pelos", "por", "qual", "quando", "que", "quem", "são", "se",
    "seja", "sejam", "sejamos", "sem", "ser", "será", "serão", "serei", "seremos", "seria",
    "seriam", "seríamos", "seu", "seus", "só", "somos", "sou", "sua", "suas", "também",
    "te", "tem", "tém", "temos", "tenha", "tenham", "tenhamos", "tenho", "terá", "terão",
    "terei", "teremos", "teria", "teriam", "teríamos", "teu", "teus", "teve", "tinha",
    "tinham", "tínhamos", "tive", "tivemos", "tiver", "tivera", "tiveram", "tivéramos",
    "tiverem", "tivermos", "tivesse", "tivessem", "tivéssemos", "tu", "tua", "tuas", "um",
    "uma", "você", "vocês", "vos",
];

/// Case-insensitive stop-word set.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words.into_iter().map(|w| w.as_ref().to_lowercase()).collect(),
        }
    }

    /// Built-in list for `language` merged with `extra`.
    pub fn for_language<S: AsRef<str>>(language: Language, extra: &[S]) -> Self {
        let builtin: &[&str] = match language {
            Language::Portuguese => PORTUGUESE,
            Language::None => &[],
        };
        let mut set = Self::new(builtin);
        set.words.extend(extra.iter().map(|w| w.as_ref().to_lowercase()));
        set
    }

    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portuguese_list_covers_common_function_words() {
        let sw = StopWords::for_language::<&str>(Language::Portuguese, &[]);
        for w in ["de", "para", "com", "não", "você", "também", "estão"] {
            assert!(sw.contains(w), "{w} should be a stop word");
        }
        assert!(!sw.contains("python"));
    }

    #[test]
    fn extras_are_lowercased_and_merged() {
        let sw = StopWords::for_language(Language::None, &["Vaga", "REQUISITOS"]);
        assert_eq!(sw.len(), 2);
        assert!(sw.contains("vaga"));
        assert!(sw.contains("requisitos"));
        assert!(!sw.contains("de"));
    }
}
