use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of yes/no questions asked for every category.
pub const QUESTIONS_PER_CATEGORY: usize = 6;

/// Fixed evaluation dimensions of the guard duty report, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "POLICÍA", alias = "policia")]
    Policia,
    #[serde(rename = "DISCIPLINA", alias = "disciplina")]
    Disciplina,
    #[serde(rename = "INTERES", alias = "interes")]
    Interes,
    #[serde(rename = "RESPONSABILIDAD", alias = "responsabilidad")]
    Responsabilidad,
    #[serde(rename = "INICIATIVA", alias = "iniciativa")]
    Iniciativa,
    #[serde(rename = "CONFIANZA EN SI MISMO", alias = "confianza_en_si_mismo")]
    ConfianzaEnSiMismo,
    #[serde(
        rename = "ACTITUD CON LOS SUBORDINADOS",
        alias = "actitud_con_los_subordinados"
    )]
    ActitudConLosSubordinados,
    #[serde(rename = "ACTITUD CON EL MANDO", alias = "actitud_con_el_mando")]
    ActitudConElMando,
    #[serde(rename = "COMPETENCIA / EFICACIA", alias = "competencia_eficacia")]
    CompetenciaEficacia,
    #[serde(rename = "TRATO", alias = "trato")]
    Trato,
    #[serde(rename = "RESISTENCIA A LA FATIGA", alias = "resistencia_a_la_fatiga")]
    ResistenciaALaFatiga,
}

impl Category {
    pub const COUNT: usize = 11;

    pub const fn ordered() -> [Self; Self::COUNT] {
        [
            Self::Policia,
            Self::Disciplina,
            Self::Interes,
            Self::Responsabilidad,
            Self::Iniciativa,
            Self::ConfianzaEnSiMismo,
            Self::ActitudConLosSubordinados,
            Self::ActitudConElMando,
            Self::CompetenciaEficacia,
            Self::Trato,
            Self::ResistenciaALaFatiga,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Policia => "POLICÍA",
            Self::Disciplina => "DISCIPLINA",
            Self::Interes => "INTERES",
            Self::Responsabilidad => "RESPONSABILIDAD",
            Self::Iniciativa => "INICIATIVA",
            Self::ConfianzaEnSiMismo => "CONFIANZA EN SI MISMO",
            Self::ActitudConLosSubordinados => "ACTITUD CON LOS SUBORDINADOS",
            Self::ActitudConElMando => "ACTITUD CON EL MANDO",
            Self::CompetenciaEficacia => "COMPETENCIA / EFICACIA",
            Self::Trato => "TRATO",
            Self::ResistenciaALaFatiga => "RESISTENCIA A LA FATIGA",
        }
    }

    /// Identifier safe for URLs and HTML form field names.
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Policia => "policia",
            Self::Disciplina => "disciplina",
            Self::Interes => "interes",
            Self::Responsabilidad => "responsabilidad",
            Self::Iniciativa => "iniciativa",
            Self::ConfianzaEnSiMismo => "confianza_en_si_mismo",
            Self::ActitudConLosSubordinados => "actitud_con_los_subordinados",
            Self::ActitudConElMando => "actitud_con_el_mando",
            Self::CompetenciaEficacia => "competencia_eficacia",
            Self::Trato => "trato",
            Self::ResistenciaALaFatiga => "resistencia_a_la_fatiga",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|category| category.slug() == slug)
    }

    /// Resolves free-form input (label or slug, any case, stray whitespace) to a category.
    pub fn lookup(value: &str) -> Option<Self> {
        let normalized = normalize_name(value);
        Self::ordered().into_iter().find(|category| {
            normalize_name(category.label()) == normalized || category.slug() == normalized
        })
    }

    /// Zero-based position in the catalog.
    pub const fn position(self) -> usize {
        self as usize
    }

    /// Checkbox label for question `index` (zero-based).
    pub fn question_label(self, index: usize) -> String {
        format!("{} - Pregunta {}", self.label(), index + 1)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn normalize_name(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}
