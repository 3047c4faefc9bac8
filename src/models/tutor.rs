// src/models/tutor.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Tutor {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Idioma configurado pelo tutor (usado na consulta de turma por nome).
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NovoTutor {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub language: Option<String>,
}

/// Atualização parcial: campos ausentes ficam como estão; `"language": null` apaga o idioma.
#[derive(Debug, Default, Deserialize)]
pub struct TutorAtualizacao {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "super::campo_anulavel::deserialize")]
    pub language: Option<Option<String>>,
}

impl Tutor {
    pub fn aplicar(&mut self, alteracoes: TutorAtualizacao) {
        if let Some(name) = alteracoes.name {
            self.name = name;
        }
        if let Some(email) = alteracoes.email {
            self.email = email;
        }
        if let Some(language) = alteracoes.language {
            self.language = language;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tutor() -> Tutor {
        Tutor {
            id: 1,
            name: "Ana".into(),
            email: "ana@exemplo.com".into(),
            language: Some("pt-BR".into()),
        }
    }

    #[test]
    fn aplicar_altera_apenas_campos_presentes() {
        let mut t = tutor();
        let alteracoes: TutorAtualizacao =
            serde_json::from_str(r#"{"email": "nova@exemplo.com"}"#).unwrap();
        t.aplicar(alteracoes);
        assert_eq!(t.name, "Ana");
        assert_eq!(t.email, "nova@exemplo.com");
        assert_eq!(t.language.as_deref(), Some("pt-BR"));
    }

    #[test]
    fn language_nulo_apaga_o_idioma() {
        let mut t = tutor();
        let alteracoes: TutorAtualizacao = serde_json::from_str(r#"{"language": null}"#).unwrap();
        assert_eq!(alteracoes.language, Some(None));
        t.aplicar(alteracoes);
        assert!(t.language.is_none());
        assert_eq!(t.name, "Ana");
    }

    #[test]
    fn novo_tutor_ignora_id_enviado_pelo_cliente() {
        let novo: NovoTutor =
            serde_json::from_str(r#"{"id": 99, "name": "Bia", "email": "b@x.com"}"#).unwrap();
        assert_eq!(novo.name, "Bia");
        assert!(novo.language.is_none());
    }
}
