// src/models/turma.rs
use super::{aluno::Aluno, conversation::Conversation, tutor::Tutor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Turma {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub level: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Vazio apenas até um tutor ser atribuído.
    pub tutor_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct NovaTurma {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub tutor_id: Option<i64>,
}

/// `null` em `level` ou `tutor_id` apaga o valor; `"tutor_id": null` deixa a turma sem tutor.
#[derive(Debug, Default, Deserialize)]
pub struct TurmaAtualizacao {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "super::campo_anulavel::deserialize")]
    pub level: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::campo_anulavel::deserialize")]
    pub tutor_id: Option<Option<i64>>,
}

impl Turma {
    /// Aplica a atualização parcial e renova `updated_at`.
    /// Devolve `true` se o tutor da turma mudou.
    pub fn aplicar(&mut self, alteracoes: TurmaAtualizacao, agora: DateTime<Utc>) -> bool {
        if let Some(title) = alteracoes.title {
            self.title = title;
        }
        if let Some(content) = alteracoes.content {
            self.content = content;
        }
        if let Some(level) = alteracoes.level {
            self.level = level;
        }
        let tutor_mudou = match alteracoes.tutor_id {
            Some(tutor_id) if self.tutor_id != tutor_id => {
                self.tutor_id = tutor_id;
                true
            }
            _ => false,
        };
        self.tocar(agora);
        tutor_mudou
    }

    // Nunca recua: relógios podem andar para trás entre pedidos.
    pub fn tocar(&mut self, agora: DateTime<Utc>) {
        self.updated_at = agora.max(self.updated_at);
    }
}

/// Turma com tutor, alunos e conversas carregados.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurmaDetalhada {
    #[serde(flatten)]
    pub turma: Turma,
    pub tutor: Option<Tutor>,
    pub alunos: Vec<AlunoComTutor>,
    pub conversations: Vec<Conversation>,
}

/// Aluno dentro de uma `TurmaDetalhada`, com o tutor embutido.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlunoComTutor {
    #[serde(flatten)]
    pub aluno: Aluno,
    pub tutor: Option<Tutor>,
}

/// Resposta de `GET /turmas/nome/{nome}`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct InfoTurma {
    pub turma_id: i64,
    pub title: String,
    pub tutor: Option<String>,
    pub language: Option<String>,
    pub level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantidadeAlunos {
    pub turma_id: i64,
    pub quantidade: i64,
}
