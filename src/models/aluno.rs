// src/models/aluno.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Aluno {
    pub id: i64,
    pub nome: String,
    pub email: String,
    // Só o hash bcrypt é guardado, e nunca sai na resposta
    #[serde(skip_serializing, default)]
    pub senha_hash: String,
    pub nickname: String,
    pub turma_id: i64,
    /// Cópia do tutor da turma; reescrita sempre que a turma ou o seu tutor mudam.
    pub tutor_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NovoAluno {
    pub nome: String,
    pub email: String,
    pub senha: String,
    pub nickname: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AlunoAtualizacao {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub senha: Option<String>,
    pub nickname: Option<String>,
}

impl Aluno {
    /// Aplica os campos de texto presentes. A senha é tratada à parte (precisa de hash).
    pub fn aplicar(&mut self, alteracoes: AlunoAtualizacao, agora: DateTime<Utc>) {
        if let Some(nome) = alteracoes.nome {
            self.nome = nome;
        }
        if let Some(email) = alteracoes.email {
            self.email = email;
        }
        if let Some(nickname) = alteracoes.nickname {
            self.nickname = nickname;
        }
        self.tocar(agora);
    }

    pub fn tocar(&mut self, agora: DateTime<Utc>) {
        self.updated_at = agora.max(self.updated_at);
    }
}

#[derive(Debug, Deserialize)]
pub struct BuscaPorNome {
    pub texto: String,
}

#[derive(Debug, Deserialize)]
pub struct TrocaDeTurma {
    pub nova_turma_id: i64,
}
