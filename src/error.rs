// src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Erro na base de dados: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Erro de migração da base de dados: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Erro de variável de ambiente: {0}")]
    EnvVarError(#[from] std::env::VarError),

    #[error("Configuração inválida: {0}")]
    Config(String),

    #[error("Erro ao processar password")]
    PasswordHashingError,

    /// O registo pedido (id, nome ou filho da turma indicada) não existe.
    #[error("{}", mensagem_nao_encontrado(.recurso))]
    NaoEncontrado { recurso: &'static str },

    /// O pai existe, mas a consulta por junção não devolveu linhas.
    #[error("{0}")]
    SemResultados(String),

    #[error("Dados inválidos: {0}")]
    Validacao(String),

    #[error("Conflito: {0}")]
    Conflito(String),

    #[error("Erro interno inesperado")]
    InternalServerError,
}

impl AppError {
    pub fn nao_encontrado(recurso: &'static str) -> Self {
        AppError::NaoEncontrado { recurso }
    }

    /// Violação de chave estrangeira, unicidade ou chave primária reportada pela DB.
    pub fn is_violacao_de_restricao(&self) -> bool {
        match self {
            AppError::SqlxError(sqlx::Error::Database(db_err)) => {
                db_err.is_foreign_key_violation() || db_err.is_unique_violation()
            }
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            AppError::NaoEncontrado { .. } | AppError::SemResultados(_) => {
                tracing::warn!("{}", self);
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AppError::Validacao(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Conflito(_) => {
                tracing::warn!("{}", self);
                (StatusCode::CONFLICT, self.to_string())
            }
            AppError::SqlxError(_) if self.is_violacao_de_restricao() => {
                tracing::warn!("Restrição da base de dados violada: {:?}", self);
                (
                    StatusCode::CONFLICT,
                    "Operação viola uma restrição de integridade dos dados.".to_string(),
                )
            }
            AppError::SqlxError(_) | AppError::SqlxMigrateError(_) => {
                tracing::error!("Erro processado: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Erro ao aceder aos dados.".to_string(),
                )
            }
            AppError::EnvVarError(_) | AppError::Config(_) => {
                tracing::error!("Erro processado: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Erro de configuração.".to_string(),
                )
            }
            AppError::PasswordHashingError => {
                tracing::error!("Erro processado: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Erro ao processar credenciais.".to_string(),
                )
            }
            AppError::InternalServerError => {
                tracing::error!("Erro processado: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

fn mensagem_nao_encontrado(recurso: &str) -> String {
    match recurso {
        "Turma" | "Conversa" => format!("{} não encontrada", recurso),
        _ => format!("{} não encontrado", recurso),
    }
}

// Tipo Result padrão para a aplicação
pub type AppResult<T = ()> = Result<T, AppError>;
