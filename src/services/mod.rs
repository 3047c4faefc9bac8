// src/services/mod.rs
pub mod aluno_service;
pub mod conversation_service;
pub mod senha_service;
pub mod turma_service;
pub mod tutor_service;

use crate::error::{AppError, AppResult};

/// Política para listas por junção sem linhas (ver `LISTA_VAZIA_404`).
/// Só é chamada depois de confirmada a existência do pai.
pub fn exigir_resultados<T>(itens: Vec<T>, lista_vazia_404: bool, mensagem: &str) -> AppResult<Vec<T>> {
    if itens.is_empty() && lista_vazia_404 {
        return Err(AppError::SemResultados(mensagem.to_string()));
    }
    Ok(itens)
}
