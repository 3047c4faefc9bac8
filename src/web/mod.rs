// src/web/mod.rs
pub mod aluno_handlers;
pub mod conversation_handlers;
pub mod routes;
pub mod turma_handlers;
pub mod tutor_handlers;

use serde::Serialize;

/// Corpo `{"ok": true}` das rotas DELETE.
#[derive(Debug, Serialize)]
pub struct Confirmacao {
    pub ok: bool,
}

impl Confirmacao {
    pub fn ok() -> Self {
        Confirmacao { ok: true }
    }
}
