// src/models/mod.rs
pub mod aluno;
pub mod conversation;
pub mod paginacao;
pub mod turma;
pub mod tutor;

/// Distingue um campo anulável ausente (`None`) de um `null` explícito (`Some(None)`).
/// Usar com `#[serde(default, deserialize_with = "...")]`.
pub mod campo_anulavel {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(d: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(d).map(Some)
    }
}
