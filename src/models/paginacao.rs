// src/models/paginacao.rs
use serde::Deserialize;

pub const LIMIT_PADRAO: i64 = 10;
pub const LIMIT_MAXIMO: i64 = 100;

/// Parâmetros `?offset=&limit=` das listagens.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Paginacao {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl Paginacao {
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    // Limite negativo no SQLite significa "sem limite", por isso o piso em 0.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(LIMIT_PADRAO).clamp(0, LIMIT_MAXIMO)
    }
}

#[cfg(test)]
impl Paginacao {
    pub fn new(offset: i64, limit: i64) -> Self {
        Paginacao {
            offset: Some(offset),
            limit: Some(limit),
        }
    }
}
