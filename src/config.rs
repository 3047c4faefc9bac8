// src/config.rs
use crate::error::{AppError, AppResult};
use std::{env, net::SocketAddr, str::FromStr};

const DATABASE_URL_PADRAO: &str = "sqlite://tutoria.db";
const PORTA_PADRAO: u16 = 3000;
const MAX_CONEXOES_PADRAO: u32 = 5;

/// Configuração lida do ambiente. O `.env` é carregado em `main`.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_conexoes: u32,
    pub bind_addr: SocketAddr,
    /// Listas por junção sem resultados respondem 404 em vez de `[]`.
    pub lista_vazia_404: bool,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DATABASE_URL_PADRAO.to_string());
        let max_conexoes = ler_var("DB_MAX_CONNECTIONS", MAX_CONEXOES_PADRAO)?;
        let bind_addr = ler_var("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], PORTA_PADRAO)))?;
        let lista_vazia_404 = ler_var("LISTA_VAZIA_404", true)?;
        let bcrypt_cost = ler_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?;

        Ok(Config {
            database_url,
            max_conexoes,
            bind_addr,
            lista_vazia_404,
            bcrypt_cost,
        })
    }
}

// Variável ausente usa o padrão; presente mas malformada é erro de configuração.
fn ler_var<T>(nome: &str, padrao: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(nome) {
        Ok(valor) => valor.trim().parse::<T>().map_err(|e| {
            AppError::Config(format!("Valor inválido para {}='{}': {}", nome, valor, e))
        }),
        Err(env::VarError::NotPresent) => Ok(padrao),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
impl Config {
    /// Configuração usada nos testes: custo bcrypt mínimo e 404 em listas vazias.
    pub fn para_testes() -> Self {
        Config {
            database_url: "sqlite::memory:".to_string(),
            max_conexoes: 1,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            lista_vazia_404: true,
            bcrypt_cost: 4,
        }
    }
}
