// src/models/conversation.rs
use crate::error::{AppError, AppResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Formato fixo de `data_horario`, na DB e no JSON.
pub const FORMATO_DATA_HORARIO: &str = "%Y-%m-%d %H:%M:%S";
const FORMATO_DATA: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub name: String,
    #[serde(with = "formato_data_horario")]
    pub data_horario: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct NovaConversation {
    pub name: String,
    #[serde(default, with = "formato_data_horario::opcional")]
    pub data_horario: Option<NaiveDateTime>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConversationAtualizacao {
    pub name: Option<String>,
    #[serde(default, with = "formato_data_horario::opcional")]
    pub data_horario: Option<NaiveDateTime>,
}

impl Conversation {
    pub fn aplicar(&mut self, alteracoes: ConversationAtualizacao) {
        if let Some(name) = alteracoes.name {
            self.name = name;
        }
        if let Some(data_horario) = alteracoes.data_horario {
            self.data_horario = truncar_segundos(data_horario);
        }
    }
}

/// Texto gravado na coluna `data_horario`. Ordem lexicográfica == ordem cronológica.
pub fn formatar_data_horario(data_horario: &NaiveDateTime) -> String {
    data_horario.format(FORMATO_DATA_HORARIO).to_string()
}

pub fn truncar_segundos(data_horario: NaiveDateTime) -> NaiveDateTime {
    data_horario.with_nanosecond(0).unwrap_or(data_horario)
}

pub fn agora() -> NaiveDateTime {
    truncar_segundos(Utc::now().naive_utc())
}

/// Parâmetros `?start_date=&end_date=` do filtro por período.
#[derive(Debug, Deserialize)]
pub struct FiltroPeriodo {
    pub start_date: String,
    pub end_date: String,
}

impl FiltroPeriodo {
    /// Intervalo fechado `[início, fim]`. Uma data sem hora cobre o dia inteiro.
    pub fn intervalo(&self) -> AppResult<(NaiveDateTime, NaiveDateTime)> {
        let inicio = interpretar_limite(&self.start_date, NaiveTime::MIN)?;
        let fim = interpretar_limite(
            &self.end_date,
            NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN),
        )?;
        if inicio > fim {
            return Err(AppError::Validacao(format!(
                "start_date ({}) é posterior a end_date ({})",
                self.start_date, self.end_date
            )));
        }
        Ok((inicio, fim))
    }
}

fn interpretar_limite(texto: &str, hora_se_so_data: NaiveTime) -> AppResult<NaiveDateTime> {
    let texto = texto.trim();
    if let Ok(data_horario) = NaiveDateTime::parse_from_str(texto, FORMATO_DATA_HORARIO) {
        return Ok(data_horario);
    }
    NaiveDate::parse_from_str(texto, FORMATO_DATA)
        .map(|data| data.and_time(hora_se_so_data))
        .map_err(|_| {
            AppError::Validacao(format!(
                "Data '{}' inválida; use 'YYYY-MM-DD HH:MM:SS' ou 'YYYY-MM-DD'",
                texto
            ))
        })
}

pub mod formato_data_horario {
    use super::FORMATO_DATA_HORARIO;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(valor: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&valor.format(FORMATO_DATA_HORARIO).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let texto = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&texto, FORMATO_DATA_HORARIO).map_err(serde::de::Error::custom)
    }

    pub mod opcional {
        use super::FORMATO_DATA_HORARIO;
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer};

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            Option::<String>::deserialize(d)?
                .map(|texto| {
                    NaiveDateTime::parse_from_str(&texto, FORMATO_DATA_HORARIO)
                        .map_err(serde::de::Error::custom)
                })
                .transpose()
        }
    }
}
