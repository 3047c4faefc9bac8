// src/services/conversation_service.rs
use crate::{
    error::{AppError, AppResult},
    models::conversation::{
        self, formatar_data_horario, Conversation, ConversationAtualizacao, FiltroPeriodo,
        NovaConversation,
    },
    services::turma_service,
};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

async fn garantir_turma(conn: &mut SqliteConnection, turma_id: i64) -> AppResult<()> {
    if turma_service::find_turma_by_id(&mut *conn, turma_id)
        .await?
        .is_none()
    {
        return Err(AppError::nao_encontrado("Turma"));
    }
    Ok(())
}

/// Associa uma conversa à turma. Se já existe uma conversa com o mesmo nome,
/// é essa que se associa (os outros campos enviados são ignorados).
/// Associar duas vezes o mesmo par viola a chave primária composta.
pub async fn criar_ou_associar(
    db_pool: &SqlitePool,
    turma_id: i64,
    nova: NovaConversation,
) -> AppResult<Conversation> {
    tracing::info!("Associando conversa '{}' à turma {}", nova.name, turma_id);
    // IMMEDIATE: a procura pelo nome e o INSERT ficam sob o mesmo lock de escrita
    let mut tx = db_pool.begin_with("BEGIN IMMEDIATE").await?;
    garantir_turma(&mut *tx, turma_id).await?;

    let existente = sqlx::query_as::<_, Conversation>(
        "SELECT id, name, data_horario FROM conversations WHERE name = ?1 ORDER BY id ASC LIMIT 1",
    )
    .bind(&nova.name)
    .fetch_optional(&mut *tx)
    .await?;

    let conversa = match existente {
        Some(conversa) => {
            tracing::debug!("Conversa '{}' já existe (id {}), reutilizando.", conversa.name, conversa.id);
            conversa
        }
        None => {
            let data_horario = nova
                .data_horario
                .map(conversation::truncar_segundos)
                .unwrap_or_else(conversation::agora);
            sqlx::query_as::<_, Conversation>(
                r#"
                INSERT INTO conversations (name, data_horario)
                VALUES (?1, ?2)
                RETURNING id, name, data_horario
                "#,
            )
            .bind(&nova.name)
            .bind(formatar_data_horario(&data_horario))
            .fetch_one(&mut *tx)
            .await?
        }
    };

    sqlx::query("INSERT INTO turma_conversations (turma_id, conversation_id) VALUES (?1, ?2)")
        .bind(turma_id)
        .bind(conversa.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::info!("✅ Conversa {} associada à turma {}.", conversa.id, turma_id);
    Ok(conversa)
}

pub async fn listar_da_turma(db_pool: &SqlitePool, turma_id: i64) -> AppResult<Vec<Conversation>> {
    tracing::debug!("Listando conversas da turma {}", turma_id);
    let mut conn = db_pool.acquire().await?;
    garantir_turma(&mut *conn, turma_id).await?;

    let conversas = sqlx::query_as::<_, Conversation>(
        r#"
        SELECT c.id, c.name, c.data_horario
        FROM conversations c
        JOIN turma_conversations tc ON tc.conversation_id = c.id
        WHERE tc.turma_id = ?1
        ORDER BY c.data_horario ASC, c.id ASC
        "#,
    )
    .bind(turma_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(conversas)
}

async fn find_conversation_da_turma<'e, E>(
    executor: E,
    turma_id: i64,
    conversation_id: i64,
) -> AppResult<Option<Conversation>>
where
    E: SqliteExecutor<'e>,
{
    let conversa = sqlx::query_as::<_, Conversation>(
        r#"
        SELECT c.id, c.name, c.data_horario
        FROM conversations c
        JOIN turma_conversations tc ON tc.conversation_id = c.id
        WHERE tc.turma_id = ?1 AND c.id = ?2
        "#,
    )
    .bind(turma_id)
    .bind(conversation_id)
    .fetch_optional(executor)
    .await?;
    Ok(conversa)
}

pub async fn buscar_da_turma(
    db_pool: &SqlitePool,
    turma_id: i64,
    conversation_id: i64,
) -> AppResult<Conversation> {
    let mut conn = db_pool.acquire().await?;
    garantir_turma(&mut *conn, turma_id).await?;
    find_conversation_da_turma(&mut *conn, turma_id, conversation_id)
        .await?
        .ok_or_else(|| AppError::nao_encontrado("Conversa"))
}

/// Atualização parcial de uma conversa associada à turma.
/// A alteração é vista por todas as turmas que partilham a conversa.
pub async fn atualizar_conversation(
    db_pool: &SqlitePool,
    turma_id: i64,
    conversation_id: i64,
    alteracoes: ConversationAtualizacao,
) -> AppResult<Conversation> {
    tracing::info!("Atualizando conversa {} (turma {})", conversation_id, turma_id);
    let mut tx = db_pool.begin().await?;
    garantir_turma(&mut *tx, turma_id).await?;

    let mut conversa = find_conversation_da_turma(&mut *tx, turma_id, conversation_id)
        .await?
        .ok_or_else(|| AppError::nao_encontrado("Conversa"))?;
    conversa.aplicar(alteracoes);

    sqlx::query("UPDATE conversations SET name = ?1, data_horario = ?2 WHERE id = ?3")
        .bind(&conversa.name)
        .bind(formatar_data_horario(&conversa.data_horario))
        .bind(conversa.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::info!("✅ Conversa {} atualizada.", conversation_id);
    Ok(conversa)
}

/// Remove apenas a associação; a conversa continua nas outras turmas.
pub async fn desassociar(
    db_pool: &SqlitePool,
    turma_id: i64,
    conversation_id: i64,
) -> AppResult<()> {
    tracing::info!("Desassociando conversa {} da turma {}", conversation_id, turma_id);
    let mut tx = db_pool.begin().await?;
    garantir_turma(&mut *tx, turma_id).await?;

    let rows_affected = sqlx::query(
        "DELETE FROM turma_conversations WHERE turma_id = ?1 AND conversation_id = ?2",
    )
    .bind(turma_id)
    .bind(conversation_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if rows_affected == 0 {
        return Err(AppError::nao_encontrado("Conversa"));
    }

    tx.commit().await?;
    tracing::info!("✅ Conversa {} desassociada da turma {}.", conversation_id, turma_id);
    Ok(())
}

/// Conversas da turma com `data_horario` em `[inicio, fim]`, por ordem cronológica.
pub async fn listar_por_periodo(
    db_pool: &SqlitePool,
    turma_id: i64,
    filtro: &FiltroPeriodo,
) -> AppResult<Vec<Conversation>> {
    let (inicio, fim) = filtro.intervalo()?;
    tracing::debug!("Conversas da turma {} entre {} e {}", turma_id, inicio, fim);
    let mut conn = db_pool.acquire().await?;
    garantir_turma(&mut *conn, turma_id).await?;

    // O formato fixo ordena como o tempo, por isso a comparação de texto basta
    let conversas = sqlx::query_as::<_, Conversation>(
        r#"
        SELECT c.id, c.name, c.data_horario
        FROM conversations c
        JOIN turma_conversations tc ON tc.conversation_id = c.id
        WHERE tc.turma_id = ?1
          AND c.data_horario BETWEEN ?2 AND ?3
        ORDER BY c.data_horario ASC, c.id ASC
        "#,
    )
    .bind(turma_id)
    .bind(formatar_data_horario(&inicio))
    .bind(formatar_data_horario(&fim))
    .fetch_all(&mut *conn)
    .await?;

    tracing::debug!("Encontradas {} conversas no período.", conversas.len());
    Ok(conversas)
}
