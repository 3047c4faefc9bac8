// src/services/turma_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        aluno::Aluno,
        conversation::Conversation,
        paginacao::Paginacao,
        turma::{
            AlunoComTutor, InfoTurma, NovaTurma, QuantidadeAlunos, Turma, TurmaAtualizacao,
            TurmaDetalhada,
        },
        tutor::Tutor,
    },
    services::tutor_service,
};
use chrono::Utc;
use sqlx::{FromRow, SqliteConnection, SqliteExecutor, SqlitePool};
use std::collections::HashMap;

const COLUNAS_TURMA: &str = "id, title, content, level, created_at, updated_at, tutor_id";

pub async fn criar_turma(db_pool: &SqlitePool, nova: NovaTurma) -> AppResult<Turma> {
    tracing::info!("Criando turma: {}", nova.title);
    let mut tx = db_pool.begin().await?;

    if let Some(tutor_id) = nova.tutor_id {
        garantir_tutor(&mut *tx, tutor_id).await?;
    }

    let agora = Utc::now();
    let turma = sqlx::query_as::<_, Turma>(&format!(
        r#"
        INSERT INTO turmas (title, content, level, created_at, updated_at, tutor_id)
        VALUES (?1, ?2, ?3, ?4, ?4, ?5)
        RETURNING {}
        "#,
        COLUNAS_TURMA
    ))
    .bind(&nova.title)
    .bind(&nova.content)
    .bind(&nova.level)
    .bind(agora)
    .bind(nova.tutor_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::info!("✅ Turma {} criada.", turma.id);
    Ok(turma)
}

/// Lista turmas já com tutor, alunos e conversas.
pub async fn listar_turmas(
    db_pool: &SqlitePool,
    pagina: Paginacao,
) -> AppResult<Vec<TurmaDetalhada>> {
    tracing::debug!("Listando turmas (offset={}, limit={})", pagina.offset(), pagina.limit());
    let turmas = sqlx::query_as::<_, Turma>(&format!(
        "SELECT {} FROM turmas ORDER BY id ASC LIMIT ?1 OFFSET ?2",
        COLUNAS_TURMA
    ))
    .bind(pagina.limit())
    .bind(pagina.offset())
    .fetch_all(db_pool)
    .await?;

    carregar_detalhes(db_pool, turmas).await
}

pub async fn find_turma_by_id<'e, E>(executor: E, turma_id: i64) -> AppResult<Option<Turma>>
where
    E: SqliteExecutor<'e>,
{
    let turma = sqlx::query_as::<_, Turma>(&format!(
        "SELECT {} FROM turmas WHERE id = ?1",
        COLUNAS_TURMA
    ))
    .bind(turma_id)
    .fetch_optional(executor)
    .await?;
    Ok(turma)
}

pub async fn buscar_turma(db_pool: &SqlitePool, turma_id: i64) -> AppResult<TurmaDetalhada> {
    tracing::debug!("Buscando turma por ID: {}", turma_id);
    let turma = find_turma_by_id(db_pool, turma_id)
        .await?
        .ok_or_else(|| AppError::nao_encontrado("Turma"))?;

    carregar_detalhes(db_pool, vec![turma])
        .await?
        .pop()
        .ok_or(AppError::InternalServerError)
}

pub async fn atualizar_turma(
    db_pool: &SqlitePool,
    turma_id: i64,
    alteracoes: TurmaAtualizacao,
) -> AppResult<Turma> {
    tracing::info!("Atualizando turma: {}", turma_id);
    let mut tx = db_pool.begin().await?;

    let mut turma = find_turma_by_id(&mut *tx, turma_id)
        .await?
        .ok_or_else(|| AppError::nao_encontrado("Turma"))?;

    if let Some(Some(tutor_id)) = alteracoes.tutor_id {
        garantir_tutor(&mut *tx, tutor_id).await?;
    }
    let tutor_mudou = turma.aplicar(alteracoes, Utc::now());

    gravar_turma(&mut *tx, &turma).await?;
    if tutor_mudou {
        sincronizar_tutor_dos_alunos(&mut *tx, &turma).await?;
    }

    tx.commit().await?;
    tracing::info!("✅ Turma {} atualizada.", turma_id);
    Ok(turma)
}

/// Atribui um tutor à turma e propaga-o aos alunos da turma.
pub async fn atribuir_tutor(
    db_pool: &SqlitePool,
    turma_id: i64,
    tutor_id: i64,
) -> AppResult<Turma> {
    tracing::info!("Atribuindo tutor {} à turma {}", tutor_id, turma_id);
    atualizar_turma(
        db_pool,
        turma_id,
        TurmaAtualizacao {
            tutor_id: Some(Some(tutor_id)),
            ..Default::default()
        },
    )
    .await
}

/// Apaga a turma e as suas associações a conversas (as conversas ficam).
/// Turmas que ainda têm alunos são recusadas.
pub async fn apagar_turma(db_pool: &SqlitePool, turma_id: i64) -> AppResult<()> {
    tracing::info!("Apagando turma: {}", turma_id);
    let mut tx = db_pool.begin().await?;

    if find_turma_by_id(&mut *tx, turma_id).await?.is_none() {
        return Err(AppError::nao_encontrado("Turma"));
    }

    let alunos = contar_alunos(&mut *tx, turma_id).await?;
    if alunos > 0 {
        return Err(AppError::Conflito(format!(
            "A turma {} ainda tem {} aluno(s); mova-os ou apague-os primeiro",
            turma_id, alunos
        )));
    }

    // turma_conversations cai por ON DELETE CASCADE
    sqlx::query("DELETE FROM turmas WHERE id = ?1")
        .bind(turma_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::info!("✅ Turma {} apagada.", turma_id);
    Ok(())
}

/// Tutor, idioma do tutor e nível da turma com o título exato `nome`.
pub async fn info_por_nome(db_pool: &SqlitePool, nome: &str) -> AppResult<InfoTurma> {
    tracing::debug!("Buscando turma pelo nome: {}", nome);
    sqlx::query_as::<_, InfoTurma>(
        r#"
        SELECT t.id AS turma_id, t.title, tu.name AS tutor, tu.language, t.level
        FROM turmas t
        LEFT JOIN tutors tu ON t.tutor_id = tu.id
        WHERE t.title = ?1
        ORDER BY t.id ASC
        LIMIT 1
        "#,
    )
    .bind(nome)
    .fetch_optional(db_pool)
    .await?
    .ok_or_else(|| AppError::nao_encontrado("Turma"))
}

pub async fn quantidade_alunos(db_pool: &SqlitePool, turma_id: i64) -> AppResult<QuantidadeAlunos> {
    if find_turma_by_id(db_pool, turma_id).await?.is_none() {
        return Err(AppError::nao_encontrado("Turma"));
    }
    let quantidade = contar_alunos(db_pool, turma_id).await?;
    tracing::debug!("Turma {} tem {} alunos.", turma_id, quantidade);
    Ok(QuantidadeAlunos {
        turma_id,
        quantidade,
    })
}

async fn contar_alunos<'e, E>(executor: E, turma_id: i64) -> AppResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let quantidade: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM alunos WHERE turma_id = ?1")
        .bind(turma_id)
        .fetch_one(executor)
        .await?;
    Ok(quantidade)
}

async fn garantir_tutor(conn: &mut SqliteConnection, tutor_id: i64) -> AppResult<()> {
    if tutor_service::find_tutor_by_id(&mut *conn, tutor_id)
        .await?
        .is_none()
    {
        tracing::warn!("Tutor {} não existe.", tutor_id);
        return Err(AppError::nao_encontrado("Tutor"));
    }
    Ok(())
}

async fn gravar_turma(conn: &mut SqliteConnection, turma: &Turma) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE turmas
        SET title = ?1, content = ?2, level = ?3, updated_at = ?4, tutor_id = ?5
        WHERE id = ?6
        "#,
    )
    .bind(&turma.title)
    .bind(&turma.content)
    .bind(&turma.level)
    .bind(turma.updated_at)
    .bind(turma.tutor_id)
    .bind(turma.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

// alunos.tutor_id é uma cópia do tutor da turma
async fn sincronizar_tutor_dos_alunos(conn: &mut SqliteConnection, turma: &Turma) -> AppResult<()> {
    let rows_affected = sqlx::query("UPDATE alunos SET tutor_id = ?1 WHERE turma_id = ?2")
        .bind(turma.tutor_id)
        .bind(turma.id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    tracing::debug!(
        "tutor_id de {} aluno(s) da turma {} sincronizado.",
        rows_affected,
        turma.id
    );
    Ok(())
}

#[derive(FromRow)]
struct ConversationDaTurma {
    turma_id: i64,
    #[sqlx(flatten)]
    conversation: Conversation,
}

/// Carrega tutores, alunos e conversas de várias turmas com três consultas.
async fn carregar_detalhes(
    db_pool: &SqlitePool,
    turmas: Vec<Turma>,
) -> AppResult<Vec<TurmaDetalhada>> {
    if turmas.is_empty() {
        return Ok(Vec::new());
    }

    let turma_ids: Vec<i64> = turmas.iter().map(|t| t.id).collect();
    let turma_ids_json = lista_json(&turma_ids)?;

    let alunos = sqlx::query_as::<_, Aluno>(
        r#"
        SELECT id, nome, email, senha_hash, nickname, turma_id, tutor_id, created_at, updated_at
        FROM alunos
        WHERE turma_id IN (SELECT value FROM json_each(?1))
        ORDER BY id ASC
        "#,
    )
    .bind(&turma_ids_json)
    .fetch_all(db_pool)
    .await?;

    let mut tutor_ids: Vec<i64> = turmas
        .iter()
        .filter_map(|t| t.tutor_id)
        .chain(alunos.iter().filter_map(|a| a.tutor_id))
        .collect();
    tutor_ids.sort_unstable();
    tutor_ids.dedup();

    let tutores: HashMap<i64, Tutor> = sqlx::query_as::<_, Tutor>(
        r#"
        SELECT id, name, email, language FROM tutors
        WHERE id IN (SELECT value FROM json_each(?1))
        "#,
    )
    .bind(lista_json(&tutor_ids)?)
    .fetch_all(db_pool)
    .await?
    .into_iter()
    .map(|t| (t.id, t))
    .collect();

    let mut alunos_por_turma: HashMap<i64, Vec<AlunoComTutor>> = HashMap::new();
    for aluno in alunos {
        alunos_por_turma
            .entry(aluno.turma_id)
            .or_default()
            .push(AlunoComTutor {
                tutor: aluno.tutor_id.and_then(|id| tutores.get(&id).cloned()),
                aluno,
            });
    }

    let mut conversas_por_turma: HashMap<i64, Vec<Conversation>> = HashMap::new();
    let conversas = sqlx::query_as::<_, ConversationDaTurma>(
        r#"
        SELECT tc.turma_id, c.id, c.name, c.data_horario
        FROM turma_conversations tc
        JOIN conversations c ON tc.conversation_id = c.id
        WHERE tc.turma_id IN (SELECT value FROM json_each(?1))
        ORDER BY c.data_horario ASC, c.id ASC
        "#,
    )
    .bind(&turma_ids_json)
    .fetch_all(db_pool)
    .await?;
    for linha in conversas {
        conversas_por_turma
            .entry(linha.turma_id)
            .or_default()
            .push(linha.conversation);
    }

    Ok(turmas
        .into_iter()
        .map(|turma| TurmaDetalhada {
            tutor: turma.tutor_id.and_then(|id| tutores.get(&id).cloned()),
            alunos: alunos_por_turma.remove(&turma.id).unwrap_or_default(),
            conversations: conversas_por_turma.remove(&turma.id).unwrap_or_default(),
            turma,
        })
        .collect())
}

fn lista_json(ids: &[i64]) -> AppResult<String> {
    serde_json::to_string(ids).map_err(|e| {
        tracing::error!("Erro ao serializar IDs para JSON: {:?}", e);
        AppError::InternalServerError
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::pool_de_teste,
        models::conversation::NovaConversation,
        services::{
            aluno_service, conversation_service,
            testes::{aluno_exemplo, turma_exemplo, tutor_exemplo},
        },
    };

    #[tokio::test]
    async fn criar_e_buscar_devolvem_o_mesmo_registo() {
        let pool = pool_de_teste().await;
        let tutor = tutor_exemplo(&pool, "Ana").await;
        let criada = turma_exemplo(&pool, "Inglês A1", Some(tutor.id)).await;
        assert_eq!(criada.created_at, criada.updated_at);

        let lida = buscar_turma(&pool, criada.id).await.unwrap();
        assert_eq!(lida.turma, criada);
        assert_eq!(lida.tutor, Some(tutor));
        assert!(lida.alunos.is_empty());
        assert!(lida.conversations.is_empty());
    }

    #[tokio::test]
    async fn criar_com_tutor_inexistente_e_nao_encontrado() {
        let pool = pool_de_teste().await;
        let r = criar_turma(
            &pool,
            NovaTurma {
                title: "X".into(),
                content: "Y".into(),
                level: None,
                tutor_id: Some(77),
            },
        )
        .await;
        assert!(matches!(r, Err(AppError::NaoEncontrado { recurso: "Tutor" })));
    }

    #[tokio::test]
    async fn listar_carrega_tutor_alunos_e_conversas() {
        let pool = pool_de_teste().await;
        let tutor = tutor_exemplo(&pool, "Ana").await;
        let com_tutor = turma_exemplo(&pool, "Inglês", Some(tutor.id)).await;
        let sem_tutor = turma_exemplo(&pool, "Espanhol", None).await;
        let aluno = aluno_exemplo(&pool, com_tutor.id, "Carlos").await;
        conversation_service::criar_ou_associar(
            &pool,
            com_tutor.id,
            NovaConversation {
                name: "Boas-vindas".into(),
                data_horario: None,
            },
        )
        .await
        .unwrap();

        let turmas = listar_turmas(&pool, Paginacao::default()).await.unwrap();
        assert_eq!(turmas.len(), 2);
        assert_eq!(turmas[0].turma.id, com_tutor.id);
        assert_eq!(turmas[0].tutor.as_ref().map(|t| t.id), Some(tutor.id));
        assert_eq!(
            turmas[0].alunos,
            vec![AlunoComTutor {
                aluno,
                tutor: Some(tutor.clone()),
            }]
        );
        assert_eq!(turmas[0].conversations.len(), 1);
        assert_eq!(turmas[1].turma.id, sem_tutor.id);
        assert!(turmas[1].tutor.is_none());
        assert!(turmas[1].alunos.is_empty());
    }

    #[tokio::test]
    async fn atualizar_parcial_renova_updated_at() {
        let pool = pool_de_teste().await;
        let criada = turma_exemplo(&pool, "Inglês", None).await;
        let atualizada = atualizar_turma(
            &pool,
            criada.id,
            TurmaAtualizacao {
                title: Some("Inglês II".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(atualizada.title, "Inglês II");
        assert_eq!(atualizada.content, criada.content);
        assert_eq!(atualizada.level, criada.level);
        assert_eq!(atualizada.created_at, criada.created_at);
        assert!(atualizada.updated_at >= criada.updated_at);
        assert_eq!(buscar_turma(&pool, criada.id).await.unwrap().turma, atualizada);
    }

    #[tokio::test]
    async fn atualizar_inexistente_e_nao_encontrado() {
        let pool = pool_de_teste().await;
        let r = atualizar_turma(&pool, 5, TurmaAtualizacao::default()).await;
        assert!(matches!(r, Err(AppError::NaoEncontrado { recurso: "Turma" })));
    }

    #[tokio::test]
    async fn atribuir_tutor_propaga_aos_alunos() {
        let pool = pool_de_teste().await;
        let ana = tutor_exemplo(&pool, "Ana").await;
        let bia = tutor_exemplo(&pool, "Bia").await;
        let turma = turma_exemplo(&pool, "Inglês", Some(ana.id)).await;
        let aluno = aluno_exemplo(&pool, turma.id, "Carlos").await;
        assert_eq!(aluno.tutor_id, Some(ana.id));

        let turma = atribuir_tutor(&pool, turma.id, bia.id).await.unwrap();
        assert_eq!(turma.tutor_id, Some(bia.id));
        let aluno = aluno_service::buscar_aluno(&pool, aluno.id).await.unwrap();
        assert_eq!(aluno.tutor_id, Some(bia.id));

        assert!(matches!(
            atribuir_tutor(&pool, turma.id, 999).await,
            Err(AppError::NaoEncontrado { recurso: "Tutor" })
        ));
        assert!(matches!(
            atribuir_tutor(&pool, 999, bia.id).await,
            Err(AppError::NaoEncontrado { recurso: "Turma" })
        ));
    }

    #[tokio::test]
    async fn tutor_id_nulo_desatribui_e_propaga_aos_alunos() {
        let pool = pool_de_teste().await;
        let ana = tutor_exemplo(&pool, "Ana").await;
        let turma = turma_exemplo(&pool, "Inglês", Some(ana.id)).await;
        let aluno = aluno_exemplo(&pool, turma.id, "Carlos").await;

        let alteracoes: TurmaAtualizacao =
            serde_json::from_str(r#"{"tutor_id": null, "level": null}"#).unwrap();
        let atualizada = atualizar_turma(&pool, turma.id, alteracoes).await.unwrap();
        assert!(atualizada.tutor_id.is_none());
        assert!(atualizada.level.is_none());
        assert_eq!(atualizada.title, turma.title);

        let lida = buscar_turma(&pool, turma.id).await.unwrap();
        assert!(lida.tutor.is_none());
        assert!(lida.turma.level.is_none());
        assert!(lida.alunos[0].tutor.is_none());
        let aluno = aluno_service::buscar_aluno(&pool, aluno.id).await.unwrap();
        assert!(aluno.tutor_id.is_none());

        let r = atualizar_turma(
            &pool,
            turma.id,
            TurmaAtualizacao {
                tutor_id: Some(Some(999)),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(r, Err(AppError::NaoEncontrado { recurso: "Tutor" })));
        assert!(buscar_turma(&pool, turma.id).await.unwrap().turma.tutor_id.is_none());
    }

    #[tokio::test]
    async fn apagar_turma_remove_associacoes_mas_mantem_conversas() {
        let pool = pool_de_teste().await;
        let turma = turma_exemplo(&pool, "Inglês", None).await;
        let outra = turma_exemplo(&pool, "Espanhol", None).await;
        let conversa = conversation_service::criar_ou_associar(
            &pool,
            turma.id,
            NovaConversation {
                name: "Aula 1".into(),
                data_horario: None,
            },
        )
        .await
        .unwrap();
        conversation_service::criar_ou_associar(
            &pool,
            outra.id,
            NovaConversation {
                name: "Aula 1".into(),
                data_horario: None,
            },
        )
        .await
        .unwrap();

        apagar_turma(&pool, turma.id).await.unwrap();
        assert!(matches!(
            buscar_turma(&pool, turma.id).await,
            Err(AppError::NaoEncontrado { .. })
        ));

        let restantes = conversation_service::listar_da_turma(&pool, outra.id)
            .await
            .unwrap();
        assert_eq!(restantes, vec![conversa]);
        let associacoes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM turma_conversations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(associacoes, 1);
    }

    #[tokio::test]
    async fn apagar_turma_com_alunos_e_conflito() {
        let pool = pool_de_teste().await;
        let turma = turma_exemplo(&pool, "Inglês", None).await;
        aluno_exemplo(&pool, turma.id, "Carlos").await;
        assert!(matches!(
            apagar_turma(&pool, turma.id).await,
            Err(AppError::Conflito(_))
        ));
        assert!(buscar_turma(&pool, turma.id).await.is_ok());
    }

    #[tokio::test]
    async fn info_por_nome_traz_tutor_idioma_e_nivel() {
        let pool = pool_de_teste().await;
        let tutor = tutor_exemplo(&pool, "Ana").await;
        let turma = turma_exemplo(&pool, "Inglês A1", Some(tutor.id)).await;

        let info = info_por_nome(&pool, "Inglês A1").await.unwrap();
        assert_eq!(
            info,
            InfoTurma {
                turma_id: turma.id,
                title: "Inglês A1".into(),
                tutor: Some("Ana".into()),
                language: Some("pt-BR".into()),
                level: Some("A1".into()),
            }
        );
        assert!(matches!(
            info_por_nome(&pool, "Inglês").await,
            Err(AppError::NaoEncontrado { recurso: "Turma" })
        ));
    }

    #[tokio::test]
    async fn quantidade_de_alunos() {
        let pool = pool_de_teste().await;
        let turma = turma_exemplo(&pool, "Inglês", None).await;
        assert_eq!(quantidade_alunos(&pool, turma.id).await.unwrap().quantidade, 0);
        aluno_exemplo(&pool, turma.id, "Carlos").await;
        aluno_exemplo(&pool, turma.id, "Duda").await;
        assert_eq!(quantidade_alunos(&pool, turma.id).await.unwrap().quantidade, 2);
        assert!(quantidade_alunos(&pool, 999).await.is_err());
    }
}
