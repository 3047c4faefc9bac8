// src/services/tutor_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        aluno::Aluno,
        paginacao::Paginacao,
        turma::Turma,
        tutor::{NovoTutor, Tutor, TutorAtualizacao},
    },
    services::exigir_resultados,
};
use sqlx::{SqliteExecutor, SqlitePool};

pub async fn criar_tutor(db_pool: &SqlitePool, novo: NovoTutor) -> AppResult<Tutor> {
    tracing::info!("Criando tutor: {}", novo.email);
    let tutor = sqlx::query_as::<_, Tutor>(
        r#"
        INSERT INTO tutors (name, email, language)
        VALUES (?1, ?2, ?3)
        RETURNING id, name, email, language
        "#,
    )
    .bind(&novo.name)
    .bind(&novo.email)
    .bind(&novo.language)
    .fetch_one(db_pool)
    .await?;

    tracing::info!("✅ Tutor {} criado.", tutor.id);
    Ok(tutor)
}

pub async fn listar_tutores(db_pool: &SqlitePool, pagina: Paginacao) -> AppResult<Vec<Tutor>> {
    tracing::debug!("Listando tutores (offset={}, limit={})", pagina.offset(), pagina.limit());
    let tutores = sqlx::query_as::<_, Tutor>(
        "SELECT id, name, email, language FROM tutors ORDER BY id ASC LIMIT ?1 OFFSET ?2",
    )
    .bind(pagina.limit())
    .bind(pagina.offset())
    .fetch_all(db_pool)
    .await?;
    Ok(tutores)
}

/// Busca um tutor por ID dentro de qualquer executor (pool ou transação).
pub async fn find_tutor_by_id<'e, E>(executor: E, tutor_id: i64) -> AppResult<Option<Tutor>>
where
    E: SqliteExecutor<'e>,
{
    let tutor = sqlx::query_as::<_, Tutor>(
        "SELECT id, name, email, language FROM tutors WHERE id = ?1",
    )
    .bind(tutor_id)
    .fetch_optional(executor)
    .await?;
    Ok(tutor)
}

pub async fn buscar_tutor(db_pool: &SqlitePool, tutor_id: i64) -> AppResult<Tutor> {
    tracing::debug!("Buscando tutor por ID: {}", tutor_id);
    find_tutor_by_id(db_pool, tutor_id)
        .await?
        .ok_or_else(|| AppError::nao_encontrado("Tutor"))
}

pub async fn atualizar_tutor(
    db_pool: &SqlitePool,
    tutor_id: i64,
    alteracoes: TutorAtualizacao,
) -> AppResult<Tutor> {
    tracing::info!("Atualizando tutor: {}", tutor_id);
    let mut tx = db_pool.begin().await?;

    let mut tutor = find_tutor_by_id(&mut *tx, tutor_id)
        .await?
        .ok_or_else(|| AppError::nao_encontrado("Tutor"))?;
    tutor.aplicar(alteracoes);

    sqlx::query("UPDATE tutors SET name = ?1, email = ?2, language = ?3 WHERE id = ?4")
        .bind(&tutor.name)
        .bind(&tutor.email)
        .bind(&tutor.language)
        .bind(tutor.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::info!("✅ Tutor {} atualizado.", tutor_id);
    Ok(tutor)
}

/// Apaga o tutor. Se ainda tiver turmas ou alunos, a chave estrangeira recusa.
pub async fn apagar_tutor(db_pool: &SqlitePool, tutor_id: i64) -> AppResult<()> {
    tracing::info!("Apagando tutor: {}", tutor_id);
    let mut tx = db_pool.begin().await?;

    let rows_affected = sqlx::query("DELETE FROM tutors WHERE id = ?1")
        .bind(tutor_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        return Err(AppError::nao_encontrado("Tutor"));
    }

    tx.commit().await?;
    tracing::info!("✅ Tutor {} apagado.", tutor_id);
    Ok(())
}

pub async fn turmas_do_tutor(
    db_pool: &SqlitePool,
    tutor_id: i64,
    lista_vazia_404: bool,
) -> AppResult<Vec<Turma>> {
    tracing::debug!("Buscando turmas do tutor {}", tutor_id);
    buscar_tutor(db_pool, tutor_id).await?;

    let turmas = sqlx::query_as::<_, Turma>(
        r#"
        SELECT id, title, content, level, created_at, updated_at, tutor_id
        FROM turmas
        WHERE tutor_id = ?1
        ORDER BY id ASC
        "#,
    )
    .bind(tutor_id)
    .fetch_all(db_pool)
    .await?;

    tracing::debug!("Encontradas {} turmas para o tutor {}.", turmas.len(), tutor_id);
    exigir_resultados(turmas, lista_vazia_404, "Nenhuma turma encontrada para este tutor")
}

/// Alunos das turmas do tutor (pela junção com `turmas`, não pela cópia `alunos.tutor_id`).
pub async fn alunos_do_tutor(
    db_pool: &SqlitePool,
    tutor_id: i64,
    lista_vazia_404: bool,
) -> AppResult<Vec<Aluno>> {
    tracing::debug!("Buscando alunos do tutor {}", tutor_id);
    buscar_tutor(db_pool, tutor_id).await?;

    let alunos = sqlx::query_as::<_, Aluno>(
        r#"
        SELECT a.id, a.nome, a.email, a.senha_hash, a.nickname, a.turma_id, a.tutor_id,
               a.created_at, a.updated_at
        FROM alunos a
        JOIN turmas t ON a.turma_id = t.id
        WHERE t.tutor_id = ?1
        ORDER BY a.id ASC
        "#,
    )
    .bind(tutor_id)
    .fetch_all(db_pool)
    .await?;

    tracing::debug!("Encontrados {} alunos para o tutor {}.", alunos.len(), tutor_id);
    exigir_resultados(alunos, lista_vazia_404, "Nenhum aluno encontrado para este tutor")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::pool_de_teste,
        services::testes::{aluno_exemplo, tutor_exemplo, turma_exemplo},
    };

    #[tokio::test]
    async fn criar_e_buscar_devolvem_o_mesmo_registo() {
        let pool = pool_de_teste().await;
        let criado = tutor_exemplo(&pool, "Ana").await;
        assert!(criado.id > 0);
        let lido = buscar_tutor(&pool, criado.id).await.unwrap();
        assert_eq!(lido, criado);
    }

    #[tokio::test]
    async fn buscar_inexistente_e_nao_encontrado() {
        let pool = pool_de_teste().await;
        let r = buscar_tutor(&pool, 42).await;
        assert!(matches!(r, Err(AppError::NaoEncontrado { recurso: "Tutor" })));
    }

    #[tokio::test]
    async fn listar_respeita_offset_e_limite_maximo() {
        let pool = pool_de_teste().await;
        let mut ids = Vec::new();
        for i in 0..105 {
            ids.push(tutor_exemplo(&pool, &format!("Tutor {}", i)).await.id);
        }

        let todos = listar_tutores(&pool, Paginacao::new(0, 1000)).await.unwrap();
        assert_eq!(todos.len(), 100);

        let fatia = listar_tutores(&pool, Paginacao::new(3, 4)).await.unwrap();
        let fatia_ids: Vec<i64> = fatia.iter().map(|t| t.id).collect();
        assert_eq!(fatia_ids, ids[3..7].to_vec());

        let padrao = listar_tutores(&pool, Paginacao::default()).await.unwrap();
        assert_eq!(padrao.len(), 10);
    }

    #[tokio::test]
    async fn atualizar_parcial_mantem_outros_campos() {
        let pool = pool_de_teste().await;
        let criado = tutor_exemplo(&pool, "Ana").await;
        let atualizado = atualizar_tutor(
            &pool,
            criado.id,
            TutorAtualizacao {
                language: Some(Some("es".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(atualizado.name, criado.name);
        assert_eq!(atualizado.email, criado.email);
        assert_eq!(atualizado.language.as_deref(), Some("es"));
        assert_eq!(buscar_tutor(&pool, criado.id).await.unwrap(), atualizado);
    }

    #[tokio::test]
    async fn apagar_tutor_sem_turmas() {
        let pool = pool_de_teste().await;
        let criado = tutor_exemplo(&pool, "Ana").await;
        apagar_tutor(&pool, criado.id).await.unwrap();
        assert!(buscar_tutor(&pool, criado.id).await.is_err());
        assert!(matches!(
            apagar_tutor(&pool, criado.id).await,
            Err(AppError::NaoEncontrado { .. })
        ));
    }

    #[tokio::test]
    async fn apagar_tutor_com_turmas_viola_restricao() {
        let pool = pool_de_teste().await;
        let tutor = tutor_exemplo(&pool, "Ana").await;
        turma_exemplo(&pool, "Inglês", Some(tutor.id)).await;
        let err = apagar_tutor(&pool, tutor.id).await.unwrap_err();
        assert!(err.is_violacao_de_restricao());
        assert!(buscar_tutor(&pool, tutor.id).await.is_ok());
    }

    #[tokio::test]
    async fn turmas_do_tutor_distingue_pai_inexistente_de_lista_vazia() {
        let pool = pool_de_teste().await;
        let tutor = tutor_exemplo(&pool, "Ana").await;

        assert!(matches!(
            turmas_do_tutor(&pool, 999, true).await,
            Err(AppError::NaoEncontrado { .. })
        ));
        assert!(matches!(
            turmas_do_tutor(&pool, tutor.id, true).await,
            Err(AppError::SemResultados(_))
        ));
        assert!(turmas_do_tutor(&pool, tutor.id, false).await.unwrap().is_empty());

        let turma = turma_exemplo(&pool, "Inglês", Some(tutor.id)).await;
        let turmas = turmas_do_tutor(&pool, tutor.id, true).await.unwrap();
        assert_eq!(turmas, vec![turma]);
    }

    #[tokio::test]
    async fn alunos_do_tutor_segue_as_turmas_do_tutor() {
        let pool = pool_de_teste().await;
        let ana = tutor_exemplo(&pool, "Ana").await;
        let bia = tutor_exemplo(&pool, "Bia").await;
        let turma_ana = turma_exemplo(&pool, "Inglês", Some(ana.id)).await;
        let turma_bia = turma_exemplo(&pool, "Espanhol", Some(bia.id)).await;
        let carlos = aluno_exemplo(&pool, turma_ana.id, "Carlos").await;
        aluno_exemplo(&pool, turma_bia.id, "Duda").await;

        let alunos = alunos_do_tutor(&pool, ana.id, true).await.unwrap();
        assert_eq!(alunos.len(), 1);
        assert_eq!(alunos[0].id, carlos.id);
    }
}
