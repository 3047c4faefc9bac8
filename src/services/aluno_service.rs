// src/services/aluno_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        aluno::{Aluno, AlunoAtualizacao, NovoAluno},
        paginacao::Paginacao,
    },
    services::{exigir_resultados, senha_service, turma_service},
};
use chrono::Utc;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const COLUNAS_ALUNO: &str =
    "id, nome, email, senha_hash, nickname, turma_id, tutor_id, created_at, updated_at";

/// Cria um aluno na turma; `tutor_id` é copiado do tutor da turma.
pub async fn criar_aluno(
    db_pool: &SqlitePool,
    turma_id: i64,
    novo: NovoAluno,
    custo_bcrypt: u32,
) -> AppResult<Aluno> {
    tracing::info!("Criando aluno '{}' na turma {}", novo.nome, turma_id);
    // Hash antes de abrir a transação para não prender a conexão
    let senha_hash = senha_service::hash_password(&novo.senha, custo_bcrypt).await?;

    let mut tx = db_pool.begin().await?;
    let turma = turma_service::find_turma_by_id(&mut *tx, turma_id)
        .await?
        .ok_or_else(|| AppError::nao_encontrado("Turma"))?;

    let agora = Utc::now();
    let aluno = sqlx::query_as::<_, Aluno>(&format!(
        r#"
        INSERT INTO alunos (nome, email, senha_hash, nickname, turma_id, tutor_id, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
        RETURNING {}
        "#,
        COLUNAS_ALUNO
    ))
    .bind(&novo.nome)
    .bind(&novo.email)
    .bind(&senha_hash)
    .bind(&novo.nickname)
    .bind(turma.id)
    .bind(turma.tutor_id)
    .bind(agora)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::info!("✅ Aluno {} criado na turma {}.", aluno.id, turma_id);
    Ok(aluno)
}

pub async fn listar_alunos_da_turma(
    db_pool: &SqlitePool,
    turma_id: i64,
    pagina: Paginacao,
) -> AppResult<Vec<Aluno>> {
    tracing::debug!("Listando alunos da turma {}", turma_id);
    if turma_service::find_turma_by_id(db_pool, turma_id).await?.is_none() {
        return Err(AppError::nao_encontrado("Turma"));
    }

    let alunos = sqlx::query_as::<_, Aluno>(&format!(
        "SELECT {} FROM alunos WHERE turma_id = ?1 ORDER BY id ASC LIMIT ?2 OFFSET ?3",
        COLUNAS_ALUNO
    ))
    .bind(turma_id)
    .bind(pagina.limit())
    .bind(pagina.offset())
    .fetch_all(db_pool)
    .await?;
    Ok(alunos)
}

pub async fn find_aluno_by_id<'e, E>(executor: E, aluno_id: i64) -> AppResult<Option<Aluno>>
where
    E: SqliteExecutor<'e>,
{
    let aluno = sqlx::query_as::<_, Aluno>(&format!(
        "SELECT {} FROM alunos WHERE id = ?1",
        COLUNAS_ALUNO
    ))
    .bind(aluno_id)
    .fetch_optional(executor)
    .await?;
    Ok(aluno)
}

pub async fn buscar_aluno(db_pool: &SqlitePool, aluno_id: i64) -> AppResult<Aluno> {
    tracing::debug!("Buscando aluno por ID: {}", aluno_id);
    find_aluno_by_id(db_pool, aluno_id)
        .await?
        .ok_or_else(|| AppError::nao_encontrado("Aluno"))
}

// Aluno que existe mas pertence a outra turma conta como não encontrado.
async fn aluno_da_turma(
    conn: &mut SqliteConnection,
    turma_id: i64,
    aluno_id: i64,
) -> AppResult<Aluno> {
    if turma_service::find_turma_by_id(&mut *conn, turma_id)
        .await?
        .is_none()
    {
        return Err(AppError::nao_encontrado("Turma"));
    }
    match find_aluno_by_id(&mut *conn, aluno_id).await? {
        Some(aluno) if aluno.turma_id == turma_id => Ok(aluno),
        Some(aluno) => {
            tracing::warn!(
                "Aluno {} pertence à turma {}, não à turma {}.",
                aluno_id,
                aluno.turma_id,
                turma_id
            );
            Err(AppError::nao_encontrado("Aluno"))
        }
        None => Err(AppError::nao_encontrado("Aluno")),
    }
}

pub async fn buscar_aluno_da_turma(
    db_pool: &SqlitePool,
    turma_id: i64,
    aluno_id: i64,
) -> AppResult<Aluno> {
    let mut conn = db_pool.acquire().await?;
    aluno_da_turma(&mut *conn, turma_id, aluno_id).await
}

pub async fn atualizar_aluno(
    db_pool: &SqlitePool,
    turma_id: i64,
    aluno_id: i64,
    mut alteracoes: AlunoAtualizacao,
    custo_bcrypt: u32,
) -> AppResult<Aluno> {
    tracing::info!("Atualizando aluno {} da turma {}", aluno_id, turma_id);
    let nova_senha_hash = match alteracoes.senha.take() {
        Some(senha) => Some(senha_service::hash_password(&senha, custo_bcrypt).await?),
        None => None,
    };

    let mut tx = db_pool.begin().await?;
    let mut aluno = aluno_da_turma(&mut *tx, turma_id, aluno_id).await?;

    if let Some(senha_hash) = nova_senha_hash {
        aluno.senha_hash = senha_hash;
    }
    aluno.aplicar(alteracoes, Utc::now());
    gravar_aluno(&mut *tx, &aluno).await?;

    tx.commit().await?;
    tracing::info!("✅ Aluno {} atualizado.", aluno_id);
    Ok(aluno)
}

pub async fn apagar_aluno(db_pool: &SqlitePool, turma_id: i64, aluno_id: i64) -> AppResult<()> {
    tracing::info!("Apagando aluno {} da turma {}", aluno_id, turma_id);
    let mut tx = db_pool.begin().await?;
    aluno_da_turma(&mut *tx, turma_id, aluno_id).await?;

    sqlx::query("DELETE FROM alunos WHERE id = ?1")
        .bind(aluno_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::info!("✅ Aluno {} apagado.", aluno_id);
    Ok(())
}

/// Busca por fragmento do nome (`LIKE`, sem distinguir maiúsculas em ASCII).
pub async fn buscar_por_nome(
    db_pool: &SqlitePool,
    texto: &str,
    lista_vazia_404: bool,
) -> AppResult<Vec<Aluno>> {
    tracing::debug!("Buscando alunos com nome contendo '{}'", texto);
    let alunos = sqlx::query_as::<_, Aluno>(&format!(
        r#"
        SELECT {} FROM alunos
        WHERE nome LIKE '%' || ?1 || '%' ESCAPE '\'
        ORDER BY id ASC
        "#,
        COLUNAS_ALUNO
    ))
    .bind(escapar_like(texto))
    .fetch_all(db_pool)
    .await?;

    tracing::debug!("Encontrados {} alunos para '{}'.", alunos.len(), texto);
    exigir_resultados(alunos, lista_vazia_404, "Nenhum aluno encontrado com esse nome")
}

fn escapar_like(texto: &str) -> String {
    texto
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Move o aluno para outra turma, levando o tutor da nova turma.
pub async fn trocar_turma(
    db_pool: &SqlitePool,
    aluno_id: i64,
    nova_turma_id: i64,
) -> AppResult<Aluno> {
    tracing::info!("Movendo aluno {} para a turma {}", aluno_id, nova_turma_id);
    let mut tx = db_pool.begin().await?;

    let mut aluno = find_aluno_by_id(&mut *tx, aluno_id)
        .await?
        .ok_or_else(|| AppError::nao_encontrado("Aluno"))?;
    let nova_turma = turma_service::find_turma_by_id(&mut *tx, nova_turma_id)
        .await?
        .ok_or_else(|| AppError::nao_encontrado("Turma"))?;

    aluno.turma_id = nova_turma.id;
    aluno.tutor_id = nova_turma.tutor_id;
    aluno.tocar(Utc::now());
    gravar_aluno(&mut *tx, &aluno).await?;

    tx.commit().await?;
    tracing::info!("✅ Aluno {} agora na turma {}.", aluno_id, nova_turma_id);
    Ok(aluno)
}

async fn gravar_aluno(conn: &mut SqliteConnection, aluno: &Aluno) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE alunos
        SET nome = ?1, email = ?2, senha_hash = ?3, nickname = ?4,
            turma_id = ?5, tutor_id = ?6, updated_at = ?7
        WHERE id = ?8
        "#,
    )
    .bind(&aluno.nome)
    .bind(&aluno.email)
    .bind(&aluno.senha_hash)
    .bind(&aluno.nickname)
    .bind(aluno.turma_id)
    .bind(aluno.tutor_id)
    .bind(aluno.updated_at)
    .bind(aluno.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
