// src/web/aluno_handlers.rs
use crate::{
    error::AppResult,
    models::{
        aluno::{Aluno, AlunoAtualizacao, BuscaPorNome, NovoAluno, TrocaDeTurma},
        paginacao::Paginacao,
    },
    services::aluno_service,
    state::AppState,
    web::Confirmacao,
};
use axum::extract::{Json, Path, Query, State};

/// POST /turmas/{id}/alunos
pub async fn handle_criar_aluno(
    State(state): State<AppState>,
    Path(turma_id): Path<i64>,
    Json(novo): Json<NovoAluno>,
) -> AppResult<Json<Aluno>> {
    let aluno =
        aluno_service::criar_aluno(&state.db_pool, turma_id, novo, state.config.bcrypt_cost)
            .await?;
    Ok(Json(aluno))
}

/// GET /turmas/{id}/alunos?offset=&limit=
pub async fn handle_listar_alunos(
    State(state): State<AppState>,
    Path(turma_id): Path<i64>,
    Query(pagina): Query<Paginacao>,
) -> AppResult<Json<Vec<Aluno>>> {
    let alunos = aluno_service::listar_alunos_da_turma(&state.db_pool, turma_id, pagina).await?;
    Ok(Json(alunos))
}

/// GET /turmas/alunos/{aluno_id} (sem escopo de turma)
pub async fn handle_ver_aluno_por_id(
    State(state): State<AppState>,
    Path(aluno_id): Path<i64>,
) -> AppResult<Json<Aluno>> {
    let aluno = aluno_service::buscar_aluno(&state.db_pool, aluno_id).await?;
    Ok(Json(aluno))
}

pub async fn handle_ver_aluno(
    State(state): State<AppState>,
    Path((turma_id, aluno_id)): Path<(i64, i64)>,
) -> AppResult<Json<Aluno>> {
    let aluno = aluno_service::buscar_aluno_da_turma(&state.db_pool, turma_id, aluno_id).await?;
    Ok(Json(aluno))
}

pub async fn handle_atualizar_aluno(
    State(state): State<AppState>,
    Path((turma_id, aluno_id)): Path<(i64, i64)>,
    Json(alteracoes): Json<AlunoAtualizacao>,
) -> AppResult<Json<Aluno>> {
    let aluno = aluno_service::atualizar_aluno(
        &state.db_pool,
        turma_id,
        aluno_id,
        alteracoes,
        state.config.bcrypt_cost,
    )
    .await?;
    Ok(Json(aluno))
}

pub async fn handle_apagar_aluno(
    State(state): State<AppState>,
    Path((turma_id, aluno_id)): Path<(i64, i64)>,
) -> AppResult<Json<Confirmacao>> {
    aluno_service::apagar_aluno(&state.db_pool, turma_id, aluno_id).await?;
    Ok(Json(Confirmacao::ok()))
}

/// GET /turmas/alunos/busca?texto=
pub async fn handle_buscar_por_nome(
    State(state): State<AppState>,
    Query(busca): Query<BuscaPorNome>,
) -> AppResult<Json<Vec<Aluno>>> {
    let alunos =
        aluno_service::buscar_por_nome(&state.db_pool, &busca.texto, state.config.lista_vazia_404)
            .await?;
    Ok(Json(alunos))
}

/// PUT /turmas/{aluno_id}/trocar-turma?nova_turma_id=
pub async fn handle_trocar_turma(
    State(state): State<AppState>,
    Path(aluno_id): Path<i64>,
    Query(troca): Query<TrocaDeTurma>,
) -> AppResult<Json<Aluno>> {
    let aluno = aluno_service::trocar_turma(&state.db_pool, aluno_id, troca.nova_turma_id).await?;
    Ok(Json(aluno))
}
